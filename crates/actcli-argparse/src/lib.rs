//! Action-based command-line parsing.
//!
//! A program is a set of named actions (sub-commands). Each action declares
//! its options with compact definition strings such as `-f, --file=FILE` or
//! `-i, --indent[=N]`, and a handler with an explicit positional signature.
//! Dispatch picks the action from the first token, scans its leading options,
//! checks the remaining positionals against the signature and calls the
//! handler.
//!
//! ```
//! use actcli_argparse::{ActionDef, App, HandlerSignature, OptionDef, Outcome};
//!
//! let mut app = App::new("tool");
//! app.register(
//!     ActionDef::define("hello [name]", "print greeting")
//!         .option(OptionDef::new("-u, --upper", "upper case").unwrap())
//!         .handler(HandlerSignature::new().optional("name"), |inv| {
//!             let msg = format!("Hello {}", inv.arg(0).unwrap_or("world"));
//!             Ok(if inv.options().is_set("upper") { msg.to_uppercase() } else { msg })
//!         })
//!         .unwrap(),
//! )
//! .unwrap();
//!
//! assert_eq!(app.run(["hello", "-u", "bob"]).unwrap(), Outcome::Output("HELLO BOB".into()));
//! ```

pub mod action;
pub mod app;
pub mod arity;
pub mod error;
pub mod help;
pub mod metadata;
pub mod option;
pub mod registry;
pub mod scanner;
pub mod value;

pub use action::{ActionBuilder, ActionDef, Handler, Invocation};
pub use app::{App, SimpleApp};
pub use arity::HandlerSignature;
pub use error::{CommandOptionError, CommandResult, DefinitionError, error};
pub use option::{ArgRequirement, OptionDef, OptionSyntax, parse_option_def};
pub use registry::Registry;
pub use scanner::OptionParser;
pub use value::{OptionMap, Outcome, Value};
