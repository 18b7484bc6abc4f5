//! Action definitions and the builder that registers them.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::app::App;
use crate::arity::HandlerSignature;
use crate::error::{CommandResult, DefinitionError};
use crate::option::OptionDef;
use crate::value::{OptionMap, Outcome};

/// Internal name of the action holding program-level options.
pub const GLOBAL_ACTION_NAME: &str = "<global>";

/// Callable invoked once arguments have been scanned and checked.
pub type Handler = Arc<dyn Fn(&Invocation<'_>) -> CommandResult<Outcome> + Send + Sync>;

/// Everything a handler gets to see for one dispatch.
#[derive(Clone, Copy)]
pub struct Invocation<'a> {
    app: &'a App,
    action: &'a ActionDef,
    args: &'a [String],
    options: &'a OptionMap,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(
        app: &'a App,
        action: &'a ActionDef,
        args: &'a [String],
        options: &'a OptionMap,
    ) -> Self {
        Self {
            app,
            action,
            args,
            options,
        }
    }

    pub fn app(&self) -> &'a App {
        self.app
    }

    pub fn action(&self) -> &'a ActionDef {
        self.action
    }

    /// Residual positional arguments.
    pub fn args(&self) -> &'a [String] {
        self.args
    }

    /// Positional argument by index.
    pub fn arg(&self, index: usize) -> Option<&'a str> {
        self.args.get(index).map(String::as_str)
    }

    pub fn options(&self) -> &'a OptionMap {
        self.options
    }
}

/// Split an action definition into its name and argument layout.
///
/// `"rename old-name new-name"` yields `("rename", Some("old-name new-name"))`.
pub fn parse_action_def(defstr: &str) -> Result<(String, Option<String>), DefinitionError> {
    let s = defstr.trim();
    if s.is_empty() {
        return Err(DefinitionError::InvalidAction(defstr.to_string()));
    }
    match s.split_once(char::is_whitespace) {
        Some((name, rest)) => {
            let rest = rest.trim();
            let argdef = (!rest.is_empty()).then(|| rest.to_string());
            Ok((name.to_string(), argdef))
        }
        None => Ok((s.to_string(), None)),
    }
}

/// A registered sub-command.
#[derive(Clone)]
pub struct ActionDef {
    name: String,
    argdef: Option<String>,
    desc: Option<String>,
    doc: Option<String>,
    options: Vec<OptionDef>,
    alias: Option<String>,
    signature: HandlerSignature,
    handler: Handler,
}

impl ActionDef {
    /// Start defining an action from `"name [arg layout]"` and its description.
    pub fn define(defstr: impl Into<String>, desc: impl Into<String>) -> ActionBuilder {
        ActionBuilder {
            defstr: Some(defstr.into()),
            desc: Some(desc.into()),
            doc: None,
            alias: None,
            options: Vec::new(),
        }
    }

    /// Start defining the program-level action consulted before any action name.
    pub fn global() -> ActionBuilder {
        ActionBuilder {
            defstr: None,
            desc: None,
            doc: None,
            alias: None,
            options: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn argdef(&self) -> Option<&str> {
        self.argdef.as_deref()
    }

    pub fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn options(&self) -> &[OptionDef] {
        &self.options
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn signature(&self) -> &HandlerSignature {
        &self.signature
    }

    pub fn is_global(&self) -> bool {
        self.name == GLOBAL_ACTION_NAME
    }

    pub(crate) fn invoke(&self, invocation: &Invocation<'_>) -> CommandResult<Outcome> {
        (self.handler)(invocation)
    }
}

impl fmt::Debug for ActionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDef")
            .field("name", &self.name)
            .field("argdef", &self.argdef)
            .field("desc", &self.desc)
            .field("alias", &self.alias)
            .field("options", &self.options)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Collects the parts of an action before it is registered.
///
/// Options are kept in a local list here; nothing is staged on the app
/// until [`App::register`] receives the finished [`ActionDef`].
#[derive(Debug, Clone)]
pub struct ActionBuilder {
    defstr: Option<String>,
    desc: Option<String>,
    doc: Option<String>,
    alias: Option<String>,
    options: Vec<OptionDef>,
}

impl ActionBuilder {
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Free text shown in the action's help, below the summary line.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn option(mut self, option: OptionDef) -> Self {
        self.options.push(option);
        self
    }

    /// Add `option` only when `cond` holds.
    pub fn option_if(self, cond: bool, option: OptionDef) -> Self {
        if cond { self.option(option) } else { self }
    }

    pub fn options<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = OptionDef>,
    {
        self.options.extend(options);
        self
    }

    /// Finish the definition with the handler and its declared signature.
    pub fn handler<F, R>(
        self,
        signature: HandlerSignature,
        f: F,
    ) -> Result<ActionDef, DefinitionError>
    where
        F: Fn(&Invocation<'_>) -> CommandResult<R> + Send + Sync + 'static,
        R: Into<Outcome>,
    {
        let (name, argdef) = match &self.defstr {
            Some(defstr) => parse_action_def(defstr)?,
            None => (GLOBAL_ACTION_NAME.to_string(), None),
        };
        check_option_conflicts(&name, &self.options)?;
        let handler: Handler =
            Arc::new(move |inv: &Invocation<'_>| f(inv).map(Into::<Outcome>::into));

        Ok(ActionDef {
            name,
            argdef,
            desc: self.desc,
            doc: self.doc,
            options: self.options,
            alias: self.alias,
            signature,
            handler,
        })
    }
}

fn check_option_conflicts(action: &str, options: &[OptionDef]) -> Result<(), DefinitionError> {
    let mut seen: HashSet<String> = HashSet::new();
    for opt in options {
        let flags = opt
            .short()
            .map(|c| format!("-{c}"))
            .into_iter()
            .chain(opt.long().map(|l| format!("--{l}")));
        for flag in flags {
            if !seen.insert(flag.clone()) {
                return Err(DefinitionError::DuplicateOption {
                    flag,
                    action: action.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_name_and_layout() {
        assert_eq!(
            parse_action_def("  hist [N] ").unwrap(),
            ("hist".to_string(), Some("[N]".to_string()))
        );
        assert_eq!(
            parse_action_def("rename \t old-name new-name").unwrap(),
            ("rename".to_string(), Some("old-name new-name".to_string()))
        );
        assert_eq!(parse_action_def("test").unwrap(), ("test".to_string(), None));
    }

    #[test]
    fn parse_rejects_empty_definition() {
        let err = parse_action_def("   ").unwrap_err();
        assert_eq!(err, DefinitionError::InvalidAction("   ".to_string()));
    }

    #[test]
    fn builder_produces_action() {
        let action = ActionDef::define("history [N]", "show history")
            .alias("hist")
            .option(OptionDef::new("-d, --date=DATE", "date").unwrap())
            .handler(HandlerSignature::new().optional("n"), |_| Ok(()))
            .unwrap();
        assert_eq!(action.name(), "history");
        assert_eq!(action.argdef(), Some("[N]"));
        assert_eq!(action.desc(), Some("show history"));
        assert_eq!(action.alias(), Some("hist"));
        assert_eq!(action.options().len(), 1);
        assert!(!action.is_global());
    }

    #[test]
    fn option_if_skips_when_false() {
        let action = ActionDef::define("fn", "test")
            .option(OptionDef::new("-h, --help", "show help").unwrap())
            .option_if(false, OptionDef::new("-v, --version", "version").unwrap())
            .option_if(true, OptionDef::new("-q", "quiet").unwrap())
            .handler(HandlerSignature::new(), |_| Ok(()))
            .unwrap();
        let longs: Vec<Option<&str>> = action.options().iter().map(|o| o.long()).collect();
        assert_eq!(longs, vec![Some("help"), None]);
    }

    #[test]
    fn conflicting_flags_are_rejected() {
        let err = ActionDef::define("fn", "test")
            .option(OptionDef::new("-h, --help", "show help").unwrap())
            .option(OptionDef::new("-h, --host=HOST", "host").unwrap())
            .handler(HandlerSignature::new(), |_| Ok(()))
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::DuplicateOption {
                flag: "-h".to_string(),
                action: "fn".to_string(),
            }
        );
    }

    #[test]
    fn global_builder_uses_reserved_name() {
        let action = ActionDef::global()
            .option(OptionDef::new("-h, --help", "help").unwrap())
            .handler(HandlerSignature::new().variadic(), |_| Ok(()))
            .unwrap();
        assert!(action.is_global());
        assert_eq!(action.desc(), None);
    }
}
