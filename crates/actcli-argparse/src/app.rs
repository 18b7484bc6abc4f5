//! Programs built from registered actions, and their dispatch loop.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::path::Path;

use crate::action::{ActionDef, Invocation};
use crate::arity::HandlerSignature;
use crate::error::{CommandOptionError, CommandResult, DefinitionError};
use crate::help;
use crate::option::OptionDef;
use crate::scanner::OptionParser;
use crate::value::Outcome;

/// Internal name of the single command of a [`SimpleApp`].
pub const SIMPLE_ACTION_NAME: &str = "<action>";

const HELP_ACTION_NAME: &str = "help";

/// A command-line program: a registry of actions plus program-level settings.
#[derive(Debug, Clone)]
pub struct App {
    name: String,
    desc: Option<String>,
    version: Option<String>,
    default_action: Option<String>,
    builtin_global: bool,
    registry: crate::registry::Registry,
}

impl App {
    /// A program with the built-in `help` action (also the default action)
    /// and global `-h, --help` handling.
    pub fn new(name: impl Into<String>) -> Self {
        let mut app = Self::bare(name);
        app.default_action = Some(HELP_ACTION_NAME.to_string());
        app.registry.set_global(builtin_global_action(false));
        app.builtin_global = true;
        app.registry
            .register(builtin_help_action())
            .expect("built-in help action registers into an empty registry");
        app
    }

    /// A program without built-in actions, global options or default action.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            desc: None,
            version: None,
            default_action: None,
            builtin_global: false,
            registry: crate::registry::Registry::new(),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    /// Set the version; the built-in global options gain `-v, --version`.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        if self.builtin_global {
            self.registry.set_global(builtin_global_action(true));
        }
        self
    }

    /// Action run when no action name is given (`None` disables the fallback).
    pub fn default_action(mut self, name: Option<&str>) -> Self {
        self.default_action = name.map(str::to_string);
        self
    }

    /// Append a fully-built action.
    ///
    /// A global action replaces the built-in one for good, like
    /// [`App::global_action`].
    pub fn register(&mut self, action: ActionDef) -> Result<(), DefinitionError> {
        if action.is_global() {
            self.global_action(action);
            return Ok(());
        }
        self.registry.register(action)
    }

    /// Replace the global action consulted when the first token is an option.
    pub fn global_action(&mut self, action: ActionDef) {
        self.builtin_global = false;
        self.registry.set_global(action);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    pub fn version_str(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn default_action_name(&self) -> Option<&str> {
        self.default_action.as_deref()
    }

    pub fn registry(&self) -> &crate::registry::Registry {
        &self.registry
    }

    pub fn find_action(&self, name: &str) -> Option<&ActionDef> {
        self.registry.find(name)
    }

    /// Program name used in help and error messages.
    ///
    /// Falls back to the basename of the running executable when unnamed.
    pub fn script_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        std::env::args_os()
            .next()
            .map(|arg0| basename(&arg0.to_string_lossy()))
            .unwrap_or_default()
    }

    /// Program-level help listing all described actions.
    pub fn help_message(&self) -> String {
        help::app_help(
            &self.script_name(),
            self.desc(),
            self.registry.actions().iter(),
        )
    }

    /// Help for the named action (or alias), or the program help when `None`.
    pub fn do_help(&self, action_name: Option<&str>) -> CommandResult<String> {
        match action_name {
            Some(name) => {
                let action = self.find_action(name).ok_or_else(|| {
                    CommandOptionError::new(format!("{name}: unknown action name."))
                })?;
                Ok(help::action_help(action, &self.script_name(), true))
            }
            None => Ok(self.help_message()),
        }
    }

    /// Dispatch `args` (program name excluded).
    pub fn run<I, S>(&self, args: I) -> CommandResult<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut current = None;
        self.dispatch(args.into_iter().map(Into::into).collect(), &mut current)
    }

    /// Run with `argv` (program name first) against the process streams and
    /// return the exit status.
    pub fn main(&self, argv: &[String]) -> i32 {
        let stdout = io::stdout();
        let stderr = io::stderr();
        self.main_with(argv, &mut stdout.lock(), &mut stderr.lock())
    }

    /// Like [`App::main`] with injected output streams.
    pub fn main_with<O, E>(&self, argv: &[String], out: &mut O, err: &mut E) -> i32
    where
        O: Write,
        E: Write,
    {
        let script = self.script_name_for(argv);
        let args: VecDeque<String> = argv.iter().skip(1).cloned().collect();
        let mut current = None;
        let result = self.dispatch(args, &mut current);
        report(&script, current.map(ActionDef::name), result, out, err)
    }

    fn script_name_for(&self, argv: &[String]) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        argv.first().map(|s| basename(s)).unwrap_or_default()
    }

    fn dispatch<'a>(
        &'a self,
        mut args: VecDeque<String>,
        current: &mut Option<&'a ActionDef>,
    ) -> CommandResult<Outcome> {
        if let Some(global) = self.registry.global() {
            let leading_option = args
                .front()
                .is_some_and(|a| a.starts_with('-') && a != "-");
            if leading_option {
                tracing::debug!("parsing global options");
                return self.invoke(global, args);
            }
        }

        let action_name = match args.pop_front() {
            Some(name) => name,
            None => self.default_action.clone().unwrap_or_default(),
        };
        if action_name.is_empty() {
            return Err(CommandOptionError::new("action name required."));
        }

        let action = self.registry.resolve(&action_name)?;
        *current = Some(action);
        tracing::debug!(action = action.name(), requested = %action_name, "resolved action");
        self.invoke(action, args)
    }

    pub(crate) fn invoke(
        &self,
        action: &ActionDef,
        mut args: VecDeque<String>,
    ) -> CommandResult<Outcome> {
        let options = OptionParser::new(action.options()).parse(&mut args)?;
        let args: Vec<String> = args.into();
        action.signature().check(args.len())?;

        let invocation = Invocation::new(self, action, &args, &options);
        let outcome = action.invoke(&invocation)?;
        tracing::debug!(action = action.name(), ?outcome, "handler finished");
        Ok(outcome)
    }

    /// Serializable description of every registered action.
    pub fn metadata(&self) -> actcli_metadata::AppMeta {
        crate::metadata::app_meta(self)
    }
}

/// A program without sub-actions: every token goes to its single command.
#[derive(Debug, Clone)]
pub struct SimpleApp {
    app: App,
}

impl SimpleApp {
    /// Start defining the command; `argdef` describes its positional layout.
    pub fn command(argdef: &str, desc: impl Into<String>) -> crate::action::ActionBuilder {
        ActionDef::define(format!("{SIMPLE_ACTION_NAME} {argdef}"), desc)
    }

    pub fn new(name: impl Into<String>, command: ActionDef) -> Result<Self, DefinitionError> {
        if command.name() != SIMPLE_ACTION_NAME {
            return Err(DefinitionError::InvalidAction(command.name().to_string()));
        }
        let mut app = App::bare(name).default_action(Some(SIMPLE_ACTION_NAME));
        if let Some(desc) = command.desc() {
            app = app.description(desc);
        }
        app.register(command)?;
        Ok(Self { app })
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    fn command_def(&self) -> CommandResult<&ActionDef> {
        self.app.registry.resolve(SIMPLE_ACTION_NAME)
    }

    /// Scan `args` against the command's options and invoke it.
    pub fn run<I, S>(&self, args: I) -> CommandResult<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let action = self.command_def()?;
        self.app
            .invoke(action, args.into_iter().map(Into::into).collect())
    }

    pub fn main(&self, argv: &[String]) -> i32 {
        let stdout = io::stdout();
        let stderr = io::stderr();
        self.main_with(argv, &mut stdout.lock(), &mut stderr.lock())
    }

    pub fn main_with<O, E>(&self, argv: &[String], out: &mut O, err: &mut E) -> i32
    where
        O: Write,
        E: Write,
    {
        let script = self.app.script_name_for(argv);
        let result = self.run(argv.iter().skip(1).cloned());
        report(&script, None, result, out, err)
    }

    /// Help for the command, without an action name in the usage line.
    pub fn help_message(&self) -> String {
        match self.command_def() {
            Ok(action) => help::action_help(action, &self.app.script_name(), false),
            Err(_) => String::new(),
        }
    }
}

/// Turn a dispatch result into output and an exit status.
fn report<O, E>(
    script: &str,
    action: Option<&str>,
    result: CommandResult<Outcome>,
    out: &mut O,
    err: &mut E,
) -> i32
where
    O: Write,
    E: Write,
{
    match result {
        Ok(Outcome::Done) => 0,
        Ok(Outcome::Status(status)) => status,
        Ok(Outcome::Output(text)) => match writeln!(out, "{text}") {
            Ok(()) => 0,
            Err(e) => {
                tracing::warn!(error = %e, "failed to write output");
                1
            }
        },
        Err(e) => {
            let prefix = match action {
                Some(action) => format!("{script} {action}"),
                None => script.to_string(),
            };
            if let Err(write_err) = writeln!(err, "{prefix}: {e}") {
                tracing::warn!(error = %write_err, "failed to write error message");
            }
            1
        }
    }
}

fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn builtin_help_action() -> ActionDef {
    ActionDef::define("help [action]", "print help")
        .handler(
            HandlerSignature::new().optional("action"),
            |inv: &Invocation<'_>| inv.app().do_help(inv.arg(0)),
        )
        .expect("built-in help action definition is well-formed")
}

fn builtin_global_action(with_version: bool) -> ActionDef {
    let help = OptionDef::new("-h, --help", "help").expect("built-in -h definition is well-formed");
    let version =
        OptionDef::new("-v, --version", "version").expect("built-in -v definition is well-formed");
    let handler = |inv: &Invocation<'_>| -> CommandResult<Outcome> {
        let app = inv.app();
        if inv.options().is_set("help") {
            return Ok(Outcome::Output(app.help_message()));
        }
        if inv.options().is_set("version") {
            return Ok(app
                .version_str()
                .map(|v| Outcome::Output(v.to_string()))
                .unwrap_or_default());
        }
        Ok(Outcome::Done)
    };
    ActionDef::global()
        .option(help)
        .option_if(with_version, version)
        .handler(HandlerSignature::new().variadic(), handler)
        .expect("built-in global options do not conflict")
}
