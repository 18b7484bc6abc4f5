use thiserror::Error;

/// Raised while registering malformed option/action definitions.
///
/// These are programmer mistakes: they surface at startup, before any
/// user input is scanned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("{0}: invalid option definition.")]
    InvalidOption(String),

    #[error("{0}: invalid action definition.")]
    InvalidAction(String),

    #[error("{name}: action already registered (conflicts with '{existing}').")]
    DuplicateAction { name: String, existing: String },

    #[error("{flag}: option defined twice in action '{action}'.")]
    DuplicateOption { flag: String, action: String },
}

/// Raised while scanning or validating the tokens of one invocation.
///
/// The message is the exact user-facing text (e.g. `-f: argument required.`);
/// the dispatch boundary prefixes it with the program/action name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CommandOptionError {
    message: String,
}

impl CommandOptionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for CommandOptionError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for CommandOptionError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Shorthand for failing a handler or check with a user-facing message.
pub fn error<T>(message: impl Into<String>) -> Result<T, CommandOptionError> {
    Err(CommandOptionError::new(message))
}

pub type CommandResult<T> = Result<T, CommandOptionError>;
