//! Option definitions: the `-f, --file=FILE` grammar, the value pipeline
//! and the flag rendering used by help output.

use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::error::DefinitionError;
use crate::value::{OptionMap, Value};

/// A single check run on the raw value; `Some(message)` rejects it.
pub type Validator = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;

/// Turns a validated raw value into its final form.
pub type Converter = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

/// Stores a value into the result map instead of the default single-key assignment.
pub type Operation = Arc<dyn Fn(Value, &mut OptionMap) + Send + Sync>;

/// Whether an option takes an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgRequirement {
    Absent,
    Required,
    Optional,
}

impl ArgRequirement {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Required => "required",
            Self::Optional => "optional",
        }
    }
}

/// Structural fields of an option definition string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSyntax {
    pub short: Option<char>,
    pub long: Option<String>,
    pub arg_name: Option<String>,
    pub requirement: ArgRequirement,
}

fn short_and_long_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^-([A-Za-z0-9_]),\s+--([A-Za-z0-9_][-A-Za-z0-9_]*)(?:=(.+)|\[=(.+)\])?$")
            .expect("valid regex")
    })
}

fn short_only_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^-([A-Za-z0-9_])(?:\s+(.+)|\[(.+)\])?$").expect("valid regex")
    })
}

fn long_only_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^--([A-Za-z0-9_][-A-Za-z0-9_]*)(?:=(.+)|\[=(.+)\])?$").expect("valid regex")
    })
}

fn requirement_of(
    required: Option<&str>,
    optional: Option<&str>,
) -> (Option<String>, ArgRequirement) {
    match (required, optional) {
        (Some(arg), _) => (Some(arg.to_string()), ArgRequirement::Required),
        (None, Some(arg)) => (Some(arg.to_string()), ArgRequirement::Optional),
        (None, None) => (None, ArgRequirement::Absent),
    }
}

/// Parse an option definition string such as `-i, --indent[=N]`.
///
/// Accepted shapes: `-X, --long[=ARG|[=ARG]]`, `-X[ ARG|[ARG]]` and
/// `--long[=ARG|[=ARG]]`. The input is trimmed first.
pub fn parse_option_def(defstr: &str) -> Result<OptionSyntax, DefinitionError> {
    let s = defstr.trim();

    if let Some(caps) = short_and_long_re().captures(s) {
        let (arg_name, requirement) = requirement_of(
            caps.get(3).map(|m| m.as_str()),
            caps.get(4).map(|m| m.as_str()),
        );
        return Ok(OptionSyntax {
            short: caps[1].chars().next(),
            long: Some(caps[2].to_string()),
            arg_name,
            requirement,
        });
    }

    if let Some(caps) = short_only_re().captures(s) {
        let (arg_name, requirement) = requirement_of(
            caps.get(2).map(|m| m.as_str()),
            caps.get(3).map(|m| m.as_str()),
        );
        return Ok(OptionSyntax {
            short: caps[1].chars().next(),
            long: None,
            arg_name,
            requirement,
        });
    }

    if let Some(caps) = long_only_re().captures(s) {
        let (arg_name, requirement) = requirement_of(
            caps.get(2).map(|m| m.as_str()),
            caps.get(3).map(|m| m.as_str()),
        );
        return Ok(OptionSyntax {
            short: None,
            long: Some(caps[1].to_string()),
            arg_name,
            requirement,
        });
    }

    Err(DefinitionError::InvalidOption(s.to_string()))
}

/// Definition of a command-line option (not its parsed value).
#[derive(Clone)]
pub struct OptionDef {
    short: Option<char>,
    long: Option<String>,
    desc: String,
    canonical: Option<String>,
    arg_name: Option<String>,
    requirement: ArgRequirement,
    arg_type: Option<String>,
    validators: Vec<Validator>,
    converter: Option<Converter>,
    operation: Option<Operation>,
}

impl OptionDef {
    /// Build an option from its definition string and help text.
    pub fn new(defstr: &str, desc: impl Into<String>) -> Result<Self, DefinitionError> {
        let syntax = parse_option_def(defstr)?;
        Ok(Self::from_syntax(syntax, desc))
    }

    pub fn from_syntax(syntax: OptionSyntax, desc: impl Into<String>) -> Self {
        Self {
            short: syntax.short,
            long: syntax.long,
            desc: desc.into(),
            canonical: None,
            arg_name: syntax.arg_name,
            requirement: syntax.requirement,
            arg_type: None,
            validators: Vec::new(),
            converter: None,
            operation: None,
        }
    }

    /// Store values under `name` instead of the long/short flag name.
    pub fn canonical(mut self, name: impl Into<String>) -> Self {
        self.canonical = Some(name.into());
        self
    }

    /// Attach a documentation-only type tag (e.g. `int`).
    pub fn arg_type(mut self, tag: impl Into<String>) -> Self {
        self.arg_type = Some(tag.into());
        self
    }

    /// Append a check. Checks run in the order they were added.
    pub fn validate<F>(mut self, check: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(check));
        self
    }

    /// Append several checks at once.
    pub fn validate_all<I>(mut self, checks: I) -> Self
    where
        I: IntoIterator<Item = Validator>,
    {
        self.validators.extend(checks);
        self
    }

    pub fn convert<F>(mut self, conversion: F) -> Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.converter = Some(Arc::new(conversion));
        self
    }

    pub fn operate<F>(mut self, operation: F) -> Self
    where
        F: Fn(Value, &mut OptionMap) + Send + Sync + 'static,
    {
        self.operation = Some(Arc::new(operation));
        self
    }

    pub fn short(&self) -> Option<char> {
        self.short
    }

    pub fn long(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn arg_name(&self) -> Option<&str> {
        self.arg_name.as_deref()
    }

    pub fn requirement(&self) -> ArgRequirement {
        self.requirement
    }

    pub fn arg_type_tag(&self) -> Option<&str> {
        self.arg_type.as_deref()
    }

    pub fn operation(&self) -> Option<&Operation> {
        self.operation.as_ref()
    }

    /// Key under which the value lands in the option map.
    pub fn name(&self) -> String {
        if let Some(canonical) = &self.canonical {
            return canonical.clone();
        }
        if let Some(long) = &self.long {
            return long.clone();
        }
        self.short.map(String::from).unwrap_or_default()
    }

    /// Run validators on the raw value, then convert it.
    ///
    /// The first failing check wins and conversion is skipped.
    pub fn handle_value(&self, value: Value) -> Result<Value, String> {
        for check in &self.validators {
            if let Some(message) = check(&value) {
                return Err(message);
            }
        }
        match &self.converter {
            Some(convert) => convert(value),
            None => Ok(value),
        }
    }

    /// Render the flag signature, e.g. `-f, --file=FILE`.
    pub fn format(&self) -> String {
        let arg = self.arg_name.as_deref().unwrap_or_default();
        let requirement = if self.arg_name.is_none() {
            ArgRequirement::Absent
        } else {
            self.requirement
        };
        match (self.short, self.long.as_deref()) {
            (Some(s), Some(l)) => match requirement {
                ArgRequirement::Absent => format!("-{s}, --{l}"),
                ArgRequirement::Required => format!("-{s}, --{l}={arg}"),
                ArgRequirement::Optional => format!("-{s}, --{l}[={arg}]"),
            },
            (Some(s), None) => match requirement {
                ArgRequirement::Absent => format!("-{s}"),
                ArgRequirement::Required => format!("-{s} {arg}"),
                ArgRequirement::Optional => format!("-{s}[{arg}]"),
            },
            (None, Some(l)) => match requirement {
                ArgRequirement::Absent => format!("    --{l}"),
                ArgRequirement::Required => format!("    --{l}={arg}"),
                ArgRequirement::Optional => format!("    --{l}[={arg}]"),
            },
            (None, None) => String::new(),
        }
    }
}

impl fmt::Debug for OptionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDef")
            .field("short", &self.short)
            .field("long", &self.long)
            .field("desc", &self.desc)
            .field("canonical", &self.canonical)
            .field("arg_name", &self.arg_name)
            .field("requirement", &self.requirement)
            .field("arg_type", &self.arg_type)
            .field("validators", &self.validators.len())
            .field("converter", &self.converter.is_some())
            .field("operation", &self.operation.is_some())
            .finish()
    }
}
