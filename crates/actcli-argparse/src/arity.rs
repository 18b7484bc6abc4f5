use crate::error::{CommandOptionError, CommandResult};

/// Declared positional parameters of a handler.
///
/// Parameters are listed in order. Defaulted parameters come after the
/// required ones; a keyword-only boundary caps how many positionals may be
/// passed, and a variadic capture lifts that cap entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerSignature {
    params: Vec<String>,
    defaults: usize,
    keyword_boundary: Option<usize>,
    variadic: bool,
}

impl HandlerSignature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a signature from its raw parts.
    pub fn from_parts(
        params: Vec<String>,
        defaults: usize,
        keyword_boundary: Option<usize>,
        variadic: bool,
    ) -> Self {
        Self {
            params,
            defaults,
            keyword_boundary,
            variadic,
        }
    }

    /// A required positional parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(name.into());
        self
    }

    /// A positional parameter with a default value.
    pub fn optional(mut self, name: impl Into<String>) -> Self {
        self.params.push(name.into());
        self.defaults += 1;
        self
    }

    /// Mark everything declared from here on as keyword-only.
    pub fn keyword_only(mut self) -> Self {
        self.keyword_boundary = Some(self.params.len());
        self
    }

    /// Accept any number of trailing positionals.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn defaults(&self) -> usize {
        self.defaults
    }

    pub fn keyword_boundary(&self) -> Option<usize> {
        self.keyword_boundary
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    /// Most positionals accepted (ignored when variadic).
    pub fn max_args(&self) -> usize {
        self.keyword_boundary.unwrap_or(self.params.len())
    }

    /// Fewest positionals accepted.
    pub fn min_args(&self) -> usize {
        self.params.len().saturating_sub(self.defaults).min(self.max_args())
    }

    /// Check `count` residual positionals against this signature.
    pub fn check(&self, count: usize) -> CommandResult<()> {
        if count > self.max_args() && !self.variadic {
            return Err(CommandOptionError::new("too many arguments."));
        }
        if count < self.min_args() {
            let name = self.params[count].replace('_', "-");
            return Err(CommandOptionError::new(format!(
                "argument ({name}) required."
            )));
        }
        Ok(())
    }
}
