use std::fmt;

use indexmap::IndexMap;

/// A parsed option value.
///
/// Options without an argument (and optional-argument options given without
/// one) carry `Bool(true)`. Everything else starts out as `Text` and may be
/// turned into another variant by the option's converter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Text(String),
    Int(i64),
    Float(f64),
    List(Vec<Value>),
}

impl Value {
    /// Whether this is the bare "option was given" marker.
    pub fn is_present_marker(&self) -> bool {
        matches!(self, Self::Bool(true))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Truthiness: `false`, empty text, zero and empty lists are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Text(s) => !s.is_empty(),
            Self::Int(n) => *n != 0,
            Self::Float(f) => *f != 0.0,
            Self::List(items) => !items.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

/// Option values collected during one dispatch, keyed by canonical name.
///
/// Insertion order is kept so handlers (and tests) see options in the order
/// they appeared on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionMap {
    values: IndexMap<String, Value>,
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    /// Whether the option was given and its value is truthy.
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(Value::is_truthy)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Set `name`, replacing any previous value (the default write-back).
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Append `value` to the list stored under `name`.
    ///
    /// A scalar already stored under `name` becomes the first list element.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        let slot = self
            .values
            .entry(name.into())
            .or_insert_with(|| Value::List(Vec::new()));
        match slot {
            Value::List(items) => items.push(value),
            other => {
                let first = std::mem::replace(other, Value::List(Vec::new()));
                *other = Value::List(vec![first, value]);
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// What a handler hands back to the dispatch boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Outcome {
    /// Nothing observable; exit status 0.
    #[default]
    Done,
    /// Process exit status.
    Status(i32),
    /// Text printed to stdout with a trailing newline; exit status 0.
    Output(String),
}

impl From<()> for Outcome {
    fn from(_: ()) -> Self {
        Self::Done
    }
}

impl From<i32> for Outcome {
    fn from(status: i32) -> Self {
        Self::Status(status)
    }
}

impl From<String> for Outcome {
    fn from(text: String) -> Self {
        Self::Output(text)
    }
}

impl From<&str> for Outcome {
    fn from(text: &str) -> Self {
        Self::Output(text.to_string())
    }
}
