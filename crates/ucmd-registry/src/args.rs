use std::collections::BTreeMap;

use ucmd_frame::{FrameError, Value};

/// Caller-supplied arguments for one invocation: positional values in order
/// plus values keyed by argument name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    positional: Vec<Value>,
    named: BTreeMap<String, Value>,
}

impl Arguments {
    /// No arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Positional arguments only.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            named: BTreeMap::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.push(value);
        self
    }

    /// Set a named argument.
    pub fn named_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.positional.push(value.into());
    }

    /// Set a named argument, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.named.insert(name.into(), value.into())
    }

    /// Parse command-line parameters: `key=value` is named, anything else is
    /// positional. Values with a `.` are floats, the rest integers.
    pub fn from_params<I, S>(params: I) -> Result<Self, FrameError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = Self::new();
        for param in params {
            let param = param.as_ref();
            match param.split_once('=') {
                Some((name, value)) => {
                    args.insert(name.trim(), value.parse::<Value>()?);
                }
                None => args.push(param.parse::<Value>()?),
            }
        }
        Ok(args)
    }

    /// Positional values in order.
    pub fn positional_values(&self) -> &[Value] {
        &self.positional
    }

    /// Named values, sorted by name.
    pub fn named_values(&self) -> &BTreeMap<String, Value> {
        &self.named
    }

    /// Total number of supplied arguments, positional and named.
    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
