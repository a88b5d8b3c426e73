use serde_json::Value;

use crate::errors::AssertError;

/// Where a pipe function is being invoked: the whole path expression and the
/// segment that named the function. Used for error reporting.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub path: &'a str,
    pub segment: &'a str,
}

impl<'a> Context<'a> {
    pub fn new(path: &'a str, segment: &'a str) -> Self {
        Self { path, segment }
    }

    /// Builds the error a pipe function reports when it cannot handle its input.
    pub fn fail(&self, message: impl Into<String>) -> AssertError {
        AssertError::PipeFunction {
            path: self.path.to_string(),
            function: self.segment.to_string(),
            message: message.into(),
        }
    }
}

/// Mutable state threaded through a pipe chain.
///
/// `exists` is the presence flag: it is distinct from JSON `null`, a path can
/// exist and hold `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeState {
    pub value: Value,
    pub exists: bool,
}

impl PipeState {
    pub fn present(value: Value) -> Self {
        Self { value, exists: true }
    }

    pub fn absent() -> Self {
        Self {
            value: Value::Null,
            exists: false,
        }
    }

    /// Strings, numbers, booleans and null. Sub-paths cannot be applied to these.
    pub fn is_scalar(&self) -> bool {
        !matches!(self.value, Value::Array(_) | Value::Object(_))
    }
}
