use thiserror::Error;

/// Every way a single path check can fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssertError {
    #[error("invalid JSON document: {0}")]
    InvalidDocument(String),

    #[error("invalid check file: {0}")]
    InvalidCheckFile(String),

    #[error("missing path: {path}")]
    MissingPath { path: String },

    #[error("path is not an array: {path}")]
    NotAnArray { path: String },

    #[error("pipe function {name} is not registered (in {path})")]
    UnregisteredFunction { path: String, name: String },

    // Configuration defect: the host never called a registration function.
    #[error("no pipe functions registered, cannot evaluate piped path {path}")]
    NoFunctionsRegistered { path: String },

    #[error("cannot apply subpath {segment} after scalar value {value} in {path}")]
    ScalarThenSubpath {
        path: String,
        segment: String,
        value: String,
    },

    #[error("pipe function {function} failed in {path}: {message}")]
    PipeFunction {
        path: String,
        function: String,
        message: String,
    },

    #[error("unsupported expected type for {path}: {detail}")]
    UnsupportedExpectedType { path: String, detail: String },

    #[error("path {path}: expected {expected}, got {actual}")]
    Mismatch {
        path: String,
        expected: String,
        actual: String,
    },
}

impl AssertError {
    /// Path expression the failure belongs to, when it has one.
    pub fn path(&self) -> Option<&str> {
        match self {
            AssertError::InvalidDocument(_) | AssertError::InvalidCheckFile(_) => None,
            AssertError::MissingPath { path }
            | AssertError::NotAnArray { path }
            | AssertError::UnregisteredFunction { path, .. }
            | AssertError::NoFunctionsRegistered { path }
            | AssertError::ScalarThenSubpath { path, .. }
            | AssertError::PipeFunction { path, .. }
            | AssertError::UnsupportedExpectedType { path, .. }
            | AssertError::Mismatch { path, .. } => Some(path),
        }
    }
}

/// All failures of one `test_json` run, joined into a single error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} check(s) failed:\n{}", .errors.len(), render_lines(.errors))]
pub struct AggregateError {
    errors: Vec<AssertError>,
}

impl AggregateError {
    /// Returns `None` when there is nothing to report.
    pub fn from_errors(mut errors: Vec<AssertError>) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }
        errors.sort_by(|a, b| a.path().cmp(&b.path()));
        Some(Self { errors })
    }

    pub fn single(error: AssertError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    pub fn errors(&self) -> &[AssertError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always `false`: an aggregate is only built from at least one failure.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

fn render_lines(errors: &[AssertError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// Type alias for results that use `AssertError` as the error type
pub type Result<T> = std::result::Result<T, AssertError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_error_list_is_not_an_error() {
        assert!(AggregateError::from_errors(Vec::new()).is_none());
    }

    #[test]
    fn aggregate_sorts_by_path_and_counts() {
        let agg = AggregateError::from_errors(vec![
            AssertError::MissingPath { path: "z".into() },
            AssertError::Mismatch {
                path: "a".into(),
                expected: "1".into(),
                actual: "2".into(),
            },
        ])
        .unwrap();
        assert_eq!(agg.len(), 2);
        assert!(!agg.is_empty());
        assert_eq!(
            agg.to_string(),
            "2 check(s) failed:\n  - path a: expected 1, got 2\n  - missing path: z"
        );
    }
}
