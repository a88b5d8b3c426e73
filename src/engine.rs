use serde_json::Value;
use tracing::{debug, trace};

use crate::comparison::{compare, Actual, Typing};
use crate::errors::{AggregateError, AssertError, Result};
use crate::expected::{Checks, Expected};
use crate::functions::Registry;
use crate::jsonpath::{classify, resolve_relative, PathKind, PIPE};
use crate::pipeline;

/// Runs check sets against JSON documents.
///
/// Holds the pipe function registry; build it once at start-up and share the
/// tester freely afterwards.
#[derive(Clone)]
pub struct JsonTester {
    registry: Registry,
}

impl JsonTester {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Evaluates every check against `document` and reports all failures at
    /// once. A failing check never stops the others from running.
    pub fn test_json(&self, document: &[u8], checks: &Checks) -> std::result::Result<(), AggregateError> {
        let doc: Value = match serde_json::from_slice(document) {
            Ok(doc) => doc,
            Err(e) => {
                debug!(error = %e, "document is not valid JSON");
                return Err(AggregateError::single(AssertError::InvalidDocument(e.to_string())));
            }
        };

        let errors: Vec<AssertError> = checks
            .iter()
            .filter_map(|(path, expected)| self.check(&doc, path, expected).err())
            .collect();
        debug!(checks = checks.len(), failed = errors.len(), "json checks done");

        match AggregateError::from_errors(errors) {
            Some(agg) => Err(agg),
            None => Ok(()),
        }
    }

    /// Evaluates a single path expression against a parsed document.
    pub fn check(&self, doc: &Value, path: &str, expected: &Expected) -> Result<()> {
        let result = self.evaluate(doc, path, expected);
        if let Err(e) = &result {
            debug!(path, error = %e, "check failed");
        }
        result
    }

    fn evaluate(&self, doc: &Value, path: &str, expected: &Expected) -> Result<()> {
        let kind = classify(path);
        trace!(path, ?kind, %expected, "check");
        match kind {
            PathKind::Plain => {
                let value = resolve_relative(doc, path, path)?;
                let actual = Actual {
                    value: &*value,
                    exists: true,
                    typing: Typing::Structural,
                };
                compare(path, &actual, expected)
            }
            // Map-over changes how the base resolves; any pipes still apply after it.
            PathKind::Array | PathKind::Piped => {
                let state = pipeline::execute(&self.registry, doc, path)?;
                let actual = Actual {
                    value: &state.value,
                    exists: state.exists,
                    typing: if path.contains(PIPE) { Typing::Loose } else { Typing::Structural },
                };
                compare(path, &actual, expected)
            }
        }
    }
}

/// Tests `document` against `checks` using the built-in pipe functions.
pub fn test_json(document: &[u8], checks: &Checks) -> std::result::Result<(), AggregateError> {
    JsonTester::new(Registry::with_builtins()).test_json(document, checks)
}
