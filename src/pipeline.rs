//! Pipe execution: `base|segment|segment...`, applied left to right.

use serde_json::Value;
use tracing::trace;

use crate::context::{Context, PipeState};
use crate::errors::{AssertError, Result};
use crate::functions::{is_call, Registry};
use crate::jsonpath::{resolve_relative, split_pipes};

const EXISTS: &str = "exists()";

fn is_exists(segment: Option<&&str>) -> bool {
    segment.is_some_and(|s| s.eq_ignore_ascii_case(EXISTS))
}

/// Resolves the base of `path` against `doc`, then applies each pipe segment.
///
/// A missing lookup immediately followed by `exists()` yields an absent
/// state instead of an error, so `missing|exists()` evaluates to `false`.
pub fn execute(registry: &Registry, doc: &Value, path: &str) -> Result<PipeState> {
    let (base, segments) = split_pipes(path);
    if !segments.is_empty() && registry.is_empty() {
        return Err(AssertError::NoFunctionsRegistered {
            path: path.to_string(),
        });
    }

    let mut state = match resolve_relative(doc, base, path) {
        Ok(v) => PipeState::present(v.into_owned()),
        Err(AssertError::MissingPath { .. }) if is_exists(segments.first()) => {
            trace!(path, base, "base missing, deferring to exists()");
            PipeState::absent()
        }
        Err(e) => return Err(e),
    };

    for (i, segment) in segments.iter().copied().enumerate() {
        trace!(path, segment, value = %state.value, exists = state.exists, "pipe segment");
        if is_call(segment) {
            let function = registry
                .get(segment)
                .ok_or_else(|| AssertError::UnregisteredFunction {
                    path: path.to_string(),
                    name: segment.to_string(),
                })?;
            function.handle(&Context::new(path, segment), &mut state)?;
            continue;
        }

        if state.is_scalar() {
            return Err(AssertError::ScalarThenSubpath {
                path: path.to_string(),
                segment: segment.to_string(),
                value: state.value.to_string(),
            });
        }
        state = match resolve_relative(&state.value, segment, path) {
            Ok(v) => PipeState::present(v.into_owned()),
            Err(AssertError::MissingPath { .. }) if is_exists(segments.get(i + 1)) => {
                PipeState::absent()
            }
            Err(e) => return Err(e),
        };
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn eval(doc: Value, path: &str) -> Result<PipeState> {
        execute(&Registry::with_builtins(), &doc, path)
    }

    #[test]
    fn applies_functions_and_subpaths_in_order() {
        let doc = json!({"s": "{\"inner\":{\"x\":1,\"list\":[1,2]}}"});
        assert_eq!(eval(doc.clone(), "s|json()|inner.x").unwrap().value, json!(1));
        assert_eq!(eval(doc, "s|json()|inner.list|len()").unwrap().value, json!(2));
    }

    #[test]
    fn missing_base_before_exists_is_false() {
        assert_eq!(eval(json!({}), "missing|exists()").unwrap().value, json!(false));
        assert_eq!(eval(json!({}), "missing|EXISTS()").unwrap().value, json!(false));
        assert_eq!(
            eval(json!({}), "missing|len()").unwrap_err(),
            AssertError::MissingPath { path: "missing|len()".into() }
        );
    }

    #[test]
    fn missing_subpath_before_exists_is_false() {
        let doc = json!({"s": "{\"a\":1}"});
        assert_eq!(eval(doc, "s|json()|b|exists()").unwrap().value, json!(false));
    }

    #[test]
    fn subpath_after_scalar_fails() {
        let err = eval(json!({"arr": [1, 2, 3]}), "arr|len()|oops").unwrap_err();
        assert_eq!(
            err,
            AssertError::ScalarThenSubpath {
                path: "arr|len()|oops".into(),
                segment: "oops".into(),
                value: "3".into(),
            }
        );
    }

    #[test]
    fn unknown_function_is_reported() {
        let err = eval(json!({"a": 1}), "a|nope()").unwrap_err();
        assert_eq!(
            err,
            AssertError::UnregisteredFunction { path: "a|nope()".into(), name: "nope()".into() }
        );
    }

    #[test]
    fn empty_registry_is_a_configuration_error() {
        let err = execute(&Registry::new(), &json!({"a": 1}), "a|len()").unwrap_err();
        assert_eq!(err, AssertError::NoFunctionsRegistered { path: "a|len()".into() });
    }

    #[test]
    fn map_over_base_then_pipe() {
        let doc = json!({"items": [{"id": 1}, {"id": 2}, {"id": 3}]});
        assert_eq!(eval(doc, "items.[].id|len()").unwrap().value, json!(3));
    }
}
