use std::borrow::Cow;

use serde_json::Value;
use tracing::trace;

use crate::errors::{AssertError, Result};
use crate::parser::{tokenize, Token};

/// Map-over marker: resolve the rest of the path against every array element.
pub const MAP_OVER: &str = "[].";

/// Separator between the base path and pipe segments.
pub const PIPE: char = '|';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Bare lookup path.
    Plain,
    /// Contains at least one map-over marker. Takes precedence over `Piped`.
    Array,
    /// Base path followed by one or more pipe segments.
    Piped,
}

/// Total over all strings; never fails.
pub fn classify(path: &str) -> PathKind {
    if path.contains(MAP_OVER) {
        PathKind::Array
    } else if path.split(PIPE).nth(1).is_some() {
        PathKind::Piped
    } else {
        PathKind::Plain
    }
}

/// Splits `base|seg|seg` into the base path and its pipe segments.
pub fn split_pipes(path: &str) -> (&str, Vec<&str>) {
    let mut parts = path.split(PIPE);
    let base = parts.next().unwrap_or_default();
    (base, parts.collect())
}

/// Direct structural lookup of a plain fragment (no map-over) against `current`.
///
/// Returns `None` when any step is absent. Borrowed from the input whenever
/// possible; `#` produces an owned count.
pub fn lookup<'a>(current: &'a Value, fragment: &str) -> Option<Cow<'a, Value>> {
    let tokens = tokenize(fragment);
    let mut node = current;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Length => {
                let count = match node {
                    Value::Array(arr) => arr.len(),
                    Value::Object(map) => map.len(),
                    _ => return None,
                };
                // Nothing can be looked up inside a count.
                return (i + 1 == tokens.len()).then(|| Cow::Owned(Value::from(count)));
            }
            Token::Key(key) => {
                node = match node {
                    Value::Object(map) => map.get(key)?,
                    Value::Array(arr) => arr.get(token.as_index()?)?,
                    _ => return None,
                };
            }
        }
    }
    Some(Cow::Borrowed(node))
}

/// Resolves `fragment` against `current`, recursing through every map-over marker.
///
/// `full_path` is only used for error messages.
pub fn resolve_relative<'a>(
    current: &'a Value,
    fragment: &str,
    full_path: &str,
) -> Result<Cow<'a, Value>> {
    let Some(pos) = fragment.find(MAP_OVER) else {
        return lookup(current, fragment).ok_or_else(|| AssertError::MissingPath {
            path: full_path.to_string(),
        });
    };

    let prefix = &fragment[..pos];
    let prefix = prefix.strip_suffix('.').unwrap_or(prefix);
    let suffix = &fragment[pos + MAP_OVER.len()..];
    trace!(prefix, suffix, "map-over");

    let base = lookup(current, prefix).ok_or_else(|| AssertError::MissingPath {
        path: full_path.to_string(),
    })?;
    let Value::Array(items) = &*base else {
        return Err(AssertError::NotAnArray {
            path: describe(full_path, prefix),
        });
    };

    let nested = suffix.contains(MAP_OVER);
    let mut collected = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let value = resolve_relative(item, suffix, full_path).map_err(|e| match e {
            AssertError::MissingPath { path } => AssertError::MissingPath {
                path: format!("{path} (element {index} of {})", describe_prefix(prefix)),
            },
            other => other,
        })?;
        match value.into_owned() {
            Value::Array(inner) if nested => collected.extend(inner),
            other => collected.push(other),
        }
    }
    Ok(Cow::Owned(Value::Array(collected)))
}

fn describe(full_path: &str, prefix: &str) -> String {
    if prefix.is_empty() || full_path == prefix {
        full_path.to_string()
    } else {
        format!("{full_path} (at {prefix})")
    }
}

fn describe_prefix(prefix: &str) -> &str {
    if prefix.is_empty() {
        "root"
    } else {
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn classifies_paths() {
        assert_eq!(classify("a.b.c"), PathKind::Plain);
        assert_eq!(classify("a.b|len()"), PathKind::Piped);
        assert_eq!(classify("a.[].b"), PathKind::Array);
        assert_eq!(classify("a.[].b|len()"), PathKind::Array);
        assert_eq!(classify(""), PathKind::Plain);
        assert_eq!(classify("a[]"), PathKind::Plain);
    }

    #[test]
    fn splits_base_and_segments() {
        assert_eq!(split_pipes("a.b|json()|c"), ("a.b", vec!["json()", "c"]));
        assert_eq!(split_pipes("a.b"), ("a.b", vec![]));
    }

    #[test]
    fn looks_up_keys_indices_and_lengths() {
        let doc = json!({"a": {"b": [10, 20, {"c": "x"}], "o": {"k": 1, "j": 2}}});
        assert_eq!(lookup(&doc, "a.b.1").unwrap().into_owned(), json!(20));
        assert_eq!(lookup(&doc, "a.b.2.c").unwrap().into_owned(), json!("x"));
        assert_eq!(lookup(&doc, "a.b.#").unwrap().into_owned(), json!(3));
        assert_eq!(lookup(&doc, "a.o.#").unwrap().into_owned(), json!(2));
        assert!(lookup(&doc, "a.b.9").is_none());
        assert!(lookup(&doc, "a.b.#.x").is_none());
        assert!(lookup(&doc, "a.missing").is_none());
        assert_eq!(lookup(&doc, "").unwrap().into_owned(), doc);
    }

    #[test]
    fn digit_key_on_object_is_a_key() {
        let doc = json!({"codes": {"200": "ok"}});
        assert_eq!(lookup(&doc, "codes.200").unwrap().into_owned(), json!("ok"));
    }

    #[test]
    fn maps_over_arrays() {
        let doc = json!({"items": [{"id": 1}, {"id": 2}]});
        let out = resolve_relative(&doc, "items.[].id", "items.[].id").unwrap();
        assert_eq!(out.into_owned(), json!([1, 2]));
    }

    #[test]
    fn nested_map_over_flattens() {
        let doc = json!({"top": [{"mid": [{"leaf": 1}, {"leaf": 2}]}, {"mid": [{"leaf": 3}]}]});
        let path = "top.[].mid.[].leaf";
        let out = resolve_relative(&doc, path, path).unwrap();
        assert_eq!(out.into_owned(), json!([1, 2, 3]));
    }

    #[test]
    fn map_over_root_array_and_identity_suffix() {
        let doc = json!([{"n": "a"}, {"n": "b"}]);
        assert_eq!(resolve_relative(&doc, "[].n", "[].n").unwrap().into_owned(), json!(["a", "b"]));
        let tags = json!({"tags": ["x", "y"]});
        assert_eq!(
            resolve_relative(&tags, "tags.[].", "tags.[].").unwrap().into_owned(),
            json!(["x", "y"])
        );
    }

    #[test]
    fn map_over_errors() {
        let doc = json!({"obj": {"a": 1}, "items": [{"id": 1}, {}]});
        assert_eq!(
            resolve_relative(&doc, "nope.[].id", "nope.[].id").unwrap_err(),
            AssertError::MissingPath { path: "nope.[].id".into() }
        );
        assert!(matches!(
            resolve_relative(&doc, "obj.[].a", "obj.[].a").unwrap_err(),
            AssertError::NotAnArray { .. }
        ));
        let err = resolve_relative(&doc, "items.[].id", "items.[].id").unwrap_err();
        assert_eq!(
            err,
            AssertError::MissingPath { path: "items.[].id (element 1 of items)".into() }
        );
    }
}
