use itertools::Itertools;
use serde_json::Value;

use crate::coerce::{convert, render, Scalar, ScalarKind};
use crate::errors::{AssertError, Result};
use crate::expected::{Expected, Sequence};

/// How the actual value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Typing {
    /// Looked up directly in the document.
    Structural,
    /// Produced by a pipe chain, where values are treated as loosely typed text.
    Loose,
}

/// Resolved value handed to the comparator.
#[derive(Debug, Clone, Copy)]
pub struct Actual<'a> {
    pub value: &'a Value,
    pub exists: bool,
    pub typing: Typing,
}

impl Actual<'_> {
    fn describe(&self) -> String {
        if !self.exists {
            "<absent>".to_string()
        } else if self.value.is_null() {
            "null".to_string()
        } else {
            render(self.value)
        }
    }
}

/// Non-empty predicate shared by the `NotEmpty` marker and `notEmpty()`.
///
/// Containers need at least one entry, strings at least one character; null is
/// empty and every number or boolean is non-empty. Loosely typed text `"true"`,
/// `"false"`, `"0"` and `"1"` is always non-empty.
// The loose-text branch selects only non-empty strings, which the structural
// rule already accepts, so results are the same either way.
// TODO: fold the loose-text rule into the structural one once callers no
// longer depend on the textual special case.
pub fn is_not_empty(value: &Value, typing: Typing) -> bool {
    if typing == Typing::Loose {
        if let Value::String(s) = value {
            if matches!(s.as_str(), "true" | "false" | "0" | "1") {
                return true;
            }
        }
    }
    match value {
        Value::Null => false,
        Value::Array(arr) => !arr.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::String(s) => !s.is_empty(),
        Value::Number(_) | Value::Bool(_) => true,
    }
}

/// Decides whether `actual` satisfies `expected`. Every failure names the path,
/// the expectation and what was found.
pub fn compare(path: &str, actual: &Actual<'_>, expected: &Expected) -> Result<()> {
    let mismatch = |found: String| AssertError::Mismatch {
        path: path.to_string(),
        expected: expected.to_string(),
        actual: found,
    };

    match expected {
        Expected::NotNull => {
            if actual.exists && !actual.value.is_null() {
                Ok(())
            } else {
                Err(mismatch(actual.describe()))
            }
        }
        Expected::NotEmpty => {
            if actual.exists && is_not_empty(actual.value, actual.typing) {
                Ok(())
            } else {
                Err(mismatch(actual.describe()))
            }
        }
        Expected::AnyOrder(seq) => {
            let kind = supported_kind(path, seq)?;
            let found = convert_elements(actual, kind).ok_or_else(|| mismatch(actual.describe()))?;
            if seq.scalars().into_iter().counts() == found.iter().cloned().counts() {
                Ok(())
            } else {
                Err(mismatch(format!("[{}]", found.iter().join(" "))))
            }
        }
        Expected::Sequence(seq) => {
            let kind = supported_kind(path, seq)?;
            let found = convert_elements(actual, kind).ok_or_else(|| mismatch(actual.describe()))?;
            if found == seq.scalars() {
                Ok(())
            } else {
                Err(mismatch(format!("[{}]", found.iter().join(" "))))
            }
        }
        Expected::Scalar(want) => match convert(actual.value, want.kind()) {
            Some(got) if actual.exists && &got == want => Ok(()),
            Some(got) if actual.exists => Err(mismatch(got.to_string())),
            _ => Err(mismatch(actual.describe())),
        },
        Expected::Other(want) => {
            if actual.exists && render(actual.value) == render(want) {
                Ok(())
            } else {
                Err(mismatch(actual.describe()))
            }
        }
    }
}

fn supported_kind(path: &str, seq: &Sequence) -> Result<ScalarKind> {
    seq.kind().ok_or_else(|| AssertError::UnsupportedExpectedType {
        path: path.to_string(),
        detail: format!("sequence elements must all be strings, bools or numbers, got {seq}"),
    })
}

/// Converts every element of an actual array, or `None` if it is not an array
/// or some element has no lossless conversion.
fn convert_elements(actual: &Actual<'_>, kind: ScalarKind) -> Option<Vec<Scalar>> {
    match actual.value {
        Value::Array(items) if actual.exists => {
            items.iter().map(|item| convert(item, kind)).collect()
        }
        _ => None,
    }
}
