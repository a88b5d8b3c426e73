//! What a check expects to find at a path.

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use serde::Deserialize;
use serde_json::Value;

use crate::coerce::{render, Scalar, ScalarKind};
use crate::errors::{AssertError, Result};

/// Path expression → expectation. Entries are evaluated independently.
pub type Checks = BTreeMap<String, Expected>;

/// A concretely typed sequence of expected elements.
#[derive(Debug, Clone, PartialEq)]
pub enum Sequence {
    Str(Vec<String>),
    Bool(Vec<bool>),
    Int(Vec<i64>),
    Float(Vec<f64>),
    /// Elements of a kind the comparator cannot convert into. Comparing
    /// against it is a usage error.
    Unsupported(Vec<Value>),
}

impl Sequence {
    /// Element kind, or `None` for [`Sequence::Unsupported`].
    pub fn kind(&self) -> Option<ScalarKind> {
        match self {
            Sequence::Str(_) => Some(ScalarKind::Str),
            Sequence::Bool(_) => Some(ScalarKind::Bool),
            Sequence::Int(_) => Some(ScalarKind::Int),
            Sequence::Float(_) => Some(ScalarKind::Float),
            Sequence::Unsupported(_) => None,
        }
    }

    pub fn scalars(&self) -> Vec<Scalar> {
        match self {
            Sequence::Str(v) => v.iter().cloned().map(Scalar::Str).collect(),
            Sequence::Bool(v) => v.iter().copied().map(Scalar::Bool).collect(),
            Sequence::Int(v) => v.iter().copied().map(Scalar::Int).collect(),
            Sequence::Float(v) => v.iter().copied().map(Scalar::Float).collect(),
            Sequence::Unsupported(_) => Vec::new(),
        }
    }

    /// Infers the element kind of a JSON array: all strings, all bools, all
    /// integers, or all numbers (integers widen to floats). An empty array is
    /// an empty string sequence.
    pub fn from_json_array(items: Vec<Value>) -> Self {
        if items.iter().all(Value::is_string) {
            Sequence::Str(items.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        } else if items.iter().all(Value::is_boolean) {
            Sequence::Bool(items.iter().filter_map(Value::as_bool).collect())
        } else if items.iter().all(Value::is_i64) {
            Sequence::Int(items.iter().filter_map(Value::as_i64).collect())
        } else if items.iter().all(Value::is_number) {
            Sequence::Float(items.iter().filter_map(Value::as_f64).collect())
        } else {
            Sequence::Unsupported(items)
        }
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sequence::Unsupported(items) => write!(f, "[{}]", items.iter().join(" ")),
            other => write!(f, "[{}]", other.scalars().iter().join(" ")),
        }
    }
}

/// Order-insensitive expected sequence: compared as a multiset.
#[derive(Debug, Clone, PartialEq)]
pub struct AnyOrder(pub Sequence);

/// Wraps comparable scalars for multiset comparison.
///
/// ```
/// use json_path_assert::{any_order, Expected};
/// let e: Expected = any_order([3, 1, 2]).into();
/// ```
pub fn any_order<I, T>(values: I) -> AnyOrder
where
    I: IntoIterator<Item = T>,
    Vec<T>: Into<Sequence>,
{
    AnyOrder(values.into_iter().collect::<Vec<T>>().into())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expected {
    /// Present and not JSON `null`.
    NotNull,
    /// Present and non-empty.
    NotEmpty,
    Scalar(Scalar),
    Sequence(Sequence),
    AnyOrder(Sequence),
    /// Anything else; compared against the actual value's textual form.
    /// `null` renders as the empty string, so `Other(Value::Null)` also
    /// matches an actual `""`.
    Other(Value),
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::NotNull => f.write_str("<not null>"),
            Expected::NotEmpty => f.write_str("<not empty>"),
            Expected::Scalar(s) => write!(f, "{s}"),
            Expected::Sequence(seq) => write!(f, "{seq}"),
            Expected::AnyOrder(seq) => write!(f, "{seq} in any order"),
            Expected::Other(v) => f.write_str(&render(v)),
        }
    }
}

macro_rules! scalar_from {
    ($($t:ty => $variant:ident via $conv:expr),* $(,)?) => {
        $(
            impl From<$t> for Expected {
                fn from(v: $t) -> Self {
                    Expected::Scalar(Scalar::$variant($conv(v)))
                }
            }

            impl From<Vec<$t>> for Sequence {
                fn from(v: Vec<$t>) -> Self {
                    Sequence::$variant(v.into_iter().map($conv).collect())
                }
            }

            impl From<Vec<$t>> for Expected {
                fn from(v: Vec<$t>) -> Self {
                    Expected::Sequence(v.into())
                }
            }
        )*
    };
}

scalar_from! {
    &str => Str via String::from,
    String => Str via std::convert::identity,
    bool => Bool via std::convert::identity,
    i8 => Int via i64::from,
    i16 => Int via i64::from,
    i32 => Int via i64::from,
    i64 => Int via std::convert::identity,
    u8 => Int via i64::from,
    u16 => Int via i64::from,
    u32 => Int via i64::from,
    f32 => Float via f64::from,
    f64 => Float via std::convert::identity,
}

impl From<AnyOrder> for Expected {
    fn from(v: AnyOrder) -> Self {
        Expected::AnyOrder(v.0)
    }
}

/// Marker names accepted by `{"$marker": ...}` in a check file.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
enum MarkerName {
    NotNull,
    NotEmpty,
}

const MARKER_KEY: &str = "$marker";
const ANY_ORDER_KEY: &str = "$anyOrder";

impl Expected {
    /// Maps a JSON literal from a check file onto the closest expectation.
    ///
    /// `{"$marker": "notNull" | "notEmpty"}` and `{"$anyOrder": [...]}` are
    /// recognised when they are the only key of an object.
    pub fn from_json(value: Value) -> Result<Self> {
        Ok(match value {
            Value::String(s) => Expected::Scalar(Scalar::Str(s)),
            Value::Bool(b) => Expected::Scalar(Scalar::Bool(b)),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Expected::Scalar(Scalar::Int(i)),
                (None, Some(f)) => Expected::Scalar(Scalar::Float(f)),
                _ => Expected::Other(Value::Number(n)),
            },
            Value::Array(items) => Expected::Sequence(Sequence::from_json_array(items)),
            Value::Object(mut map) if map.len() == 1 && map.contains_key(MARKER_KEY) => {
                let raw = map.remove(MARKER_KEY).unwrap_or_default();
                let marker: MarkerName = serde_json::from_value(raw)
                    .map_err(|e| AssertError::InvalidCheckFile(format!("{MARKER_KEY}: {e}")))?;
                match marker {
                    MarkerName::NotNull => Expected::NotNull,
                    MarkerName::NotEmpty => Expected::NotEmpty,
                }
            }
            Value::Object(mut map) if map.len() == 1 && map.contains_key(ANY_ORDER_KEY) => {
                match map.remove(ANY_ORDER_KEY) {
                    Some(Value::Array(items)) => {
                        Expected::AnyOrder(Sequence::from_json_array(items))
                    }
                    _ => {
                        return Err(AssertError::InvalidCheckFile(format!(
                            "{ANY_ORDER_KEY} must hold an array"
                        )))
                    }
                }
            }
            other => Expected::Other(other),
        })
    }
}

/// Parses a check file: a JSON object of path expression → expectation.
pub fn parse_checks(text: &str) -> Result<Checks> {
    let raw: BTreeMap<String, Value> = serde_json::from_str(text)
        .map_err(|e| AssertError::InvalidCheckFile(e.to_string()))?;
    raw.into_iter()
        .map(|(path, value)| Ok((path, Expected::from_json(value)?)))
        .collect()
}
