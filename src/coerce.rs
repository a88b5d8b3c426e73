//! Type-directed conversion of JSON values into the closed set of scalar kinds
//! an expectation can be written in.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde_json::Value;

/// Element kinds the comparator can convert into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Str,
    Bool,
    Int,
    Float,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScalarKind::Str => "string",
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int64",
            ScalarKind::Float => "float64",
        })
    }
}

/// A converted value. Floats compare and hash by bit pattern so scalars can be
/// counted in a multiset.
#[derive(Debug, Clone)]
pub enum Scalar {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Str(_) => ScalarKind::Str,
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::Float(_) => ScalarKind::Float,
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Str(a), Scalar::Str(b)) => a == b,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::Float(a), Scalar::Float(b)) => a.to_bits() == b.to_bits() || a == b,
            _ => false,
        }
    }
}

impl Eq for Scalar {}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Scalar::Str(s) => s.hash(state),
            Scalar::Bool(b) => b.hash(state),
            Scalar::Int(i) => i.hash(state),
            // -0.0 == 0.0, so both must land in the same bucket.
            Scalar::Float(f) => (if *f == 0.0 { 0.0f64 } else { *f }).to_bits().hash(state),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => f.write_str(s),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
        }
    }
}

/// Textual form of a JSON value: strings unquoted, null as the empty string,
/// containers as compact JSON.
pub fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Integers convert exactly; floats only when they have no fractional part.
pub fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let t = s.trim();
            t.parse::<i64>()
                .ok()
                .or_else(|| t.parse::<f64>().ok().and_then(integral))
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

pub fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => parse_bool(s.trim()),
        _ => None,
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn integral(f: f64) -> Option<i64> {
    // `i64::MAX as f64` rounds up to 2^63, which does not fit; the bound is exclusive.
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

/// Converts `value` into `kind`, or `None` when no lossless conversion exists.
pub fn convert(value: &Value, kind: ScalarKind) -> Option<Scalar> {
    match kind {
        ScalarKind::Str => Some(Scalar::Str(render(value))),
        ScalarKind::Bool => to_bool(value).map(Scalar::Bool),
        ScalarKind::Int => to_i64(value).map(Scalar::Int),
        ScalarKind::Float => to_f64(value).map(Scalar::Float),
    }
}
