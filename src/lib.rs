//! Declarative assertions over JSON documents.
//!
//! A check set maps path expressions to expected values. Every check is
//! evaluated and all violations are reported together:
//!
//! ```
//! use json_path_assert::{any_order, test_json, Checks, Expected};
//!
//! let doc = br#"{"a":{"b":{"baz":"qux","arr":[1,2,3]},"raw":"{\"x\":1}"}}"#;
//! let mut checks = Checks::new();
//! checks.insert("a.b.baz".into(), "qux".into());
//! checks.insert("a.b.arr".into(), vec![1, 2, 3].into());
//! checks.insert("a.b.arr|len()".into(), 3.into());
//! checks.insert("a.b.arr.[].".into(), any_order([3, 2, 1]).into());
//! checks.insert("a.raw|json()|x".into(), 1.into());
//! checks.insert("a.gone|exists()".into(), false.into());
//! checks.insert("a.b".into(), Expected::NotEmpty);
//! assert!(test_json(doc, &checks).is_ok());
//! ```
//!
//! Path syntax: `a.b.c` looks up keys (digits index arrays), `a.b.#` counts,
//! `a.[].b` collects `b` from every element of `a` (nestable), and
//! `a.b|func()|c.d` pipes the value through registered functions and
//! relative sub-paths.

pub mod coerce;
pub mod comparison;
pub mod context;
pub mod engine;
pub mod errors;
pub mod expected;
pub mod functions; // plugin model
pub mod jsonpath;
mod parser;
pub mod pipeline;

pub use context::{Context, PipeState};
pub use engine::{test_json, JsonTester};
pub use errors::{AggregateError, AssertError, Result};
pub use expected::{any_order, parse_checks, AnyOrder, Checks, Expected, Sequence};
pub use functions::{builtins, PipeFunction, Registry};
