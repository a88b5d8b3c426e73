use std::collections::HashMap;
use std::sync::Arc;

use crate::context::{Context, PipeState};
use crate::errors::Result;

/// Suffix every pipe function name must carry.
pub const CALL_SUFFIX: &str = "()";

/// Trait for pluggable functions applied by `|name()` pipe segments.
///
/// A function reads the current value and presence flag from `state` and
/// overwrites them with its result.
pub trait PipeFunction: Send + Sync {
    /// Registry key, ending in `()`. Matched case-insensitively.
    fn name(&self) -> &str;
    fn handle(&self, ctx: &Context<'_>, state: &mut PipeState) -> Result<()>;
}

/// Function registry.
///
/// Populate it once during start-up, then share it read-only: evaluation never
/// writes to it, so concurrent evaluations are safe once registration is done.
/// Registering while evaluations are running is not supported.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<HashMap<String, Arc<dyn PipeFunction>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_all(&mut registry);
        registry
    }

    /// Adds `f` under its lower-cased name, replacing any previous entry.
    ///
    /// # Panics
    ///
    /// Panics if the name does not end in `()`. This is a wiring defect in the
    /// host program, not a data-dependent failure.
    pub fn register<F: PipeFunction + 'static>(&mut self, f: F) {
        let name = f.name().to_lowercase();
        assert!(
            name.ends_with(CALL_SUFFIX),
            "pipe function name {name:?} must end with {CALL_SUFFIX:?}"
        );
        Arc::make_mut(&mut self.inner).insert(name, Arc::new(f));
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<Arc<dyn PipeFunction>> {
        self.inner.get(&name.to_lowercase()).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.inner.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Syntactic test for a function-call segment.
pub fn is_call(segment: &str) -> bool {
    segment.ends_with(CALL_SUFFIX)
}

pub mod builtins {
    use super::*;
    use crate::coerce::render;
    use crate::comparison::{is_not_empty, Typing};
    use serde_json::Value;

    /// Registers `json()`, `exists()`, `notNull()`, `notEmpty()` and `len()`.
    pub fn register_all(registry: &mut Registry) {
        registry.register(Json);
        registry.register(Exists);
        registry.register(NotNull);
        registry.register(NotEmpty);
        registry.register(Len);
    }

    /// Parses the current string value as JSON text.
    pub struct Json;
    impl PipeFunction for Json {
        fn name(&self) -> &str { "json()" }
        fn handle(&self, ctx: &Context<'_>, state: &mut PipeState) -> Result<()> {
            if !state.exists {
                return Err(ctx.fail("no value to parse"));
            }
            let Value::String(text) = &state.value else {
                return Err(ctx.fail(format!("expected a JSON string, got {}", state.value)));
            };
            let parsed: Value = serde_json::from_str(text)
                .map_err(|e| ctx.fail(format!("invalid JSON text: {e}")))?;
            *state = PipeState::present(parsed);
            Ok(())
        }
    }

    /// Whether the current value is present, `null` included.
    pub struct Exists;
    impl PipeFunction for Exists {
        fn name(&self) -> &str { "exists()" }
        fn handle(&self, _ctx: &Context<'_>, state: &mut PipeState) -> Result<()> {
            *state = PipeState::present(Value::Bool(state.exists));
            Ok(())
        }
    }

    pub struct NotNull;
    impl PipeFunction for NotNull {
        fn name(&self) -> &str { "notNull()" }
        fn handle(&self, _ctx: &Context<'_>, state: &mut PipeState) -> Result<()> {
            let not_null = state.exists && !state.value.is_null();
            *state = PipeState::present(Value::Bool(not_null));
            Ok(())
        }
    }

    pub struct NotEmpty;
    impl PipeFunction for NotEmpty {
        fn name(&self) -> &str { "notEmpty()" }
        fn handle(&self, _ctx: &Context<'_>, state: &mut PipeState) -> Result<()> {
            let not_empty = state.exists && is_not_empty(&state.value, Typing::Structural);
            *state = PipeState::present(Value::Bool(not_empty));
            Ok(())
        }
    }

    /// Element count, key count, or length of the textual form.
    pub struct Len;
    impl PipeFunction for Len {
        fn name(&self) -> &str { "len()" }
        fn handle(&self, _ctx: &Context<'_>, state: &mut PipeState) -> Result<()> {
            let len = match &state.value {
                Value::Array(arr) => arr.len(),
                Value::Object(map) => map.len(),
                other => render(other).chars().count(),
            };
            *state = PipeState::present(Value::from(len));
            Ok(())
        }
    }
}
