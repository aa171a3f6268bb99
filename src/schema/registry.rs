//! The type registry: built-in scalar kinds plus the registration
//! interface for host-defined ones (spec §9: "Type Registry as
//! module-level state becomes an explicit configuration object threaded
//! through parsers and validators; in systems languages prefer passing
//! the registry by reference").

use std::collections::HashMap;
use std::sync::Arc;

use crate::schema::types::ScalarKind;
use crate::value::Value;

/// A predicate deciding whether a [`Value`] is a valid instance of a
/// scalar kind, used by both the schema parser (to validate literal
/// defaults) and the validator (C6).
pub type ScalarPredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct ScalarDef {
    pub kind: ScalarKind,
    pub predicate: ScalarPredicate,
}

/// Explicit, by-reference configuration object carrying every scalar
/// kind a schema may reference by name. Constructed once with
/// [`TypeRegistry::with_builtins`] and extended with
/// [`TypeRegistry::register_scalar`] before parsing or validating.
#[derive(Clone)]
pub struct TypeRegistry {
    scalars: HashMap<String, ScalarDef>,
}

impl TypeRegistry {
    /// An empty registry with none of the built-in scalar names bound.
    pub fn empty() -> Self {
        Self { scalars: HashMap::new() }
    }

    /// A registry with `str`, `int`, `float`, `bool`, `null`, `any`,
    /// `date`, `time`, `datetime` and `timestamp` bound to their
    /// built-in [`ScalarKind`] and shape predicate.
    pub fn with_builtins() -> Self {
        let mut reg = Self::empty();
        reg.register_builtin(ScalarKind::Str, |v| matches!(v, Value::String(_)));
        reg.register_builtin(ScalarKind::Int, |v| matches!(v, Value::Int(_)));
        // No int->float coercion (spec §9 open question, resolved: preserved).
        reg.register_builtin(ScalarKind::Float, |v| matches!(v, Value::Float(_)));
        reg.register_builtin(ScalarKind::Bool, |v| matches!(v, Value::Bool(_)));
        reg.register_builtin(ScalarKind::Null, |v| matches!(v, Value::Null));
        reg.register_builtin(ScalarKind::Any, |_| true);
        // Temporal kinds are represented on the wire as strings; their
        // format is checked separately by `schema::temporal`.
        reg.register_builtin(ScalarKind::Date, |v| matches!(v, Value::String(_)));
        reg.register_builtin(ScalarKind::Time, |v| matches!(v, Value::String(_)));
        reg.register_builtin(ScalarKind::DateTime, |v| matches!(v, Value::String(_)));
        // A timestamp is a Unix epoch offset, carried on the wire as an
        // integer (spec §6.3), not a string.
        reg.register_builtin(ScalarKind::Timestamp, |v| matches!(v, Value::Int(_)));
        reg
    }

    fn register_builtin(&mut self, kind: ScalarKind, predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) {
        let name = kind.builtin_name().expect("builtin kind has a name");
        self.scalars.insert(name.to_string(), ScalarDef { kind, predicate: Arc::new(predicate) });
    }

    /// Registers a host-defined scalar kind under `name`, with `predicate`
    /// deciding which values are valid instances of it. Overwrites any
    /// existing binding for `name`, including a built-in one.
    pub fn register_scalar(
        &mut self,
        name: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) {
        self.scalars.insert(name.into(), ScalarDef { kind: ScalarKind::Custom, predicate: Arc::new(predicate) });
    }

    pub fn resolve(&self, name: &str) -> Option<&ScalarDef> {
        self.scalars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scalars.contains_key(name)
    }

    pub fn matches(&self, name: &str, value: &Value) -> Option<bool> {
        self.resolve(name).map(|def| (def.predicate)(value))
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
