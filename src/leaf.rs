//! Scalar leaf nodes.
//!
//! A [`Leaf<T>`] holds one `String`, `i64` or `bool` value together with its
//! default, usage line, optional environment variable binding, and the rank
//! of the source that last set it. Applications keep the `Arc<Leaf<T>>`
//! returned at construction and read [`Leaf::value`] once configuration has
//! been loaded.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::coerce;
use crate::error::NexusError;
use crate::node::{
    Configurable, DefaultValue, EnvVarName, GetValue, Named, Prioritized, SetValue, UsageSummary,
};
use crate::priority::{Outcome, Priority};
use crate::registry::Registerable;
use crate::types::{ScalarKind, Value};

/// A type a leaf can be declared with.
pub trait Scalar: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    const KIND: ScalarKind;

    /// Coerce a proposed value. `Err` carries the reason.
    fn coerce(value: Value) -> Result<Self, String>;

    /// Parse a declared default. An empty string is the type's zero value
    /// for booleans; integers still require a literal.
    fn parse_default(raw: &str) -> Result<Self, String>;

    fn into_value(self) -> Value;
}

impl Scalar for String {
    const KIND: ScalarKind = ScalarKind::String;

    fn coerce(value: Value) -> Result<Self, String> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(format!("value must be a string, got {}", other.kind())),
        }
    }

    fn parse_default(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl Scalar for i64 {
    const KIND: ScalarKind = ScalarKind::Int;

    fn coerce(value: Value) -> Result<Self, String> {
        match value {
            Value::Int(n) => Ok(n),
            Value::String(s) => coerce::parse_int(&s),
            Value::Bool(_) => Err("expecting int, got bool".into()),
        }
    }

    fn parse_default(raw: &str) -> Result<Self, String> {
        coerce::parse_int(raw)
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl Scalar for bool {
    const KIND: ScalarKind = ScalarKind::Bool;

    fn coerce(value: Value) -> Result<Self, String> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Int(n) => Ok(n != 0),
            Value::String(s) => Ok(coerce::parse_bool(&s)),
        }
    }

    fn parse_default(raw: &str) -> Result<Self, String> {
        Ok(!raw.trim().is_empty() && coerce::parse_bool(raw))
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

pub type StringLeaf = Leaf<String>;
pub type IntLeaf = Leaf<i64>;
pub type BoolLeaf = Leaf<bool>;

#[derive(Debug)]
struct LeafState<T> {
    value: T,
    priority: Priority,
}

/// A terminal node holding a typed scalar.
pub struct Leaf<T: Scalar> {
    name: String,
    usage: String,
    env_var: String,
    default: T,
    arbitrated: bool,
    state: RwLock<LeafState<T>>,
}

impl<T: Scalar> Leaf<T> {
    /// A leaf with no environment binding, starting at its default.
    pub fn new(name: &str, usage: &str, default: T) -> Self {
        Self::builder(name).usage(usage).default(default).build()
    }

    pub fn builder(name: &str) -> LeafBuilder<T> {
        LeafBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current value.
    pub fn value(&self) -> T {
        self.read().value.clone()
    }

    pub fn default(&self) -> &T {
        &self.default
    }

    /// Rank of the source that last set this leaf.
    pub fn priority(&self) -> Priority {
        self.read().priority
    }

    /// Overwrite the value directly. The rank is left as it is.
    pub fn set(&self, value: T) {
        self.write().value = value;
    }

    /// Restore the default value and drop back to [`Priority::DEFAULT`].
    pub fn reset(&self) {
        let mut state = self.write();
        state.value = self.default.clone();
        state.priority = Priority::DEFAULT;
    }

    fn coerce(&self, value: Value) -> Result<T, NexusError> {
        T::coerce(value).map_err(|reason| NexusError::invalid_value(&self.name, reason))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, LeafState<T>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, LeafState<T>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Scalar> fmt::Debug for Leaf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("Leaf")
            .field("name", &self.name)
            .field("value", &state.value)
            .field("priority", &state.priority)
            .finish()
    }
}

impl<T: Scalar> Configurable for Leaf<T> {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn as_named(&self) -> Option<&dyn Named> {
        Some(self)
    }

    fn as_getter(&self) -> Option<&dyn GetValue> {
        Some(self)
    }

    fn as_setter(&self) -> Option<&dyn SetValue> {
        Some(self)
    }

    fn as_default(&self) -> Option<&dyn DefaultValue> {
        Some(self)
    }

    fn as_usage(&self) -> Option<&dyn UsageSummary> {
        Some(self)
    }

    fn as_env_var(&self) -> Option<&dyn EnvVarName> {
        Some(self)
    }

    fn as_prioritized(&self) -> Option<&dyn Prioritized> {
        if self.arbitrated { Some(self) } else { None }
    }
}

impl<T: Scalar> Named for Leaf<T> {
    fn name(&self) -> &str {
        &self.name
    }
}

impl<T: Scalar> GetValue for Leaf<T> {
    fn get_value(&self) -> Value {
        self.value().into_value()
    }
}

impl<T: Scalar> SetValue for Leaf<T> {
    fn set_value(&self, value: Value) -> Result<(), NexusError> {
        let v = self.coerce(value)?;
        self.set(v);
        Ok(())
    }
}

impl<T: Scalar> DefaultValue for Leaf<T> {
    fn default_value(&self) -> Value {
        self.default.clone().into_value()
    }
}

impl<T: Scalar> UsageSummary for Leaf<T> {
    fn usage_summary(&self) -> &str {
        &self.usage
    }
}

impl<T: Scalar> EnvVarName for Leaf<T> {
    fn env_var_name(&self) -> &str {
        &self.env_var
    }
}

impl<T: Scalar> Prioritized for Leaf<T> {
    fn priority(&self) -> Priority {
        Leaf::priority(self)
    }

    fn set_priority(&self, priority: Priority) {
        self.write().priority = priority;
    }

    fn assign_at(&self, value: Value, source: Priority) -> Result<Outcome, NexusError> {
        let mut state = self.write();
        if state.priority > source {
            return Ok(Outcome::Rejected);
        }
        state.value = self.coerce(value)?;
        state.priority = source;
        Ok(Outcome::Accepted)
    }
}

/// Builder for [`Leaf`].
///
/// ```ignore
/// let port = Leaf::<i64>::builder("port")
///     .usage("Port to listen on")
///     .default(8080)
///     .env("MYAPP_PORT")
///     .register(default_registry());
/// ```
#[derive(Debug)]
pub struct LeafBuilder<T: Scalar> {
    name: String,
    usage: String,
    env_var: String,
    default: T,
    arbitrated: bool,
}

impl<T: Scalar> LeafBuilder<T> {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            usage: String::new(),
            env_var: String::new(),
            default: T::default(),
            arbitrated: true,
        }
    }

    /// One-line usage summary, shown in flag help.
    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    /// Initial value, also reported as the default (default: the type's zero value).
    pub fn default(mut self, default: T) -> Self {
        self.default = default;
        self
    }

    /// Bind an environment variable. An empty name leaves the leaf unbound.
    pub fn env(mut self, var: &str) -> Self {
        self.env_var = var.to_string();
        self
    }

    /// Build without the priority capability: every source may overwrite
    /// this leaf, regardless of order.
    pub fn unarbitrated(mut self) -> Self {
        self.arbitrated = false;
        self
    }

    pub fn build(self) -> Leaf<T> {
        Leaf {
            state: RwLock::new(LeafState {
                value: self.default.clone(),
                priority: Priority::DEFAULT,
            }),
            name: self.name,
            usage: self.usage,
            env_var: self.env_var,
            default: self.default,
            arbitrated: self.arbitrated,
        }
    }

    /// Build and register with `reg`, returning the shared handle.
    pub fn register(self, reg: &dyn Registerable) -> Arc<Leaf<T>> {
        let leaf = Arc::new(self.build());
        reg.register(leaf.clone());
        leaf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Capability, supports};
    use crate::registry::Registry;

    #[test]
    fn starts_at_default_priority() {
        let leaf = Leaf::<i64>::new("port", "Listen port", 8080);
        assert_eq!(leaf.value(), 8080);
        assert_eq!(*leaf.default(), 8080);
        assert_eq!(leaf.priority(), Priority::DEFAULT);
    }

    #[test]
    fn int_default_literal_round_trip() {
        let leaf = Leaf::<i64>::new("n", "", i64::parse_default("42").unwrap());
        assert_eq!(leaf.get_value(), Value::Int(42));
        leaf.set_value(Value::from("007")).unwrap();
        assert_eq!(leaf.value(), 7);
    }

    #[test]
    fn int_accepts_native_and_text() {
        let leaf = Leaf::<i64>::new("n", "", 0);
        leaf.set_value(Value::Int(-3)).unwrap();
        assert_eq!(leaf.value(), -3);
        leaf.set_value(Value::from(" 0x10 ")).unwrap();
        assert_eq!(leaf.value(), 16);
    }

    #[test]
    fn int_rejects_bool_and_garbage() {
        let leaf = Leaf::<i64>::new("n", "", 5);
        assert!(leaf.set_value(Value::Bool(true)).is_err());
        let err = leaf.set_value(Value::from("five")).unwrap_err();
        assert!(err.to_string().contains("'n'"));
        assert_eq!(leaf.value(), 5);
    }

    #[test]
    fn bool_coercion() {
        let leaf = Leaf::<bool>::new("debug", "", false);
        for (input, want) in [
            ("0", false),
            ("NO", false),
            ("False", false),
            ("f", false),
            ("1", true),
            ("yes", true),
            ("true", true),
            ("anything-else", true),
            ("", true),
        ] {
            leaf.set_value(Value::from(input)).unwrap();
            assert_eq!(leaf.value(), want, "input {input:?}");
        }
        leaf.set_value(Value::Int(2)).unwrap();
        assert!(leaf.value());
        leaf.set_value(Value::Int(0)).unwrap();
        assert!(!leaf.value());
        leaf.set_value(Value::Bool(true)).unwrap();
        assert!(leaf.value());
    }

    #[test]
    fn bool_default_empty_is_false() {
        assert_eq!(bool::parse_default(""), Ok(false));
        assert_eq!(bool::parse_default("yes"), Ok(true));
        assert_eq!(bool::parse_default("no"), Ok(false));
    }

    #[test]
    fn string_is_verbatim_and_strict() {
        let leaf = Leaf::<String>::new("host", "", "localhost".into());
        leaf.set_value(Value::from("  spaced  ")).unwrap();
        assert_eq!(leaf.value(), "  spaced  ");
        assert!(leaf.set_value(Value::Int(3)).is_err());
        assert!(leaf.set_value(Value::Bool(true)).is_err());
        assert_eq!(leaf.value(), "  spaced  ");
    }

    #[test]
    fn set_keeps_priority_reset_restores_both() {
        let leaf = Leaf::<i64>::new("n", "", 1);
        Prioritized::set_priority(&leaf, Priority::FILE);
        leaf.set(9);
        assert_eq!((leaf.value(), leaf.priority()), (9, Priority::FILE));
        leaf.reset();
        assert_eq!((leaf.value(), leaf.priority()), (1, Priority::DEFAULT));
    }

    #[test]
    fn builder_fields() {
        let leaf = Leaf::<String>::builder("url")
            .usage("Database URL")
            .default("pg://".into())
            .env("APP_DB_URL")
            .build();
        assert_eq!(leaf.usage_summary(), "Database URL");
        assert_eq!(leaf.env_var_name(), "APP_DB_URL");
        assert_eq!(leaf.default_value(), Value::from("pg://"));
        assert_eq!(leaf.value(), "pg://");
    }

    #[test]
    fn unarbitrated_drops_priority_capability() {
        let leaf = Leaf::<bool>::builder("quiet").unarbitrated().build();
        assert!(!supports(&leaf, Capability::Priority));
        assert!(supports(&leaf, Capability::SetValue));
    }

    #[test]
    fn register_shares_the_handle() {
        let registry = Registry::new();
        let leaf = Leaf::<i64>::builder("n").default(3).register(&registry);
        assert_eq!(registry.len(), 1);
        assert_eq!(Arc::strong_count(&leaf), 2);
    }
}
