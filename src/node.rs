//! The configurable node model.
//!
//! A node is anything implementing [`Configurable`]. The trait itself carries
//! no behavior beyond downcasting: every operation an adapter may want is an
//! optional *capability*, exposed through an `as_*` probe that returns
//! `Some(&dyn Capability)` when the node supports it and `None` otherwise.
//! Adapters probe for what they need and skip nodes that lack it, so new node
//! types can participate in any subset of sources without a shared base type.
//!
//! | Capability      | Probe             | Used by |
//! |-----------------|-------------------|---------|
//! | [`Named`]       | `as_named`        | file and flag adapters, listing |
//! | [`HasChildren`] | `as_parent`       | every tree walk |
//! | [`GetValue`]    | `as_getter`       | flag slots, listing |
//! | [`SetValue`]    | `as_setter`       | every adapter |
//! | [`DefaultValue`]| `as_default`      | flag help text |
//! | [`UsageSummary`]| `as_usage`        | flag help text, listing |
//! | [`EnvVarName`]  | `as_env_var`      | environment adapter |
//! | [`Prioritized`] | `as_prioritized`  | arbitration |

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::NexusError;
use crate::priority::{Outcome, Priority};
use crate::types::Value;

/// A registry-tracked unit of configuration state.
///
/// Implementors override the probes for the capabilities they support.
pub trait Configurable: Send + Sync {
    /// Upcast for typed access to concrete node types.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    fn as_named(&self) -> Option<&dyn Named> {
        None
    }

    fn as_parent(&self) -> Option<&dyn HasChildren> {
        None
    }

    fn as_getter(&self) -> Option<&dyn GetValue> {
        None
    }

    fn as_setter(&self) -> Option<&dyn SetValue> {
        None
    }

    fn as_default(&self) -> Option<&dyn DefaultValue> {
        None
    }

    fn as_usage(&self) -> Option<&dyn UsageSummary> {
        None
    }

    fn as_env_var(&self) -> Option<&dyn EnvVarName> {
        None
    }

    fn as_prioritized(&self) -> Option<&dyn Prioritized> {
        None
    }
}

pub trait Named {
    fn name(&self) -> &str;
}

pub trait HasChildren {
    /// Children in registration order.
    fn children(&self) -> Vec<Arc<dyn Configurable>>;
}

pub trait GetValue {
    fn get_value(&self) -> Value;
}

pub trait SetValue {
    /// Store `value`, coercing strings into the node's declared type.
    ///
    /// On error the previous value is left untouched.
    fn set_value(&self, value: Value) -> Result<(), NexusError>;
}

pub trait DefaultValue {
    fn default_value(&self) -> Value;
}

pub trait UsageSummary {
    fn usage_summary(&self) -> &str;
}

pub trait EnvVarName {
    /// Environment variable bound to this node. Empty means unbound.
    fn env_var_name(&self) -> &str;
}

pub trait Prioritized {
    fn priority(&self) -> Priority;
    fn set_priority(&self, priority: Priority);

    /// Store `value` iff the current rank is at most `source`, then raise the
    /// rank to `source`. The rank check, the coercion and both writes happen
    /// under one lock, so concurrent proposals can never lower the rank.
    fn assign_at(&self, value: Value, source: Priority) -> Result<Outcome, NexusError>;
}

/// Names of the optional node capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Named,
    HasChildren,
    GetValue,
    SetValue,
    DefaultValue,
    UsageSummary,
    EnvVarName,
    Priority,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Capability::Named,
        Capability::HasChildren,
        Capability::GetValue,
        Capability::SetValue,
        Capability::DefaultValue,
        Capability::UsageSummary,
        Capability::EnvVarName,
        Capability::Priority,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Probe `node` for a single capability.
pub fn supports(node: &dyn Configurable, capability: Capability) -> bool {
    match capability {
        Capability::Named => node.as_named().is_some(),
        Capability::HasChildren => node.as_parent().is_some(),
        Capability::GetValue => node.as_getter().is_some(),
        Capability::SetValue => node.as_setter().is_some(),
        Capability::DefaultValue => node.as_default().is_some(),
        Capability::UsageSummary => node.as_usage().is_some(),
        Capability::EnvVarName => node.as_env_var().is_some(),
        Capability::Priority => node.as_prioritized().is_some(),
    }
}

/// Every capability `node` exposes, in declaration order.
pub fn capabilities(node: &dyn Configurable) -> Vec<Capability> {
    Capability::ALL
        .into_iter()
        .filter(|c| supports(node, *c))
        .collect()
}

/// The node's name, if it has one.
pub fn name_of(node: &dyn Configurable) -> Option<&str> {
    node.as_named().map(|n| n.name())
}

/// Join a parent key and a child name into a dotted key.
pub(crate) fn dotted(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

impl fmt::Debug for dyn Configurable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Configurable");
        if let Some(name) = name_of(self) {
            d.field("name", &name);
        }
        if let Some(getter) = self.as_getter() {
            d.field("value", &getter.get_value());
        }
        d.field("capabilities", &capabilities(self)).finish()
    }
}
