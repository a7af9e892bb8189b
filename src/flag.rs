//! Command-line flag adapter.
//!
//! This module is framework-agnostic. [`FlagAdapter::adapt_with`] walks the
//! registry and hands every named, assignable node to a callback as a
//! [`FlagSlot`]: a string-settable value slot carrying the flag name, usage
//! line and default text. The callback registers the slot with whatever flag
//! parser the program uses, and the parser calls [`FlagSlot::set`] once per
//! flag actually given on the command line.
//!
//! Assignments through a slot are proposed at [`Priority::FLAG`], so a flag
//! always stamps the node with the flag rank when it is accepted.
//!
//! Each node is adapted at most once per adapter, tracked by node identity,
//! so calling [`adapt`](FlagAdapter::adapt) again after registering more
//! nodes only picks up the new ones.
//!
//! The clap binding lives in the `cli` module (feature `clap`).

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::NexusError;
use crate::node::{Capability, Configurable, name_of};
use crate::priority::{self, Outcome, Priority};
use crate::registry::Registry;
use crate::types::Value;

/// A string-settable handle onto one configurable.
#[derive(Clone)]
pub struct FlagSlot {
    name: String,
    usage: String,
    node: Arc<dyn Configurable>,
}

impl FlagSlot {
    /// The flag name (the node's name).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// The node's default rendered for help output.
    pub fn default_text(&self) -> String {
        match self.node.as_default() {
            Some(d) => d.default_value().to_literal(),
            None => "[configurable]".to_string(),
        }
    }

    /// Whether the node's default is a boolean, i.e. the flag may be given
    /// without a value.
    pub fn is_bool(&self) -> bool {
        matches!(
            self.node.as_default().map(|d| d.default_value()),
            Some(Value::Bool(_))
        )
    }

    /// The node's current value, if it exposes one.
    pub fn current(&self) -> Option<Value> {
        self.node.as_getter().map(|g| g.get_value())
    }

    /// Assign the text given on the command line.
    pub fn set(&self, raw: &str) -> Result<Outcome, NexusError> {
        match priority::propose(
            self.node.as_ref(),
            Value::String(raw.to_string()),
            Priority::FLAG,
        )? {
            Outcome::Unsupported => Err(NexusError::NotSupported {
                key: self.name.clone(),
                capability: Capability::SetValue,
            }),
            outcome => Ok(outcome),
        }
    }

    pub fn node(&self) -> &Arc<dyn Configurable> {
        &self.node
    }
}

impl std::fmt::Debug for FlagSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagSlot")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .finish()
    }
}

/// Tracks which nodes have been exposed as flags.
#[derive(Debug, Default)]
pub struct FlagAdapter {
    adapted: HashSet<usize>,
    slots: Vec<FlagSlot>,
}

impl FlagAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapt every not-yet-adapted node in `registry`, keeping the slots.
    ///
    /// Returns how many new slots were created.
    pub fn adapt(&mut self, registry: &Registry) -> usize {
        self.adapt_with(registry, |_| {})
    }

    /// Like [`adapt`](Self::adapt), also passing each new slot to `register`
    /// (typically a flag parser's "define a custom-valued flag" call).
    pub fn adapt_with<F>(&mut self, registry: &Registry, mut register: F) -> usize
    where
        F: FnMut(&FlagSlot),
    {
        let before = self.slots.len();
        registry.for_each(|node| {
            self.adapt_recursive(node, &mut register);
        });
        self.slots.len() - before
    }

    /// All slots created so far, in traversal order.
    pub fn slots(&self) -> &[FlagSlot] {
        &self.slots
    }

    /// The first slot named `name`.
    pub fn slot(&self, name: &str) -> Option<&FlagSlot> {
        self.slots.iter().find(|s| s.name == name)
    }

    fn adapt_recursive<F>(&mut self, node: &Arc<dyn Configurable>, register: &mut F)
    where
        F: FnMut(&FlagSlot),
    {
        if let Some(slot) = self.adapt_one(node) {
            register(&slot);
            self.slots.push(slot);
        }
        if let Some(parent) = node.as_parent() {
            for child in parent.children() {
                self.adapt_recursive(&child, register);
            }
        }
    }

    fn adapt_one(&mut self, node: &Arc<dyn Configurable>) -> Option<FlagSlot> {
        let id = Arc::as_ptr(node) as *const () as usize;
        if self.adapted.contains(&id) {
            return None;
        }
        let name = name_of(node.as_ref())?;
        node.as_setter()?;

        let usage = node
            .as_usage()
            .map(|u| u.usage_summary().to_string())
            .unwrap_or_default();
        self.adapted.insert(id);
        tracing::trace!(event = "nexus.flag.adapted", name);

        Some(FlagSlot {
            name: name.to_string(),
            usage,
            node: node.clone(),
        })
    }
}
