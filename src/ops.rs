//! Read-side operations: listing and lookup of the resolved tree.
//!
//! These back a `config list` / `config get` style surface. Both walk the
//! registry and report, for every readable node, its dotted key, current
//! value, and the rank of the source that set it.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::NexusError;
use crate::node::{Configurable, dotted, name_of};
use crate::priority::Priority;
use crate::registry::Registry;
use crate::types::Value;

/// One readable node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub key: String,
    pub value: Value,
    /// Rank of the source that set the value. `None` for nodes that opt out
    /// of arbitration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub usage: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub env_var: String,
}

impl Entry {
    fn from_node(key: String, node: &dyn Configurable) -> Option<Self> {
        let value = node.as_getter()?.get_value();
        Some(Self {
            key,
            value,
            priority: node.as_prioritized().map(|p| p.priority()),
            usage: node
                .as_usage()
                .map(|u| u.usage_summary().to_string())
                .unwrap_or_default(),
            env_var: node
                .as_env_var()
                .map(|e| e.env_var_name().to_string())
                .unwrap_or_default(),
        })
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.usage.is_empty() {
            writeln!(f, "# {}", self.usage)?;
        }
        if !self.env_var.is_empty() {
            writeln!(f, "# env: {}", self.env_var)?;
        }
        write!(f, "{} = {}", self.key, self.value.to_literal())?;
        if let Some(p) = self.priority {
            write!(f, "  ({p})")?;
        }
        Ok(())
    }
}

/// Every readable node in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Listing {
    pub entries: Vec<Entry>,
}

impl Listing {
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Pretty-printed JSON, for machine consumption.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Entries separated by blank lines, each rendered as its [`Entry`] form.
impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

/// List every readable node as a dotted key.
pub fn list_values(registry: &Registry) -> Listing {
    let mut listing = Listing::default();
    registry.for_each(|node| {
        collect(node, "", &mut listing.entries);
    });
    listing
}

fn collect(node: &Arc<dyn Configurable>, prefix: &str, out: &mut Vec<Entry>) {
    let Some(name) = name_of(node.as_ref()) else {
        return;
    };
    let key = dotted(prefix, name);

    if let Some(entry) = Entry::from_node(key.clone(), node.as_ref()) {
        out.push(entry);
    }
    if let Some(parent) = node.as_parent() {
        for child in parent.children() {
            collect(&child, &key, out);
        }
    }
}

/// Look up one node by dotted key (e.g. `"server.port"`).
///
/// Groups are not readable, so naming one is a [`NexusError::KeyNotFound`].
pub fn get_value(registry: &Registry, key: &str) -> Result<Entry, NexusError> {
    let not_found = || NexusError::KeyNotFound(key.to_string());

    let mut segments = key.split('.');
    let first = segments.next().ok_or_else(not_found)?;

    let mut current: Option<Arc<dyn Configurable>> = None;
    let _ = registry.visit(|node| {
        if name_of(node.as_ref()) == Some(first) {
            current = Some(node.clone());
            return Err(());
        }
        Ok(())
    });

    let mut node = current.ok_or_else(not_found)?;
    for segment in segments {
        let child = node
            .as_parent()
            .and_then(|p| {
                p.children()
                    .into_iter()
                    .find(|c| name_of(c.as_ref()) == Some(segment))
            })
            .ok_or_else(not_found)?;
        node = child;
    }

    Entry::from_node(key.to_string(), node.as_ref()).ok_or_else(not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::sample;
    use crate::leaf::Leaf;
    use crate::priority;

    #[test]
    fn lists_leaves_with_dotted_keys() {
        let s = sample();
        let listing = list_values(&s.registry);
        let keys: Vec<&str> = listing.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "server.host",
                "server.port",
                "server.tls.enabled",
                "debug",
                "name"
            ]
        );
    }

    #[test]
    fn listing_reports_source() {
        let s = sample();
        priority::propose(&*s.port, Value::Int(1), Priority::FILE).unwrap();
        let listing = list_values(&s.registry);
        let port = listing.get("server.port").unwrap();
        assert_eq!(port.value, Value::Int(1));
        assert_eq!(port.priority, Some(Priority::FILE));
        assert_eq!(port.env_var, "APP_PORT");
        assert_eq!(
            listing.get("name").unwrap().priority,
            Some(Priority::DEFAULT)
        );
    }

    #[test]
    fn listing_display() {
        let s = sample();
        priority::propose(&*s.port, Value::Int(9), Priority::FLAG).unwrap();
        let listing = list_values(&s.registry);
        let text = listing.to_string();
        assert!(text.starts_with(
            "# Address to bind\n# env: APP_HOST\nserver.host = \"localhost\"  (default)\n\n"
        ));
        assert!(text.contains("server.port = 9  (flag)"));
        assert!(text.ends_with("# Instance name\nname = \"nexus\"  (default)"));
        for entry in &listing.entries {
            assert!(text.contains(&entry.to_string()));
        }
    }

    #[test]
    fn listing_json() {
        let s = sample();
        let json = list_values(&s.registry).to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &parsed["entries"][0];
        assert_eq!(first["key"], "server.host");
        assert_eq!(first["value"], "localhost");
        assert_eq!(first["priority"], 0);
        assert_eq!(parsed["entries"][1]["value"], 8080);
    }

    #[test]
    fn get_nested_value() {
        let s = sample();
        s.tls_enabled.set(true);
        let entry = get_value(&s.registry, "server.tls.enabled").unwrap();
        assert_eq!(entry.value, Value::Bool(true));
        assert_eq!(entry.usage, "Serve over TLS");
    }

    #[test]
    fn get_top_level_value() {
        let s = sample();
        let entry = get_value(&s.registry, "name").unwrap();
        assert_eq!(entry.to_string(), "# Instance name\nname = \"nexus\"  (default)");
    }

    #[test]
    fn unknown_or_group_key_not_found() {
        let s = sample();
        for key in ["nope", "server.nope", "server", "name.extra", ""] {
            let result = get_value(&s.registry, key);
            assert!(
                matches!(result, Err(NexusError::KeyNotFound(ref k)) if k == key),
                "key {key:?}"
            );
        }
    }

    #[test]
    fn unarbitrated_leaf_has_no_priority() {
        let registry = Registry::new();
        Leaf::<bool>::builder("quiet").unarbitrated().register(&registry);
        let entry = get_value(&registry, "quiet").unwrap();
        assert_eq!(entry.priority, None);
        assert_eq!(entry.to_string(), "quiet = false");
    }
}
