//! Environment variable adapter.
//!
//! Every node that exposes a non-empty [`EnvVarName`](crate::node::EnvVarName)
//! and can be assigned is looked up in the environment. A variable that is
//! set is proposed at [`Priority::ENVIRONMENT`]; an unset variable means the
//! environment has no opinion and the node is left alone.
//!
//! Children are visited before their parent, so a composite node that also
//! carries its own binding sees its children settled first.

use std::sync::Arc;

use crate::node::{Configurable, dotted, name_of};
use crate::priority::{self, ApplyReport, Priority};
use crate::registry::Registry;
use crate::types::Value;

/// Apply the process environment to every bound node in `registry`.
pub fn adapt_env(registry: &Registry) -> ApplyReport {
    adapt_env_with(registry, |var| std::env::var(var).ok())
}

/// Like [`adapt_env`], but resolve variables through `lookup`.
///
/// Takes a closure so tests can pass synthetic data instead of the real
/// environment.
pub fn adapt_env_with<F>(registry: &Registry, mut lookup: F) -> ApplyReport
where
    F: FnMut(&str) -> Option<String>,
{
    let mut report = ApplyReport::default();
    registry.for_each(|node| {
        adapt_recursive(node, "", &mut lookup, &mut report);
    });
    tracing::debug!(
        event = "nexus.env.applied",
        accepted = report.accepted.len(),
        rejected = report.rejected.len(),
        failed = report.failures.len()
    );
    report
}

fn adapt_recursive<F>(
    node: &Arc<dyn Configurable>,
    prefix: &str,
    lookup: &mut F,
    report: &mut ApplyReport,
) where
    F: FnMut(&str) -> Option<String>,
{
    let key = dotted(prefix, name_of(node.as_ref()).unwrap_or_default());

    if let Some(parent) = node.as_parent() {
        for child in parent.children() {
            adapt_recursive(&child, &key, lookup, report);
        }
    }

    adapt(node.as_ref(), &key, lookup, report);
}

fn adapt<F>(node: &dyn Configurable, key: &str, lookup: &mut F, report: &mut ApplyReport)
where
    F: FnMut(&str) -> Option<String>,
{
    let Some(binding) = node.as_env_var() else {
        return;
    };
    if node.as_setter().is_none() {
        return;
    }

    let var = binding.env_var_name();
    if var.is_empty() {
        return;
    }

    let Some(raw) = lookup(var) else {
        return;
    };

    report.record(
        key,
        priority::propose(node, Value::String(raw), Priority::ENVIRONMENT),
    );
}
