//! Priority arbitration between configuration sources.
//!
//! Every source proposes assignments at a fixed rank:
//!
//! ```text
//! DEFAULT (0) < ENVIRONMENT (1000) < FILE (2000) < FLAG (3000)
//! ```
//!
//! A proposal at rank `P` to a node currently at rank `Q` is accepted iff
//! `Q <= P`. Acceptance stores the coerced value and raises the node to `P`.
//! A rejected proposal changes nothing and is not reported as an error. A
//! proposal whose value fails coercion changes nothing either, including the
//! rank, so a later valid proposal from a lower source can still land.
//!
//! Because ranks only ever go up, adapters may run in any order, and any
//! number of times, and still converge on the highest-ranked source's value.
//! Nodes without the [`Prioritized`](crate::node::Prioritized) capability opt
//! out of arbitration: every proposal to them is accepted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NexusError;
use crate::node::Configurable;
use crate::types::Value;

/// Rank of a configuration source. Higher ranks win.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Priority(u32);

impl Priority {
    /// Values set at construction.
    pub const DEFAULT: Priority = Priority(0);
    /// Values read from environment variables.
    pub const ENVIRONMENT: Priority = Priority(1000);
    /// Values loaded from a configuration file.
    pub const FILE: Priority = Priority(2000);
    /// Values given as command-line flags.
    pub const FLAG: Priority = Priority(3000);

    pub const fn new(rank: u32) -> Self {
        Priority(rank)
    }

    pub const fn rank(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Priority::DEFAULT => f.write_str("default"),
            Priority::ENVIRONMENT => f.write_str("environment"),
            Priority::FILE => f.write_str("file"),
            Priority::FLAG => f.write_str("flag"),
            Priority(rank) => write!(f, "priority {rank}"),
        }
    }
}

/// What happened to a single proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The value was stored.
    Accepted,
    /// The node already holds a value from a higher-ranked source.
    Rejected,
    /// The node cannot be assigned at all.
    Unsupported,
}

/// Propose `value` to `node` on behalf of a source ranked `source`.
///
/// Coercion failures are returned as errors; the node's value and rank are
/// unchanged in that case.
pub fn propose(
    node: &dyn Configurable,
    value: Value,
    source: Priority,
) -> Result<Outcome, NexusError> {
    let Some(setter) = node.as_setter() else {
        return Ok(Outcome::Unsupported);
    };

    match node.as_prioritized() {
        Some(prio) => prio.assign_at(value, source),
        None => {
            setter.set_value(value)?;
            Ok(Outcome::Accepted)
        }
    }
}

/// Summary of one adapter pass, keyed by dotted node path.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub accepted: Vec<String>,
    pub rejected: Vec<String>,
    pub failures: Vec<NexusError>,
}

impl ApplyReport {
    /// File one proposal result under `key`.
    ///
    /// Coercion failures are re-keyed with `key`, so a failure names the same
    /// path as the accepted and rejected lists.
    pub fn record(&mut self, key: &str, result: Result<Outcome, NexusError>) {
        match result {
            Ok(Outcome::Accepted) => self.accepted.push(key.to_string()),
            Ok(Outcome::Rejected) => self.rejected.push(key.to_string()),
            Ok(Outcome::Unsupported) => {}
            Err(e) => {
                let e = match e {
                    NexusError::InvalidValue { reason, .. } => {
                        NexusError::invalid_value(key, reason)
                    }
                    other => other,
                };
                tracing::warn!(event = "nexus.assign.failed", key, error = %e);
                self.failures.push(e);
            }
        }
    }

    /// True when no proposal failed coercion.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn extend(&mut self, other: ApplyReport) {
        self.accepted.extend(other.accepted);
        self.rejected.extend(other.rejected);
        self.failures.extend(other.failures);
    }
}
