//! A neutral registry of configurable values, fed by files, environment
//! variables and command-line flags under one priority rule.
//!
//! Cfgnexus sits between the parts of a program that *declare* settings and
//! the parts that *supply* them. Declarations register nodes with a
//! [`Registry`]; adapters walk the registry and propose values. Neither side
//! knows about the other.
//!
//! ```ignore
//! let port = Leaf::<i64>::builder("port")
//!     .usage("Port to listen on")
//!     .default(8080)
//!     .env("MYAPP_PORT")
//!     .register(default_registry());
//!
//! adapt_env(default_registry());
//! FileSource::new("myapp").load(default_registry())?;
//! println!("listening on {}", port.value());
//! ```
//!
//! # Nodes and capabilities
//!
//! Everything in the registry is a [`Configurable`]. A node exposes whatever
//! subset of capabilities it supports ([`Named`], [`HasChildren`],
//! [`GetValue`], [`SetValue`], [`DefaultValue`], [`UsageSummary`],
//! [`EnvVarName`], [`Prioritized`]) through `as_*` probes that return
//! `Option<&dyn Trait>`. Adapters probe and skip: a node without
//! [`SetValue`] is left alone by every source, and a node without
//! [`HasChildren`] is treated as terminal.
//!
//! Two concrete node types ship with the crate:
//!
//! - **[`Leaf<T>`]** holds one `String`, `i64` or `bool`, plus its default,
//!   usage line, optional environment binding and current rank.
//! - **[`Group`]** is a named container. It is itself a registration target,
//!   so leaves can be built straight into it.
//!
//! Nodes are shared as `Arc<dyn Configurable>`. Keep the typed
//! `Arc<Leaf<T>>` returned at construction and read it after loading.
//!
//! # Priority
//!
//! ```text
//! Default (0)  <  Environment (1000)  <  File (2000)  <  Flag (3000)
//! ```
//!
//! A proposal at rank `P` to a node at rank `Q` lands iff `Q <= P`, and then
//! raises the node to `P`. Lower-ranked proposals are dropped silently. Ranks
//! only rise, so adapters can run in any order, or repeatedly, and still
//! settle on the highest-ranked source. See [`priority`] for details, and
//! [`LeafBuilder::unarbitrated`] for leaves that opt out.
//!
//! # Adapters
//!
//! - **Environment**: [`adapt_env`] looks up each bound node's variable and
//!   proposes it at [`Priority::ENVIRONMENT`]. Unset variables are ignored.
//! - **File**: [`FileSource`] resolves one file (an explicit path, usually
//!   from the [`conf_flag`] leaf, or the last existing candidate) and
//!   proposes its keys at [`Priority::FILE`]. TOML by default, JSON for
//!   `.json` files. Tables map onto groups by name.
//! - **Flags**: [`FlagAdapter`] turns every named, assignable node into a
//!   [`FlagSlot`] proposing at [`Priority::FLAG`]. With the `clap` feature
//!   (on by default) the slots are added to a `clap::Command` and applied
//!   from its matches.
//!
//! Every pass returns an [`ApplyReport`] listing which dotted keys were
//! accepted or rejected, plus the coercion failures. One bad value never
//! aborts a pass.
//!
//! # Declarative groups
//!
//! [`StructSpec`] describes a record field by field and generates a
//! [`Group`] of leaves from it, lower-casing names and parsing text
//! defaults. Fields of unsupported types fail the build.
//!
//! # Inspection
//!
//! [`list_values`] and [`get_value`] report the resolved tree as dotted
//! keys with their value and the rank of the source that set them.
//!
//! # Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events tagged
//! `event = "nexus.<area>.<what>"` and never installs a subscriber.
//! Registrations and adaptations are `trace`, pass summaries and file
//! resolution are `debug`, failed assignments are `warn`.
//!
//! # Error handling
//!
//! All fallible operations return [`NexusError`]. See the [`error`] module.

pub mod coerce;
pub mod error;
pub mod node;
pub mod priority;
pub mod types;

#[cfg(feature = "clap")]
mod cli;
mod env;
mod file;
mod flag;
mod group;
mod leaf;
mod ops;
mod registry;
mod schema;

#[cfg(test)]
mod fixtures;

pub use env::{adapt_env, adapt_env_with};
pub use error::NexusError;
pub use file::{
    CONF_FLAG, FileSource, Format, Loaded, apply_document, conf_flag, default_candidates,
    load_path, read_document, resolve_path, user_config_path,
};
pub use flag::{FlagAdapter, FlagSlot};
pub use group::Group;
pub use leaf::{BoolLeaf, IntLeaf, Leaf, LeafBuilder, Scalar, StringLeaf};
pub use node::{
    Capability, Configurable, DefaultValue, EnvVarName, GetValue, HasChildren, Named,
    Prioritized, SetValue, UsageSummary, capabilities, supports,
};
pub use ops::{Entry, Listing, get_value, list_values};
pub use priority::{ApplyReport, Outcome, Priority, propose};
pub use registry::{NoRegister, Registerable, Registry, default_registry};
pub use schema::{FieldSpec, StructSpec};
pub use types::{ScalarKind, Value};
