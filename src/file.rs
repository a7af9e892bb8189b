//! Configuration file adapter.
//!
//! # Resolution
//!
//! A [`FileSource`] decides which single file to load:
//!
//! - An explicit path (typically from the `--conf` flag, see [`conf_flag`])
//!   always wins outright, whether or not any candidate exists.
//! - Otherwise each candidate is checked in order and the **last** one that
//!   exists is used. Later candidates are more specific (installation
//!   directory, then the user's config directory), so they override earlier
//!   system-wide ones.
//! - If no candidate exists, nothing is loaded. That is not an error.
//!
//! Candidates are templates: a leading `$BIN/` is replaced with the directory
//! containing the running executable.
//!
//! # Decoding
//!
//! Files ending in `.json` are decoded as JSON, everything else as TOML. Both
//! produce the same generic nested table.
//!
//! # Application
//!
//! The decoded table is walked in parallel with the registry tree. A group
//! looks up each child by name in the matching sub-table; a leaf receives the
//! scalar at its key at [`Priority::FILE`]. Keys without a matching node and
//! nodes without a matching key are both skipped silently.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use toml::Table;

use crate::error::NexusError;
use crate::leaf::Leaf;
use crate::node::{Configurable, dotted, name_of};
use crate::priority::{self, ApplyReport, Priority};
use crate::registry::{Registerable, Registry};
use crate::types::Value;

/// Name of the conventional config-path flag.
pub const CONF_FLAG: &str = "conf";

/// Declare the `conf` string leaf ("Configuration file path").
///
/// Pass its value to [`FileSource::explicit_path`] after flags are parsed.
pub fn conf_flag(reg: &dyn Registerable) -> Arc<Leaf<String>> {
    Leaf::<String>::builder(CONF_FLAG)
        .usage("Configuration file path")
        .register(reg)
}

/// Supported document syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Format {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Toml,
        }
    }
}

/// Decode `content` into a generic nested table.
pub fn decode(content: &str, format: Format, path: &Path) -> Result<Table, NexusError> {
    match format {
        Format::Toml => toml::from_str(content).map_err(|e| NexusError::ParseError {
            path: path.to_path_buf(),
            source: e,
        }),
        Format::Json => serde_json::from_str(content).map_err(|e| NexusError::JsonParseError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Read and decode the file at `path`.
pub fn read_document(path: &Path) -> Result<Table, NexusError> {
    let content = std::fs::read_to_string(path).map_err(|e| NexusError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    decode(&content, Format::from_path(path), path)
}

/// Apply a decoded document to every node in `registry`.
pub fn apply_document(registry: &Registry, document: &Table) -> ApplyReport {
    let mut report = ApplyReport::default();
    registry.for_each(|node| {
        apply_child(node, document, "", &mut report);
    });
    report
}

/// Load `path` and apply it to `registry`.
pub fn load_path(registry: &Registry, path: &Path) -> Result<ApplyReport, NexusError> {
    let document = read_document(path)?;
    let report = apply_document(registry, &document);
    tracing::debug!(
        event = "nexus.file.loaded",
        path = %path.display(),
        accepted = report.accepted.len(),
        rejected = report.rejected.len(),
        failed = report.failures.len()
    );
    Ok(report)
}

fn apply_child(
    node: &Arc<dyn Configurable>,
    table: &Table,
    prefix: &str,
    report: &mut ApplyReport,
) {
    let Some(name) = name_of(node.as_ref()) else {
        return;
    };
    let Some(value) = table.get(name) else {
        return;
    };
    apply(node, value, &dotted(prefix, name), report);
}

fn apply(
    node: &Arc<dyn Configurable>,
    value: &toml::Value,
    key: &str,
    report: &mut ApplyReport,
) {
    if let Some(parent) = node.as_parent() {
        let children = parent.children();
        if !children.is_empty() {
            if let toml::Value::Table(sub) = value {
                for child in &children {
                    apply_child(child, sub, key, report);
                }
            }
            return;
        }
    }

    if node.as_setter().is_none() {
        return;
    }

    match Value::from_toml(value) {
        Some(scalar) => report.record(
            key,
            priority::propose(node.as_ref(), scalar, Priority::FILE),
        ),
        None => report.record(
            key,
            Err(NexusError::invalid_value(
                key,
                format!("unsupported {} value in config file", value.type_str()),
            )),
        ),
    }
}

/// The candidate templates searched for `program` when no path is given.
///
/// System-wide locations come first, then locations relative to the
/// executable, so the latter win when several exist.
pub fn default_candidates(program: &str) -> Vec<String> {
    vec![
        format!("/etc/{program}/{program}.conf"),
        format!("/etc/{program}.conf"),
        format!("etc/{program}.conf"),
        format!("$BIN/{program}.conf"),
        format!("$BIN/../etc/{program}/{program}.conf"),
        format!("$BIN/../etc/{program}.conf"),
    ]
}

/// The per-user config file for `program`, e.g. `~/.config/{program}/{program}.conf`.
pub fn user_config_path(program: &str) -> Option<PathBuf> {
    let proj = directories::ProjectDirs::from("", "", program)?;
    Some(proj.config_dir().join(format!("{program}.conf")))
}

/// Expand a candidate template. `$BIN/` is resolved against `bin_dir`;
/// without one, such candidates are dropped.
pub fn expand_candidate(template: &str, bin_dir: Option<&Path>) -> Option<PathBuf> {
    match template.strip_prefix("$BIN/") {
        Some(rest) => bin_dir.map(|dir| dir.join(rest)),
        None => Some(PathBuf::from(template)),
    }
}

/// Pick the file to load: `explicit` if given, else the last existing candidate.
pub fn resolve_path(explicit: Option<&Path>, candidates: &[PathBuf]) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    candidates.iter().rev().find(|p| p.exists()).cloned()
}

fn current_bin_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent().map(Path::to_path_buf)
}

/// The result of loading one file.
#[derive(Debug)]
pub struct Loaded {
    pub path: PathBuf,
    pub report: ApplyReport,
}

/// Builder that resolves and loads the configuration file for a program.
///
/// ```ignore
/// let conf = conf_flag(default_registry());
/// // ... parse flags ...
/// let loaded = FileSource::new("myapp")
///     .explicit_path(Some(conf.value()).filter(|p| !p.is_empty()).map(PathBuf::from))
///     .load(default_registry())?;
/// ```
#[derive(Debug, Clone)]
pub struct FileSource {
    program: String,
    explicit: Option<PathBuf>,
    candidates: Option<Vec<String>>,
    bin_dir: Option<PathBuf>,
    user_config: bool,
}

impl FileSource {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            explicit: None,
            candidates: None,
            bin_dir: None,
            user_config: true,
        }
    }

    /// Load exactly this path, bypassing candidate search. `None` clears it.
    pub fn explicit_path(mut self, path: Option<PathBuf>) -> Self {
        self.explicit = path;
        self
    }

    /// Replace the default candidate templates entirely.
    ///
    /// Templates are listed in ascending precedence: the last existing one is used.
    pub fn candidates(mut self, templates: Vec<String>) -> Self {
        self.candidates = Some(templates);
        self
    }

    /// Directory substituted for `$BIN/` (default: the running executable's directory).
    pub fn bin_dir(mut self, dir: PathBuf) -> Self {
        self.bin_dir = Some(dir);
        self
    }

    /// Whether to append the per-user config path as the final candidate (default: `true`).
    pub fn user_config(mut self, enabled: bool) -> Self {
        self.user_config = enabled;
        self
    }

    /// The concrete candidate paths, in ascending precedence.
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        let templates = match &self.candidates {
            Some(t) => t.clone(),
            None => default_candidates(&self.program),
        };
        let bin_dir = self.bin_dir.clone().or_else(current_bin_dir);

        let mut paths: Vec<PathBuf> = templates
            .iter()
            .filter_map(|t| expand_candidate(t, bin_dir.as_deref()))
            .collect();
        if self.user_config
            && let Some(user) = user_config_path(&self.program)
        {
            paths.push(user);
        }
        paths
    }

    /// The file that [`load`](Self::load) would read, if any.
    pub fn resolve(&self) -> Option<PathBuf> {
        let resolved = resolve_path(self.explicit.as_deref(), &self.candidate_paths());
        tracing::debug!(
            event = "nexus.file.resolved",
            program = %self.program,
            path = ?resolved
        );
        resolved
    }

    /// Resolve, read and apply the configuration file.
    ///
    /// Returns `Ok(None)` when no file was found.
    pub fn load(&self, registry: &Registry) -> Result<Option<Loaded>, NexusError> {
        let Some(path) = self.resolve() else {
            return Ok(None);
        };
        let report = load_path(registry, &path)?;
        Ok(Some(Loaded { path, report }))
    }
}
