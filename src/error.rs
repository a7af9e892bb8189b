use std::path::PathBuf;
use thiserror::Error;

use crate::node::Capability;

#[derive(Debug, Error)]
pub enum NexusError {
    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Unsupported type for field '{field}': {type_name} (expected String, i64 or bool)")]
    UnsupportedFieldType {
        field: String,
        type_name: &'static str,
    },

    #[error("Invalid default for field '{field}': {value:?} ({reason})")]
    InvalidDefault {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Duplicate field '{field}' in group '{group}'")]
    DuplicateField { group: String, field: String },

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    JsonParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Configurable '{key}' does not support {capability}")]
    NotSupported { key: String, capability: Capability },
}

impl NexusError {
    pub(crate) fn invalid_value(key: &str, reason: impl Into<String>) -> Self {
        NexusError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
