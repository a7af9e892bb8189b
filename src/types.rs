use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar configuration value, either held by a leaf or proposed to one.
///
/// Sources that only speak text (flags, environment variables) propose
/// [`Value::String`]; the receiving leaf coerces it into its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
}

impl Value {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Value::String(_) => ScalarKind::String,
            Value::Int(_) => ScalarKind::Int,
            Value::Bool(_) => ScalarKind::Bool,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert a decoded document value into a scalar.
    ///
    /// Returns `None` for floats, datetimes, arrays and tables, none of which
    /// a leaf can hold.
    pub fn from_toml(value: &toml::Value) -> Option<Value> {
        match value {
            toml::Value::String(s) => Some(Value::String(s.clone())),
            toml::Value::Integer(n) => Some(Value::Int(*n)),
            toml::Value::Boolean(b) => Some(Value::Bool(*b)),
            _ => None,
        }
    }

    /// Render the value the way it would be written in a TOML file.
    pub fn to_literal(&self) -> String {
        match self {
            Value::String(s) => format!("{s:?}"),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// The three scalar types a leaf may be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Int,
    Bool,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::String => "string",
            ScalarKind::Int => "int",
            ScalarKind::Bool => "bool",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_toml_keeps_scalars() {
        assert_eq!(
            Value::from_toml(&toml::Value::String("x".into())),
            Some(Value::String("x".into()))
        );
        assert_eq!(
            Value::from_toml(&toml::Value::Integer(3)),
            Some(Value::Int(3))
        );
        assert_eq!(
            Value::from_toml(&toml::Value::Boolean(true)),
            Some(Value::Bool(true))
        );
    }

    #[test]
    fn from_toml_rejects_non_scalars() {
        assert_eq!(Value::from_toml(&toml::Value::Float(1.5)), None);
        assert_eq!(Value::from_toml(&toml::Value::Array(vec![])), None);
        assert_eq!(
            Value::from_toml(&toml::Value::Table(toml::Table::new())),
            None
        );
    }

    #[test]
    fn literal_quotes_strings_only() {
        assert_eq!(Value::from("pg://db").to_literal(), "\"pg://db\"");
        assert_eq!(Value::Int(8080).to_literal(), "8080");
        assert_eq!(Value::Bool(false).to_literal(), "false");
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&vec![Value::Int(1), Value::from("a")]).unwrap();
        assert_eq!(json, r#"[1,"a"]"#);
    }
}
