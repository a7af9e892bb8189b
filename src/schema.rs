//! Declarative generation of configurable groups.
//!
//! A [`StructSpec`] describes a record type the way an annotated struct
//! would: one [`FieldSpec`] per field, each with a Rust type, an optional
//! default (as text), an optional usage line and an optional environment
//! variable. [`StructSpec::build`] turns it into a [`Group`] with one
//! [`Leaf`] per eligible field.
//!
//! Rules:
//!
//! - A field is eligible only if it declares a usage line, a default, or
//!   both. Other fields are skipped.
//! - The field type must be `String`, `i64` or `bool`. Anything else fails
//!   the whole build with [`NexusError::UnsupportedFieldType`].
//! - Defaults are parsed with the same coercion rules as assigned values,
//!   except that an empty boolean default is `false`. A default that does not
//!   parse fails the build with [`NexusError::InvalidDefault`].
//! - Leaf names are the field names lower-cased. Two eligible fields that
//!   map to the same name fail the build with [`NexusError::DuplicateField`].
//!
//! ```ignore
//! let server = StructSpec::new("server")
//!     .field(FieldSpec::of::<String>("Host").default("localhost").usage("Bind address"))
//!     .field(FieldSpec::of::<i64>("Port").default("8080").env("SERVER_PORT"))
//!     .register(default_registry())?;
//! let port = server.leaf::<i64>("port").unwrap();
//! ```

use std::any::{TypeId, type_name};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::NexusError;
use crate::group::Group;
use crate::leaf::{Leaf, Scalar};
use crate::node::Configurable;
use crate::registry::Registerable;

/// One field of a [`StructSpec`].
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    default: Option<String>,
    usage: Option<String>,
    env: Option<String>,
}

impl FieldSpec {
    /// A field named `name` of type `T`.
    pub fn of<T: 'static>(name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            default: None,
            usage: None,
            env: None,
        }
    }

    pub fn default(mut self, raw: &str) -> Self {
        self.default = Some(raw.to_string());
        self
    }

    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = Some(usage.to_string());
        self
    }

    pub fn env(mut self, var: &str) -> Self {
        self.env = Some(var.to_string());
        self
    }

    fn is_eligible(&self) -> bool {
        let declared = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.is_empty());
        declared(&self.usage) || declared(&self.default)
    }

    fn leaf_name(&self) -> String {
        self.name.to_lowercase()
    }

    fn build(&self) -> Result<Arc<dyn Configurable>, NexusError> {
        let id = self.type_id;
        if id == TypeId::of::<String>() {
            Ok(self.build_leaf::<String>()?)
        } else if id == TypeId::of::<i64>() {
            Ok(self.build_leaf::<i64>()?)
        } else if id == TypeId::of::<bool>() {
            Ok(self.build_leaf::<bool>()?)
        } else {
            Err(NexusError::UnsupportedFieldType {
                field: self.name.clone(),
                type_name: self.type_name,
            })
        }
    }

    fn build_leaf<T: Scalar>(&self) -> Result<Arc<Leaf<T>>, NexusError> {
        let default = match &self.default {
            Some(raw) => T::parse_default(raw).map_err(|reason| NexusError::InvalidDefault {
                field: self.name.clone(),
                value: raw.clone(),
                reason,
            })?,
            None => T::default(),
        };

        let leaf = Leaf::<T>::builder(&self.leaf_name())
            .default(default)
            .usage(self.usage.as_deref().unwrap_or_default())
            .env(self.env.as_deref().unwrap_or_default())
            .build();
        Ok(Arc::new(leaf))
    }
}

/// A record type described field by field.
#[derive(Debug, Clone)]
pub struct StructSpec {
    name: String,
    fields: Vec<FieldSpec>,
}

impl StructSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Generate the group. Nothing is registered on failure.
    pub fn build(&self) -> Result<Arc<Group>, NexusError> {
        let group = Group::new(&self.name);
        let mut names = HashSet::new();

        for field in self.fields.iter().filter(|f| f.is_eligible()) {
            let leaf = field.build()?;
            if !names.insert(field.leaf_name()) {
                return Err(NexusError::DuplicateField {
                    group: self.name.clone(),
                    field: field.leaf_name(),
                });
            }
            group.add(leaf);
        }

        Ok(Arc::new(group))
    }

    /// Generate the group and register it with `reg`.
    pub fn register(&self, reg: &dyn Registerable) -> Result<Arc<Group>, NexusError> {
        let group = self.build()?;
        reg.register(group.clone());
        Ok(group)
    }
}
