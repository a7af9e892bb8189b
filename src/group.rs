use std::any::Any;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::leaf::{Leaf, Scalar};
use crate::node::{Configurable, HasChildren, Named, name_of};
use crate::registry::Registerable;
use crate::types::Value;

/// A named composite holding an ordered list of child nodes.
///
/// Groups only expose [`Named`] and [`HasChildren`]; adapters recurse into
/// them but never assign to them. Children can be added after the group has
/// itself been registered.
#[derive(Default)]
pub struct Group {
    name: String,
    children: RwLock<Vec<Arc<dyn Configurable>>>,
}

impl Group {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            children: RwLock::default(),
        }
    }

    /// Create a group and register it with `reg` in one step.
    pub fn registered(reg: &dyn Registerable, name: &str) -> Arc<Group> {
        let group = Arc::new(Group::new(name));
        reg.register(group.clone());
        group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a child node.
    pub fn add(&self, child: Arc<dyn Configurable>) {
        self.children
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(child);
    }

    /// The first child named `name`.
    pub fn child(&self, name: &str) -> Option<Arc<dyn Configurable>> {
        self.children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|c| name_of(c.as_ref()) == Some(name))
            .cloned()
    }

    /// The child named `name` as a typed leaf, if it is one of type `T`.
    pub fn leaf<T: Scalar>(&self, name: &str) -> Option<Arc<Leaf<T>>> {
        self.child(name)?.into_any().downcast::<Leaf<T>>().ok()
    }

    /// Current value of the child named `name`.
    pub fn value_of(&self, name: &str) -> Option<Value> {
        let child = self.child(name)?;
        child.as_getter().map(|g| g.get_value())
    }

    pub fn len(&self) -> usize {
        self.children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("children", &self.children())
            .finish()
    }
}

impl Configurable for Group {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn as_named(&self) -> Option<&dyn Named> {
        Some(self)
    }

    fn as_parent(&self) -> Option<&dyn HasChildren> {
        Some(self)
    }
}

impl Named for Group {
    fn name(&self) -> &str {
        &self.name
    }
}

impl HasChildren for Group {
    fn children(&self) -> Vec<Arc<dyn Configurable>> {
        self.children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Registerable for Group {
    fn register(&self, node: Arc<dyn Configurable>) {
        self.add(node);
    }
}
