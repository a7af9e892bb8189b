//! The registry of top-level configurables.
//!
//! A [`Registry`] is an append-only, ordered list of nodes. It knows nothing
//! about children; adapters recurse into groups themselves. Registration and
//! traversal are serialized through one lock, and a visit holds that lock for
//! the whole pass. A visit callback must therefore not call back into
//! [`Registry::register`] on the same registry, or it will deadlock.
//!
//! Most programs use the process-wide [`default_registry`]. Tests and
//! embedders that need isolation construct their own and hand it to the
//! adapters explicitly.

use std::convert::Infallible;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::node::{Configurable, name_of};

/// Anything new configurables can be attached to.
pub trait Registerable {
    fn register(&self, node: Arc<dyn Configurable>);
}

/// A [`Registerable`] that drops everything, for nodes that should stay
/// out of every registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRegister;

impl Registerable for NoRegister {
    fn register(&self, _node: Arc<dyn Configurable>) {}
}

#[derive(Debug, Default)]
pub struct Registry {
    nodes: RwLock<Vec<Arc<dyn Configurable>>>,
}

static DEFAULT_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// The process-wide registry.
pub fn default_registry() -> &'static Registry {
    &DEFAULT_REGISTRY
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a top-level node.
    pub fn register(&self, node: Arc<dyn Configurable>) {
        tracing::trace!(
            event = "nexus.registry.register",
            name = name_of(node.as_ref()).unwrap_or("<unnamed>")
        );
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(node);
    }

    /// Call `f` on every top-level node in registration order.
    ///
    /// The first error stops the pass and is returned; nodes already visited
    /// keep whatever `f` did to them.
    pub fn visit<E, F>(&self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&Arc<dyn Configurable>) -> Result<(), E>,
    {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        for node in nodes.iter() {
            f(node)?;
        }
        Ok(())
    }

    /// Call `f` on every top-level node in registration order. Cannot stop
    /// early; use [`visit`](Self::visit) for that.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Arc<dyn Configurable>),
    {
        let Ok(()) = self.visit::<Infallible, _>(|node| {
            f(node);
            Ok(())
        });
    }

    pub fn len(&self) -> usize {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Registerable for Registry {
    fn register(&self, node: Arc<dyn Configurable>) {
        Registry::register(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::Opaque;
    use crate::group::Group;
    use crate::leaf::Leaf;

    #[test]
    fn empty_visit_calls_nothing() {
        let registry = Registry::new();
        let mut calls = 0;
        let result: Result<(), ()> = registry.visit(|_| {
            calls += 1;
            Ok(())
        });
        assert!(result.is_ok());
        assert_eq!(calls, 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn visits_in_registration_order() {
        let registry = Registry::new();
        for name in ["c", "a", "b"] {
            registry.register(Arc::new(Group::new(name)));
        }
        let mut seen = Vec::new();
        registry
            .visit::<(), _>(|node| {
                seen.push(name_of(node.as_ref()).unwrap().to_string());
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, vec!["c", "a", "b"]);
    }

    #[test]
    fn error_short_circuits() {
        let registry = Registry::new();
        for name in ["a", "b", "c"] {
            Leaf::<i64>::builder(name).register(&registry);
        }
        let mut seen = Vec::new();
        let result = registry.visit(|node| {
            let name = name_of(node.as_ref()).unwrap().to_string();
            if name == "b" {
                return Err(name);
            }
            seen.push(name);
            Ok(())
        });
        assert_eq!(result, Err("b".to_string()));
        assert_eq!(seen, vec!["a"]);
    }

    #[test]
    fn accepts_capability_less_nodes() {
        let registry = Registry::new();
        registry.register(Arc::new(Opaque));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn no_register_discards() {
        let leaf = Leaf::<bool>::builder("x").register(&NoRegister);
        assert_eq!(Arc::strong_count(&leaf), 1);
    }

    #[test]
    fn for_each_sees_every_node() {
        let registry = Registry::new();
        for name in ["a", "b"] {
            Leaf::<i64>::builder(name).register(&registry);
        }
        let mut seen = Vec::new();
        registry.for_each(|node| seen.push(name_of(node.as_ref()).unwrap().to_string()));
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn concurrent_register_and_visit() {
        let registry = Registry::new();
        std::thread::scope(|scope| {
            for t in 0..4 {
                let registry = &registry;
                scope.spawn(move || {
                    for i in 0..50 {
                        Leaf::<i64>::builder(&format!("t{t}_{i}")).register(registry);
                    }
                });
            }
            scope.spawn(|| {
                let mut last = 0;
                for _ in 0..200 {
                    let mut count = 0;
                    registry.for_each(|_| count += 1);
                    assert!(count >= last);
                    last = count;
                }
            });
        });
        assert_eq!(registry.len(), 200);

        let mut names = std::collections::HashSet::new();
        registry.for_each(|node| {
            names.insert(name_of(node.as_ref()).unwrap().to_string());
        });
        assert_eq!(names.len(), 200);
    }

    #[test]
    fn default_registry_is_shared() {
        assert!(std::ptr::eq(default_registry(), default_registry()));
    }
}
