// src/component/registry.rs

//! Component catalog lookup.
//!
//! The registry is an explicitly passed, read-only dependency of graph
//! construction: [`Graph::build`](crate::graph::Graph::build) resolves
//! every vertex's component type through it once, and the built graph
//! holds `Arc`s to the resolved components. There is no ambient global
//! registry, which keeps the engine testable in isolation.

use std::collections::HashMap;
use std::sync::Arc;

use super::Component;

/// Read-only catalog of component implementations, keyed by the
/// component-type identifier used in vertex descriptors.
#[derive(Default, Clone)]
pub struct ComponentRegistry {
    components: HashMap<String, Arc<dyn Component>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component implementation under a type identifier.
    ///
    /// Later registrations replace earlier ones for the same identifier.
    pub fn register(&mut self, component_type: &str, component: Arc<dyn Component>) {
        self.components
            .insert(component_type.to_string(), component);
    }

    /// Builder-style variant of [`register`](Self::register).
    pub fn with(mut self, component_type: &str, component: Arc<dyn Component>) -> Self {
        self.register(component_type, component);
        self
    }

    /// Look up a component implementation by type identifier.
    pub fn get(&self, component_type: &str) -> Option<Arc<dyn Component>> {
        self.components.get(component_type).cloned()
    }

    pub fn contains(&self, component_type: &str) -> bool {
        self.components.contains_key(component_type)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&str> = self.components.keys().map(|s| s.as_str()).collect();
        types.sort_unstable();
        f.debug_struct("ComponentRegistry")
            .field("types", &types)
            .finish()
    }
}
