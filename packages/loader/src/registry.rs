//! Type registry
//!
//! Maps type names in documents to component specs. A registry is built once at
//! startup and handed to the loader; nothing is looked up by reflection.

use std::collections::HashMap;
use tracing::debug;
use trellis_tree::widgets::standard_library;
use trellis_tree::ComponentSpec;

#[derive(Debug, Default, Clone)]
pub struct Registry {
    types: HashMap<&'static str, &'static ComponentSpec>,
    /// Prefix-mounted module registries, searched in mount order
    modules: Vec<(String, Registry)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every concrete type of the standard library
    pub fn with_standard_library() -> Self {
        let mut registry = Self::new();
        for spec in standard_library() {
            registry.register(spec);
        }
        registry
    }

    /// Register a type under its own name, replacing any previous registration
    pub fn register(&mut self, spec: &'static ComponentSpec) -> Option<&'static ComponentSpec> {
        self.types.insert(spec.name, spec)
    }

    /// Resolve type names starting with `prefix` in `module`
    pub fn mount(&mut self, prefix: impl Into<String>, module: Registry) {
        let prefix = prefix.into();
        debug!(prefix = %prefix, types = module.len(), "Mounting type module");
        self.modules.push((prefix, module));
    }

    pub fn resolve(&self, name: &str) -> Option<&'static ComponentSpec> {
        if let Some(spec) = self.types.get(name) {
            return Some(spec);
        }
        self.modules
            .iter()
            .filter(|(prefix, _)| name.starts_with(prefix.as_str()))
            .find_map(|(_, module)| module.resolve(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Directly registered type names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.types.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
