//! Lazily created, internally owned helper nodes
//!
//! A host's composite factory runs at most once. The first lookup of *any* key
//! materializes the full set; later lookups only read the map.

use crate::error::{TreeError, TreeResult};
use crate::node::Node;
use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use tracing::debug;

#[derive(Default)]
pub(crate) struct CompositeHost {
    composites: RefCell<IndexMap<String, Node>>,
    created: Cell<bool>,
}

impl CompositeHost {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_created(&self) -> bool {
        self.created.get()
    }

    pub(crate) fn snapshot(&self) -> Vec<(String, Node)> {
        self.composites
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Install an already-built composite set (used when copying a host)
    pub(crate) fn install(&self, composites: Vec<(String, Node)>) {
        self.created.set(true);
        self.composites.borrow_mut().extend(composites);
    }
}

impl Node {
    /// Run the composite factory if it has not run yet
    pub fn ensure_composites(&self) -> TreeResult<()> {
        let host = &self.0.composites;
        if host.created.get() {
            return Ok(());
        }
        // A failing factory still counts as the one run.
        host.created.set(true);

        let Some(factory) = self.spec().composite_factory() else {
            return Ok(());
        };

        debug!(host = %self.describe(), "Creating composites");
        let created = factory(self)?;
        for (key, composite) in created {
            self.add_composite(key, composite);
        }
        Ok(())
    }

    /// Look up a composite by key, creating the host's composites on first use
    pub fn composite(&self, key: &str) -> TreeResult<Node> {
        self.ensure_composites()?;
        self.0
            .composites
            .composites
            .borrow()
            .get(key)
            .cloned()
            .ok_or_else(|| TreeError::CompositeNotFound {
                key: key.to_string(),
                host: self.describe(),
            })
    }

    /// Every composite of this host, in creation order
    pub fn composites(&self) -> TreeResult<Vec<Node>> {
        self.ensure_composites()?;
        Ok(self.0.composites.composites.borrow().values().cloned().collect())
    }

    fn add_composite(&self, key: String, composite: Node) {
        composite.set_parent(Some(self));
        self.0.composites.composites.borrow_mut().insert(key, composite);
    }
}
