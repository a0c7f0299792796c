//! Prototype replication
//!
//! A replicating host holds one prototype and materializes a deep copy of it per
//! replicator id. Every id inside a clone is rewritten with the suffix
//! `_{scope}_{replicator id}`, where the scope is an id of the enclosing
//! structure (see [`Node::replication_scope`]). The pre-rewrite ids stay
//! reachable through a per-clone reverse lookup table.
//!
//! Clones are created on first access and live for the rest of the tree's
//! lifetime, or until [`Node::unset_replicator`] discards them.

use crate::error::{TreeError, TreeResult};
use crate::node::Node;
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Default)]
pub(crate) struct Replicator {
    prototype: Option<Node>,
    /// Replicator id to clone, in creation order
    clones: IndexMap<String, Node>,
    /// Replicator id to (original id to clone descendant)
    reverse_lookup: HashMap<String, HashMap<String, Node>>,
}

impl Replicator {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

/// Suffix appended to every id of the clone for `replicator_id` in `scope_id`
pub fn clone_suffix(scope_id: &str, replicator_id: &str) -> String {
    format!("_{}_{}", scope_id, replicator_id)
}

impl Node {
    fn replicator(&self) -> TreeResult<&std::cell::RefCell<Replicator>> {
        self.0
            .replicator
            .as_ref()
            .ok_or_else(|| TreeError::NotReplicating {
                host: self.describe(),
            })
    }

    /// Install the prototype. A host has at most one.
    pub fn set_prototype(&self, prototype: Node) -> TreeResult<()> {
        let replicator = self.replicator()?;
        if replicator.borrow().prototype.is_some() {
            return Err(TreeError::PrototypeAlreadySet {
                host: self.describe(),
            });
        }
        if prototype.parent().is_some() {
            return Err(TreeError::AlreadyParented {
                child: prototype.describe(),
            });
        }

        prototype.set_parent(Some(self));
        replicator.borrow_mut().prototype = Some(prototype);
        Ok(())
    }

    /// Clear the prototype slot if it holds `prototype`
    pub(crate) fn take_prototype(&self, prototype: &Node) -> bool {
        let Some(replicator) = self.0.replicator.as_ref() else {
            return false;
        };
        let mut replicator = replicator.borrow_mut();
        if replicator.prototype.as_ref().is_some_and(|p| p.ptr_eq(prototype)) {
            replicator.prototype = None;
            true
        } else {
            false
        }
    }

    pub fn prototype(&self) -> Option<Node> {
        self.0
            .replicator
            .as_ref()
            .and_then(|replicator| replicator.borrow().prototype.clone())
    }

    /// The enclosing id that namespaces this host's clones
    ///
    /// Types may declare a scope resolver; otherwise the host's own id is used.
    pub fn replication_scope(&self) -> TreeResult<String> {
        let scope = match self.spec().scope_resolver() {
            Some(resolve) => resolve(self),
            None => self.id(),
        };
        scope.ok_or_else(|| TreeError::MissingScope {
            host: self.describe(),
        })
    }

    /// Clone for `replicator_id` in this host's own scope
    pub fn replicate(&self, replicator_id: &str) -> TreeResult<Node> {
        let scope = self.replication_scope()?;
        self.replicate_in_scope(&scope, replicator_id)
    }

    /// Clone for `replicator_id`, created on first access
    pub fn replicate_in_scope(&self, scope_id: &str, replicator_id: &str) -> TreeResult<Node> {
        let replicator = self.replicator()?;
        let prototype = {
            let replicator = replicator.borrow();
            if let Some(existing) = replicator.clones.get(replicator_id) {
                return Ok(existing.clone());
            }
            replicator
                .prototype
                .clone()
                .ok_or_else(|| TreeError::MissingPrototype {
                    host: self.describe(),
                })?
        };

        if prototype.id().is_none() {
            return Err(TreeError::MissingPrototypeId {
                host: self.describe(),
            });
        }

        let suffix = clone_suffix(scope_id, replicator_id);
        let clone = prototype.copy(&suffix)?;
        let lookup = reverse_lookup(&clone, scope_id, replicator_id, &suffix)?;

        clone.set_parent(Some(self));
        debug!(
            host = %self.describe(),
            replicator_id = %replicator_id,
            clone = %clone.describe(),
            "Created clone"
        );

        let mut replicator = replicator.borrow_mut();
        replicator
            .reverse_lookup
            .insert(replicator_id.to_string(), lookup);
        replicator
            .clones
            .insert(replicator_id.to_string(), clone.clone());
        Ok(clone)
    }

    /// Clone descendant known by its pre-rewrite id, materializing the clone first
    pub fn replicated_widget(&self, replicator_id: &str, original_id: &str) -> TreeResult<Option<Node>> {
        let scope = self.replication_scope()?;
        self.replicated_widget_in_scope(&scope, replicator_id, original_id)
    }

    pub fn replicated_widget_in_scope(
        &self,
        scope_id: &str,
        replicator_id: &str,
        original_id: &str,
    ) -> TreeResult<Option<Node>> {
        self.replicate_in_scope(scope_id, replicator_id)?;
        let replicator = self.replicator()?.borrow();
        Ok(replicator
            .reverse_lookup
            .get(replicator_id)
            .and_then(|lookup| lookup.get(original_id))
            .cloned())
    }

    /// Discard the clone for `replicator_id`
    pub fn unset_replicator(&self, replicator_id: &str) -> TreeResult<Option<Node>> {
        let mut replicator = self.replicator()?.borrow_mut();
        replicator.reverse_lookup.remove(replicator_id);
        let removed = replicator.clones.shift_remove(replicator_id);
        if let Some(clone) = &removed {
            clone.set_parent(None);
        }
        Ok(removed)
    }

    /// Materialized replicator ids, in creation order
    pub fn replicator_ids(&self) -> Vec<String> {
        self.0
            .replicator
            .as_ref()
            .map(|replicator| replicator.borrow().clones.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn clones(&self) -> Vec<(String, Node)> {
        self.0
            .replicator
            .as_ref()
            .map(|replicator| {
                replicator
                    .borrow()
                    .clones
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn reverse_lookup(
    clone: &Node,
    scope_id: &str,
    replicator_id: &str,
    suffix: &str,
) -> TreeResult<HashMap<String, Node>> {
    let delimiter = format!("_{}_", scope_id);
    let mut lookup = HashMap::new();

    let nodes = std::iter::once(clone.clone()).chain(clone.get_descendants(None));
    for node in nodes {
        let Some(id) = node.id() else { continue };
        let Some(original) = id.strip_suffix(suffix) else {
            return Err(TreeError::StructuralMismatch {
                replicator_id: replicator_id.to_string(),
                node_id: id,
                suffix: suffix.to_string(),
            });
        };
        if original.contains(&delimiter) {
            warn!(
                id = %original,
                scope = %scope_id,
                "Id contains a clone suffix pattern; replicated ids may collide"
            );
        }
        lookup.insert(original.to_string(), node);
    }

    Ok(lookup)
}
