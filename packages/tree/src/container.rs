use crate::error::{TreeError, TreeResult};
use crate::node::Node;
use std::collections::HashMap;
use tracing::trace;

/// Ordered children plus an id index over them
#[derive(Default)]
pub(crate) struct ChildList {
    children: Vec<Node>,
    by_id: HashMap<String, Node>,
}

impl ChildList {
    fn position(&self, id: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|child| child.id().as_deref() == Some(id))
    }

    fn insert(&mut self, index: usize, child: Node) {
        if let Some(id) = child.id() {
            self.by_id.insert(id, child.clone());
        }
        self.children.insert(index, child);
    }

    fn remove(&mut self, id: &str) -> Option<Node> {
        let index = self.position(id)?;
        self.by_id.remove(id);
        Some(self.children.remove(index))
    }

    fn remove_node(&mut self, node: &Node) -> bool {
        let Some(index) = self.children.iter().position(|child| child.ptr_eq(node)) else {
            return false;
        };
        let child = self.children.remove(index);
        if let Some(id) = child.id() {
            self.by_id.remove(&id);
        }
        true
    }
}

#[derive(Clone, Copy)]
enum Placement<'a> {
    End,
    Before(&'a str),
    After(&'a str),
}

impl Node {
    /// True if this node owns a children list
    pub fn accepts_children(&self) -> bool {
        self.0.children.is_some()
    }

    pub fn children(&self) -> Vec<Node> {
        match &self.0.children {
            Some(list) => list.borrow().children.clone(),
            None => Vec::new(),
        }
    }

    pub fn child(&self, id: &str) -> Option<Node> {
        self.0
            .children
            .as_ref()
            .and_then(|list| list.borrow().by_id.get(id).cloned())
    }

    pub fn child_count(&self) -> usize {
        self.0
            .children
            .as_ref()
            .map_or(0, |list| list.borrow().children.len())
    }

    pub fn append(&self, child: Node) -> TreeResult<()> {
        self.attach(child, Placement::End)
    }

    /// Insert `child` directly before the child with id `reference`
    pub fn insert_before(&self, child: Node, reference: &str) -> TreeResult<()> {
        self.attach(child, Placement::Before(reference))
    }

    /// Insert `child` directly after the child with id `reference`
    pub fn insert_after(&self, child: Node, reference: &str) -> TreeResult<()> {
        self.attach(child, Placement::After(reference))
    }

    /// Detach and return the child with the given id
    pub fn remove(&self, id: &str) -> TreeResult<Node> {
        let list = self.child_list()?;
        let removed = list.borrow_mut().remove(id);
        match removed {
            Some(child) => {
                child.set_parent(None);
                Ok(child)
            }
            None => Err(TreeError::ChildNotFound {
                id: id.to_string(),
                parent: self.describe(),
            }),
        }
    }

    /// Detach this node from its parent, whether it sits in the parent's child
    /// list or is the parent's prototype. Returns false for a root.
    pub fn detach(&self) -> bool {
        let Some(parent) = self.parent() else {
            return false;
        };
        let removed = match &parent.0.children {
            Some(list) => list.borrow_mut().remove_node(self),
            None => false,
        };
        let removed = removed || parent.take_prototype(self);
        if removed {
            self.set_parent(None);
            trace!(parent = %parent.describe(), child = %self.describe(), "Detached child");
        }
        removed
    }

    fn child_list(&self) -> TreeResult<&std::cell::RefCell<ChildList>> {
        self.0.children.as_ref().ok_or_else(|| TreeError::NotAParent {
            type_name: self.type_name().to_string(),
        })
    }

    fn attach(&self, child: Node, placement: Placement<'_>) -> TreeResult<()> {
        let list = self.child_list()?;

        if child.parent().is_some() {
            return Err(TreeError::AlreadyParented {
                child: child.describe(),
            });
        }

        if self.ptr_eq(&child) || self.ancestors().any(|ancestor| ancestor.ptr_eq(&child)) {
            return Err(TreeError::InvalidAttachment {
                child: child.describe(),
                parent: self.describe(),
                reason: "a node cannot contain itself".to_string(),
            });
        }

        {
            let mut list = list.borrow_mut();
            if let Some(id) = child.id() {
                if list.by_id.contains_key(&id) {
                    return Err(TreeError::DuplicateId {
                        id,
                        parent: self.describe(),
                    });
                }
            }

            let index = match placement {
                Placement::End => list.children.len(),
                Placement::Before(reference) | Placement::After(reference) => {
                    let position = list.position(reference).ok_or_else(|| TreeError::ChildNotFound {
                        id: reference.to_string(),
                        parent: self.describe(),
                    })?;
                    if matches!(placement, Placement::After(_)) {
                        position + 1
                    } else {
                        position
                    }
                }
            };

            list.insert(index, child.clone());
        }

        child.set_parent(Some(self));
        trace!(parent = %self.describe(), child = %child.describe(), "Attached child");

        self.notify_descendant_added(&child);
        Ok(())
    }

    /// Walk up from this node, letting every ancestor react to the new descendant
    pub(crate) fn notify_descendant_added(&self, descendant: &Node) {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if let Some(hook) = node.spec().descendant_added_hook() {
                hook(&node, descendant);
            }
            current = node.parent();
        }
    }
}
