use crate::error::TreeResult;
use crate::node::Node;

impl Node {
    /// Deep structural copy
    ///
    /// Children, already created composites, the prototype of a replicating
    /// host, properties and bindings are all copied. Every non-null id gets
    /// `id_suffix` appended. Clones are not copied; the copy starts with an
    /// empty clone table. The returned root is detached.
    pub fn copy(&self, id_suffix: &str) -> TreeResult<Node> {
        let copy = Node::new(self.spec());
        if let Some(id) = self.id() {
            *copy.0.id.borrow_mut() = Some(format!("{}{}", id, id_suffix));
        }

        copy.set_visible(self.is_visible());
        *copy.0.classes.borrow_mut() = self.0.classes.borrow().clone();
        *copy.0.properties.borrow_mut() = self.0.properties.borrow().clone();
        *copy.0.bindings.borrow_mut() = self.0.bindings.borrow().clone();

        if let (Some(source), Some(target)) = (&self.0.replicator_set, &copy.0.replicator_set) {
            *target.borrow_mut() = source.borrow().clone();
        }

        for child in self.children() {
            copy.append(child.copy(id_suffix)?)?;
        }

        if self.0.composites.is_created() {
            let mut composites = Vec::new();
            for (key, composite) in self.0.composites.snapshot() {
                let composite = composite.copy(id_suffix)?;
                composite.set_parent(Some(&copy));
                composites.push((key, composite));
            }
            copy.0.composites.install(composites);
        }

        if let Some(prototype) = self.prototype() {
            copy.set_prototype(prototype.copy(id_suffix)?)?;
        }

        Ok(copy)
    }
}
