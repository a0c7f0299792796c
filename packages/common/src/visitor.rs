use trellis_parser::ast::*;

/// Visitor pattern for traversing document declarations immutably
///
/// This trait provides default implementations that walk the entire tree.
/// Override specific visit_* methods to perform custom actions on nodes.
pub trait Visitor: Sized {
    fn visit_document(&mut self, doc: &Document) {
        walk_document(self, doc);
    }

    fn visit_node(&mut self, node: &NodeDecl) {
        walk_node(self, node);
    }

    fn visit_property(&mut self, _node: &NodeDecl, _property: &PropertyDecl) {
        // Leaf, nothing to walk
    }
}

pub fn walk_document<V: Visitor>(visitor: &mut V, doc: &Document) {
    for node in &doc.nodes {
        visitor.visit_node(node);
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &NodeDecl) {
    for property in &node.properties {
        visitor.visit_property(node, property);
    }
    for child in &node.children {
        visitor.visit_node(child);
    }
}
