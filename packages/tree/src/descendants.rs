use crate::component::Capabilities;
use crate::node::Node;
use indexmap::IndexMap;

/// Selects nodes by type name (including inherited type names) or by capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeFilter {
    Type(String),
    Capability(Capabilities),
}

impl TypeFilter {
    pub fn of_type(name: impl Into<String>) -> Self {
        TypeFilter::Type(name.into())
    }

    pub fn matches(&self, node: &Node) -> bool {
        match self {
            TypeFilter::Type(name) => node.is_a(name),
            TypeFilter::Capability(capability) => node.has(*capability),
        }
    }
}

impl From<Capabilities> for TypeFilter {
    fn from(capability: Capabilities) -> Self {
        TypeFilter::Capability(capability)
    }
}

/// Result of a descendant walk: one pre-order sequence, with an id index over
/// the id-bearing entries
#[derive(Debug, Clone, Default)]
pub struct Descendants {
    nodes: Vec<Node>,
    by_id: IndexMap<String, usize>,
}

impl Descendants {
    fn push(&mut self, node: Node) {
        if let Some(id) = node.id() {
            // first occurrence wins the keyed slot
            self.by_id.entry(id).or_insert(self.nodes.len());
        }
        self.nodes.push(node);
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.by_id.get(id).map(|&index| &self.nodes[index])
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.by_id.keys().map(String::as_str)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn into_vec(self) -> Vec<Node> {
        self.nodes
    }
}

impl IntoIterator for Descendants {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a> IntoIterator for &'a Descendants {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl Node {
    /// Depth-first pre-order over children, not composites or prototypes
    pub fn get_descendants(&self, filter: Option<&TypeFilter>) -> Descendants {
        let mut found = Descendants::default();
        self.collect_descendants(filter, &mut found);
        found
    }

    fn collect_descendants(&self, filter: Option<&TypeFilter>, found: &mut Descendants) {
        for child in self.children() {
            if filter.map_or(true, |f| f.matches(&child)) {
                found.push(child.clone());
            }
            child.collect_descendants(filter, found);
        }
    }

    pub fn get_first_descendant(&self, filter: &TypeFilter) -> Option<Node> {
        self.children().into_iter().find_map(|child| {
            if filter.matches(&child) {
                Some(child)
            } else {
                child.get_first_descendant(filter)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::{CHECKBOX, DATE_ENTRY, ENTRY, FRAME, INTEGER_ENTRY};

    fn sample() -> Node {
        let root = Node::with_id(&FRAME, "root");
        let b = Node::new(&FRAME);
        b.append(Node::with_id(&ENTRY, "b1")).unwrap();
        b.append(Node::new(&CHECKBOX)).unwrap();
        root.append(Node::with_id(&INTEGER_ENTRY, "a")).unwrap();
        root.append(b).unwrap();
        root.append(Node::with_id(&DATE_ENTRY, "c")).unwrap();
        root
    }

    #[test]
    fn test_preorder_with_keyed_and_positional_entries() {
        let root = sample();
        let all = root.get_descendants(None);
        let described: Vec<_> = all.iter().map(Node::describe).collect();
        assert_eq!(
            described,
            vec!["IntegerEntry#a", "Frame", "Entry#b1", "Checkbox", "DateEntry#c"]
        );
        assert_eq!(all.ids().collect::<Vec<_>>(), vec!["a", "b1", "c"]);
        assert_eq!(all.get("c").unwrap().type_name(), "DateEntry");

        let again: Vec<_> = root.get_descendants(None).iter().map(Node::describe).collect();
        assert_eq!(described, again);
    }

    #[test]
    fn test_type_filter_includes_subtypes() {
        let root = sample();
        let entries = root.get_descendants(Some(&TypeFilter::of_type("Entry")));
        let ids: Vec<_> = entries.iter().filter_map(|n| n.id()).collect();
        assert_eq!(ids, vec!["a", "b1"]);

        let stateful = root.get_descendants(Some(&Capabilities::STATEFUL.into()));
        assert_eq!(stateful.len(), 4);
    }

    #[test]
    fn test_composites_are_skipped() {
        let root = sample();
        let date = root.get_descendants(None).get("c").cloned().unwrap();
        date.composites().unwrap();
        assert!(root
            .get_first_descendant(&TypeFilter::of_type("Flydown"))
            .is_none());
    }

    #[test]
    fn test_first_descendant() {
        let root = sample();
        let first = root
            .get_first_descendant(&TypeFilter::of_type("Checkbox"))
            .unwrap();
        assert!(first.id().is_none());
        assert!(root
            .get_first_descendant(&TypeFilter::of_type("Form"))
            .is_none());
    }
}
