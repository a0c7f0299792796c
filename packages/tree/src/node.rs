//! The base composable unit
//!
//! A [`Node`] is a cheap, reference-counted handle. Ownership flows strictly
//! downwards: a container owns its children, a host owns its composites and its
//! prototype. The only upward link is the non-owning parent reference, so
//! detaching a node is just clearing that reference.
//!
//! Trees are confined to one thread (`Node` is neither `Send` nor `Sync`); the
//! create-once guards and clone tables rely on that.

use crate::binding::PropertyBinding;
use crate::component::{Capabilities, ComponentSpec, PropertySpec};
use crate::composite::CompositeHost;
use crate::container::ChildList;
use crate::descendants::TypeFilter;
use crate::error::{TreeError, TreeResult};
use crate::replicator::Replicator;
use crate::value::PropertyValue;
use indexmap::{IndexMap, IndexSet};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use trellis_form::ReplicatorSet;

pub(crate) struct NodeInner {
    pub(crate) spec: &'static ComponentSpec,
    pub(crate) id: RefCell<Option<String>>,
    pub(crate) parent: RefCell<Weak<NodeInner>>,
    pub(crate) visible: Cell<bool>,
    pub(crate) classes: RefCell<IndexSet<String>>,
    pub(crate) properties: RefCell<IndexMap<String, PropertyValue>>,
    pub(crate) bindings: RefCell<Vec<PropertyBinding>>,
    pub(crate) children: Option<RefCell<ChildList>>,
    pub(crate) composites: CompositeHost,
    pub(crate) replicator: Option<RefCell<Replicator>>,
    pub(crate) replicator_set: Option<RefCell<ReplicatorSet>>,
}

/// Handle to a node in a tree
#[derive(Clone)]
pub struct Node(pub(crate) Rc<NodeInner>);

/// Non-owning reference to a node
#[derive(Clone, Default)]
pub struct WeakNode(Weak<NodeInner>);

impl WeakNode {
    pub fn upgrade(&self) -> Option<Node> {
        self.0.upgrade().map(Node)
    }
}

impl Node {
    pub fn new(spec: &'static ComponentSpec) -> Node {
        let capabilities = spec.capabilities();
        Node(Rc::new(NodeInner {
            spec,
            id: RefCell::new(None),
            parent: RefCell::new(Weak::new()),
            visible: Cell::new(true),
            classes: RefCell::new(IndexSet::new()),
            properties: RefCell::new(IndexMap::new()),
            bindings: RefCell::new(Vec::new()),
            children: capabilities
                .contains(Capabilities::PARENT)
                .then(|| RefCell::new(ChildList::default())),
            composites: CompositeHost::new(),
            replicator: capabilities
                .contains(Capabilities::REPLICATOR)
                .then(|| RefCell::new(Replicator::new())),
            replicator_set: capabilities
                .contains(Capabilities::REPLICATOR_SET)
                .then(|| RefCell::new(ReplicatorSet::new())),
        }))
    }

    pub fn with_id(spec: &'static ComponentSpec, id: impl Into<String>) -> Node {
        let node = Node::new(spec);
        *node.0.id.borrow_mut() = Some(id.into());
        node
    }

    pub fn spec(&self) -> &'static ComponentSpec {
        self.0.spec
    }

    pub fn type_name(&self) -> &'static str {
        self.0.spec.name
    }

    pub fn is_a(&self, type_name: &str) -> bool {
        self.0.spec.is_a(type_name)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.0.spec.capabilities()
    }

    pub fn has(&self, capability: Capabilities) -> bool {
        self.capabilities().contains(capability)
    }

    pub fn is_widget(&self) -> bool {
        self.has(Capabilities::WIDGET)
    }

    pub fn id(&self) -> Option<String> {
        self.0.id.borrow().clone()
    }

    /// Assign the id. Ids are fixed once the node is attached anywhere.
    pub fn set_id(&self, id: impl Into<String>) -> TreeResult<()> {
        if self.parent().is_some() {
            return Err(TreeError::IdLocked {
                node: self.describe(),
            });
        }
        *self.0.id.borrow_mut() = Some(id.into());
        Ok(())
    }

    /// `Type#id`, or just `Type` for id-less nodes
    pub fn describe(&self) -> String {
        match self.id() {
            Some(id) => format!("{}#{}", self.type_name(), id),
            None => self.type_name().to_string(),
        }
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakNode {
        WeakNode(Rc::downgrade(&self.0))
    }

    // Parent links

    pub fn parent(&self) -> Option<Node> {
        self.0.parent.borrow().upgrade().map(Node)
    }

    pub(crate) fn set_parent(&self, parent: Option<&Node>) {
        *self.0.parent.borrow_mut() = match parent {
            Some(parent) => Rc::downgrade(&parent.0),
            None => Weak::new(),
        };
    }

    /// Parent, grandparent, ... up to the root
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: self.parent(),
        }
    }

    pub fn first_ancestor(&self, filter: &TypeFilter) -> Option<Node> {
        self.ancestors().find(|node| filter.matches(node))
    }

    pub fn root(&self) -> Node {
        self.ancestors().last().unwrap_or_else(|| self.clone())
    }

    // Visibility and classes

    pub fn is_visible(&self) -> bool {
        self.0.visible.get()
    }

    pub fn set_visible(&self, visible: bool) {
        self.0.visible.set(visible);
    }

    /// Visible itself and through every ancestor
    pub fn is_displayed(&self) -> bool {
        self.is_visible() && self.ancestors().all(|node| node.is_visible())
    }

    pub fn classes(&self) -> Vec<String> {
        self.0.classes.borrow().iter().cloned().collect()
    }

    pub fn add_class(&self, class: impl Into<String>) {
        self.0.classes.borrow_mut().insert(class.into());
    }

    pub fn remove_class(&self, class: &str) -> bool {
        self.0.classes.borrow_mut().shift_remove(class)
    }

    // Properties

    pub fn property_spec(&self, name: &str) -> TreeResult<&'static PropertySpec> {
        self.0
            .spec
            .property(name)
            .ok_or_else(|| TreeError::UnknownProperty {
                type_name: self.type_name().to_string(),
                property: name.to_string(),
            })
    }

    pub fn property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "visible" => Some(PropertyValue::Boolean(self.is_visible())),
            "classes" => {
                let classes = self.0.classes.borrow();
                (!classes.is_empty()).then(|| {
                    PropertyValue::String(classes.iter().cloned().collect::<Vec<_>>().join(" "))
                })
            }
            _ => self.0.properties.borrow().get(name).cloned(),
        }
    }

    /// Typed convenience accessors
    pub fn string_property(&self, name: &str) -> Option<String> {
        self.property(name).and_then(|v| v.as_str().map(str::to_string))
    }

    pub fn integer_property(&self, name: &str) -> Option<i64> {
        self.property(name).and_then(|v| v.as_integer())
    }

    pub fn bool_property(&self, name: &str) -> Option<bool> {
        self.property(name).and_then(|v| v.as_bool())
    }

    pub fn set_property(&self, name: &str, value: PropertyValue) -> TreeResult<()> {
        let spec = self.property_spec(name)?;
        if spec.indexed {
            return match value {
                PropertyValue::Map(entries) => {
                    for (key, value) in entries {
                        self.set_indexed_property(name, &key, value)?;
                    }
                    Ok(())
                }
                _ => Err(TreeError::KeyRequired {
                    type_name: self.type_name().to_string(),
                    property: name.to_string(),
                }),
            };
        }

        let value = self.check_kind(spec, value)?;
        match (name, value) {
            ("visible", PropertyValue::Boolean(visible)) => self.set_visible(visible),
            ("classes", PropertyValue::String(classes)) => {
                for class in classes.split_whitespace() {
                    self.add_class(class);
                }
            }
            (_, value) => {
                self.0.properties.borrow_mut().insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    /// Assign one entry of an indexed property: `name[key] = value`
    pub fn set_indexed_property(&self, name: &str, key: &str, value: PropertyValue) -> TreeResult<()> {
        let spec = self.property_spec(name)?;
        if !spec.indexed {
            return Err(TreeError::NotIndexed {
                type_name: self.type_name().to_string(),
                property: name.to_string(),
            });
        }

        let value = self.check_kind(spec, value)?;
        let mut properties = self.0.properties.borrow_mut();
        let entry = properties
            .entry(name.to_string())
            .or_insert_with(|| PropertyValue::Map(IndexMap::new()));
        if let PropertyValue::Map(map) = entry {
            map.insert(key.to_string(), value);
        }
        Ok(())
    }

    pub fn clear_property(&self, name: &str) -> TreeResult<Option<PropertyValue>> {
        self.property_spec(name)?;
        Ok(self.0.properties.borrow_mut().shift_remove(name))
    }

    /// Declared properties that currently hold a value, in assignment order
    pub fn properties(&self) -> Vec<(String, PropertyValue)> {
        self.0
            .properties
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn check_kind(&self, spec: &PropertySpec, value: PropertyValue) -> TreeResult<PropertyValue> {
        if !value.matches(spec.kind) {
            return Err(TreeError::PropertyTypeMismatch {
                type_name: self.type_name().to_string(),
                property: spec.name.to_string(),
                expected: spec.kind,
                found: value.kind_name().to_string(),
            });
        }
        if let Some((min, max)) = spec.out_of_range(&value) {
            return Err(TreeError::PropertyOutOfRange {
                type_name: self.type_name().to_string(),
                property: spec.name.to_string(),
                value: value.as_integer().unwrap_or_default(),
                min,
                max,
            });
        }
        Ok(value)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.describe())
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Node {}

/// Iterator over the ancestors of a node
pub struct Ancestors {
    next: Option<Node>,
}

impl Iterator for Ancestors {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::PropertyKind;
    use crate::widgets::{CHECKBOX, ENTRY, FLYDOWN, FORM, FRAME};

    #[test]
    fn test_new_node_defaults() {
        let entry = Node::new(&ENTRY);
        assert_eq!(entry.type_name(), "Entry");
        assert_eq!(entry.id(), None);
        assert!(entry.is_visible());
        assert!(entry.is_widget());
        assert!(entry.parent().is_none());
        assert_eq!(entry.describe(), "Entry");
    }

    #[test]
    fn test_id_locked_after_attach() {
        let form = Node::with_id(&FORM, "form");
        let entry = Node::new(&ENTRY);
        entry.set_id("name").unwrap();
        form.append(entry.clone()).unwrap();

        assert!(matches!(entry.set_id("other"), Err(TreeError::IdLocked { .. })));
        assert_eq!(entry.id().as_deref(), Some("name"));
    }

    #[test]
    fn test_typed_properties() {
        let entry = Node::new(&ENTRY);
        entry
            .set_property("maxlength", PropertyValue::Integer(20))
            .unwrap();
        assert_eq!(entry.integer_property("maxlength"), Some(20));

        let err = entry
            .set_property("maxlength", PropertyValue::String("20".into()))
            .unwrap_err();
        assert!(matches!(
            err,
            TreeError::PropertyTypeMismatch {
                expected: PropertyKind::Integer,
                ..
            }
        ));

        assert!(matches!(
            entry.set_property("colour", PropertyValue::Boolean(true)),
            Err(TreeError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn test_core_properties() {
        let checkbox = Node::new(&CHECKBOX);
        checkbox
            .set_property("visible", PropertyValue::Boolean(false))
            .unwrap();
        checkbox
            .set_property("classes", PropertyValue::String("wide  primary".into()))
            .unwrap();
        checkbox
            .set_property("classes", PropertyValue::String("wide".into()))
            .unwrap();

        assert!(!checkbox.is_visible());
        assert_eq!(checkbox.classes(), vec!["wide", "primary"]);
        assert_eq!(
            checkbox.property("classes"),
            Some(PropertyValue::String("wide primary".into()))
        );
    }

    #[test]
    fn test_indexed_properties() {
        let flydown = Node::new(&FLYDOWN);
        flydown
            .set_indexed_property("options", "ca", PropertyValue::String("Canada".into()))
            .unwrap();
        flydown
            .set_indexed_property("options", "us", PropertyValue::String("United States".into()))
            .unwrap();

        let options = flydown.property("options").unwrap();
        let map = options.as_map().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["ca", "us"]);

        assert!(matches!(
            flydown.set_property("options", PropertyValue::String("x".into())),
            Err(TreeError::KeyRequired { .. })
        ));
        assert!(matches!(
            flydown.set_indexed_property("value", "k", PropertyValue::String("x".into())),
            Err(TreeError::NotIndexed { .. })
        ));
    }

    #[test]
    fn test_ancestors_and_display() {
        let form = Node::with_id(&FORM, "form");
        let frame = Node::with_id(&FRAME, "frame");
        let entry = Node::with_id(&ENTRY, "entry");
        form.append(frame.clone()).unwrap();
        frame.append(entry.clone()).unwrap();

        let ids: Vec<_> = entry.ancestors().filter_map(|n| n.id()).collect();
        assert_eq!(ids, vec!["frame", "form"]);
        assert_eq!(entry.root(), form);
        assert_eq!(
            entry.first_ancestor(&TypeFilter::of_type("Form")),
            Some(form.clone())
        );

        assert!(entry.is_displayed());
        frame.set_visible(false);
        assert!(entry.is_visible());
        assert!(!entry.is_displayed());
    }
}
