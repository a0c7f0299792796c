//! Component type descriptors
//!
//! Every node is an instance of a [`ComponentSpec`]: a static descriptor naming
//! the type, its parent type, the capabilities it declares, its property table,
//! its named constants and the optional behaviour hooks. Specs form a single
//! inheritance chain through `parent`; capabilities, properties, constants and
//! hooks are all resolved along that chain, closest type first.

use crate::error::TreeResult;
use crate::node::Node;
use crate::value::{PropertyKind, PropertyValue};
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Capabilities a component type declares
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u16 {
        /// Addressable widget: carries an id and takes part in duplicate-id checks
        const WIDGET = 1 << 0;
        /// Owns an ordered list of children
        const PARENT = 1 << 1;
        /// Exposes an opaque state value through its state property
        const STATEFUL = 1 << 2;
        /// Holds a single prototype and replicates it per replicator id
        const REPLICATOR = 1 << 3;
        /// Owns a persisted replicator-id set
        const REPLICATOR_SET = 1 << 4;
        /// Accepts file uploads; forms switch to multipart encoding
        const FILE_UPLOAD = 1 << 5;
        /// Receives a generated id when declared without one
        const AUTO_ID = 1 << 6;
    }
}

/// Builds the composite nodes of a host. Runs at most once per host.
pub type CompositeFactory = fn(&Node) -> TreeResult<Vec<(String, Node)>>;

/// Called on a node (and each of its ancestors) after a descendant was attached
pub type DescendantAdded = fn(&Node, &Node);

/// Resolves the enclosing scope id used to namespace clones
pub type ScopeResolver = fn(&Node) -> Option<String>;

/// A declared property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertySpec {
    pub name: &'static str,
    pub kind: PropertyKind,
    /// Multi-valued: assigned as `name[key]`
    pub indexed: bool,
    /// Inclusive bounds for integer values
    pub range: Option<(i64, i64)>,
}

impl PropertySpec {
    pub const fn new(name: &'static str, kind: PropertyKind) -> Self {
        Self {
            name,
            kind,
            indexed: false,
            range: None,
        }
    }

    pub const fn indexed(name: &'static str, kind: PropertyKind) -> Self {
        Self {
            name,
            kind,
            indexed: true,
            range: None,
        }
    }

    pub const fn bounded(mut self, min: i64, max: i64) -> Self {
        self.range = Some((min, max));
        self
    }

    /// The bounds `value` falls outside of, if any
    pub fn out_of_range(&self, value: &PropertyValue) -> Option<(i64, i64)> {
        let (min, max) = self.range?;
        let value = value.as_integer()?;
        (value < min || value > max).then_some((min, max))
    }
}

pub struct ComponentSpec {
    pub name: &'static str,
    pub parent: Option<&'static ComponentSpec>,
    pub capabilities: Capabilities,
    pub properties: &'static [PropertySpec],
    pub constants: &'static [(&'static str, i64)],
    pub state_property: Option<&'static str>,
    pub create_composites: Option<CompositeFactory>,
    pub descendant_added: Option<DescendantAdded>,
    pub replication_scope: Option<ScopeResolver>,
}

impl ComponentSpec {
    /// A spec with no parent, capabilities, properties or hooks
    pub const fn base(name: &'static str) -> Self {
        Self {
            name,
            parent: None,
            capabilities: Capabilities::empty(),
            properties: &[],
            constants: &[],
            state_property: None,
            create_composites: None,
            descendant_added: None,
            replication_scope: None,
        }
    }

    /// This spec followed by its ancestors
    pub fn lineage(&'static self) -> impl Iterator<Item = &'static ComponentSpec> {
        std::iter::successors(Some(self), |spec| spec.parent)
    }

    /// True if this type is `name` or inherits from it
    pub fn is_a(&'static self, name: &str) -> bool {
        self.lineage().any(|spec| spec.name == name)
    }

    /// Declared plus inherited capabilities
    pub fn capabilities(&'static self) -> Capabilities {
        self.lineage()
            .fold(Capabilities::empty(), |caps, spec| caps | spec.capabilities)
    }

    pub fn has(&'static self, capability: Capabilities) -> bool {
        self.capabilities().contains(capability)
    }

    pub fn property(&'static self, name: &str) -> Option<&'static PropertySpec> {
        self.lineage()
            .flat_map(|spec| spec.properties.iter())
            .find(|p| p.name == name)
    }

    pub fn constant(&'static self, name: &str) -> Option<i64> {
        self.lineage()
            .flat_map(|spec| spec.constants.iter())
            .find(|(constant, _)| *constant == name)
            .map(|(_, value)| *value)
    }

    pub fn state_property(&'static self) -> Option<&'static str> {
        self.lineage().find_map(|spec| spec.state_property)
    }

    pub fn composite_factory(&'static self) -> Option<CompositeFactory> {
        self.lineage().find_map(|spec| spec.create_composites)
    }

    pub fn descendant_added_hook(&'static self) -> Option<DescendantAdded> {
        self.lineage().find_map(|spec| spec.descendant_added)
    }

    pub fn scope_resolver(&'static self) -> Option<ScopeResolver> {
        self.lineage().find_map(|spec| spec.replication_scope)
    }
}

impl fmt::Debug for ComponentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSpec")
            .field("name", &self.name)
            .field("parent", &self.parent.map(|p| p.name))
            .field("capabilities", &self.capabilities)
            .finish()
    }
}
