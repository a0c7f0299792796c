//! Capability contracts
//!
//! Capabilities are declared on [`ComponentSpec`](crate::ComponentSpec)s and
//! checked once, when a typed view is requested from a [`Node`]. Holding a view
//! is the proof: code that receives a [`StatefulNode`] never has to ask again.

use crate::component::Capabilities;
use crate::error::{TreeError, TreeResult};
use crate::node::Node;
use crate::value::{PropertyValue, StateValue};
use std::ops::Deref;

/// Exposes an add-child operation
pub trait AcceptsChildren {
    fn add_child(&self, child: Node) -> TreeResult<()>;
}

/// Exposes get/set of an opaque state value
pub trait Stateful {
    fn state(&self) -> StateValue;
    fn set_state(&self, state: &StateValue) -> TreeResult<()>;
}

/// Carries an id and takes part in duplicate-id checks
pub trait AddressableWidget {
    fn widget_id(&self) -> Option<String>;
}

macro_rules! node_view {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(Node);

        impl Deref for $name {
            type Target = Node;

            fn deref(&self) -> &Node {
                &self.0
            }
        }

        impl $name {
            pub fn node(&self) -> &Node {
                &self.0
            }

            pub fn into_node(self) -> Node {
                self.0
            }
        }
    };
}

node_view!(
    /// A node that accepts children: a container or a replicating host
    ParentNode
);
node_view!(
    /// A node with a state property
    StatefulNode
);
node_view!(
    /// An addressable widget
    WidgetNode
);

impl Node {
    pub fn as_parent(&self) -> Option<ParentNode> {
        (self.accepts_children() || self.has(Capabilities::REPLICATOR)).then(|| ParentNode(self.clone()))
    }

    pub fn as_stateful(&self) -> Option<StatefulNode> {
        (self.has(Capabilities::STATEFUL) && self.spec().state_property().is_some())
            .then(|| StatefulNode(self.clone()))
    }

    pub fn as_widget(&self) -> Option<WidgetNode> {
        self.is_widget().then(|| WidgetNode(self.clone()))
    }
}

impl AcceptsChildren for ParentNode {
    /// Replicating hosts take their single child as prototype; containers append.
    fn add_child(&self, child: Node) -> TreeResult<()> {
        if self.has(Capabilities::REPLICATOR) {
            self.set_prototype(child)
        } else {
            self.append(child)
        }
    }
}

impl StatefulNode {
    fn state_property(&self) -> &'static str {
        // checked in `as_stateful`
        self.spec().state_property().unwrap_or("value")
    }
}

impl Stateful for StatefulNode {
    fn state(&self) -> StateValue {
        self.property(self.state_property())
            .map(|value| value.to_json())
            .unwrap_or(StateValue::Null)
    }

    fn set_state(&self, state: &StateValue) -> TreeResult<()> {
        let name = self.state_property();
        if state.is_null() {
            self.clear_property(name)?;
            return Ok(());
        }

        let spec = self.property_spec(name)?;
        let value = PropertyValue::from_json(state)
            .and_then(|value| value.coerce(spec.kind))
            .ok_or_else(|| TreeError::PropertyTypeMismatch {
                type_name: self.type_name().to_string(),
                property: name.to_string(),
                expected: spec.kind,
                found: state.to_string(),
            })?;
        self.set_property(name, value)
    }
}

impl AddressableWidget for WidgetNode {
    fn widget_id(&self) -> Option<String> {
        self.id()
    }
}
