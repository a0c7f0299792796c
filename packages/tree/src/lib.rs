//! # Trellis Tree
//!
//! The node tree a document is loaded into.
//!
//! - [`Node`]: reference-counted handle with typed properties, an ordered
//!   child list for container types and a weak parent link
//! - [`ComponentSpec`]: static type descriptor with inherited capabilities,
//!   properties, constants and hooks
//! - Composites: helper nodes a host creates once, on first access
//! - Replication: per-replicator-id deep copies of a prototype, with a reverse
//!   lookup from original ids to cloned nodes
//! - [`widgets`]: the standard component library
//!
//! ## Example
//!
//! ```
//! use trellis_tree::{widgets, Node};
//!
//! let form = Node::with_id(&widgets::FORM, "signup");
//! let email = Node::with_id(&widgets::ENTRY, "email");
//! form.append(email).unwrap();
//!
//! assert_eq!(form.get_descendants(None).len(), 1);
//! ```

pub mod binding;
pub mod capability;
pub mod component;
pub mod composite;
pub mod container;
pub mod copy;
pub mod descendants;
pub mod error;
pub mod node;
pub mod replicator;
pub mod state;
pub mod value;
pub mod widgets;

pub use binding::{PropertyBinding, Record};
pub use capability::{AcceptsChildren, AddressableWidget, ParentNode, Stateful, StatefulNode, WidgetNode};
pub use component::{Capabilities, ComponentSpec, PropertySpec};
pub use descendants::{Descendants, TypeFilter};
pub use error::{TreeError, TreeResult};
pub use node::{Ancestors, Node, WeakNode};
pub use replicator::clone_suffix;
pub use state::StateMap;
pub use value::{parse_date, PropertyKind, PropertyValue, StateValue};
pub use widgets::{InputRow, InputRowClones, WidgetCellRenderer};
