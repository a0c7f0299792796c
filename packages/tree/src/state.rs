use crate::capability::Stateful;
use crate::component::Capabilities;
use crate::error::TreeResult;
use crate::node::Node;
use crate::value::StateValue;
use indexmap::IndexMap;
use tracing::{debug, trace};

/// Descendant id to opaque state, in tree order
pub type StateMap = IndexMap<String, StateValue>;

impl Node {
    /// State of every stateful descendant that has an id.
    ///
    /// Id-less descendants cannot be addressed and are left out.
    pub fn capture_state(&self) -> StateMap {
        let mut state = StateMap::new();
        for node in &self.get_descendants(Some(&Capabilities::STATEFUL.into())) {
            let (Some(id), Some(stateful)) = (node.id(), node.as_stateful()) else {
                continue;
            };
            state.entry(id).or_insert_with(|| stateful.state());
        }
        debug!(node = %self.describe(), count = state.len(), "Captured state");
        state
    }

    /// Restore state captured by [`Node::capture_state`]. Unknown ids are ignored.
    pub fn restore_state(&self, state: &StateMap) -> TreeResult<()> {
        let descendants = self.get_descendants(Some(&Capabilities::STATEFUL.into()));
        for (id, value) in state {
            match descendants.get(id).and_then(Node::as_stateful) {
                Some(stateful) => stateful.set_state(value)?,
                None => trace!(id = %id, "No stateful descendant for captured state"),
            }
        }
        Ok(())
    }
}
