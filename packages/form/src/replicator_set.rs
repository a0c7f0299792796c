use crate::error::{FormError, FormResult};
use serde::{Deserialize, Serialize};

/// Name of the hidden field a replicating scope persists its ids under
pub fn replicator_field_name(scope_id: &str) -> String {
    format!("{}_replicators", scope_id)
}

/// Replicator ids are opaque but restricted to `[A-Za-z0-9-]+`.
///
/// `_` is the delimiter of generated clone-id suffixes, so it is not allowed.
pub fn is_valid_replicator_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// Ordered, duplicate-free list of live replicator ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ReplicatorSet {
    ids: Vec<String>,
}

impl ReplicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// `"0"`, `"1"`, ... `count - 1`
    pub fn seeded(count: usize) -> Self {
        Self {
            ids: (0..count).map(|i| i.to_string()).collect(),
        }
    }

    pub fn from_ids<I, S>(ids: I) -> FormResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for id in ids {
            set.push(id)?;
        }
        Ok(set)
    }

    pub fn push(&mut self, id: impl Into<String>) -> FormResult<()> {
        let id = id.into();
        if !is_valid_replicator_id(&id) {
            return Err(FormError::InvalidReplicatorId { id });
        }
        if self.contains(&id) {
            return Err(FormError::DuplicateReplicatorId { id });
        }
        self.ids.push(id);
        Ok(())
    }

    /// Remove an id, keeping the relative order of the rest
    pub fn remove(&mut self, id: &str) -> bool {
        match self.ids.iter().position(|i| i == id) {
            Some(index) => {
                self.ids.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    /// One past the largest numeric id, or `"0"` for a set without numeric ids.
    /// Once the numeric range is used up at the top, the lowest free number.
    pub fn next_id(&self) -> String {
        let next = self
            .ids
            .iter()
            .filter_map(|id| id.parse::<u64>().ok()?.checked_add(1))
            .max()
            .unwrap_or(0)
            .to_string();
        if !self.contains(&next) {
            return next;
        }
        (0u64..)
            .map(|n| n.to_string())
            .find(|id| !self.contains(id))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }
}

impl TryFrom<Vec<String>> for ReplicatorSet {
    type Error = FormError;

    fn try_from(ids: Vec<String>) -> FormResult<Self> {
        Self::from_ids(ids)
    }
}

impl From<ReplicatorSet> for Vec<String> {
    fn from(set: ReplicatorSet) -> Self {
        set.ids
    }
}
