use crate::value::PropertyKind;
use thiserror::Error;
use trellis_form::FormError;

pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Error, Debug)]
pub enum TreeError {
    // Structural errors
    #[error("Duplicate id '{id}' in {parent}")]
    DuplicateId { id: String, parent: String },

    #[error("{child} already has a parent")]
    AlreadyParented { child: String },

    #[error("{type_name} does not accept children")]
    NotAParent { type_name: String },

    #[error("Cannot attach {child} to {parent}: {reason}")]
    InvalidAttachment {
        child: String,
        parent: String,
        reason: String,
    },

    #[error("Child '{id}' not found in {parent}")]
    ChildNotFound { id: String, parent: String },

    #[error("Cannot change id of attached node {node}")]
    IdLocked { node: String },

    // Property errors
    #[error("{type_name} has no property '{property}'")]
    UnknownProperty { type_name: String, property: String },

    #[error("Property '{property}' of {type_name} is not indexed")]
    NotIndexed { type_name: String, property: String },

    #[error("Property '{property}' of {type_name} is indexed and needs a key")]
    KeyRequired { type_name: String, property: String },

    #[error("Property '{property}' of {type_name} expects {expected}, got {found}")]
    PropertyTypeMismatch {
        type_name: String,
        property: String,
        expected: PropertyKind,
        found: String,
    },

    #[error("Property '{property}' of {type_name} must be between {min} and {max}, got {value}")]
    PropertyOutOfRange {
        type_name: String,
        property: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Property '{property}' of {node} is required but unset")]
    MissingProperty { node: String, property: String },

    #[error("Record has no field '{field}' bound to '{property}' of {node}")]
    MissingRecordField {
        node: String,
        property: String,
        field: String,
    },

    // Replication errors
    #[error("{host} does not replicate a prototype")]
    NotReplicating { host: String },

    #[error("{host} already has a prototype")]
    PrototypeAlreadySet { host: String },

    #[error("{host} has no prototype to replicate")]
    MissingPrototype { host: String },

    #[error("Prototype of {host} has no id; clones need an id-bearing prototype")]
    MissingPrototypeId { host: String },

    #[error("{host} has no enclosing scope id to namespace clones with")]
    MissingScope { host: String },

    #[error("Clone '{replicator_id}' is structurally inconsistent: '{node_id}' does not end in '{suffix}'")]
    StructuralMismatch {
        replicator_id: String,
        node_id: String,
        suffix: String,
    },

    #[error("Replicator id rejected: {0}")]
    Form(#[from] FormError),

    // Lookup errors (recoverable)
    #[error("Widget '{id}' not found")]
    WidgetNotFound { id: String },

    #[error("Composite '{key}' not found in {host}")]
    CompositeNotFound { key: String, host: String },

    #[error("Row '{replicator_id}' not found in {row}")]
    RowNotFound { replicator_id: String, row: String },
}

impl TreeError {
    /// Lookup failures are recoverable by the caller, everything else is a
    /// programming error or bad input.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            TreeError::WidgetNotFound { .. }
                | TreeError::CompositeNotFound { .. }
                | TreeError::RowNotFound { .. }
                | TreeError::ChildNotFound { .. }
        )
    }
}
