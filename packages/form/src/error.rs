use thiserror::Error;

pub type FormResult<T> = Result<T, FormError>;

#[derive(Error, Debug)]
pub enum FormError {
    #[error("Malformed signed envelope: {reason}")]
    MalformedEnvelope { reason: String },

    #[error("Signing key rejected")]
    InvalidKey,

    #[error("Signature mismatch: payload was modified or signed with another secret")]
    SignatureMismatch,

    #[error("Hidden field '{field}' was rejected: {source}")]
    HiddenField {
        field: String,
        #[source]
        source: Box<FormError>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid replicator id '{id}': expected ASCII letters, digits or '-'")]
    InvalidReplicatorId { id: String },

    #[error("Duplicate replicator id '{id}'")]
    DuplicateReplicatorId { id: String },
}

impl FormError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEnvelope {
            reason: reason.into(),
        }
    }
}
