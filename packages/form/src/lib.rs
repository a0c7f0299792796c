//! # Trellis Form
//!
//! The persistence channel between one request and the next.
//!
//! On render, components write values they need back into [`HiddenFields`]. Every
//! value is serialized with `serde_json` and wrapped in a signed envelope
//! (`signature|payload`). On the following request the submitted copy arrives in
//! [`FormData`], and [`FormData::hidden_field`] re-verifies the signature before
//! handing the value back. A tampered value is an error, never a silent fallback.
//!
//! [`ReplicatorSet`] is the ordered list of replicator ids one replicating scope
//! persists through this channel.

pub mod envelope;
pub mod error;
pub mod fields;
pub mod replicator_set;

pub use envelope::{sign, sign_value, unsign, unsign_value};
pub use error::{FormError, FormResult};
pub use fields::{FormData, HiddenFields};
pub use replicator_set::{is_valid_replicator_id, replicator_field_name, ReplicatorSet};
