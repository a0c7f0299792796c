//! Shared plumbing for Trellis crates: document reading through a
//! swappable file system and a visitor over parsed documents.

pub mod document;
pub mod error;
pub mod filesystem;
pub mod visitor;

pub use document::*;
pub use error::*;
pub use filesystem::*;
pub use visitor::*;
