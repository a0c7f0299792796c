//! # Trellis Loader
//!
//! Loads declarative documents into [`trellis_tree`] node trees.
//!
//! ```
//! use trellis_loader::Loader;
//! use trellis_tree::{widgets, Node};
//!
//! let root = Node::new(&widgets::CONTAINER);
//! let report = Loader::standard()
//!     .load_str(
//!         r#"widget Form#signup { widget Entry#email { maxlength: integer = 80; } }"#,
//!         &root,
//!     )
//!     .unwrap();
//!
//! let email = report.widget("email").unwrap();
//! assert_eq!(email.integer_property("maxlength"), Some(80));
//! ```

pub mod diagnostic;
pub mod error;
pub mod expression;
pub mod loader;
pub mod property;
pub mod registry;
pub mod translator;

#[cfg(test)]
mod tests_loader;

pub use diagnostic::{Diagnostic, DiagnosticLevel};
pub use error::{ExprError, ExprResult, LoadError, LoadResult};
pub use expression::{evaluate, ConstantScope, TypeScope};
pub use loader::{LoadReport, Loader, LoaderOptions, Ui};
pub use registry::Registry;
pub use translator::{CatalogTranslator, IdentityTranslator, Translator};
