use std::path::PathBuf;
use thiserror::Error;
use trellis_parser::ast::{NodeKind, PropertyType};
use trellis_parser::ParseError;
use trellis_tree::TreeError;

pub type ExprResult<T> = Result<T, ExprError>;
pub type LoadResult<T> = Result<T, LoadError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    #[error("Mismatched parentheses in '{expression}'")]
    MismatchedParentheses { expression: String },

    #[error("Syntax error in '{expression}': {message}")]
    SyntaxError { expression: String, message: String },

    #[error("Undefined constant '{name}' in '{expression}'")]
    UndefinedConstant { name: String, expression: String },

    #[error("Division by zero in '{expression}'")]
    DivisionByZero { expression: String },

    #[error("Integer overflow in '{expression}'")]
    Overflow { expression: String },
}

impl ExprError {
    pub(crate) fn syntax(expression: &str, message: impl Into<String>) -> Self {
        ExprError::SyntaxError {
            expression: expression.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed document {path}: {source}")]
    MalformedDocument {
        path: String,
        #[source]
        source: ParseError,
    },

    #[error("Duplicate widget id '{id}' on {element}")]
    DuplicateId { id: String, element: String },

    #[error("Unknown type '{type_name}' on {element}")]
    UnknownType { type_name: String, element: String },

    #[error("{element} is declared as {kind} but {type_name} {}", if *kind == NodeKind::Widget { "is not a widget" } else { "is a widget" })]
    WrongNodeKind {
        element: String,
        kind: NodeKind,
        type_name: String,
    },

    #[error("{element} has no property '{property}'{}", reason.as_ref().map(|r| format!(" ({})", r)).unwrap_or_default())]
    InvalidPropertyName {
        element: String,
        property: String,
        reason: Option<String>,
    },

    #[error("Invalid {ty} value for '{property}' on {element}: {reason}")]
    InvalidPropertyType {
        element: String,
        property: String,
        ty: PropertyType,
        reason: String,
    },

    #[error("{parent} does not accept children (while adding {child})")]
    DoesNotImplementParent { parent: String, child: String },

    #[error("Constant expression for '{property}' on {element}: {source}")]
    Expression {
        element: String,
        property: String,
        #[source]
        source: ExprError,
    },

    #[error(transparent)]
    Tree(#[from] TreeError),
}
