pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span_id;

pub use error::{ParseError, ParseResult};
#[cfg(feature = "pretty-errors")]
pub use error::format_error;
pub use lexer::{lex, Token, TokenSpan};
pub use parser::{parse, parse_with_path, Parser};
pub use span_id::{document_id, SpanIds};
