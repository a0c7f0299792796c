//! Lexer for Trellis documents using logos
//!
//! Logos provides extremely fast lexing via compile-time DFA generation.

use logos::Logos;

/// Token types for the Trellis document syntax
#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n]+")] // Skip whitespace
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/")]
pub enum Token<'src> {
    // Keywords
    #[token("widget")]
    Widget,
    #[token("object")]
    Object,
    #[token("translatable")]
    Translatable,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Identifiers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice())]
    Ident(&'src str),

    /// `#some_id` - the leading `#` is stripped
    #[regex(r"#[a-zA-Z0-9_][a-zA-Z0-9_\-]*", |lex| &lex.slice()[1..])]
    IdRef(&'src str),

    // Literals
    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        &s[1..s.len()-1]  // Strip quotes
    })]
    String(&'src str),

    #[regex(r"'([^'\\]|\\.)*'", |lex| {
        let s = lex.slice();
        &s[1..s.len()-1]  // Strip quotes
    })]
    SingleQuoteString(&'src str),

    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice())]
    Number(&'src str),

    // Punctuation
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(":")]
    Colon,
    #[token("=")]
    Eq,
    #[token(";")]
    Semi,
}

/// Span information for a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

/// A token with its span
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken<'src> {
    pub token: Token<'src>,
    pub span: TokenSpan,
}

/// Lex source code into tokens with spans
pub fn lex(source: &str) -> impl Iterator<Item = Result<SpannedToken<'_>, LexError>> + '_ {
    Token::lexer(source).spanned().map(|(result, span)| match result {
        Ok(token) => Ok(SpannedToken {
            token,
            span: TokenSpan {
                start: span.start,
                end: span.end,
            },
        }),
        Err(_) => Err(LexError {
            span: TokenSpan {
                start: span.start,
                end: span.end,
            },
            message: "Unexpected character".to_string(),
        }),
    })
}

#[derive(Debug, Clone)]
pub struct LexError {
    pub span: TokenSpan,
    pub message: String,
}
