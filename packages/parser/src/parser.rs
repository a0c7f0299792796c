use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::span_id::SpanIds;
use crate::lexer::{lex, Token};

/// Parser for Trellis documents
pub struct Parser<'src> {
    tokens: Vec<(Token<'src>, std::ops::Range<usize>)>,
    pos: usize,
    span_ids: SpanIds,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, span_ids: SpanIds) -> ParseResult<Self> {
        let mut tokens = Vec::new();
        for result in lex(source) {
            match result {
                Ok(spanned) => tokens.push((spanned.token, spanned.span.start..spanned.span.end)),
                Err(err) => {
                    return Err(ParseError::LexError {
                        span: err.span,
                        message: err.message,
                    })
                }
            }
        }

        Ok(Self {
            tokens,
            pos: 0,
            span_ids,
        })
    }

    /// Parse a complete document
    pub fn parse_document(&mut self) -> ParseResult<Document> {
        let mut doc = Document::new();

        while !self.is_at_end() {
            match self.peek() {
                Some((Token::Widget, _)) | Some((Token::Object, _)) => {
                    doc.nodes.push(self.parse_node()?);
                }
                _ => {
                    return Err(ParseError::invalid_syntax(
                        self.peek_span(),
                        format!(
                            "Expected 'widget' or 'object', found {}",
                            Self::format_token(self.peek())
                        ),
                    ));
                }
            }
        }

        Ok(doc)
    }

    /// Parse `widget Type#id { ... }` or `object Type#id { ... }`
    fn parse_node(&mut self) -> ParseResult<NodeDecl> {
        let start = self.peek_span().start;
        let kind = match self.advance() {
            Some((Token::Widget, _)) => NodeKind::Widget,
            Some((Token::Object, _)) => NodeKind::Object,
            _ => {
                return Err(ParseError::invalid_syntax(
                    self.current_span(),
                    "Expected 'widget' or 'object'",
                ))
            }
        };

        let type_name = self.expect_ident()?;

        let id = match self.peek() {
            Some((Token::IdRef(id), _)) => {
                let id = id.to_string();
                self.advance();
                Some(id)
            }
            _ => None,
        };

        self.expect(Token::LBrace)?;

        let mut properties = Vec::new();
        let mut children = Vec::new();

        while !self.check(Token::RBrace) {
            match self.peek() {
                None => return Err(ParseError::unexpected_eof("'}'")),
                Some((Token::Widget, _)) | Some((Token::Object, _)) => {
                    children.push(self.parse_node()?);
                }
                Some((Token::Ident(_), _)) => {
                    properties.push(self.parse_property()?);
                }
                _ => {
                    return Err(ParseError::unexpected_token(
                        self.peek_span(),
                        "property or node declaration",
                        Self::format_token(self.peek()),
                    ));
                }
            }
        }

        self.expect(Token::RBrace)?;
        let end = self.current_span().end;

        Ok(NodeDecl {
            kind,
            type_name,
            id,
            properties,
            children,
            span: Span::new(start, end, self.span_ids.node()),
        })
    }

    /// Parse `name[key]: type translatable = value;`
    fn parse_property(&mut self) -> ParseResult<PropertyDecl> {
        let start = self.peek_span().start;
        let name = self.expect_ident()?;

        let key = if self.match_token(Token::LBracket) {
            let key = self.expect_key()?;
            self.expect(Token::RBracket)?;
            Some(key)
        } else {
            None
        };

        let mut ty = PropertyType::Implicit;
        let mut translatable = false;

        if self.match_token(Token::Colon) {
            let type_span = self.peek_span();
            let keyword = self.expect_ident()?;
            ty = PropertyType::from_keyword(&keyword).ok_or_else(|| {
                ParseError::invalid_syntax(
                    type_span,
                    format!(
                        "Unknown property type '{}' (expected string, boolean, integer, float, constant, data or date)",
                        keyword
                    ),
                )
            })?;
            translatable = self.match_token(Token::Translatable);
        }

        self.expect(Token::Eq)?;
        let value = self.expect_literal()?;
        self.expect(Token::Semi)?;

        let end = self.current_span().end;

        Ok(PropertyDecl {
            name,
            key,
            ty,
            translatable,
            value,
            span: Span::new(start, end, self.span_ids.property()),
        })
    }

    // Helper methods

    fn peek(&self) -> Option<&(Token<'src>, std::ops::Range<usize>)> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&(Token<'src>, std::ops::Range<usize>)> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, token: Token) -> bool {
        if let Some((t, _)) = self.peek() {
            std::mem::discriminant(t) == std::mem::discriminant(&token)
        } else {
            false
        }
    }

    fn match_token(&mut self, token: Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> ParseResult<()> {
        if self.check(token.clone()) {
            self.advance();
            Ok(())
        } else if self.is_at_end() {
            Err(ParseError::unexpected_eof(Self::format_expected_token(
                &token,
            )))
        } else {
            Err(ParseError::unexpected_token(
                self.peek_span(),
                Self::format_expected_token(&token),
                Self::format_token(self.peek()),
            ))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some((Token::Ident(s), _)) => {
                let val = s.to_string();
                self.advance();
                Ok(val)
            }
            None => Err(ParseError::unexpected_eof("identifier")),
            _ => Err(ParseError::unexpected_token(
                self.peek_span(),
                "identifier",
                Self::format_token(self.peek()),
            )),
        }
    }

    /// Index key inside `name[...]`
    fn expect_key(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some((Token::Ident(s), _)) | Some((Token::Number(s), _)) => {
                let val = s.to_string();
                self.advance();
                Ok(val)
            }
            Some((Token::String(s), _)) | Some((Token::SingleQuoteString(s), _)) => {
                let val = unescape(s);
                self.advance();
                Ok(val)
            }
            None => Err(ParseError::unexpected_eof("property key")),
            _ => Err(ParseError::unexpected_token(
                self.peek_span(),
                "property key",
                Self::format_token(self.peek()),
            )),
        }
    }

    fn expect_literal(&mut self) -> ParseResult<String> {
        let value = match self.peek() {
            Some((Token::String(s), _)) | Some((Token::SingleQuoteString(s), _)) => unescape(s),
            Some((Token::Number(s), _)) | Some((Token::Ident(s), _)) => s.to_string(),
            Some((Token::True, _)) => "true".to_string(),
            Some((Token::False, _)) => "false".to_string(),
            None => return Err(ParseError::unexpected_eof("property value")),
            _ => {
                return Err(ParseError::unexpected_token(
                    self.peek_span(),
                    "property value",
                    Self::format_token(self.peek()),
                ))
            }
        };
        self.advance();
        Ok(value)
    }

    /// Get the span of the current token (the one we just consumed)
    fn current_span(&self) -> std::ops::Range<usize> {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|(_, span)| span.clone())
            .unwrap_or(0..0)
    }

    /// Get the span of the next token (the one we're about to consume)
    fn peek_span(&self) -> std::ops::Range<usize> {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| span.clone())
            .unwrap_or_else(|| {
                // If we're at EOF, use the end of the last token
                let end = self.tokens.last().map(|(_, span)| span.end).unwrap_or(0);
                end..end
            })
    }

    /// Format a token for display in error messages
    fn format_token(token: Option<&(Token, std::ops::Range<usize>)>) -> String {
        match token {
            None => "end of file".to_string(),
            Some((Token::Ident(s), _)) => format!("identifier '{}'", s),
            Some((Token::IdRef(s), _)) => format!("id '#{}'", s),
            Some((Token::String(s), _)) => format!("string \"{}\"", s),
            Some((Token::SingleQuoteString(s), _)) => format!("string '{}'", s),
            Some((Token::Number(n), _)) => format!("number {}", n),
            Some((Token::LBrace, _)) => "'{'".to_string(),
            Some((Token::RBrace, _)) => "'}'".to_string(),
            Some((Token::LBracket, _)) => "'['".to_string(),
            Some((Token::RBracket, _)) => "']'".to_string(),
            Some((Token::Colon, _)) => "':'".to_string(),
            Some((Token::Eq, _)) => "'='".to_string(),
            Some((Token::Semi, _)) => "';'".to_string(),
            Some((Token::Widget, _)) => "keyword 'widget'".to_string(),
            Some((Token::Object, _)) => "keyword 'object'".to_string(),
            Some((Token::Translatable, _)) => "keyword 'translatable'".to_string(),
            Some((token, _)) => format!("{:?}", token),
        }
    }

    fn format_expected_token(token: &Token) -> String {
        match token {
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::Eq => "'='".to_string(),
            Token::Semi => "';'".to_string(),
            token => format!("{:?}", token),
        }
    }
}

/// Resolve backslash escapes inside a quoted literal
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

pub fn parse(source: &str) -> ParseResult<Document> {
    Parser::new(source, SpanIds::anonymous())?.parse_document()
}

pub fn parse_with_path(source: &str, path: &str) -> ParseResult<Document> {
    Parser::new(source, SpanIds::for_path(path))?.parse_document()
}
