use std::fmt;

use crate::ast::{Config, Directive, LocationConfig, ServerConfig};
use crate::cursor::TokenCursor;
use crate::diagnostic::Diagnostics;
use crate::token::{Span, Token, TokenKind};

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A specific token was required.
    Expected {
        message: &'static str,
        found: String,
    },
    /// A directive keyword was required.
    ExpectedDirective { found: String },
    /// A directive value or `;` was required.
    ExpectedValue { found: String },
    /// `server` or `location` where a directive should start.
    UnexpectedBlock { keyword: String },
    /// `server` inside a server block.
    NestedServer,
    /// `server` inside a location block.
    ServerInLocation,
    /// `location` inside a location block.
    NestedLocation,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected { message, found } => write!(f, "{message}, found {found}"),
            Self::ExpectedDirective { found } => {
                write!(f, "expected directive name, found {found}")
            }
            Self::ExpectedValue { found } => {
                write!(f, "expected directive value or ';', found {found}")
            }
            Self::UnexpectedBlock { keyword } => {
                write!(f, "unexpected '{keyword}' block inside a directive list")
            }
            Self::NestedServer => {
                write!(f, "unexpected start of server block inside a server block")
            }
            Self::ServerInLocation => {
                write!(f, "unexpected start of server block inside a location block")
            }
            Self::NestedLocation => write!(f, "nested locations are not supported"),
        }
    }
}

/// Recoverable parse failure. Caught at the nearest block boundary,
/// reported once, and followed by resynchronization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

/// Parse a token stream into a `Config` AST.
///
/// Syntax errors are reported to `diagnostics`; the returned tree holds
/// every server block that parsed cleanly enough to keep.
pub fn parse(tokens: &[Token], diagnostics: &mut Diagnostics) -> Config {
    Parser::new(tokens, diagnostics).parse_config()
}

type ParseResult<T> = Result<T, ParseError>;

struct Parser<'a, 'd> {
    cursor: TokenCursor<'a>,
    diagnostics: &'d mut Diagnostics,
}

impl<'a, 'd> Parser<'a, 'd> {
    fn new(tokens: &'a [Token], diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            cursor: TokenCursor::new(tokens),
            diagnostics,
        }
    }

    fn report(&mut self, error: &ParseError) {
        self.diagnostics.error(error.span, error.kind.to_string());
    }

    fn parse_config(mut self) -> Config {
        let mut servers: Vec<ServerConfig> = Vec::new();

        while !self.cursor.is_at_end() {
            match self.parse_server() {
                Ok(server) => servers.push(server),
                Err(error) => {
                    self.report(&error);
                    self.cursor.synchronize_to_next_server();
                }
            }
        }

        let span = match (servers.first(), servers.last()) {
            (Some(first), Some(last)) => first.span.to(last.span),
            _ => Span::default(),
        };
        Config { servers, span }
    }

    fn parse_server(&mut self) -> ParseResult<ServerConfig> {
        let start = self
            .cursor
            .expect(TokenKind::Server, "expected 'server' keyword")?;
        self.cursor
            .expect(TokenKind::LeftBrace, "expected '{' after 'server'")?;

        let mut directives = Vec::new();
        let mut locations = Vec::new();

        while !self.cursor.is_at_end() && !self.cursor.check(TokenKind::RightBrace) {
            let result = if self.cursor.check(TokenKind::Location) {
                self.parse_location().map(|l| locations.push(l))
            } else {
                self.parse_directive().map(|d| directives.push(d))
            };

            if let Err(error) = result {
                if self.cursor.check(TokenKind::Server) {
                    // a bad location header can stop right before `server`
                    if !matches!(error.kind, ParseErrorKind::UnexpectedBlock { .. }) {
                        self.report(&error);
                    }
                    // nesting is never recoverable inside the block
                    return Err(self.cursor.error(ParseErrorKind::NestedServer));
                }
                self.report(&error);
                self.cursor.synchronize_statement();
            }
        }

        let end = self
            .cursor
            .expect(TokenKind::RightBrace, "expected '}' after server block")?;

        let span = start.span.to(end.span);
        tracing::debug!(
            line = span.start.line,
            directives = directives.len(),
            locations = locations.len(),
            "parsed server block"
        );
        Ok(ServerConfig {
            directives,
            locations,
            span,
        })
    }

    fn parse_location(&mut self) -> ParseResult<LocationConfig> {
        let start = self
            .cursor
            .expect(TokenKind::Location, "expected 'location' keyword")?;
        let path = self
            .cursor
            .expect(TokenKind::Identifier, "expected location path")?;
        self.cursor
            .expect(TokenKind::LeftBrace, "expected '{' after location path")?;

        let mut directives = Vec::new();

        while !self.cursor.is_at_end() && !self.cursor.check(TokenKind::RightBrace) {
            match self.parse_directive() {
                Ok(directive) => directives.push(directive),
                Err(error) => {
                    let error = if self.cursor.check(TokenKind::Server) {
                        self.cursor.error(ParseErrorKind::ServerInLocation)
                    } else if self.cursor.check(TokenKind::Location) {
                        self.cursor.error(ParseErrorKind::NestedLocation)
                    } else {
                        error
                    };
                    self.report(&error);
                    self.cursor.synchronize_statement();
                }
            }
        }

        let end = self
            .cursor
            .expect(TokenKind::RightBrace, "expected '}' after location block")?;

        Ok(LocationConfig {
            path: path.text,
            directives,
            span: start.span.to(end.span),
        })
    }

    fn parse_directive(&mut self) -> ParseResult<Directive> {
        if self.cursor.check(TokenKind::Location) || self.cursor.check(TokenKind::Server) {
            let keyword = self.cursor.peek().text.clone();
            return Err(self
                .cursor
                .error(ParseErrorKind::UnexpectedBlock { keyword }));
        }

        let key = self.cursor.expect_directive_key()?;
        let mut values = Vec::new();
        while !self.cursor.is_at_end() && !self.cursor.check(TokenKind::Semicolon) {
            values.push(self.cursor.expect_value()?.text);
        }
        let end = self
            .cursor
            .expect(TokenKind::Semicolon, "expected ';' after directive")?;

        Ok(Directive {
            key: key.text,
            values,
            span: key.span.to(end.span),
        })
    }
}
