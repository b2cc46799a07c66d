//! Sequential one-token-lookahead reader used by the parser.

use crate::parser::{ParseError, ParseErrorKind};
use crate::token::{Span, Token, TokenKind};

/// Reader over a token stream ending in [`TokenKind::EndOfFile`].
///
/// Reading past the end keeps returning the end-of-file token, so the
/// parser never has to bounds-check.
pub struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    eof: Token,
}

impl<'a> TokenCursor<'a> {
    #[must_use]
    pub fn new(tokens: &'a [Token]) -> Self {
        let eof_span = tokens.last().map_or_else(Span::default, |t| {
            if t.kind == TokenKind::EndOfFile {
                t.span
            } else {
                Span::new(t.span.end, t.span.end)
            }
        });
        Self {
            tokens,
            pos: 0,
            eof: Token {
                kind: TokenKind::EndOfFile,
                text: String::new(),
                span: eof_span,
            },
        }
    }

    /// Current token, or end-of-file once the stream is exhausted.
    #[must_use]
    pub fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    /// The token consumed last, if any.
    #[must_use]
    pub fn previous(&self) -> Option<&Token> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    /// Consume the current token and return it. Does not move past
    /// end-of-file.
    pub fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::EndOfFile
    }

    #[must_use]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Consume the current token iff it has the given kind.
    pub fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) && !self.is_at_end() {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume a token of `kind` or fail with `message`.
    pub fn expect(&mut self, kind: TokenKind, message: &'static str) -> Result<Token, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(self.error(ParseErrorKind::Expected {
            message,
            found: self.peek().describe(),
        }))
    }

    /// Consume a directive keyword.
    pub fn expect_directive_key(&mut self) -> Result<Token, ParseError> {
        if self.peek().kind.is_directive() {
            return Ok(self.advance());
        }
        Err(self.error(ParseErrorKind::ExpectedDirective {
            found: self.peek().describe(),
        }))
    }

    /// Consume a token that may stand as a directive value.
    pub fn expect_value(&mut self) -> Result<Token, ParseError> {
        if self.peek().kind.is_value() {
            return Ok(self.advance());
        }
        Err(self.error(ParseErrorKind::ExpectedValue {
            found: self.peek().describe(),
        }))
    }

    /// Build an error anchored at the current token.
    #[must_use]
    pub fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            kind,
            span: self.peek().span,
        }
    }

    /// Skip to the next statement or block boundary after a malformed
    /// directive. Always consumes at least one token unless already at
    /// end-of-file.
    pub fn synchronize_statement(&mut self) {
        let from = self.peek().span.start;
        self.advance();
        while !self.is_at_end() {
            if self
                .previous()
                .is_some_and(|t| t.kind == TokenKind::Semicolon)
            {
                break;
            }
            if matches!(
                self.peek().kind,
                TokenKind::Server | TokenKind::Location | TokenKind::RightBrace
            ) {
                break;
            }
            self.advance();
        }
        tracing::trace!(from = %from, to = %self.peek().span.start, "resynchronized to statement");
    }

    /// Discard everything up to the next `server` keyword.
    pub fn synchronize_to_next_server(&mut self) {
        let from = self.peek().span.start;
        self.advance();
        while !self.is_at_end() && !self.check(TokenKind::Server) {
            self.advance();
        }
        tracing::trace!(from = %from, to = %self.peek().span.start, "resynchronized to server");
    }
}
