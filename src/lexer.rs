use crate::diagnostic::Diagnostics;
use crate::token::{Position, Span, Token, TokenKind};

/// Tokenize a configuration source string into a sequence of tokens.
///
/// Never fails: a character that cannot start a token becomes an
/// [`TokenKind::Unknown`] token, a diagnostic is reported, and scanning
/// resumes right after it. The returned stream always ends with a single
/// [`TokenKind::EndOfFile`] token positioned at the end of the input.
pub fn tokenize(input: &str, diagnostics: &mut Diagnostics) -> Vec<Token> {
    let tokens = Lexer::new(input).tokenize(diagnostics);
    tracing::debug!(tokens = tokens.len(), "lexed configuration");
    tokens
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        let start = if input.starts_with('\u{FEFF}') { 3 } else { 0 };
        Self {
            input,
            pos: start,
            line: 1,
            col: 1,
        }
    }

    fn tokenize(mut self, diagnostics: &mut Diagnostics) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();
            let Some(ch) = self.peek() else {
                break;
            };

            let start = self.position();
            let token = match ch {
                b'{' => self.single(TokenKind::LeftBrace, start),
                b'}' => self.single(TokenKind::RightBrace, start),
                b';' => self.single(TokenKind::Semicolon, start),
                _ if is_word_byte(ch) => self.read_word(start),
                _ => {
                    let token = self.read_unknown(start);
                    diagnostics.error(token.span, unexpected_message(&token.text));
                    token
                }
            };
            tokens.push(token);
        }

        let end = self.position();
        tokens.push(Token {
            kind: TokenKind::EndOfFile,
            text: String::new(),
            span: Span::new(end, end),
        });
        tokens
    }

    const fn position(&self) -> Position {
        Position::new(self.line, self.col, self.pos)
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.input[self.pos..].chars().next() {
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
            self.pos += ch.len_utf8();
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                b' ' | b'\t'..=b'\r' => self.advance(),
                b'#' => {
                    // comment runs through the newline
                    while let Some(c) = self.peek() {
                        self.advance();
                        if c == b'\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn make_token(&self, kind: TokenKind, start: Position) -> Token {
        Token {
            kind,
            text: self.input[start.offset..self.pos].to_string(),
            span: Span::new(start, self.position()),
        }
    }

    fn single(&mut self, kind: TokenKind, start: Position) -> Token {
        self.advance();
        self.make_token(kind, start)
    }

    fn read_word(&mut self, start: Position) -> Token {
        while self.peek().is_some_and(is_word_byte) {
            self.advance();
        }
        let word = &self.input[start.offset..self.pos];
        let kind = TokenKind::keyword(word).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start)
    }

    fn read_unknown(&mut self, start: Position) -> Token {
        self.advance();
        self.make_token(TokenKind::Unknown, start)
    }
}

const fn is_word_byte(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, b'/' | b'_' | b'.' | b'-' | b':')
}

fn unexpected_message(text: &str) -> String {
    match text.chars().next() {
        Some(ch) if !ch.is_control() => format!("unexpected character '{ch}'"),
        Some(ch) => format!("unexpected character {ch:?}"),
        None => "unexpected character".to_string(),
    }
}
