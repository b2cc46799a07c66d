//! Lexer, parser, and validator for nginx-style server configuration.
//!
//! Raw configuration text goes through three gated phases: the lexer
//! turns it into tokens, the recursive-descent parser builds a
//! [`Config`] tree, and the [`Validator`] checks directive rules and
//! cross-server invariants. Each phase reports every problem it can find
//! into a shared [`Diagnostics`] reporter; the next phase only runs when
//! the previous one left the reporter empty.
//!
//! # Quick start
//!
//! ```
//! use serverconf_rs::{check_str, RealFs};
//!
//! let input = "server {\n    listen 8080;\n    root /;\n}\n";
//! let config = check_str(input, &RealFs).unwrap();
//! assert_eq!(config.servers.len(), 1);
//! ```
//!
//! ## Running the phases by hand
//!
//! ```
//! use serverconf_rs::{parse, tokenize, Diagnostics};
//!
//! let mut diagnostics = Diagnostics::new();
//! let tokens = tokenize("server { bad!!! ; root /tmp; }", &mut diagnostics);
//! let config = parse(&tokens, &mut diagnostics);
//! assert!(diagnostics.has_errors());
//! assert_eq!(config.servers[0].directives[0].key, "root");
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod cursor;
pub mod diagnostic;
pub mod fs;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod validator;

pub use ast::{Config, Directive, LocationConfig, Node, ServerConfig};
pub use cursor::TokenCursor;
pub use diagnostic::{Diagnostic, Diagnostics, Severity};
pub use fs::{FileSystem, RealFs};
pub use lexer::tokenize;
pub use parser::{ParseError, ParseErrorKind, parse};
pub use token::{Position, Span, Token, TokenKind};
pub use validator::{Context, DirectiveKind, Validator, Violation};

/// Failure of one pipeline phase, carrying everything it reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The lexer met characters it could not tokenize.
    #[error("{0}")]
    Lex(Diagnostics),
    /// The token stream did not match the grammar.
    #[error("{0}")]
    Parse(Diagnostics),
    /// The configuration parsed but broke a semantic rule.
    #[error("{0}")]
    Validate(Diagnostics),
}

impl Error {
    /// The diagnostics of the phase that failed.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        match self {
            Self::Lex(d) | Self::Parse(d) | Self::Validate(d) => d,
        }
    }

    /// Name of the phase that failed.
    #[must_use]
    pub const fn phase(&self) -> &'static str {
        match self {
            Self::Lex(_) => "lexing",
            Self::Parse(_) => "parsing",
            Self::Validate(_) => "validation",
        }
    }
}

/// Lex, parse, and validate a configuration source string, stopping
/// after the first phase that reports anything.
pub fn check_str(input: &str, fs: &dyn FileSystem) -> Result<Config, Error> {
    let mut diagnostics = Diagnostics::new();

    let tokens = tokenize(input, &mut diagnostics);
    if diagnostics.has_errors() {
        return Err(Error::Lex(diagnostics));
    }

    let config = parse(&tokens, &mut diagnostics);
    if diagnostics.has_errors() {
        return Err(Error::Parse(diagnostics));
    }

    Validator::new(fs).validate(&config, &mut diagnostics);
    if diagnostics.has_errors() {
        return Err(Error::Validate(diagnostics));
    }

    Ok(config)
}
