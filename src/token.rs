use std::fmt;

/// A point in the source text.
///
/// `line` and `column` are 1-based, `offset` is the 0-based byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.line, self.column)
    }
}

/// Source range covered by a token or AST node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// True when `start` does not come after `end`.
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        self.start.offset <= self.end.offset
    }

    /// True when `other` lies entirely within `self`.
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        self.start.offset <= other.start.offset && other.end.offset <= self.end.offset
    }

    /// Span running from the start of `self` to the end of `other`.
    #[must_use]
    pub const fn to(self, other: Self) -> Self {
        Self {
            start: self.start,
            end: other.end,
        }
    }
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Opening brace `{`.
    LeftBrace,
    /// Closing brace `}`.
    RightBrace,
    /// Statement terminator `;`.
    Semicolon,
    /// Synthetic token closing every stream.
    EndOfFile,
    /// A character that cannot start any token.
    Unknown,

    Server,
    Location,

    Listen,
    Root,
    Index,
    ServerName,
    ErrorPage,
    Methods,
    Autoindex,
    Return,
    UploadStore,
    CgiExtension,
    ClientMaxBodySize,
    AllowMethods,
    AutoIndex,
    CgiPass,
    CgiExtensions,
    UploadDir,

    /// Path, port, address, flag, or any other bare word.
    Identifier,
}

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("server", TokenKind::Server),
    ("location", TokenKind::Location),
    ("listen", TokenKind::Listen),
    ("root", TokenKind::Root),
    ("index", TokenKind::Index),
    ("server_name", TokenKind::ServerName),
    ("error_page", TokenKind::ErrorPage),
    ("methods", TokenKind::Methods),
    ("autoindex", TokenKind::Autoindex),
    ("return", TokenKind::Return),
    ("upload_store", TokenKind::UploadStore),
    ("cgi_extension", TokenKind::CgiExtension),
    ("client_max_body_size", TokenKind::ClientMaxBodySize),
    ("allow_methods", TokenKind::AllowMethods),
    ("auto_index", TokenKind::AutoIndex),
    ("cgi_pass", TokenKind::CgiPass),
    ("cgi_extensions", TokenKind::CgiExtensions),
    ("upload_dir", TokenKind::UploadDir),
];

impl TokenKind {
    /// Look up a scanned word in the keyword table.
    #[must_use]
    pub fn keyword(word: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(name, _)| *name == word)
            .map(|(_, kind)| *kind)
    }

    /// True for kinds that may start a directive.
    #[must_use]
    pub const fn is_directive(self) -> bool {
        matches!(
            self,
            Self::Listen
                | Self::Root
                | Self::Index
                | Self::ServerName
                | Self::ErrorPage
                | Self::Methods
                | Self::Autoindex
                | Self::Return
                | Self::UploadStore
                | Self::CgiExtension
                | Self::ClientMaxBodySize
                | Self::AllowMethods
                | Self::AutoIndex
                | Self::CgiPass
                | Self::CgiExtensions
                | Self::UploadDir
        )
    }

    /// True for kinds accepted as a directive value. Keyword-shaped
    /// words are valid values (`index server;` is legal).
    #[must_use]
    pub const fn is_value(self) -> bool {
        self.is_directive() || matches!(self, Self::Identifier | Self::Location | Self::Server)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LeftBrace => "'{'",
            Self::RightBrace => "'}'",
            Self::Semicolon => "';'",
            Self::EndOfFile => "end of file",
            Self::Unknown => "unknown character",
            Self::Server => "'server'",
            Self::Location => "'location'",
            Self::Identifier => "identifier",
            _ => "directive name",
        };
        f.write_str(name)
    }
}

/// A single token with its kind, text, and source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    /// Human readable description used in "found ..." messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::EndOfFile => "end of file".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}
