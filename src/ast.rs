use crate::token::Span;

/// Complete configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub servers: Vec<ServerConfig>,
    pub span: Span,
}

/// `server { ... }` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub directives: Vec<Directive>,
    pub locations: Vec<LocationConfig>,
    pub span: Span,
}

/// `location <path> { ... }` block nested in a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationConfig {
    pub path: String,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// A `key value* ;` statement. Value order is significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub key: String,
    pub values: Vec<String>,
    pub span: Span,
}

/// Borrowed view over any AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node<'a> {
    Config(&'a Config),
    Server(&'a ServerConfig),
    Location(&'a LocationConfig),
    Directive(&'a Directive),
}

impl Node<'_> {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Config(c) => c.span,
            Self::Server(s) => s.span,
            Self::Location(l) => l.span,
            Self::Directive(d) => d.span,
        }
    }
}

impl Config {
    /// Every node of the tree in source order, parents before children.
    #[must_use]
    pub fn nodes(&self) -> Vec<Node<'_>> {
        let mut nodes = vec![Node::Config(self)];
        for server in &self.servers {
            nodes.push(Node::Server(server));
            nodes.extend(server.directives.iter().map(Node::Directive));
            for location in &server.locations {
                nodes.push(Node::Location(location));
                nodes.extend(location.directives.iter().map(Node::Directive));
            }
        }
        nodes
    }

    #[must_use]
    pub fn location_count(&self) -> usize {
        self.servers.iter().map(|s| s.locations.len()).sum()
    }
}

impl ServerConfig {
    /// First directive named `key`, if any.
    #[must_use]
    pub fn directive(&self, key: &str) -> Option<&Directive> {
        self.directives.iter().find(|d| d.key == key)
    }

    #[must_use]
    pub fn location(&self, path: &str) -> Option<&LocationConfig> {
        self.locations.iter().find(|l| l.path == path)
    }
}

impl LocationConfig {
    #[must_use]
    pub fn directive(&self, key: &str) -> Option<&Directive> {
        self.directives.iter().find(|d| d.key == key)
    }
}

impl Directive {
    /// Value at `index`, if present.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }
}
