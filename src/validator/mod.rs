//! Semantic validation of a parsed configuration.
//!
//! Checks run per server block in a fixed order: required directives,
//! duplicate directives, duplicate locations, per-directive rules, and
//! finally the cross-server `(listen, server_name)` uniqueness check,
//! which only runs while the reporter is still empty.

pub mod directives;

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::ast::{Config, Directive, ServerConfig};
use crate::diagnostic::Diagnostics;
use crate::fs::FileSystem;
use crate::token::Span;

pub use directives::{Arity, Violation};

const REQUIRED_DIRECTIVES: [&str; 2] = ["listen", "root"];

/// Directives the validator knows how to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Listen,
    Root,
    ServerName,
    ClientMaxBodySize,
    Index,
    Autoindex,
    ErrorPage,
    Return,
    UploadStore,
    CgiExtension,
    Methods,
}

impl DirectiveKind {
    pub const ALL: [Self; 11] = [
        Self::Listen,
        Self::Root,
        Self::ServerName,
        Self::ClientMaxBodySize,
        Self::Index,
        Self::Autoindex,
        Self::ErrorPage,
        Self::Return,
        Self::UploadStore,
        Self::CgiExtension,
        Self::Methods,
    ];

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == key)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Listen => "listen",
            Self::Root => "root",
            Self::ServerName => "server_name",
            Self::ClientMaxBodySize => "client_max_body_size",
            Self::Index => "index",
            Self::Autoindex => "autoindex",
            Self::ErrorPage => "error_page",
            Self::Return => "return",
            Self::UploadStore => "upload_store",
            Self::CgiExtension => "cgi_extension",
            Self::Methods => "methods",
        }
    }

    #[must_use]
    pub const fn arity(self) -> Arity {
        match self {
            Self::Listen
            | Self::Root
            | Self::ClientMaxBodySize
            | Self::Autoindex
            | Self::UploadStore => Arity::Exactly(1),
            Self::ServerName | Self::Index | Self::Methods => Arity::AtLeast(1),
            Self::ErrorPage => Arity::AtLeast(2),
            Self::Return => Arity::Between(1, 2),
            Self::CgiExtension => Arity::Exactly(2),
        }
    }

    /// Directives that make no sense inside a location block.
    #[must_use]
    pub const fn server_only(self) -> bool {
        matches!(self, Self::Listen | Self::ServerName)
    }
}

/// Block a directive appears in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Server,
    Location,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server => f.write_str("server"),
            Self::Location => f.write_str("location"),
        }
    }
}

/// Validates a [`Config`], reporting every problem it finds.
///
/// Holds the `(listen, server_name)` table for the cross-server check.
/// The table is cleared at the start of every [`Validator::validate`]
/// call, so an instance may be reused but not shared between threads.
pub struct Validator<'fs> {
    fs: &'fs dyn FileSystem,
    endpoints: HashMap<(String, String), Span>,
}

impl<'fs> Validator<'fs> {
    #[must_use]
    pub fn new(fs: &'fs dyn FileSystem) -> Self {
        Self {
            fs,
            endpoints: HashMap::new(),
        }
    }

    pub fn validate(&mut self, config: &Config, diagnostics: &mut Diagnostics) {
        self.endpoints.clear();
        tracing::debug!(servers = config.servers.len(), "validating configuration");
        for server in &config.servers {
            self.validate_server(server, diagnostics);
        }
    }

    fn validate_server(&mut self, server: &ServerConfig, diagnostics: &mut Diagnostics) {
        check_required(server, diagnostics);
        check_duplicate_directives(server, diagnostics);
        check_duplicate_locations(server, diagnostics);

        for directive in &server.directives {
            self.check_directive(directive, Context::Server, diagnostics);
        }
        for location in &server.locations {
            for directive in &location.directives {
                self.check_directive(directive, Context::Location, diagnostics);
            }
        }

        if diagnostics.has_errors() {
            tracing::debug!(
                line = server.span.start.line,
                "skipping listen/server_name uniqueness check after earlier errors"
            );
            return;
        }
        self.check_unique_endpoint(server, diagnostics);
    }

    fn check_directive(
        &self,
        directive: &Directive,
        context: Context,
        diagnostics: &mut Diagnostics,
    ) {
        let Some(kind) = DirectiveKind::from_key(&directive.key) else {
            diagnostics.error(
                directive.span,
                format!("unknown directive '{}'", directive.key),
            );
            return;
        };

        if kind.server_only() && context == Context::Location {
            diagnostics.error(
                directive.span,
                format!(
                    "'{}' directive is only allowed in server context",
                    kind.name()
                ),
            );
            return;
        }

        if let Err(violation) = directives::check(kind, &directive.values, self.fs) {
            diagnostics.error(directive.span, violation.to_string());
        }
    }

    fn check_unique_endpoint(&mut self, server: &ServerConfig, diagnostics: &mut Diagnostics) {
        let Some(listen) = listen_value(server) else {
            return;
        };

        let (mut names, span) = match server.directive("server_name") {
            Some(directive) => (directive.values.clone(), directive.span),
            None => (vec![String::new()], server.span),
        };
        // a name repeated within one server is not a cross-server clash
        let mut seen = HashSet::new();
        names.retain(|name| seen.insert(name.clone()));

        for name in names {
            let key = (listen.to_string(), name);
            if let Some(previous) = self.endpoints.get(&key) {
                let (port, name) = &key;
                if name.is_empty() {
                    diagnostics.error(
                        span,
                        format!("duplicate listen port '{port}' with default server_name"),
                    );
                    diagnostics.error(
                        *previous,
                        "previous declaration of this listen port with default server_name",
                    );
                } else {
                    diagnostics.error(
                        span,
                        format!("duplicate server_name '{name}' with listen port '{port}'"),
                    );
                    diagnostics.error(
                        *previous,
                        "previous declaration of this server_name and port combination",
                    );
                }
            } else {
                self.endpoints.insert(key, span);
            }
        }
    }
}

/// The value of the server's only `listen` directive, when it has
/// exactly one.
fn listen_value(server: &ServerConfig) -> Option<&str> {
    let mut listens = server.directives.iter().filter(|d| d.key == "listen");
    match (listens.next(), listens.next()) {
        (Some(directive), None) if directive.values.len() == 1 => directive.value(0),
        _ => None,
    }
}

fn check_required(server: &ServerConfig, diagnostics: &mut Diagnostics) {
    for name in REQUIRED_DIRECTIVES {
        if server.directive(name).is_none() {
            diagnostics.error(
                server.span,
                format!("server block is missing required directive '{name}'"),
            );
        }
    }
}

fn check_duplicate_directives(server: &ServerConfig, diagnostics: &mut Diagnostics) {
    let mut seen = Vec::new();
    for directive in &server.directives {
        if seen.contains(&directive.key.as_str()) {
            diagnostics.error(
                directive.span,
                format!("duplicate directive '{}'", directive.key),
            );
        } else {
            seen.push(directive.key.as_str());
        }
    }
}

fn check_duplicate_locations(server: &ServerConfig, diagnostics: &mut Diagnostics) {
    let mut seen: HashMap<&str, Span> = HashMap::new();
    for location in &server.locations {
        if let Some(previous) = seen.get(location.path.as_str()) {
            diagnostics.error(
                location.span,
                format!("duplicate location '{}'", location.path),
            );
            diagnostics.error(
                *previous,
                format!("previous declaration of location '{}'", location.path),
            );
        } else {
            seen.insert(&location.path, location.span);
        }
    }
}
