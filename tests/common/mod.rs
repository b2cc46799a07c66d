#![allow(dead_code)]

use std::collections::HashSet;

use serverconf_rs::{Config, Diagnostics, FileSystem, Validator, parse, tokenize};

/// In-memory filesystem: a set of directories and a set of files, some
/// of them executable.
#[derive(Debug, Default)]
pub struct MemFs {
    dirs: HashSet<String>,
    files: HashSet<String>,
    executables: HashSet<String>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dir(mut self, path: &str) -> Self {
        self.dirs.insert(path.to_string());
        self
    }

    pub fn file(mut self, path: &str) -> Self {
        self.files.insert(path.to_string());
        self
    }

    pub fn executable(mut self, path: &str) -> Self {
        self.files.insert(path.to_string());
        self.executables.insert(path.to_string());
        self
    }

    /// The layout most tests validate against.
    pub fn standard() -> Self {
        Self::new()
            .dir("/var/www")
            .dir("/srv/uploads")
            .dir("/usr/bin")
            .file("/var/www/index.html")
            .executable("/usr/bin/python3")
    }
}

impl FileSystem for MemFs {
    fn exists(&self, path: &str) -> bool {
        self.dirs.contains(path) || self.files.contains(path)
    }

    fn is_dir(&self, path: &str) -> bool {
        self.dirs.contains(path)
    }

    fn is_file(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    fn is_executable(&self, path: &str) -> bool {
        self.executables.contains(path)
    }
}

/// Lex and parse, returning the tree and all syntax diagnostics.
pub fn parse_input(input: &str) -> (Config, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let tokens = tokenize(input, &mut diagnostics);
    let config = parse(&tokens, &mut diagnostics);
    (config, diagnostics)
}

/// Lex, parse, and validate against [`MemFs::standard`]. Panics on
/// syntax errors so validator tests only ever see semantic ones.
pub fn validate(input: &str) -> Diagnostics {
    let (config, mut diagnostics) = parse_input(input);
    assert!(
        diagnostics.is_empty(),
        "unexpected syntax errors:\n{diagnostics}"
    );
    Validator::new(&MemFs::standard()).validate(&config, &mut diagnostics);
    diagnostics
}

/// Wrap directives in a server block that already satisfies the
/// required-directive check.
pub fn server_with(body: &str) -> String {
    format!("server {{\n    listen 8080;\n    root /var/www;\n{body}\n}}\n")
}
