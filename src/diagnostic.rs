//! Diagnostic collection and rendering shared by every phase.

use std::fmt::{self, Write as _};

use crate::token::Span;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("Error"),
            Self::Warning => f.write_str("Warning"),
        }
    }
}

/// A single reported problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub span: Span,
    pub message: String,
    pub severity: Severity,
}

impl Diagnostic {
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}: {}", self.severity, self.span.start, self.message)
    }
}

/// Ordered collection of diagnostics produced by the lexer, the
/// parser, and the validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn report(&mut self, span: Span, message: impl Into<String>, is_warning: bool) {
        let severity = if is_warning {
            Severity::Warning
        } else {
            Severity::Error
        };
        self.items.push(Diagnostic {
            span,
            message: message.into(),
            severity,
        });
    }

    pub fn error(&mut self, span: Span, message: impl Into<String>) {
        self.report(span, message, false);
    }

    pub fn warning(&mut self, span: Span, message: impl Into<String>) {
        self.report(span, message, true);
    }

    /// True once anything has been reported. Warnings count too: every
    /// phase gate treats a non-empty reporter as failure.
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        !self.items.is_empty()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| !d.is_warning()).count()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Messages in report order. Handy for assertions.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.items.iter().map(|d| d.message.as_str()).collect()
    }

    /// Render every diagnostic with the offending source line and a
    /// caret under the reported column.
    #[must_use]
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut out = String::new();
        for diagnostic in &self.items {
            render_one(&mut out, diagnostic, filename, source);
            out.push('\n');
        }
        out
    }

    /// Write the rendered diagnostics to stderr.
    pub fn emit(&self, filename: &str, source: &str) {
        eprint!("{}", self.render(filename, source));
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_char('\n')?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

fn render_one(out: &mut String, diagnostic: &Diagnostic, filename: &str, source: &str) {
    let start = diagnostic.span.start;
    let line_number = start.line.to_string();
    let line = source_line(source, start.offset);
    let gutter = " ".repeat(line_number.len());
    let pad = " ".repeat(start.column.saturating_sub(1));

    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        "{} {filename}{start}: {}",
        diagnostic.severity, diagnostic.message
    );
    let _ = writeln!(out, "{line_number} | {line}");
    let _ = writeln!(out, "{gutter} | {pad}^");
}

/// The full line of `source` containing byte `offset`, without its
/// terminator.
fn source_line(source: &str, offset: usize) -> &str {
    let offset = offset.min(source.len());
    let bytes = source.as_bytes();
    let mut start = offset;
    while start > 0 && bytes[start - 1] != b'\n' {
        start -= 1;
    }
    let mut end = offset;
    while end < bytes.len() && bytes[end] != b'\n' {
        end += 1;
    }
    source
        .get(start..end)
        .unwrap_or_default()
        .trim_end_matches('\r')
}
