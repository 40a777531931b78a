//! Queued message records.

use std::fmt;

/// Classification of a deferred message.
///
/// Severity decides the output channel at drain time: informational
/// messages go to stdout, warnings and errors to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    /// Regular trace output.
    #[default]
    Info,
    /// Recoverable problems.
    Warning,
    /// Failures.
    Error,
}

impl Severity {
    /// Returns the lowercase name of the severity.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    /// Returns true for severities routed to the error stream.
    #[must_use]
    pub fn is_diagnostic(&self) -> bool {
        !matches!(self, Severity::Info)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<log::Level> for Severity {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Severity::Error,
            log::Level::Warn => Severity::Warning,
            log::Level::Info | log::Level::Debug | log::Level::Trace => Severity::Info,
        }
    }
}

/// A single pending line of output.
///
/// The indentation width is captured when the message is enqueued, so later
/// changes to the nesting level never affect it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: String,
    indent: usize,
    severity: Severity,
}

impl Message {
    /// Creates a message stamped with the given indentation width.
    #[must_use]
    pub fn new(text: impl Into<String>, indent: usize, severity: Severity) -> Self {
        Self {
            text: text.into(),
            indent,
            severity,
        }
    }

    /// The formatted text, possibly spanning several lines.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of leading spaces applied to every line of the text.
    #[must_use]
    pub fn indent(&self) -> usize {
        self.indent
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns true if the text contains embedded line breaks.
    #[must_use]
    pub fn is_multiline(&self) -> bool {
        self.text.contains('\n')
    }
}
