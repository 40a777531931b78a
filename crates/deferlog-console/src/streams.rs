//! Output channels.

use std::io::{self, Write};

use deferlog_core::Severity;

/// Destination stream for a printed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Stdout,
    Stderr,
}

impl Channel {
    /// Informational messages go to stdout, warnings and errors to stderr.
    #[must_use]
    pub fn for_severity(severity: Severity) -> Self {
        if severity.is_diagnostic() {
            Channel::Stderr
        } else {
            Channel::Stdout
        }
    }
}

/// A pair of line-oriented output streams.
pub trait OutputStreams: Send {
    /// Writes `line` followed by a newline.
    fn write_line(&mut self, channel: Channel, line: &str) -> io::Result<()>;

    /// Whether the channel is attached to an interactive terminal.
    fn is_terminal(&self, channel: Channel) -> bool;

    fn flush(&mut self) -> io::Result<()>;
}

/// The process's standard output and standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdStreams;

impl OutputStreams for StdStreams {
    fn write_line(&mut self, channel: Channel, line: &str) -> io::Result<()> {
        match channel {
            Channel::Stdout => writeln!(io::stdout().lock(), "{line}"),
            Channel::Stderr => writeln!(io::stderr().lock(), "{line}"),
        }
    }

    fn is_terminal(&self, channel: Channel) -> bool {
        match channel {
            Channel::Stdout => console::Term::stdout().is_term(),
            Channel::Stderr => console::Term::stderr().is_term(),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        io::stderr().flush()
    }
}
