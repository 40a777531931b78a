//! Drain-time printing.
//!
//! The [`Printer`] walks a drained batch of messages exactly once, in order,
//! and writes each one to the channel matching its severity. A separator
//! line precedes a non-empty batch; an empty batch prints nothing at all.

use std::io;

use deferlog_core::Message;

use crate::config::{StyleScope, TraceConfig};
use crate::streams::{Channel, OutputStreams};
use crate::theme::TraceTheme;

/// Whether escape sequences are written to each channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelColors {
    pub stdout: bool,
    pub stderr: bool,
}

impl ChannelColors {
    #[must_use]
    pub fn both(enabled: bool) -> Self {
        Self {
            stdout: enabled,
            stderr: enabled,
        }
    }

    #[must_use]
    pub fn get(&self, channel: Channel) -> bool {
        match channel {
            Channel::Stdout => self.stdout,
            Channel::Stderr => self.stderr,
        }
    }
}

/// Indentation prefix, rebuilt only when the width changes between
/// consecutive messages.
#[derive(Debug, Default)]
pub(crate) struct IndentCache {
    width: Option<usize>,
    prefix: String,
    rebuilds: usize,
}

impl IndentCache {
    pub(crate) fn prefix(&mut self, width: usize) -> &str {
        if self.width != Some(width) {
            self.prefix = " ".repeat(width);
            self.width = Some(width);
            self.rebuilds += 1;
        }
        &self.prefix
    }
}

/// Writes drained messages to a pair of output streams.
#[derive(Debug, Clone)]
pub struct Printer {
    theme: TraceTheme,
    style_scope: StyleScope,
    colors: ChannelColors,
    separator: String,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new(ChannelColors::default())
    }
}

impl Printer {
    /// Printer with the default theme and an 80 column dash separator.
    #[must_use]
    pub fn new(colors: ChannelColors) -> Self {
        Self {
            theme: crate::theme::theme().clone(),
            style_scope: StyleScope::default(),
            colors,
            separator: "-".repeat(80),
        }
    }

    /// Printer configured from `config`, with already resolved colors.
    #[must_use]
    pub fn from_config(config: &TraceConfig, colors: ChannelColors) -> Self {
        Self::new(colors)
            .with_style_scope(config.style_scope)
            .with_separator(config.separator_char, config.separator_width)
    }

    #[must_use]
    pub fn with_theme(mut self, theme: TraceTheme) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn with_style_scope(mut self, scope: StyleScope) -> Self {
        self.style_scope = scope;
        self
    }

    #[must_use]
    pub fn with_separator(mut self, ch: char, width: usize) -> Self {
        self.separator = std::iter::repeat_n(ch, width).collect();
        self
    }

    #[must_use]
    pub fn colors(&self) -> ChannelColors {
        self.colors
    }

    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Prints `messages` in order and returns how many were printed.
    ///
    /// Nothing is written, not even the separator, when `messages` is empty.
    pub fn print(&self, messages: Vec<Message>, out: &mut dyn OutputStreams) -> io::Result<usize> {
        if messages.is_empty() {
            return Ok(0);
        }

        let separator = if self.colors.get(Channel::Stdout) {
            TraceTheme::paint(&self.theme.separator, &self.separator)
        } else {
            self.separator.clone()
        };
        out.write_line(Channel::Stdout, &separator)?;

        let mut indent = IndentCache::default();
        for message in &messages {
            let channel = Channel::for_severity(message.severity());
            let prefix = indent.prefix(message.indent());
            let line = self.render(message, prefix, self.colors.get(channel));
            out.write_line(channel, &line)?;
        }
        out.flush()?;

        log::debug!(
            target: deferlog_core::logging::targets::CONSOLE,
            "printed {} deferred message(s), {} distinct indentation run(s)",
            messages.len(),
            indent.rebuilds
        );
        Ok(messages.len())
    }

    /// Renders one message, applying the indentation to every embedded line.
    #[must_use]
    pub fn render(&self, message: &Message, indent: &str, colorize: bool) -> String {
        let style = self.theme.style_for(message.severity());
        let mut out = String::with_capacity(message.text().len() + indent.len());

        for (i, line) in message.text().split('\n').enumerate() {
            if i > 0 {
                out.push('\n');
            }
            match (colorize, self.style_scope) {
                (false, _) => {
                    out.push_str(indent);
                    out.push_str(line);
                }
                (true, StyleScope::Body) => {
                    out.push_str(indent);
                    out.push_str(&TraceTheme::paint(style, line));
                }
                (true, StyleScope::Line) => {
                    out.push_str(&TraceTheme::paint(style, &format!("{indent}{line}")));
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestStreams;
    use deferlog_core::Severity;

    fn msg(text: &str, indent: usize, severity: Severity) -> Message {
        Message::new(text, indent, severity)
    }

    #[test]
    fn test_empty_batch_prints_nothing() {
        let mut streams = TestStreams::new();
        let printed = Printer::default().print(Vec::new(), &mut streams).unwrap();
        assert_eq!(printed, 0);
        assert!(streams.stdout().is_empty());
        assert!(streams.stderr().is_empty());
    }

    #[test]
    fn test_separator_then_messages() {
        let mut streams = TestStreams::new();
        let batch = vec![msg("one", 0, Severity::Info), msg("two", 2, Severity::Info)];
        let printed = Printer::default().print(batch, &mut streams).unwrap();
        assert_eq!(printed, 2);
        assert_eq!(streams.stdout(), vec!["-".repeat(80), "one".to_string(), "  two".to_string()]);
    }

    #[test]
    fn test_severity_routing() {
        let mut streams = TestStreams::new();
        let batch = vec![
            msg("info", 0, Severity::Info),
            msg("warn", 0, Severity::Warning),
            msg("err", 0, Severity::Error),
        ];
        Printer::default().print(batch, &mut streams).unwrap();
        assert_eq!(streams.stdout()[1..], ["info".to_string()]);
        assert_eq!(streams.stderr(), vec!["warn".to_string(), "err".to_string()]);
    }

    #[test]
    fn test_multiline_indentation() {
        let mut streams = TestStreams::new();
        let batch = vec![msg("first\nsecond\nthird", 4, Severity::Info)];
        Printer::default().print(batch, &mut streams).unwrap();
        assert_eq!(streams.stdout()[1..], ["    first", "    second", "    third"]);
    }

    #[test]
    fn test_indent_cache_rebuilds_on_change_only() {
        let mut cache = IndentCache::default();
        assert_eq!(cache.prefix(2), "  ");
        assert_eq!(cache.prefix(2), "  ");
        assert_eq!(cache.prefix(0), "");
        assert_eq!(cache.prefix(0), "");
        assert_eq!(cache.prefix(4), "    ");
        assert_eq!(cache.rebuilds, 3);
    }

    #[test]
    fn test_colorized_body_leaves_indent_plain() {
        let printer = Printer::new(ChannelColors::both(true));
        let line = printer.render(&msg("bad", 0, Severity::Error), "  ", true);
        assert!(line.starts_with("  \u{1b}["));
        assert!(line.ends_with("\u{1b}[0m"));
    }

    #[test]
    fn test_colorized_line_encloses_indent() {
        let printer = Printer::new(ChannelColors::both(true)).with_style_scope(StyleScope::Line);
        let line = printer.render(&msg("bad", 0, Severity::Warning), "  ", true);
        assert!(line.starts_with("\u{1b}["));
        assert!(line.contains("  bad"));
    }

    #[test]
    fn test_colorized_multiline_styles_each_line() {
        let printer = Printer::new(ChannelColors::both(true));
        let line = printer.render(&msg("a\nb", 2, Severity::Error), "  ", true);
        let plain = strip_ansi_escapes::strip_str(&line);
        assert_eq!(plain, "  a\n  b");
        assert_eq!(line.matches("\u{1b}[0m").count(), 2);
    }

    #[test]
    fn test_info_never_gets_escape_codes() {
        let printer = Printer::new(ChannelColors::both(true));
        assert_eq!(printer.render(&msg("hi", 2, Severity::Info), "  ", true), "  hi");
    }

    #[test]
    fn test_custom_separator() {
        let mut streams = TestStreams::new();
        let printer = Printer::default().with_separator('=', 10);
        printer.print(vec![msg("x", 0, Severity::Info)], &mut streams).unwrap();
        assert_eq!(streams.stdout()[0], "==========");
    }

    #[test]
    fn test_colored_channels_only() {
        let mut streams = TestStreams::new();
        let colors = ChannelColors {
            stdout: false,
            stderr: true,
        };
        let batch = vec![msg("out", 0, Severity::Info), msg("err", 0, Severity::Error)];
        Printer::new(colors).print(batch, &mut streams).unwrap();
        assert!(!streams.raw_stdout().iter().any(|l| l.contains('\u{1b}')));
        assert!(streams.raw_stderr()[0].contains('\u{1b}'));
        assert_eq!(streams.stderr(), vec!["err".to_string()]);
    }
}
