//! TestConsole for capturing drained output in tests
//!
//! Provides output streams that record every printed line instead of writing
//! to stdout/stderr, and a `DeferredConsole` wired to them.

use std::io;
use std::sync::{Arc, Mutex};

use strip_ansi_escapes::strip_str;

use crate::config::TraceConfig;
use crate::console::DeferredConsole;
use crate::streams::{Channel, OutputStreams};

#[derive(Debug, Default)]
struct TestBuffer {
    /// Lines in write order, with the channel they went to (ANSI preserved)
    lines: Vec<(Channel, String)>,
}

impl TestBuffer {
    fn channel(&self, channel: Channel) -> Vec<String> {
        self.lines
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, line)| line.clone())
            .collect()
    }
}

/// Output streams that capture lines in memory
///
/// Clones share the same buffer, so a test can hand one clone to a console
/// and keep another for assertions.
#[derive(Debug, Clone, Default)]
pub struct TestStreams {
    buffer: Arc<Mutex<TestBuffer>>,
    terminal: bool,
    failing: bool,
}

impl TestStreams {
    /// Create capturing streams that report as non-interactive
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report both channels as interactive terminals
    #[must_use]
    pub fn with_terminal(mut self, terminal: bool) -> Self {
        self.terminal = terminal;
        self
    }

    /// Make every write fail with a broken pipe
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    fn lines(&self, channel: Option<Channel>) -> Vec<String> {
        self.buffer
            .lock()
            .map(|b| match channel {
                Some(c) => b.channel(c),
                None => b.lines.iter().map(|(_, l)| l.clone()).collect(),
            })
            .unwrap_or_default()
    }

    /// Lines written to stdout (ANSI codes stripped)
    #[must_use]
    pub fn stdout(&self) -> Vec<String> {
        strip_all(self.raw_stdout())
    }

    /// Lines written to stderr (ANSI codes stripped)
    #[must_use]
    pub fn stderr(&self) -> Vec<String> {
        strip_all(self.raw_stderr())
    }

    /// Lines written to stdout (with ANSI codes)
    #[must_use]
    pub fn raw_stdout(&self) -> Vec<String> {
        self.lines(Some(Channel::Stdout))
    }

    /// Lines written to stderr (with ANSI codes)
    #[must_use]
    pub fn raw_stderr(&self) -> Vec<String> {
        self.lines(Some(Channel::Stderr))
    }

    /// Every captured line in write order, both channels (ANSI codes stripped)
    #[must_use]
    pub fn output(&self) -> Vec<String> {
        strip_all(self.lines(None))
    }

    #[must_use]
    pub fn output_string(&self) -> String {
        self.output().join("\n")
    }

    /// Check if output contains a string (case-insensitive)
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        let output = self.output_string().to_lowercase();
        output.contains(&needle.to_lowercase())
    }

    /// Check if output matches a regex pattern
    #[must_use]
    pub fn matches(&self, pattern: &str) -> bool {
        match regex::Regex::new(pattern) {
            Ok(re) => re.is_match(&self.output_string()),
            Err(_) => false,
        }
    }

    /// Assert that output contains a string
    ///
    /// # Panics
    ///
    /// Panics if the output does not contain the needle string.
    pub fn assert_contains(&self, needle: &str) {
        assert!(
            self.contains(needle),
            "Output did not contain '{}'. Actual output:\n{}",
            needle,
            self.output_string()
        );
    }

    /// Assert that output does NOT contain a string
    ///
    /// # Panics
    ///
    /// Panics if the output contains the needle string.
    pub fn assert_not_contains(&self, needle: &str) {
        assert!(
            !self.contains(needle),
            "Output unexpectedly contained '{}'. Actual output:\n{}",
            needle,
            self.output_string()
        );
    }

    /// Assert output has specific number of lines across both channels
    ///
    /// # Panics
    ///
    /// Panics if the line count doesn't match expected.
    pub fn assert_line_count(&self, expected: usize) {
        let actual = self.output().len();
        assert_eq!(
            actual, expected,
            "Expected {} lines but got {}. Actual output:\n{}",
            expected, actual, self.output_string()
        );
    }

    pub fn clear(&self) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.lines.clear();
        }
    }
}

fn strip_all(lines: Vec<String>) -> Vec<String> {
    lines.iter().map(|l| strip_str(l)).collect()
}

impl OutputStreams for TestStreams {
    fn write_line(&mut self, channel: Channel, line: &str) -> io::Result<()> {
        if self.failing {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "test stream closed"));
        }
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer
                .lines
                .extend(line.split('\n').map(|l| (channel, l.to_string())));
        }
        Ok(())
    }

    fn is_terminal(&self, _channel: Channel) -> bool {
        self.terminal
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A deferred console that prints into [`TestStreams`]
///
/// Use `console()` to record trace calls, `flush()` to drain, then the
/// output accessors and assertion methods to verify what was printed.
#[derive(Debug)]
pub struct TestConsole {
    inner: DeferredConsole,
    streams: TestStreams,
}

impl TestConsole {
    /// Create a test console with color disabled
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TraceConfig::new().colorize(false))
    }

    /// Create a test console that always writes escape sequences
    #[must_use]
    pub fn new_colored() -> Self {
        Self::with_config(TraceConfig::new().colorize(true))
    }

    #[must_use]
    pub fn with_config(config: TraceConfig) -> Self {
        let streams = TestStreams::new();
        Self {
            inner: DeferredConsole::with_streams(config, streams.clone()),
            streams,
        }
    }

    /// Get the underlying console
    #[must_use]
    pub fn console(&self) -> &DeferredConsole {
        &self.inner
    }

    #[must_use]
    pub fn streams(&self) -> &TestStreams {
        &self.streams
    }

    /// Drain the console into the capture buffer, returning the message count
    ///
    /// # Panics
    ///
    /// Panics if printing fails, which capturing streams never do.
    pub fn flush(&self) -> usize {
        self.inner
            .flush()
            .expect("capturing streams do not fail")
    }

    #[must_use]
    pub fn stdout(&self) -> Vec<String> {
        self.streams.stdout()
    }

    #[must_use]
    pub fn stderr(&self) -> Vec<String> {
        self.streams.stderr()
    }

    #[must_use]
    pub fn output(&self) -> Vec<String> {
        self.streams.output()
    }

    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.streams.contains(needle)
    }

    /// Assert that printed output contains a string
    ///
    /// # Panics
    ///
    /// Panics if the output does not contain the needle string.
    pub fn assert_contains(&self, needle: &str) {
        self.streams.assert_contains(needle);
    }

    /// Print output for debugging (in tests)
    pub fn debug_print(&self) {
        eprintln!("=== TestConsole Output ===");
        for (i, line) in self.output().iter().enumerate() {
            eprintln!("{:3}: {}", i + 1, line);
        }
        eprintln!("==========================");
    }
}

impl Default for TestConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_captured_until_flush() {
        let tc = TestConsole::new();
        tc.console().tracer().log("Hello, world!", &[]);
        assert!(tc.output().is_empty());
        assert_eq!(tc.flush(), 1);
        assert!(tc.contains("hello"));
    }

    #[test]
    fn test_contains_case_insensitive() {
        let tc = TestConsole::new();
        tc.console().tracer().log("Hello World", &[]);
        tc.flush();
        assert!(tc.contains("WORLD"));
    }

    #[test]
    fn test_output_keeps_write_order_across_channels() {
        let tc = TestConsole::new();
        let tracer = tc.console().tracer();
        tracer.log("a", &[]);
        tracer.error("b", &[]);
        tracer.log("c", &[]);
        tc.flush();
        assert_eq!(tc.output()[1..], ["a", "b", "c"]);
        assert_eq!(tc.stdout()[1..], ["a", "c"]);
    }

    #[test]
    fn test_assert_not_contains() {
        let tc = TestConsole::new();
        tc.console().tracer().log("Success", &[]);
        tc.flush();
        tc.streams().assert_not_contains("Error");
    }

    #[test]
    fn test_clear() {
        let tc = TestConsole::new();
        tc.console().tracer().log("Some output", &[]);
        tc.flush();
        tc.streams().assert_line_count(2);
        tc.streams().clear();
        assert!(tc.output().is_empty());
    }

    #[test]
    fn test_matches_regex() {
        let tc = TestConsole::new();
        tc.console().tracer().warn("Error code: 42", &[]);
        tc.flush();
        assert!(tc.streams().matches(r"code: \d+"));
        assert!(!tc.streams().matches(r"code: [a-z]+"));
    }

    #[test]
    fn test_colored_console_strips_for_assertions() {
        let tc = TestConsole::new_colored();
        tc.console().tracer().error("boom", &[]);
        tc.flush();
        assert_eq!(tc.stderr(), vec!["boom".to_string()]);
        assert!(tc.streams().raw_stderr()[0].contains('\u{1b}'));
    }

    #[test]
    fn test_multiline_write_is_split() {
        let mut streams = TestStreams::new();
        streams.write_line(Channel::Stdout, "one\ntwo").unwrap();
        assert_eq!(streams.stdout(), vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_failing_streams() {
        let mut streams = TestStreams::new().failing();
        assert!(streams.write_line(Channel::Stderr, "x").is_err());
        assert!(streams.output().is_empty());
    }
}
