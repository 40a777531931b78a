//! Deferred console: a tracer plus the streams it drains into.

use std::io;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use deferlog_core::Tracer;
use deferlog_core::logging::targets;

use crate::config::TraceConfig;
use crate::detection::TerminalInfo;
use crate::error::{ConsoleError, ConsoleResult};
use crate::printer::{ChannelColors, Printer};
use crate::streams::{OutputStreams, StdStreams};

/// Collects trace calls and prints them when flushed or dropped.
///
/// The console owns a [`Tracer`] for recording and a [`Printer`] plus output
/// streams for draining. Draining happens on [`flush`](Self::flush),
/// [`close`](Self::close), or when the console is dropped.
pub struct DeferredConsole {
    tracer: Tracer,
    printer: Printer,
    streams: Mutex<Box<dyn OutputStreams>>,
    config: TraceConfig,
}

impl std::fmt::Debug for DeferredConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredConsole")
            .field("tracer", &self.tracer)
            .field("colors", &self.printer.colors())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DeferredConsole {
    /// Create with configuration from the environment, writing to stdout/stderr
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TraceConfig::from_env())
    }

    /// Create with explicit configuration, writing to stdout/stderr
    #[must_use]
    pub fn with_config(config: TraceConfig) -> Self {
        Self::with_streams(config, StdStreams)
    }

    /// Create with custom output streams (for testing or redirection)
    #[must_use]
    pub fn with_streams<S: OutputStreams + 'static>(config: TraceConfig, streams: S) -> Self {
        let colors = config.resolve_colors(&TerminalInfo::detect(), &streams);
        Self::with_colors(config, streams, colors)
    }

    /// Create with already resolved channel colors
    #[must_use]
    pub fn with_colors<S: OutputStreams + 'static>(
        config: TraceConfig,
        streams: S,
        colors: ChannelColors,
    ) -> Self {
        let tracer = Tracer::builder()
            .indent_unit(config.indent_unit)
            .enabled(config.enabled)
            .build();

        Self {
            tracer,
            printer: Printer::from_config(&config, colors),
            streams: Mutex::new(Box::new(streams)),
            config,
        }
    }

    /// The tracer that records trace calls
    #[must_use]
    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    #[must_use]
    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    #[must_use]
    pub fn printer(&self) -> &Printer {
        &self.printer
    }

    fn streams(&self) -> MutexGuard<'_, Box<dyn OutputStreams>> {
        self.streams.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drain pending messages and print them.
    ///
    /// Returns the number of messages printed. An empty queue prints
    /// nothing, so repeated calls never duplicate the separator. Concurrent
    /// flushes print their batches in the order they were drained.
    pub fn flush(&self) -> io::Result<usize> {
        let mut streams = self.streams();
        let messages = self.tracer.drain();
        if messages.is_empty() {
            return Ok(0);
        }
        self.printer.print(messages, streams.as_mut())
    }

    /// Flush, logging instead of returning any output failure.
    pub fn close(&self) {
        if let Err(err) = self.flush() {
            log::warn!(target: targets::CONSOLE, "failed to print deferred messages: {err}");
        }
    }
}

impl Default for DeferredConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DeferredConsole {
    fn drop(&mut self) {
        self.close();
    }
}

// ─────────────────────────────────────────────────────────
// Global Console Accessor
// ─────────────────────────────────────────────────────────

static CONSOLE: OnceLock<DeferredConsole> = OnceLock::new();

/// Get the global deferred console, creating it from the environment
/// on first use.
///
/// Statics are never dropped, so the global console only prints when
/// flushed explicitly or through a [`FlushGuard`].
#[must_use]
pub fn console() -> &'static DeferredConsole {
    CONSOLE.get_or_init(DeferredConsole::new)
}

/// Initialize the global console with specific settings.
///
/// Must be called before any output; fails if already initialized.
pub fn init_console(config: TraceConfig) -> ConsoleResult<()> {
    install_console(DeferredConsole::with_config(config))
}

/// Install an already built console as the global one.
///
/// Fails if the global console was already initialized or used.
pub fn install_console(console: DeferredConsole) -> ConsoleResult<()> {
    CONSOLE
        .set(console)
        .map_err(|_| ConsoleError::AlreadyInitialized)
}

/// Flushes the global console when dropped.
///
/// Keep it alive for the whole of `main` so every queued message is printed
/// during the program's orderly shutdown.
#[derive(Debug)]
#[must_use = "the guard flushes when dropped; binding it to `_` flushes immediately"]
pub struct FlushGuard {
    console: &'static DeferredConsole,
}

impl FlushGuard {
    /// Guard over the global console.
    pub fn new() -> Self {
        Self { console: console() }
    }

    /// Guard over a specific long-lived console.
    pub fn for_console(console: &'static DeferredConsole) -> Self {
        Self { console }
    }
}

impl Default for FlushGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FlushGuard {
    fn drop(&mut self) {
        self.console.close();
    }
}
