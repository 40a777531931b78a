//! Deferred `log` output.
//!
//! Provides a `log` crate compatible logger that queues every record on a
//! [`DeferredConsole`] instead of writing it.
//!
//! # Usage
//!
//! ```ignore
//! use deferlog_console::logging::{DeferredLogger, DeferredLoggerBuilder};
//! use log::Level;
//!
//! // Simple initialization
//! DeferredLogger::init(Level::Info)?;
//!
//! // Or use the builder for more control
//! DeferredLoggerBuilder::new()
//!     .level(Level::Debug)
//!     .with_targets(true)
//!     .init()?;
//! ```

use log::{Level, LevelFilter, Log, Metadata, Record};

use deferlog_core::Severity;

use super::{accepts, with_target};
use crate::console::DeferredConsole;

/// Logger that queues records on a deferred console.
///
/// `Error` records become error messages, `Warn` records warnings, and
/// everything else informational messages.
pub struct DeferredLogger {
    console: &'static DeferredConsole,
    min_level: Level,
    show_targets: bool,
}

impl std::fmt::Debug for DeferredLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredLogger")
            .field("min_level", &self.min_level)
            .field("show_targets", &self.show_targets)
            .finish_non_exhaustive()
    }
}

impl DeferredLogger {
    /// Create a logger on the global console with the given minimum level.
    #[must_use]
    pub fn new(min_level: Level) -> Self {
        Self::builder().level(min_level).build()
    }

    #[must_use]
    pub fn builder() -> DeferredLoggerBuilder {
        DeferredLoggerBuilder::new()
    }

    /// Initialize as the global logger.
    ///
    /// Returns an error if a logger has already been set.
    pub fn init(min_level: Level) -> Result<(), log::SetLoggerError> {
        Self::builder().level(min_level).init()
    }

    /// Initialize as the global logger, ignoring errors if already set.
    pub fn try_init(min_level: Level) {
        let _ = Self::init(min_level);
    }

    fn record_text(&self, record: &Record) -> String {
        with_target(record.args().to_string(), record.target(), self.show_targets)
    }
}

/// Builder for configuring the deferred logger.
#[derive(Debug)]
pub struct DeferredLoggerBuilder {
    console: Option<&'static DeferredConsole>,
    min_level: Level,
    show_targets: bool,
}

impl Default for DeferredLoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DeferredLoggerBuilder {
    /// Create a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            console: None,
            min_level: Level::Info,
            show_targets: false,
        }
    }

    /// Queue on a specific console instead of the global one.
    #[must_use]
    pub fn console(mut self, console: &'static DeferredConsole) -> Self {
        self.console = Some(console);
        self
    }

    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Set the minimum log level from a LevelFilter.
    #[must_use]
    pub fn level_filter(mut self, filter: LevelFilter) -> Self {
        self.min_level = filter.to_level().unwrap_or(Level::Trace);
        self
    }

    /// Set whether each message is prefixed with `[target]`.
    #[must_use]
    pub fn with_targets(mut self, show: bool) -> Self {
        self.show_targets = show;
        self
    }

    /// Build the logger without installing it.
    #[must_use]
    pub fn build(self) -> DeferredLogger {
        DeferredLogger {
            console: self.console.unwrap_or_else(crate::console::console),
            min_level: self.min_level,
            show_targets: self.show_targets,
        }
    }

    /// Build and install as the global logger.
    ///
    /// Returns an error if a logger has already been set.
    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.min_level;
        let logger = Box::new(self.build());
        log::set_boxed_logger(logger)?;
        log::set_max_level(level.to_level_filter());
        Ok(())
    }

    /// Build and install, ignoring errors if already set.
    pub fn try_init(self) {
        let _ = self.init();
    }
}

impl Log for DeferredLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.min_level && accepts(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        self.console
            .tracer()
            .record(Severity::from(record.level()), self.record_text(record));
    }

    fn flush(&self) {
        self.console.close();
    }
}
