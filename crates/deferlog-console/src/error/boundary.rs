//! ErrorBoundary wrapper for deferred error reporting.
//!
//! The [`ErrorBoundary`] type wraps fallible operations and records every
//! failure as a deferred error message on a console. The error and its
//! `source()` chain become one multi-line message, printed on stderr when
//! the console drains.
//!
//! # Example
//!
//! ```rust,ignore
//! use deferlog_console::error::ErrorBoundary;
//! use deferlog_console::console;
//!
//! let boundary = ErrorBoundary::new(console());
//!
//! // Simple usage - returns Option<T>
//! let config = boundary.wrap(load_config());
//!
//! // With context message
//! let config = boundary.wrap_with_context(load_config(), "loading configuration");
//!
//! if boundary.has_errors() {
//!     eprintln!("Encountered {} errors", boundary.error_count());
//! }
//! ```

use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};

use deferlog_core::Severity;

use crate::console::DeferredConsole;

/// Wraps operations and records their errors as deferred messages.
///
/// # Thread Safety
///
/// `ErrorBoundary` is thread-safe and can be shared across threads. The
/// error count is tracked using atomic operations.
///
/// # Exit on Error
///
/// With [`with_exit_on_error`](ErrorBoundary::with_exit_on_error), the first
/// error flushes the console and exits the process with code 1, so queued
/// output is not lost.
pub struct ErrorBoundary<'a> {
    console: &'a DeferredConsole,
    exit_on_error: bool,
    error_count: AtomicUsize,
}

impl<'a> ErrorBoundary<'a> {
    #[must_use]
    pub fn new(console: &'a DeferredConsole) -> Self {
        Self {
            console,
            exit_on_error: false,
            error_count: AtomicUsize::new(0),
        }
    }

    /// Configures the boundary to flush and exit the process on error.
    #[must_use]
    pub fn with_exit_on_error(mut self, exit: bool) -> Self {
        self.exit_on_error = exit;
        self
    }

    /// Wraps a `Result`, recording the error if `Err`.
    ///
    /// Returns `Some(value)` on success, or `None` on error.
    pub fn wrap<T, E>(&self, result: Result<T, E>) -> Option<T>
    where
        E: Error,
    {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.handle_error(None, &e);
                None
            }
        }
    }

    /// Wraps a `Result`, prefixing the recorded error with `context`.
    pub fn wrap_with_context<T, E>(&self, result: Result<T, E>, context: &str) -> Option<T>
    where
        E: Error,
    {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.handle_error(Some(context), &e);
                None
            }
        }
    }

    /// Wraps a `Result`, returning the error after recording it.
    pub fn wrap_result<T, E>(&self, result: Result<T, E>) -> Result<T, E>
    where
        E: Error,
    {
        result.inspect_err(|e| self.handle_error(None, e))
    }

    /// Records an error directly without wrapping a `Result`.
    pub fn display_error(&self, error: &dyn Error) {
        self.handle_error(None, error);
    }

    /// Gets the total number of errors that have occurred.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Resets the error count to zero.
    pub fn reset_count(&self) {
        self.error_count.store(0, Ordering::Relaxed);
    }

    fn handle_error(&self, context: Option<&str>, error: &dyn Error) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
        self.console
            .tracer()
            .record(Severity::Error, describe(context, error));

        if self.exit_on_error {
            self.console.close();
            std::process::exit(1);
        }
    }
}

/// Renders an error and its source chain, one cause per line.
#[must_use]
pub fn describe(context: Option<&str>, error: &dyn Error) -> String {
    let mut text = match context {
        Some(ctx) => format!("{ctx}: {error}"),
        None => error.to_string(),
    };
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str("\ncaused by: ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Convenience macro for trying an operation with deferred error reporting.
///
/// If the operation fails, the error is recorded and the macro returns
/// early from the current function.
#[macro_export]
macro_rules! try_record {
    ($boundary:expr, $expr:expr) => {
        match $boundary.wrap($expr) {
            Some(v) => v,
            None => return,
        }
    };
    ($boundary:expr, $expr:expr, $ctx:expr) => {
        match $boundary.wrap_with_context($expr, $ctx) {
            Some(v) => v,
            None => return,
        }
    };
}
