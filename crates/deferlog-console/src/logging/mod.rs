//! Bridges from the `log` and `tracing` ecosystems into a deferred console.
//!
//! - [`DeferredLogger`] - A `log` crate logger that queues records
//! - [`DeferredLayer`] - A tracing layer: events become messages, spans
//!   become enter/leave scopes
//! - [`DeferredSubscriberBuilder`] - Tracing subscriber builder
//!
//! Nothing is printed when a record arrives; it is queued at the console's
//! current indentation and printed with everything else on flush.
//!
//! Records whose target is under `deferlog` are dropped. Some of them are
//! emitted while the console's queue is locked, and re-entering the queue
//! from inside that lock would deadlock.
//!
//! # Example
//!
//! ```ignore
//! use deferlog_console::logging::DeferredLogger;
//! use log::Level;
//!
//! DeferredLogger::init(Level::Info)?;
//! log::info!("queued, printed at shutdown");
//! ```

mod logger;
mod subscriber;

pub use logger::{DeferredLogger, DeferredLoggerBuilder};
pub use subscriber::{DeferredLayer, DeferredSubscriberBuilder};

use deferlog_core::logging::is_internal_target;

/// Prefixes `message` with `[target]` when requested.
fn with_target(message: String, target: &str, show_target: bool) -> String {
    if show_target && !target.is_empty() {
        format!("[{target}] {message}")
    } else {
        message
    }
}

/// Whether a record from `target` may be queued.
fn accepts(target: &str) -> bool {
    !is_internal_target(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_target() {
        assert_eq!(with_target("up".into(), "app::db", true), "[app::db] up");
        assert_eq!(with_target("up".into(), "app::db", false), "up");
        assert_eq!(with_target("up".into(), "", true), "up");
    }

    #[test]
    fn test_internal_targets_rejected() {
        assert!(!accepts("deferlog::queue"));
        assert!(accepts("my_app"));
    }
}
