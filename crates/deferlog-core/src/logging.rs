//! Diagnostics logging for deferlog itself.
//!
//! deferlog reports its own internal events through the standard [`log`]
//! facade. These are separate from the deferred messages it queues: they are
//! emitted immediately, to whatever logger the application installed.
//!
//! # Log Targets
//!
//! - `deferlog`: Root target for all deferlog diagnostics
//! - `deferlog::queue`: Enqueue and drain activity
//! - `deferlog::scope`: Scope stack anomalies (unmatched leave)
//! - `deferlog::console`: Flushing and output stream failures
//! - `deferlog::config`: Configuration loading
//!
//! Example filter: `RUST_LOG=deferlog::console=debug`
//!
//! Loggers that feed records back into a deferred queue must skip targets
//! under `deferlog`, since some of these records are emitted while the queue
//! is locked.

// Re-export log macros for ergonomic use
pub use log::{debug, error, info, trace, warn};

// Re-export log level types for programmatic use
pub use log::{Level, LevelFilter};

/// Log targets used by deferlog components.
pub mod targets {
    /// Root target for all deferlog logs.
    pub const DEFERLOG: &str = "deferlog";

    /// Queue activity.
    pub const QUEUE: &str = "deferlog::queue";

    /// Scope stack.
    pub const SCOPE: &str = "deferlog::scope";

    /// Console flushing and output streams.
    pub const CONSOLE: &str = "deferlog::console";

    /// Configuration loading.
    pub const CONFIG: &str = "deferlog::config";
}

/// Returns whether logging is enabled at the given level for the given target.
#[inline]
#[must_use]
pub fn is_enabled(level: Level, target: &str) -> bool {
    log::log_enabled!(target: target, level)
}

/// Returns true for records emitted by deferlog itself.
#[must_use]
pub fn is_internal_target(target: &str) -> bool {
    target == targets::DEFERLOG || target.starts_with("deferlog::")
}
