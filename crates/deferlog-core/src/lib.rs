//! Core types for deferlog.
//!
//! This crate provides the deferred tracing machinery:
//! - [`Message`] and [`Severity`], the immutable queued record
//! - [`MessageQueue`], the append-only FIFO of pending messages
//! - [`Indentation`] and [`ScopeStack`], nesting and enter/leave naming
//! - [`Tracer`], the context object tying them together
//! - [`sprintf`] and the [`MessageFormatter`] seam for printf-style templates
//!
//! Nothing here writes to the terminal. Draining and printing live in
//! `deferlog-console`.

#![forbid(unsafe_code)]

pub mod format;
mod indent;
pub mod logging;
mod message;
mod queue;
mod scope;
mod tracer;

pub use format::{Arg, MessageFormatter, PrintfFormatter, sprintf};
pub use indent::{DEFAULT_INDENT_UNIT, Indentation};
pub use message::{Message, Severity};
pub use queue::MessageQueue;
pub use scope::{ScopeStack, close_marker, leave_text, open_marker, scope_name};
pub use tracer::{ScopeGuard, TraceState, Tracer, TracerBuilder};
