//! Testing utilities for deferred console output
//!
//! Provides `TestStreams` for capturing what a drain prints, and
//! `TestConsole` for a console wired to them.

mod test_console;

pub use test_console::{TestConsole, TestStreams};
