#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub mod config;
pub mod console;
pub mod detection;
pub mod error; // ConsoleError, ErrorBoundary
pub mod logging; // log and tracing bridges
pub mod printer;
pub mod streams;
pub mod testing; // Test utilities
pub mod theme;

pub use config::{ColorMode, StyleScope, TraceConfig};
pub use console::{DeferredConsole, FlushGuard, console, init_console, install_console};
pub use detection::TerminalInfo;
pub use error::{ConsoleError, ConsoleResult, ErrorBoundary};
pub use printer::{ChannelColors, Printer};
pub use streams::{Channel, OutputStreams, StdStreams};
pub use theme::{TraceTheme, theme};
