#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub use deferlog_core::{
    Arg, DEFAULT_INDENT_UNIT, Message, MessageFormatter, PrintfFormatter, ScopeGuard, Severity,
    Tracer, TracerBuilder, sprintf,
};

pub use deferlog_console::{
    ChannelColors, ColorMode, ConsoleError, ConsoleResult, DeferredConsole, ErrorBoundary,
    FlushGuard, StyleScope, TerminalInfo, TraceConfig, console, init_console, install_console,
};

pub use deferlog_console::{config, error, logging, testing};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        Arg, DeferredConsole, ErrorBoundary, FlushGuard, ScopeGuard, Severity, TraceConfig,
        Tracer, console,
    };
}

/// Start deferred logging on the global console.
///
/// The global console is configured from the environment on first use. Keep
/// the returned guard alive until the end of `main`; dropping it prints
/// everything queued so far.
#[must_use = "queued messages are printed when the guard drops"]
pub fn init() -> FlushGuard {
    FlushGuard::new()
}

/// Like [`init`], with explicit configuration.
///
/// Fails with [`ConsoleError::AlreadyInitialized`] when the global console
/// was already created, for example by an earlier macro call.
pub fn init_with(config: TraceConfig) -> ConsoleResult<FlushGuard> {
    init_console(config)?;
    Ok(FlushGuard::new())
}

/// Queues an informational message on the global console.
///
/// The template uses printf directives (`%s`, `%d`, `%i`, `%f`, `%j`, `%o`,
/// `%O`, `%c`, `%%`); each argument is converted with [`Arg::from`].
///
/// ```
/// deferlog::log!("%d! = %d", 3, 6);
/// ```
#[macro_export]
macro_rules! log {
    ($template:expr $(, $arg:expr)* $(,)?) => {
        $crate::console()
            .tracer()
            .log($template, &[$($crate::Arg::from($arg)),*])
    };
}

/// Queues a warning on the global console. Printed on stderr.
#[macro_export]
macro_rules! warn {
    ($template:expr $(, $arg:expr)* $(,)?) => {
        $crate::console()
            .tracer()
            .warn($template, &[$($crate::Arg::from($arg)),*])
    };
}

/// Queues an error on the global console. Printed on stderr.
#[macro_export]
macro_rules! error {
    ($template:expr $(, $arg:expr)* $(,)?) => {
        $crate::console()
            .tracer()
            .error($template, &[$($crate::Arg::from($arg)),*])
    };
}

/// Does nothing. Swap a `log!` for `ignore!` to silence it in place.
///
/// The arguments are not evaluated.
#[macro_export]
macro_rules! ignore {
    ($($tokens:tt)*) => {
        ()
    };
}

/// Increases nesting, optionally queueing a message first.
#[macro_export]
macro_rules! indent {
    () => {
        $crate::console().tracer().indent()
    };
    ($template:expr $(, $arg:expr)* $(,)?) => {
        $crate::console()
            .tracer()
            .indent_with($template, &[$($crate::Arg::from($arg)),*])
    };
}

/// Alias for [`indent!`].
#[macro_export]
macro_rules! group {
    ($($tokens:tt)*) => {
        $crate::indent!($($tokens)*)
    };
}

/// Decreases nesting. Never goes below zero.
#[macro_export]
macro_rules! unindent {
    () => {
        $crate::console().tracer().unindent()
    };
}

/// Alias for [`unindent!`].
#[macro_export]
macro_rules! group_end {
    () => {
        $crate::unindent!()
    };
}

/// Opens a scope. The first word of the message names it.
///
/// ```
/// deferlog::enter!("compile %s", "main.rs");
/// deferlog::leave!("done");
/// ```
#[macro_export]
macro_rules! enter {
    () => {
        $crate::console().tracer().enter()
    };
    ($template:expr $(, $arg:expr)* $(,)?) => {
        $crate::console()
            .tracer()
            .enter_with($template, &[$($crate::Arg::from($arg)),*])
    };
}

/// Closes the innermost scope, printing its name and the optional message.
#[macro_export]
macro_rules! leave {
    () => {
        $crate::console().tracer().leave()
    };
    ($template:expr $(, $arg:expr)* $(,)?) => {
        $crate::console()
            .tracer()
            .leave_with($template, &[$($crate::Arg::from($arg)),*])
    };
}

/// Opens a scope that closes when the returned guard drops.
///
/// ```
/// fn load() {
///     let _scope = deferlog::scope!("load %s", "config");
///     deferlog::log!("reading");
/// }
/// # load();
/// ```
#[macro_export]
macro_rules! scope {
    ($template:expr $(, $arg:expr)* $(,)?) => {
        $crate::console()
            .tracer()
            .scope($template, &[$($crate::Arg::from($arg)),*])
    };
}
