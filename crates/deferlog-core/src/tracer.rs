//! The deferred tracing context.
//!
//! A [`Tracer`] owns the message queue, the indentation tracker and the scope
//! stack. Trace calls only append to the queue; nothing is printed until the
//! owner drains it.
//!
//! # Example
//!
//! ```
//! use deferlog_core::{Arg, Tracer};
//!
//! let tracer = Tracer::new();
//! tracer.log("%d! = %d", &[Arg::from(3), Arg::from(6)]);
//! {
//!     let _scope = tracer.scope("compile main.rs", &[]);
//!     tracer.warn("unused variable", &[]);
//! }
//!
//! let lines: Vec<String> = tracer.drain().iter().map(|m| m.text().to_string()).collect();
//! assert_eq!(lines, vec!["3! = 6", "> compile main.rs", "unused variable", "< compile"]);
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::format::{Arg, MessageFormatter, PrintfFormatter};
use crate::indent::{DEFAULT_INDENT_UNIT, Indentation};
use crate::message::{Message, Severity};
use crate::queue::MessageQueue;
use crate::scope::{ScopeStack, close_marker, leave_text, open_marker, scope_name};

/// Queue, indentation and scope stack, mutated together under one lock.
#[derive(Debug, Default)]
pub struct TraceState {
    queue: MessageQueue,
    indentation: Indentation,
    scopes: ScopeStack,
}

impl TraceState {
    #[must_use]
    pub fn new(indent_unit: usize) -> Self {
        Self {
            queue: MessageQueue::new(),
            indentation: Indentation::new(indent_unit),
            scopes: ScopeStack::new(),
        }
    }

    /// Appends `text` at the current width.
    pub fn enqueue(&mut self, text: impl Into<String>, severity: Severity) {
        let width = self.indentation.width();
        self.queue.enqueue(text, width, severity);
    }

    /// Optional message at the current width, then one level deeper.
    pub fn indent(&mut self, message: Option<String>) {
        if let Some(text) = message {
            self.enqueue(text, Severity::Info);
        }
        self.indentation.increase();
    }

    pub fn unindent(&mut self) {
        self.indentation.decrease();
    }

    /// Opens a named scope.
    ///
    /// The message (if any) is enqueued with the open marker before the
    /// level increases; its first token becomes the scope name.
    pub fn enter(&mut self, message: Option<String>) {
        let name = match message {
            Some(text) => {
                let name = scope_name(&text).to_string();
                let line = format!("{}{text}", open_marker(self.indentation.unit()));
                self.enqueue(line, Severity::Info);
                name
            }
            None => String::new(),
        };
        self.scopes.push(name);
        self.indentation.increase();
    }

    /// Closes the innermost scope.
    ///
    /// The level decreases first, so the leave line lines up with its enter
    /// line. A leave without a matching enter uses the empty scope name.
    pub fn leave(&mut self, message: Option<String>) {
        self.indentation.decrease();
        if self.scopes.is_empty() {
            log::trace!(target: crate::logging::targets::SCOPE, "leave without a matching enter");
        }
        let name = self.scopes.pop();
        let line = format!(
            "{}{}",
            close_marker(self.indentation.unit()),
            leave_text(&name, message.as_deref())
        );
        self.enqueue(line, Severity::Info);
    }

    pub fn drain(&mut self) -> Vec<Message> {
        self.queue.drain()
    }

    #[must_use]
    pub fn queue(&self) -> &MessageQueue {
        &self.queue
    }

    #[must_use]
    pub fn indentation(&self) -> Indentation {
        self.indentation
    }

    #[must_use]
    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }
}

/// Deferred trace context shared by reference.
///
/// Every operation takes the internal lock for its whole duration, so a
/// `Tracer` can be shared across threads. [`drain`](Tracer::drain) takes a
/// snapshot: messages enqueued afterwards stay pending for the next drain.
pub struct Tracer {
    state: Mutex<TraceState>,
    formatter: Box<dyn MessageFormatter>,
    enabled: bool,
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("enabled", &self.enabled)
            .field("pending", &self.pending())
            .field("level", &self.level())
            .finish_non_exhaustive()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracer {
    /// Creates an enabled tracer with the default indentation unit.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    #[must_use]
    pub fn builder() -> TracerBuilder {
        TracerBuilder::new()
    }

    fn lock(&self) -> MutexGuard<'_, TraceState> {
        // Trace calls never panic while holding the lock, but a panicking
        // formatter on another thread must not wedge every later call.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn render(&self, template: &str, args: &[Arg]) -> String {
        self.formatter.format(template, args)
    }

    fn push(&self, severity: Severity, template: &str, args: &[Arg]) {
        if !self.enabled {
            return;
        }
        let text = self.render(template, args);
        self.lock().enqueue(text, severity);
    }

    /// Whether trace calls are recorded at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    // ─────────────────────────────────────────────────
    // Messages
    // ─────────────────────────────────────────────────

    pub fn log(&self, template: &str, args: &[Arg]) {
        self.push(Severity::Info, template, args);
    }

    pub fn warn(&self, template: &str, args: &[Arg]) {
        self.push(Severity::Warning, template, args);
    }

    pub fn error(&self, template: &str, args: &[Arg]) {
        self.push(Severity::Error, template, args);
    }

    /// Enqueues already formatted text.
    pub fn record(&self, severity: Severity, text: impl Into<String>) {
        if self.enabled {
            self.lock().enqueue(text, severity);
        }
    }

    /// Does nothing. Lets a call site silence a trace without restructuring.
    pub fn ignore(&self, _template: &str, _args: &[Arg]) {}

    // ─────────────────────────────────────────────────
    // Indentation
    // ─────────────────────────────────────────────────

    pub fn indent(&self) {
        if self.enabled {
            self.lock().indent(None);
        }
    }

    /// Enqueues a message, then increases nesting.
    pub fn indent_with(&self, template: &str, args: &[Arg]) {
        if self.enabled {
            let text = self.render(template, args);
            self.lock().indent(Some(text));
        }
    }

    /// Alias for [`indent`](Tracer::indent).
    pub fn group(&self) {
        self.indent();
    }

    /// Alias for [`indent_with`](Tracer::indent_with).
    pub fn group_with(&self, template: &str, args: &[Arg]) {
        self.indent_with(template, args);
    }

    pub fn unindent(&self) {
        if self.enabled {
            self.lock().unindent();
        }
    }

    /// Alias for [`unindent`](Tracer::unindent).
    pub fn group_end(&self) {
        self.unindent();
    }

    // ─────────────────────────────────────────────────
    // Scopes
    // ─────────────────────────────────────────────────

    /// Opens an unnamed scope.
    pub fn enter(&self) {
        self.enter_message(None);
    }

    /// Opens a scope named after the first word of the formatted message.
    pub fn enter_with(&self, template: &str, args: &[Arg]) {
        let text = self.enabled.then(|| self.render(template, args));
        self.enter_message(text);
    }

    /// Closes the innermost scope, printing its name.
    pub fn leave(&self) {
        self.leave_message(None);
    }

    /// Closes the innermost scope, printing its name followed by the message.
    pub fn leave_with(&self, template: &str, args: &[Arg]) {
        let text = self.enabled.then(|| self.render(template, args));
        self.leave_message(text);
    }

    pub fn enter_message(&self, message: Option<String>) {
        if self.enabled {
            self.lock().enter(message);
        }
    }

    pub fn leave_message(&self, message: Option<String>) {
        if self.enabled {
            self.lock().leave(message);
        }
    }

    /// Opens a scope that is closed when the returned guard drops.
    ///
    /// The leave happens on every exit path, including early returns and
    /// panics unwinding through the caller.
    #[must_use = "dropping the guard immediately closes the scope"]
    pub fn scope(&self, template: &str, args: &[Arg]) -> ScopeGuard<'_> {
        self.enter_with(template, args);
        ScopeGuard {
            tracer: self,
            message: None,
        }
    }

    // ─────────────────────────────────────────────────
    // Inspection and draining
    // ─────────────────────────────────────────────────

    /// Moves out every pending message in enqueue order.
    pub fn drain(&self) -> Vec<Message> {
        let messages = self.lock().drain();
        if !messages.is_empty() {
            log::debug!(
                target: crate::logging::targets::QUEUE,
                "drained {} deferred message(s)",
                messages.len()
            );
        }
        messages
    }

    /// Number of messages waiting to be drained.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().queue().len()
    }

    /// Width that a message enqueued now would receive.
    #[must_use]
    pub fn width(&self) -> usize {
        self.lock().indentation().width()
    }

    #[must_use]
    pub fn level(&self) -> usize {
        self.lock().indentation().level()
    }

    /// Number of open named scopes.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.lock().scopes().depth()
    }

    /// Runs `f` with exclusive access to the state.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut TraceState) -> R) -> R {
        f(&mut self.lock())
    }
}

/// Closes a scope opened with [`Tracer::scope`] when dropped.
#[derive(Debug)]
pub struct ScopeGuard<'a> {
    tracer: &'a Tracer,
    message: Option<String>,
}

impl ScopeGuard<'_> {
    /// Closes the scope now with a formatted leave message.
    pub fn finish(mut self, template: &str, args: &[Arg]) {
        if self.tracer.is_enabled() {
            self.message = Some(self.tracer.render(template, args));
        }
    }

    /// Sets the leave message without closing the scope yet.
    pub fn set_message(&mut self, text: impl Into<String>) {
        self.message = Some(text.into());
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.tracer.leave_message(self.message.take());
    }
}

/// Builder for [`Tracer`].
pub struct TracerBuilder {
    indent_unit: usize,
    enabled: bool,
    formatter: Box<dyn MessageFormatter>,
}

impl std::fmt::Debug for TracerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracerBuilder")
            .field("indent_unit", &self.indent_unit)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl Default for TracerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TracerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            indent_unit: DEFAULT_INDENT_UNIT,
            enabled: true,
            formatter: Box::new(PrintfFormatter),
        }
    }

    /// Spaces per nesting level.
    #[must_use]
    pub fn indent_unit(mut self, unit: usize) -> Self {
        self.indent_unit = unit;
        self
    }

    /// A disabled tracer ignores every call.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn formatter<F: MessageFormatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    #[must_use]
    pub fn build(self) -> Tracer {
        Tracer {
            state: Mutex::new(TraceState::new(self.indent_unit)),
            formatter: self.formatter,
            enabled: self.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drained(tracer: &Tracer) -> Vec<(String, usize, Severity)> {
        tracer
            .drain()
            .into_iter()
            .map(|m| (m.text().to_string(), m.indent(), m.severity()))
            .collect()
    }

    fn texts(tracer: &Tracer) -> Vec<String> {
        drained(tracer).into_iter().map(|(t, _, _)| t).collect()
    }

    #[test]
    fn test_log_formats_arguments() {
        let tracer = Tracer::new();
        tracer.log("%d! = %d", &[Arg::from(3), Arg::from(6)]);
        assert_eq!(drained(&tracer), vec![("3! = 6".to_string(), 0, Severity::Info)]);
    }

    #[test]
    fn test_severities_recorded() {
        let tracer = Tracer::new();
        tracer.log("a", &[]);
        tracer.warn("b", &[]);
        tracer.error("c", &[]);
        let severities: Vec<_> = drained(&tracer).into_iter().map(|(_, _, s)| s).collect();
        assert_eq!(severities, vec![Severity::Info, Severity::Warning, Severity::Error]);
    }

    #[test]
    fn test_width_stamped_at_enqueue_time() {
        let tracer = Tracer::new();
        tracer.indent();
        tracer.log("inner", &[]);
        tracer.unindent();
        tracer.indent();
        tracer.indent();
        let messages = drained(&tracer);
        assert_eq!(messages[0].1, 2);
        assert_eq!(tracer.width(), 4);
    }

    #[test]
    fn test_indent_with_message_printed_before_increase() {
        let tracer = Tracer::new();
        tracer.indent_with("header %s", &[Arg::from("x")]);
        tracer.log("body", &[]);
        let messages = drained(&tracer);
        assert_eq!(messages[0], ("header x".to_string(), 0, Severity::Info));
        assert_eq!(messages[1].1, 2);
    }

    #[test]
    fn test_group_aliases() {
        let tracer = Tracer::new();
        tracer.group();
        assert_eq!(tracer.level(), 1);
        tracer.group_with("g", &[]);
        assert_eq!(tracer.level(), 2);
        tracer.group_end();
        tracer.group_end();
        assert_eq!(tracer.level(), 0);
    }

    #[test]
    fn test_unindent_at_zero_is_clamped() {
        let tracer = Tracer::new();
        tracer.unindent();
        tracer.log("flat", &[]);
        assert_eq!(drained(&tracer)[0].1, 0);
        assert_eq!(tracer.level(), 0);
    }

    #[test]
    fn test_enter_leave_uses_first_word() {
        let tracer = Tracer::new();
        tracer.enter_with("foo", &[]);
        tracer.leave();
        assert_eq!(texts(&tracer), vec!["> foo", "< foo"]);
    }

    #[test]
    fn test_enter_leave_joins_name_and_message() {
        let tracer = Tracer::new();
        tracer.enter_with("bar baz", &[]);
        tracer.leave_with("done", &[]);
        assert_eq!(texts(&tracer), vec!["> bar baz", "< bar done"]);
    }

    #[test]
    fn test_nested_leave_is_lifo() {
        let tracer = Tracer::new();
        tracer.enter_with("A", &[]);
        tracer.enter_with("B", &[]);
        tracer.leave();
        tracer.leave();
        let messages = drained(&tracer);
        assert_eq!(messages[0], ("> A".to_string(), 0, Severity::Info));
        assert_eq!(messages[1], ("> B".to_string(), 2, Severity::Info));
        assert_eq!(messages[2], ("< B".to_string(), 2, Severity::Info));
        assert_eq!(messages[3], ("< A".to_string(), 0, Severity::Info));
    }

    #[test]
    fn test_unmatched_leave_prints_message_only() {
        let tracer = Tracer::new();
        tracer.leave_with("orphan", &[]);
        tracer.leave();
        assert_eq!(texts(&tracer), vec!["< orphan", "< "]);
        assert_eq!(tracer.level(), 0);
    }

    #[test]
    fn test_unnamed_enter_keeps_stack_aligned() {
        let tracer = Tracer::new();
        tracer.enter_with("outer", &[]);
        tracer.enter();
        assert_eq!(tracer.depth(), 2);
        tracer.leave_with("inner done", &[]);
        tracer.leave();
        assert_eq!(texts(&tracer), vec!["> outer", "< inner done", "< outer"]);
    }

    #[test]
    fn test_scope_depth_tracks_enters() {
        let tracer = Tracer::new();
        tracer.indent();
        tracer.enter_with("x", &[]);
        assert_eq!(tracer.depth(), 1);
        assert!(tracer.depth() <= tracer.level());
        tracer.leave();
        tracer.unindent();
        assert_eq!(tracer.depth(), 0);
        assert_eq!(tracer.level(), 0);
    }

    #[test]
    fn test_scope_guard_leaves_on_drop() {
        let tracer = Tracer::new();
        {
            let _guard = tracer.scope("load config.toml", &[]);
            tracer.log("reading", &[]);
        }
        let messages = drained(&tracer);
        assert_eq!(messages[1], ("reading".to_string(), 2, Severity::Info));
        assert_eq!(messages[2], ("< load".to_string(), 0, Severity::Info));
    }

    #[test]
    fn test_scope_guard_finish_with_message() {
        let tracer = Tracer::new();
        let guard = tracer.scope("parse", &[]);
        guard.finish("ok in %dms", &[Arg::from(12)]);
        assert_eq!(texts(&tracer), vec!["> parse", "< parse ok in 12ms"]);
    }

    #[test]
    fn test_scope_guard_leaves_during_unwind() {
        let tracer = Tracer::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = tracer.scope("risky", &[]);
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(tracer.level(), 0);
        assert_eq!(texts(&tracer), vec!["> risky", "< risky"]);
    }

    #[test]
    fn test_recursive_scopes() {
        fn walk(tracer: &Tracer, n: u32) {
            let _guard = tracer.scope("walk %d", &[Arg::from(n)]);
            if n > 0 {
                walk(tracer, n - 1);
            }
        }

        let tracer = Tracer::new();
        walk(&tracer, 2);
        let messages = drained(&tracer);
        let leaves: Vec<_> = messages
            .iter()
            .filter(|(t, _, _)| t.starts_with('<'))
            .map(|(_, w, _)| *w)
            .collect();
        assert_eq!(leaves, vec![4, 2, 0]);
    }

    #[test]
    fn test_ignore_records_nothing() {
        let tracer = Tracer::new();
        tracer.ignore("hidden %s", &[Arg::from("x")]);
        assert_eq!(tracer.pending(), 0);
    }

    #[test]
    fn test_disabled_tracer_ignores_everything() {
        let tracer = Tracer::builder().enabled(false).build();
        tracer.log("a", &[]);
        tracer.enter_with("b", &[]);
        tracer.indent();
        assert_eq!(tracer.pending(), 0);
        assert_eq!(tracer.level(), 0);
    }

    #[test]
    fn test_custom_indent_unit_and_markers() {
        let tracer = Tracer::builder().indent_unit(4).build();
        tracer.enter_with("step", &[]);
        tracer.log("x", &[]);
        tracer.leave();
        let messages = drained(&tracer);
        assert_eq!(messages[0].0, ">   step");
        assert_eq!(messages[1].1, 4);
        assert_eq!(messages[2].0, "<   step");
    }

    #[test]
    fn test_custom_formatter() {
        struct Upper;
        impl MessageFormatter for Upper {
            fn format(&self, template: &str, _args: &[Arg]) -> String {
                template.to_uppercase()
            }
        }

        let tracer = Tracer::builder().formatter(Upper).build();
        tracer.log("quiet", &[]);
        assert_eq!(texts(&tracer), vec!["QUIET"]);
    }

    #[test]
    fn test_second_drain_is_empty() {
        let tracer = Tracer::new();
        tracer.log("once", &[]);
        assert_eq!(tracer.drain().len(), 1);
        assert!(tracer.drain().is_empty());
    }

    #[test]
    fn test_tracer_shared_across_threads() {
        let tracer = std::sync::Arc::new(Tracer::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let tracer = tracer.clone();
                std::thread::spawn(move || {
                    for j in 0..10 {
                        tracer.log("%d:%d", &[Arg::from(i), Arg::from(j)]);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(tracer.pending(), 40);
    }
}
