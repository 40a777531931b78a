//! Deferred tracing subscriber integration.
//!
//! Provides a tracing `Layer` and builder that queue events on a
//! [`DeferredConsole`] and turn spans into enter/leave scopes.
//!
//! Entering a span opens a scope named after the span; exiting it closes the
//! scope. The console's scope stack is shared by every thread, so spans
//! entered concurrently on several threads interleave their scopes.

use std::fmt;

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;

use deferlog_core::Severity;

use super::{accepts, with_target};
use crate::console::DeferredConsole;

/// A tracing layer that queues events on a deferred console.
pub struct DeferredLayer {
    console: &'static DeferredConsole,
    show_targets: bool,
}

impl fmt::Debug for DeferredLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredLayer")
            .field("show_targets", &self.show_targets)
            .finish_non_exhaustive()
    }
}

impl DeferredLayer {
    #[must_use]
    pub fn new(console: &'static DeferredConsole, show_targets: bool) -> Self {
        Self {
            console,
            show_targets,
        }
    }
}

#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl FieldCollector {
    fn record_value(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            if self.message.is_none() {
                self.message = Some(value);
            }
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }

    /// `message key=value key=value`, falling back to `fallback` for the
    /// message part.
    fn into_text(self, fallback: &str) -> String {
        let mut text = self.message.unwrap_or_else(|| fallback.to_string());
        for (key, value) in self.fields {
            text.push(' ');
            text.push_str(&key);
            text.push('=');
            text.push_str(&value);
        }
        text
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, value.to_string());
    }
}

/// Rendered enter line of a span, stored in the span's extensions.
struct SpanText(String);

fn severity(level: &Level) -> Severity {
    if *level == Level::ERROR {
        Severity::Error
    } else if *level == Level::WARN {
        Severity::Warning
    } else {
        Severity::Info
    }
}

impl<S> Layer<S> for DeferredLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let metadata = attrs.metadata();
        if !accepts(metadata.target()) {
            return;
        }
        let mut collector = FieldCollector::default();
        attrs.record(&mut collector);
        let text = collector.into_text(metadata.name());

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(SpanText(text));
        }
    }

    fn on_enter(&self, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            if let Some(SpanText(text)) = span.extensions().get::<SpanText>() {
                self.console.tracer().enter_message(Some(text.clone()));
            }
        }
    }

    fn on_exit(&self, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            if span.extensions().get::<SpanText>().is_some() {
                self.console.tracer().leave();
            }
        }
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !accepts(metadata.target()) {
            return;
        }
        let mut collector = FieldCollector::default();
        event.record(&mut collector);

        let text = with_target(
            collector.into_text(metadata.name()),
            metadata.target(),
            self.show_targets,
        );
        self.console.tracer().record(severity(metadata.level()), text);
    }
}

/// Builder for configuring a deferred tracing subscriber.
#[derive(Debug)]
pub struct DeferredSubscriberBuilder {
    console: Option<&'static DeferredConsole>,
    show_targets: bool,
    level_filter: LevelFilter,
}

impl Default for DeferredSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DeferredSubscriberBuilder {
    /// Create a new builder with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            console: None,
            show_targets: false,
            level_filter: LevelFilter::INFO,
        }
    }

    /// Queue on a specific console instead of the global one.
    #[must_use]
    pub fn console(mut self, console: &'static DeferredConsole) -> Self {
        self.console = Some(console);
        self
    }

    /// Toggle the `[target]` prefix on events.
    #[must_use]
    pub fn with_targets(mut self, show: bool) -> Self {
        self.show_targets = show;
        self
    }

    /// Set the minimum log level.
    #[must_use]
    pub fn with_level_filter(mut self, filter: LevelFilter) -> Self {
        self.level_filter = filter;
        self
    }

    /// Build the layer alone, for composing with other layers.
    #[must_use]
    pub fn layer(self) -> DeferredLayer {
        DeferredLayer::new(
            self.console.unwrap_or_else(crate::console::console),
            self.show_targets,
        )
    }

    /// Build the subscriber without installing it.
    #[must_use]
    pub fn build(self) -> impl Subscriber {
        let level_filter = self.level_filter;
        tracing_subscriber::registry()
            .with(level_filter)
            .with(self.layer())
    }

    /// Build and install as the global subscriber.
    pub fn init(self) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
        let subscriber = self.build();
        tracing::subscriber::set_global_default(subscriber)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TraceConfig;
    use crate::testing::TestStreams;

    fn leaked_console() -> (&'static DeferredConsole, TestStreams) {
        let streams = TestStreams::new();
        let console = DeferredConsole::with_streams(TraceConfig::new().colorize(false), streams.clone());
        (Box::leak(Box::new(console)), streams)
    }

    #[test]
    fn test_builder_defaults() {
        let builder = DeferredSubscriberBuilder::default();
        assert!(!builder.show_targets);
        assert!(builder.console.is_none());
        assert_eq!(builder.level_filter, LevelFilter::INFO);
    }

    #[test]
    fn test_events_are_queued() {
        let (console, streams) = leaked_console();
        let subscriber = DeferredSubscriberBuilder::new().console(console).build();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(rows = 3, "loaded");
            tracing::error!("failed");
            tracing::debug!("filtered out");
        });
        assert!(streams.output().is_empty());

        console.flush().unwrap();
        assert_eq!(streams.stdout()[1..], ["loaded rows=3"]);
        assert_eq!(streams.stderr(), vec!["failed".to_string()]);
    }

    #[test]
    fn test_spans_become_scopes() {
        let (console, streams) = leaked_console();
        let subscriber = DeferredSubscriberBuilder::new().console(console).build();

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("compile", unit = "main");
            let _entered = span.enter();
            tracing::warn!("unused import");
        });

        console.flush().unwrap();
        assert_eq!(streams.stdout()[1..], ["> compile unit=main", "< compile"]);
        assert_eq!(streams.stderr(), vec!["  unused import".to_string()]);
    }

    #[test]
    fn test_internal_targets_are_skipped() {
        let (console, _) = leaked_console();
        let subscriber = DeferredSubscriberBuilder::new()
            .console(console)
            .with_level_filter(LevelFilter::TRACE)
            .build();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "deferlog::console", "internal");
        });
        assert_eq!(console.tracer().pending(), 0);
    }

    #[test]
    fn test_target_prefix() {
        let (console, streams) = leaked_console();
        let subscriber = DeferredSubscriberBuilder::new()
            .console(console)
            .with_targets(true)
            .build();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "app::net", "connected");
        });
        console.flush().unwrap();
        assert_eq!(streams.stdout()[1], "[app::net] connected");
    }
}
