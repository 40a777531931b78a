//! Per-severity output styles.

use std::sync::OnceLock;

use console::Style;
use deferlog_core::Severity;

/// Styles applied to drained lines when color is enabled.
#[derive(Debug, Clone)]
pub struct TraceTheme {
    pub info: Style,
    pub warning: Style,
    pub error: Style,
    /// Style of the separator line printed before the first message.
    pub separator: Style,
}

impl Default for TraceTheme {
    fn default() -> Self {
        Self {
            info: Style::new(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            separator: Style::new().dim(),
        }
    }
}

impl TraceTheme {
    #[must_use]
    pub fn style_for(&self, severity: Severity) -> &Style {
        match severity {
            Severity::Info => &self.info,
            Severity::Warning => &self.warning,
            Severity::Error => &self.error,
        }
    }

    /// Wraps `text` in the escape sequences of `style`, regardless of what
    /// the `console` crate detects for the current process.
    #[must_use]
    pub fn paint(style: &Style, text: &str) -> String {
        style.clone().force_styling(true).apply_to(text).to_string()
    }
}

static THEME: OnceLock<TraceTheme> = OnceLock::new();

/// The shared default theme.
#[must_use]
pub fn theme() -> &'static TraceTheme {
    THEME.get_or_init(TraceTheme::default)
}
