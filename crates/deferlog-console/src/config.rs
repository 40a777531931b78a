//! Centralized configuration for deferred console output.
//!
//! `TraceConfig` can be built programmatically, loaded from a TOML file,
//! read from environment variables, or any layering of those.

use std::env;
use std::path::Path;
use std::str::FromStr;

use deferlog_core::DEFAULT_INDENT_UNIT;
use deferlog_core::logging::targets;
use serde::{Deserialize, Serialize};

use crate::detection::TerminalInfo;
use crate::error::{ConsoleError, ConsoleResult};
use crate::printer::ChannelColors;
use crate::streams::{Channel, OutputStreams};

/// Comprehensive configuration for a deferred console
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Record trace calls at all; when false every call is ignored
    pub enabled: bool,
    /// Color policy
    pub color: ColorMode,
    /// What the color escapes enclose
    pub style_scope: StyleScope,
    /// Spaces per nesting level
    pub indent_unit: usize,
    /// Length of the separator line printed before drained messages
    pub separator_width: usize,
    /// Character the separator line is made of
    pub separator_char: char,
}

/// When to emit color escape sequences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color when the channel is a capable terminal
    #[default]
    Auto,
    /// Always emit escape sequences
    Always,
    /// Never emit escape sequences
    Never,
}

impl FromStr for ColorMode {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorMode::Auto),
            "always" | "1" | "true" | "on" => Ok(ColorMode::Always),
            "never" | "0" | "false" | "off" => Ok(ColorMode::Never),
            _ => Err(ConsoleError::invalid_setting("color", s)),
        }
    }
}

/// Which part of a printed line the color escapes enclose
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleScope {
    /// Only the message text; indentation stays unstyled
    #[default]
    Body,
    /// The whole line including indentation
    Line,
}

impl FromStr for StyleScope {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "body" => Ok(StyleScope::Body),
            "line" => Ok(StyleScope::Line),
            _ => Err(ConsoleError::invalid_setting("style", s)),
        }
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            color: ColorMode::Auto,
            style_scope: StyleScope::Body,
            indent_unit: DEFAULT_INDENT_UNIT,
            separator_width: 80,
            separator_char: '-',
        }
    }
}

impl TraceConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from environment variables, skipping invalid values
    ///
    /// # Environment Variables
    ///
    /// | Variable | Values | Description |
    /// |----------|--------|-------------|
    /// | `DEFERLOG_COLOR` | auto/always/never | Color policy |
    /// | `DEFERLOG_PLAIN` | (set) | Never color |
    /// | `NO_COLOR` | (set) | Never color (standard) |
    /// | `DEFERLOG_STYLE` | body/line | What color encloses |
    /// | `DEFERLOG_INDENT` | integer | Spaces per nesting level |
    /// | `DEFERLOG_DISABLE` | (set) | Ignore every trace call |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        for err in config.apply_vars(|key| env::var(key).ok()) {
            log::warn!(target: targets::CONFIG, "ignoring invalid setting: {err}");
        }
        config
    }

    /// Like [`from_env`](Self::from_env), but fails on the first invalid value
    pub fn try_from_env() -> ConsoleResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> ConsoleResult<Self> {
        let config: Self = toml::from_str(source).map_err(|source| ConsoleError::ConfigParse {
            path: None,
            source,
        })?;
        config.validate()
    }

    /// Load a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> ConsoleResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text).map_err(|source| ConsoleError::ConfigParse {
            path: Some(path.to_path_buf()),
            source,
        })?;
        log::debug!(target: targets::CONFIG, "loaded configuration from {}", path.display());
        config.validate()
    }

    /// Layer environment variables over the current values
    ///
    /// Every valid variable is applied even when another one is invalid;
    /// the first invalid one is returned.
    pub fn apply_env(&mut self) -> ConsoleResult<()> {
        match self.apply_vars(|key| env::var(key).ok()).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Applies each variable on its own, collecting the invalid ones.
    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> Vec<ConsoleError> {
        let mut errors = Vec::new();

        if let Some(value) = var("DEFERLOG_COLOR") {
            match value.parse() {
                Ok(mode) => self.color = mode,
                Err(err) => errors.push(err),
            }
        }
        if var("DEFERLOG_PLAIN").is_some() || var("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            self.color = ColorMode::Never;
        }
        if let Some(value) = var("DEFERLOG_STYLE") {
            match value.parse() {
                Ok(scope) => self.style_scope = scope,
                Err(err) => errors.push(err),
            }
        }
        if let Some(value) = var("DEFERLOG_INDENT") {
            match value.trim().parse().ok().filter(|unit: &usize| *unit > 0) {
                Some(unit) => self.indent_unit = unit,
                None => errors.push(ConsoleError::invalid_setting("indent", &value)),
            }
        }
        if var("DEFERLOG_DISABLE").is_some() {
            self.enabled = false;
        }
        errors
    }

    fn validate(self) -> ConsoleResult<Self> {
        if self.indent_unit == 0 {
            return Err(ConsoleError::invalid_setting("indent_unit", "0"));
        }
        Ok(self)
    }

    // ─────────────────────────────────────────────────
    // Builder Methods
    // ─────────────────────────────────────────────────

    /// Force color on or off
    #[must_use]
    pub fn colorize(mut self, colorize: bool) -> Self {
        self.color = if colorize {
            ColorMode::Always
        } else {
            ColorMode::Never
        };
        self
    }

    /// Set the color policy
    #[must_use]
    pub fn with_color(mut self, mode: ColorMode) -> Self {
        self.color = mode;
        self
    }

    #[must_use]
    pub fn with_style_scope(mut self, scope: StyleScope) -> Self {
        self.style_scope = scope;
        self
    }

    /// Set spaces per nesting level
    #[must_use]
    pub fn with_indent_unit(mut self, unit: usize) -> Self {
        self.indent_unit = unit;
        self
    }

    /// Set the separator line
    #[must_use]
    pub fn with_separator(mut self, ch: char, width: usize) -> Self {
        self.separator_char = ch;
        self.separator_width = width;
        self
    }

    /// Ignore every trace call
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    // ─────────────────────────────────────────────────
    // Resolution Methods
    // ─────────────────────────────────────────────────

    /// Resolve whether each channel gets color escapes
    #[must_use]
    pub fn resolve_colors(&self, info: &TerminalInfo, streams: &dyn OutputStreams) -> ChannelColors {
        let resolve = |channel: Channel| match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => streams.is_terminal(channel) && info.supports_color(channel),
        };
        ChannelColors {
            stdout: resolve(Channel::Stdout),
            stderr: resolve(Channel::Stderr),
        }
    }
}
