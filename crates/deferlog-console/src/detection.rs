//! Terminal capability probing.
//!
//! Determines whether colored output should be emitted on each output
//! channel, based on environment variables, the operating system and whether
//! the stream is attached to a terminal.

use std::env;
use std::sync::OnceLock;

use regex::Regex;

use crate::streams::Channel;

/// Snapshot of everything the color decision depends on.
///
/// Capture it once with [`TerminalInfo::detect`], or build one by hand to
/// test a specific environment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TerminalInfo {
    /// Value of `TERM`.
    pub term: Option<String>,
    /// Value of `COLORTERM`.
    pub colorterm: Option<String>,
    /// Operating system identifier, as in [`std::env::consts::OS`].
    pub os: String,
    /// `NO_COLOR` is set to a non-empty value.
    pub no_color: bool,
    /// `FORCE_COLOR` / `CLICOLOR_FORCE` override.
    pub force_color: Option<bool>,
    pub stdout_is_terminal: bool,
    pub stderr_is_terminal: bool,
}

impl TerminalInfo {
    /// Probe the current process environment.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            term: env::var("TERM").ok(),
            colorterm: env::var("COLORTERM").ok(),
            os: env::consts::OS.to_string(),
            no_color: env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()),
            force_color: force_color_from_env(),
            stdout_is_terminal: console::Term::stdout().is_term(),
            stderr_is_terminal: console::Term::stderr().is_term(),
        }
    }

    /// Whether the given channel is attached to a terminal.
    #[must_use]
    pub fn is_terminal(&self, channel: Channel) -> bool {
        match channel {
            Channel::Stdout => self.stdout_is_terminal,
            Channel::Stderr => self.stderr_is_terminal,
        }
    }

    /// Decide whether escape sequences may be written to `channel`.
    ///
    /// An explicit force wins, then `NO_COLOR`, then the stream must be a
    /// terminal. On Windows any terminal counts as color-capable and the
    /// build number is not checked; elsewhere the terminal type decides.
    #[must_use]
    pub fn supports_color(&self, channel: Channel) -> bool {
        if let Some(force) = self.force_color {
            return force;
        }
        if self.no_color || !self.is_terminal(channel) {
            return false;
        }
        if self.os == "windows" {
            return true;
        }
        match self.term.as_deref() {
            Some("dumb") => false,
            _ if self.colorterm.is_some() => true,
            Some(term) => color_term_pattern().is_match(term),
            None => false,
        }
    }
}

fn color_term_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(screen|xterm|vt100|vt220|rxvt)|color|ansi|cygwin|linux")
            .expect("TERM color pattern is valid")
    })
}

fn force_color_from_env() -> Option<bool> {
    if let Ok(value) = env::var("FORCE_COLOR") {
        return Some(!matches!(value.to_lowercase().as_str(), "0" | "false"));
    }
    if let Ok(value) = env::var("CLICOLOR_FORCE") {
        return Some(value != "0");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tty(term: &str) -> TerminalInfo {
        TerminalInfo {
            term: Some(term.to_string()),
            os: "linux".to_string(),
            stdout_is_terminal: true,
            stderr_is_terminal: true,
            ..TerminalInfo::default()
        }
    }

    #[test]
    fn test_xterm_supports_color() {
        assert!(tty("xterm-256color").supports_color(Channel::Stdout));
        assert!(tty("screen").supports_color(Channel::Stderr));
        assert!(tty("linux").supports_color(Channel::Stdout));
    }

    #[test]
    fn test_dumb_terminal_has_no_color() {
        assert!(!tty("dumb").supports_color(Channel::Stdout));
    }

    #[test]
    fn test_unknown_term_without_colorterm() {
        assert!(!tty("unknown").supports_color(Channel::Stdout));
        let info = TerminalInfo {
            colorterm: Some("truecolor".to_string()),
            ..tty("unknown")
        };
        assert!(info.supports_color(Channel::Stdout));
    }

    #[test]
    fn test_missing_term_has_no_color() {
        let info = TerminalInfo {
            term: None,
            ..tty("xterm")
        };
        assert!(!info.supports_color(Channel::Stdout));
    }

    #[test]
    fn test_no_color_wins_over_terminal() {
        let info = TerminalInfo {
            no_color: true,
            ..tty("xterm")
        };
        assert!(!info.supports_color(Channel::Stdout));
    }

    #[test]
    fn test_force_color_wins() {
        let forced = TerminalInfo {
            force_color: Some(true),
            no_color: true,
            stdout_is_terminal: false,
            ..tty("dumb")
        };
        assert!(forced.supports_color(Channel::Stdout));

        let off = TerminalInfo {
            force_color: Some(false),
            ..tty("xterm")
        };
        assert!(!off.supports_color(Channel::Stdout));
    }

    #[test]
    fn test_channel_must_be_terminal() {
        let info = TerminalInfo {
            stdout_is_terminal: false,
            ..tty("xterm")
        };
        assert!(!info.supports_color(Channel::Stdout));
        assert!(info.supports_color(Channel::Stderr));
    }

    #[test]
    fn test_windows_terminal_counts_as_capable() {
        let windows = TerminalInfo {
            os: "windows".to_string(),
            term: None,
            ..tty("")
        };
        assert!(windows.supports_color(Channel::Stdout));

        let redirected = TerminalInfo {
            stdout_is_terminal: false,
            ..windows.clone()
        };
        assert!(!redirected.supports_color(Channel::Stdout));

        let no_color = TerminalInfo {
            no_color: true,
            ..windows
        };
        assert!(!no_color.supports_color(Channel::Stderr));
    }

    #[test]
    fn test_detect_does_not_panic() {
        let info = TerminalInfo::detect();
        assert_eq!(info.os, std::env::consts::OS);
    }
}
