//! Named enter/leave scopes.
//!
//! Every enter pushes one name and every leave pops one, so scopes nest in
//! strict LIFO order no matter how many sibling pairs occur in between.

/// Stack of scope names pushed by `enter` and popped by `leave`.
#[derive(Debug, Default, Clone)]
pub struct ScopeStack {
    names: Vec<String>,
}

impl ScopeStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    /// Pops the innermost name; an empty stack yields the empty name.
    pub fn pop(&mut self) -> String {
        self.names.pop().unwrap_or_default()
    }

    #[must_use]
    pub fn peek(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Derives the scope name from an enter message: its first
/// whitespace-delimited token, or the whole message if it has none.
#[must_use]
pub fn scope_name(message: &str) -> &str {
    message.split_whitespace().next().unwrap_or(message)
}

/// Builds the text of a leave line from the popped name and optional message.
#[must_use]
pub fn leave_text(name: &str, message: Option<&str>) -> String {
    match (name.is_empty(), message.filter(|m| !m.is_empty())) {
        (false, Some(msg)) => format!("{name} {msg}"),
        (false, None) => name.to_string(),
        (true, Some(msg)) => msg.to_string(),
        (true, None) => String::new(),
    }
}

/// Open marker padded so that marker plus padding spans one indentation unit.
#[must_use]
pub fn open_marker(unit: usize) -> String {
    marker('>', unit)
}

/// Close marker, same width as [`open_marker`].
#[must_use]
pub fn close_marker(unit: usize) -> String {
    marker('<', unit)
}

fn marker(symbol: char, unit: usize) -> String {
    let mut out = String::with_capacity(unit.max(1));
    out.push(symbol);
    out.extend(std::iter::repeat_n(' ', unit.saturating_sub(1)));
    out
}
