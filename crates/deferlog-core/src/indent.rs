//! Nesting depth tracking.

/// Spaces per nesting level unless configured otherwise.
pub const DEFAULT_INDENT_UNIT: usize = 2;

/// Current nesting depth and the width it translates to.
///
/// The level never goes below zero: decreasing at level 0 is a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indentation {
    level: usize,
    unit: usize,
}

impl Default for Indentation {
    fn default() -> Self {
        Self::new(DEFAULT_INDENT_UNIT)
    }
}

impl Indentation {
    /// Creates a tracker at level 0. A `unit` of 0 is clamped to 1.
    #[must_use]
    pub fn new(unit: usize) -> Self {
        Self {
            level: 0,
            unit: unit.max(1),
        }
    }

    pub fn increase(&mut self) {
        self.level += 1;
    }

    pub fn decrease(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Leading spaces for a message enqueued right now.
    #[must_use]
    pub fn width(&self) -> usize {
        self.level * self.unit
    }

    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    #[must_use]
    pub fn unit(&self) -> usize {
        self.unit
    }
}
