//! Append-only FIFO of pending messages.

use crate::message::{Message, Severity};

/// Ordered, append-only sequence of pending messages.
///
/// Messages come back out of [`drain`](MessageQueue::drain) in exactly the
/// order they were enqueued. There is no prioritization by severity.
#[derive(Debug, Default)]
pub struct MessageQueue {
    messages: Vec<Message>,
}

impl MessageQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message stamped with `indent`.
    pub fn enqueue(&mut self, text: impl Into<String>, indent: usize, severity: Severity) {
        self.messages.push(Message::new(text, indent, severity));
    }

    /// Appends an already built message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Moves every pending message out, leaving the queue empty.
    ///
    /// Calling this again with nothing pending yields an empty vector.
    pub fn drain(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }

    /// Number of pending messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterates pending messages without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }
}
