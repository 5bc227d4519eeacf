//! # Command Context
//!
//! Per-invocation state threaded through the guard chain, the action and any
//! nested subcommand delegation: the source event, the remaining argument tokens
//! and the reply sink.

use crate::domain::traits::ReplySink;
use crate::domain::types::MessageEvent;

/// Placeholder replaced with the dispatcher prefix in every reply.
pub const PREFIX_PLACEHOLDER: &str = "{{prefix}}";

pub struct CommandContext<'a> {
    event: &'a MessageEvent,
    args: Vec<String>,
    sink: &'a dyn ReplySink,
    prefix: &'a str,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        event: &'a MessageEvent,
        args: Vec<String>,
        sink: &'a dyn ReplySink,
        prefix: &'a str,
    ) -> Self {
        Self {
            event,
            args,
            sink,
            prefix,
        }
    }

    pub fn event(&self) -> &MessageEvent {
        self.event
    }

    pub fn sender(&self) -> &str {
        &self.event.sender
    }

    /// Tokens not yet consumed by a dispatch layer.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Remove and return the leading token. Only dispatch layers and
    /// argument-checking guards consume tokens.
    pub fn consume(&mut self) -> Option<String> {
        if self.args.is_empty() {
            None
        } else {
            Some(self.args.remove(0))
        }
    }

    pub fn reply(&self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.contains(PREFIX_PLACEHOLDER) {
            self.sink.reply(&text.replace(PREFIX_PLACEHOLDER, self.prefix));
        } else {
            self.sink.reply(text);
        }
    }
}
