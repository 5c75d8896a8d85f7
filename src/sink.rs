//! Hook sinks: the host-supplied capability that takes a unit's messages.

use std::sync::{Mutex, PoisonError};

use crate::error::HookError;

/// Accepts one text message per unit event.
///
/// Implemented for any `Fn(&str) -> Result<(), HookError>`, so a closure is
/// usually all a host needs.
pub trait HookSink: Send + Sync {
    fn hook(&self, message: &str) -> Result<(), HookError>;
}

impl<F> HookSink for F
where
    F: Fn(&str) -> Result<(), HookError> + Send + Sync,
{
    fn hook(&self, message: &str) -> Result<(), HookError> {
        self(message)
    }
}

/// Keeps every message it is handed, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages seen so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HookSink for RecordingSink {
    fn hook(&self, message: &str) -> Result<(), HookError> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
        Ok(())
    }
}

/// Forwards messages to the `log` facade at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl HookSink for LogSink {
    fn hook(&self, message: &str) -> Result<(), HookError> {
        info!("[HOOK] {}", message);
        Ok(())
    }
}
