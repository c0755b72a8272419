// TourBox Dry-Run Output
// Logs and records every sink call instead of injecting it

use std::sync::Arc;

use parking_lot::Mutex;

use super::{CommandSpawner, KeySink, ShellSpawnError, SinkError};
use crate::key::KeyToken;

/// One call made against a sink or spawner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Press(KeyToken),
    Release(KeyToken),
    Type(String),
    Shell(String),
}

/// Sink and spawner that only log.
///
/// Clones share one call log, so the same `DryRun` can serve as both the
/// key sink and the spawner and still record calls in order.
#[derive(Debug, Clone, Default)]
pub struct DryRun {
    calls: Arc<Mutex<Vec<SinkCall>>>,
}

impl DryRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every call so far
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().clone()
    }

    /// Remove and return every call so far
    pub fn take_calls(&self) -> Vec<SinkCall> {
        std::mem::take(&mut *self.calls.lock())
    }

    fn record(&self, call: SinkCall) {
        log::info!("[dry-run] {:?}", call);
        self.calls.lock().push(call);
    }
}

impl KeySink for DryRun {
    fn press(&mut self, key: KeyToken) -> Result<(), SinkError> {
        self.record(SinkCall::Press(key));
        Ok(())
    }

    fn release(&mut self, key: KeyToken) -> Result<(), SinkError> {
        self.record(SinkCall::Release(key));
        Ok(())
    }

    fn type_text(&mut self, text: &str) -> Result<(), SinkError> {
        self.record(SinkCall::Type(text.to_string()));
        Ok(())
    }
}

impl CommandSpawner for DryRun {
    fn spawn_detached(&mut self, command: &str) -> Result<(), ShellSpawnError> {
        self.record(SinkCall::Shell(command.to_string()));
        Ok(())
    }
}
