// TourBox Output Layer
// Keystroke sinks and the process spawner the engine drives

mod dry_run;
mod shell;

#[cfg(feature = "uinput")]
mod uinput;

pub use dry_run::{DryRun, SinkCall};
pub use shell::ShellSpawner;

#[cfg(feature = "uinput")]
pub use uinput::VirtualKeyboard;

use crate::key::KeyToken;

/// Errors from a keystroke sink. The engine logs these and moves on.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("no key code for '{0}'")]
    Unmappable(KeyToken),

    #[error("failed to create virtual device: {0}")]
    DeviceCreation(String),

    #[error("failed to write event: {0}")]
    Write(#[from] std::io::Error),
}

/// A shell command that could not be started
#[derive(Debug, thiserror::Error)]
#[error("failed to launch '{command}': {source}")]
pub struct ShellSpawnError {
    pub command: String,
    #[source]
    pub source: std::io::Error,
}

/// OS-level keystroke injection
pub trait KeySink {
    /// Put a key down
    fn press(&mut self, key: KeyToken) -> Result<(), SinkError>;

    /// Let a key up
    fn release(&mut self, key: KeyToken) -> Result<(), SinkError>;

    /// Type literal text
    fn type_text(&mut self, text: &str) -> Result<(), SinkError>;
}

/// Fire-and-forget process launching
pub trait CommandSpawner {
    /// Start a command line without waiting for it; output is discarded
    fn spawn_detached(&mut self, command: &str) -> Result<(), ShellSpawnError>;
}
