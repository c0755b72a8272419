// TourBox Transport Layer
// Byte channel to the device, the serial implementation, and port discovery

mod discovery;
mod serial;

pub use discovery::{candidate_ports, find_port, find_port_in, PORT_PREFIXES};
pub use serial::SerialPort;

use std::path::PathBuf;
use std::time::Duration;

/// Errors from opening or talking to the device
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("no TourBox port found (looked for {0})")]
    NotFound(String),

    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("device disconnected")]
    Disconnected,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bidirectional byte channel to the controller
pub trait Transport {
    /// Wait up to `timeout` for one byte. `Ok(None)` means nothing arrived.
    fn read_byte(&mut self, timeout: Duration) -> Result<Option<u8>, TransportError>;

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Release the underlying channel. Calling it twice is harmless.
    fn close(&mut self) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read_byte(&mut self, timeout: Duration) -> Result<Option<u8>, TransportError> {
        (**self).read_byte(timeout)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).write_bytes(bytes)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        (**self).close()
    }
}
