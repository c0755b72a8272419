// TourBox Wire Protocol
// One byte per control event, plus the vendor unlock handshake

use std::time::Duration;

use crate::control::{self, ControlDescriptor};
use crate::transport::{Transport, TransportError};
use crate::Edge;

/// Command that switches the device into event-reporting mode
pub const UNLOCK_COMMAND: [u8; 8] = [0x55, 0x00, 0x07, 0x88, 0x94, 0x00, 0x1a, 0xfe];

/// First byte of a successful unlock response
pub const UNLOCK_ACK: u8 = 0x07;

/// How long to wait for the first response byte after unlocking
pub const UNLOCK_TIMEOUT: Duration = Duration::from_millis(300);

/// Quiet period that ends draining of trailing response bytes
const UNLOCK_DRAIN_TIMEOUT: Duration = Duration::from_millis(20);

/// Upper bound on response bytes drained after the first one
const UNLOCK_DRAIN_LIMIT: usize = 100;

/// Mask selecting the control identifier bits
pub const CONTROL_ID_MASK: u8 = 0x7f;

/// A decoded control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlEvent {
    /// Control identifier (bits 0-6)
    pub control_id: u8,
    /// Press or Release (bit 7)
    pub edge: Edge,
    /// Byte as received, for logging
    pub raw: u8,
}

/// A control identifier that is not in the control table
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown control code {raw:#04x} (id {id:#04x})")]
pub struct UnknownControl {
    pub id: u8,
    pub raw: u8,
}

/// Decode one wire byte. Total: every byte yields an event.
pub fn decode(byte: u8) -> ControlEvent {
    ControlEvent {
        control_id: byte & CONTROL_ID_MASK,
        edge: Edge::from_byte(byte),
        raw: byte,
    }
}

impl ControlEvent {
    /// Classify the event against the control table
    pub fn descriptor(&self) -> Result<ControlDescriptor, UnknownControl> {
        control::lookup(self.control_id).ok_or(UnknownControl {
            id: self.control_id,
            raw: self.raw,
        })
    }
}

/// Outcome of the unlock handshake. Every variant counts as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockStatus {
    /// Device answered with the acknowledgment byte
    Acknowledged,
    /// No answer within the timeout (older firmware stays silent)
    Silent,
    /// Device answered with something else
    Unexpected(u8),
}

/// Send the unlock command and wait briefly for the acknowledgment.
///
/// Only a transport I/O failure is an error.
pub fn unlock<T: Transport + ?Sized>(transport: &mut T) -> Result<UnlockStatus, TransportError> {
    log::info!("Sending unlock command...");
    transport.write_bytes(&UNLOCK_COMMAND)?;

    let Some(first) = transport.read_byte(UNLOCK_TIMEOUT)? else {
        log::warn!("No unlock response (may still work)");
        return Ok(UnlockStatus::Silent);
    };

    let mut drained = 0;
    while drained < UNLOCK_DRAIN_LIMIT && transport.read_byte(UNLOCK_DRAIN_TIMEOUT)?.is_some() {
        drained += 1;
    }
    log::debug!("Unlock response: first={:#04x}, {} trailing byte(s)", first, drained);

    if first == UNLOCK_ACK {
        log::info!("TourBox unlocked successfully");
        Ok(UnlockStatus::Acknowledged)
    } else {
        log::warn!("Unexpected unlock response {:#04x} (may still work)", first);
        Ok(UnlockStatus::Unexpected(first))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Control;
    use std::collections::VecDeque;

    struct FakePort {
        incoming: VecDeque<Result<Option<u8>, TransportError>>,
        written: Vec<u8>,
    }

    impl FakePort {
        fn new(incoming: Vec<Result<Option<u8>, TransportError>>) -> Self {
            Self {
                incoming: incoming.into(),
                written: Vec::new(),
            }
        }
    }

    impl Transport for FakePort {
        fn read_byte(&mut self, _timeout: Duration) -> Result<Option<u8>, TransportError> {
            self.incoming.pop_front().unwrap_or(Ok(None))
        }

        fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
            self.written.extend_from_slice(bytes);
            Ok(())
        }

        fn close(&mut self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    #[test]
    fn test_decode_all_bytes() {
        for b in 0..=255u8 {
            let event = decode(b);
            assert_eq!(event.control_id, b & 0x7f);
            assert_eq!(event.edge == Edge::Release, b & 0x80 != 0);
            assert_eq!(event.raw, b);
        }
    }

    #[test]
    fn test_decode_side_press_and_release() {
        let press = decode(0x01);
        assert_eq!(press.edge, Edge::Press);
        assert_eq!(press.descriptor().unwrap().control, Control::Side);

        let release = decode(0x81);
        assert_eq!(release.edge, Edge::Release);
        assert_eq!(release.descriptor().unwrap().control, Control::Side);
    }

    #[test]
    fn test_decode_unknown_control() {
        let event = decode(0x85);
        assert_eq!(
            event.descriptor(),
            Err(UnknownControl { id: 0x05, raw: 0x85 })
        );
    }

    #[test]
    fn test_unlock_acknowledged() {
        let mut port = FakePort::new(vec![Ok(Some(UNLOCK_ACK)), Ok(Some(0x00)), Ok(Some(0x01))]);
        assert_eq!(unlock(&mut port).unwrap(), UnlockStatus::Acknowledged);
        assert_eq!(port.written, UNLOCK_COMMAND);
        assert!(port.incoming.is_empty(), "trailing bytes should be drained");
    }

    #[test]
    fn test_unlock_silent_is_success() {
        let mut port = FakePort::new(vec![]);
        assert_eq!(unlock(&mut port).unwrap(), UnlockStatus::Silent);
    }

    #[test]
    fn test_unlock_unexpected_is_success() {
        let mut port = FakePort::new(vec![Ok(Some(0x42))]);
        assert_eq!(unlock(&mut port).unwrap(), UnlockStatus::Unexpected(0x42));
    }

    #[test]
    fn test_unlock_io_error_is_fatal() {
        let mut port = FakePort::new(vec![Err(TransportError::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "unplugged",
        )))]);
        assert!(matches!(unlock(&mut port), Err(TransportError::Io(_))));
    }
}
