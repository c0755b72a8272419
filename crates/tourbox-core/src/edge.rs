// TourBox Edge Type
// Press/Release transition carried by every control byte

use std::fmt;

/// Transition of a control, taken from bit 7 of the wire byte.
///
///   bit 7 clear == 'pressed'
///   bit 7 set   == 'released'
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Press,
    Release,
}

impl Edge {
    /// Bit that marks a release on the wire
    pub const RELEASE_BIT: u8 = 0x80;

    /// Returns true if this is a PRESS edge
    pub fn is_press(self) -> bool {
        matches!(self, Edge::Press)
    }

    /// Returns true if this is a RELEASE edge
    pub fn is_release(self) -> bool {
        matches!(self, Edge::Release)
    }

    /// Read the edge out of a raw wire byte
    pub fn from_byte(byte: u8) -> Self {
        if byte & Self::RELEASE_BIT != 0 {
            Edge::Release
        } else {
            Edge::Press
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Press => write!(f, "press"),
            Edge::Release => write!(f, "release"),
        }
    }
}
