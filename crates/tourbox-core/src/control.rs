// TourBox Control Table
// Fixed mapping from 7-bit control identifiers to named controls

use std::fmt;

use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

/// How a control reports its edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// Buttons, D-pad and click controls: distinct Press and Release edges.
    Momentary,
    /// Wheels, knobs and dials: one Press per detent, never a Release.
    Rotary,
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlKind::Momentary => write!(f, "momentary"),
            ControlKind::Rotary => write!(f, "rotary"),
        }
    }
}

/// A physical control on the device, named as it appears in profiles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, IntoStaticStr, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Control {
    Tall,
    Side,
    Top,
    Short,
    ScrollClick,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    C1,
    C2,
    Tour,
    KnobClick,
    DialClick,
    KnobCcw,
    KnobCw,
    ScrollDown,
    ScrollUp,
    DialCcw,
    DialCw,
}

/// One row of the control table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlDescriptor {
    pub id: u8,
    pub control: Control,
    pub kind: ControlKind,
}

/// Look up a control identifier (already masked to 7 bits).
/// Identifiers no control claims are unknown.
pub fn lookup(id: u8) -> Option<ControlDescriptor> {
    Control::iter()
        .find(|control| control.id() == id)
        .map(Control::descriptor)
}

impl Control {
    /// Profile name of this control, e.g. `dpad_up`
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Parse a profile key into a control
    pub fn from_name(name: &str) -> Option<Self> {
        name.trim().parse().ok()
    }

    pub fn descriptor(self) -> ControlDescriptor {
        ControlDescriptor {
            id: self.id(),
            control: self,
            kind: self.kind(),
        }
    }

    /// Wire identifier
    pub fn id(self) -> u8 {
        match self {
            // Buttons
            Control::Tall => 0x00,
            Control::Side => 0x01,
            Control::Top => 0x02,
            Control::Short => 0x03,
            Control::ScrollClick => 0x0a,
            Control::DpadUp => 0x10,
            Control::DpadDown => 0x11,
            Control::DpadLeft => 0x12,
            Control::DpadRight => 0x13,
            Control::C1 => 0x22,
            Control::C2 => 0x23,
            Control::Tour => 0x2a,
            Control::KnobClick => 0x37,
            Control::DialClick => 0x38,
            // Rotary controls
            Control::KnobCcw => 0x04,
            Control::KnobCw => 0x44,
            Control::ScrollDown => 0x09,
            Control::ScrollUp => 0x49,
            Control::DialCcw => 0x0f,
            Control::DialCw => 0x4f,
        }
    }

    pub fn kind(self) -> ControlKind {
        match self {
            Control::KnobCcw
            | Control::KnobCw
            | Control::ScrollDown
            | Control::ScrollUp
            | Control::DialCcw
            | Control::DialCw => ControlKind::Rotary,
            _ => ControlKind::Momentary,
        }
    }

    pub fn is_rotary(self) -> bool {
        self.kind() == ControlKind::Rotary
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identifiers_are_unique_and_seven_bit() {
        let mut seen = HashSet::new();
        for control in Control::iter() {
            let id = control.id();
            assert!(id < 0x80, "{} has id {:#04x}", control, id);
            assert!(seen.insert(id), "duplicate id {:#04x}", id);
        }
        assert_eq!(seen.len(), 20);
    }

    #[test]
    fn test_descriptor_matches_accessors() {
        for control in Control::iter() {
            let descriptor = control.descriptor();
            assert_eq!(descriptor.control, control);
            assert_eq!(lookup(descriptor.id), Some(descriptor));
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup(0x01).map(|d| d.control), Some(Control::Side));
        assert_eq!(lookup(0x49).map(|d| d.control), Some(Control::ScrollUp));
        assert_eq!(lookup(0x2a).map(|d| d.control), Some(Control::Tour));
        assert!(lookup(0x05).is_none());
        assert!(lookup(0x7f).is_none());
    }

    #[test]
    fn test_names_round_trip() {
        assert_eq!(Control::DpadUp.name(), "dpad_up");
        assert_eq!(Control::KnobCcw.name(), "knob_ccw");
        assert_eq!(Control::C1.name(), "c1");
        assert_eq!(Control::from_name("scroll_click"), Some(Control::ScrollClick));
        assert_eq!(Control::from_name(" tour "), Some(Control::Tour));
        assert_eq!(Control::from_name("pedal"), None);
    }

    #[test]
    fn test_kinds() {
        for rotary in [
            Control::KnobCw,
            Control::KnobCcw,
            Control::ScrollUp,
            Control::ScrollDown,
            Control::DialCw,
            Control::DialCcw,
        ] {
            assert!(rotary.is_rotary(), "{} should be rotary", rotary);
        }
        assert_eq!(Control::KnobClick.kind(), ControlKind::Momentary);
        assert_eq!(Control::ScrollClick.kind(), ControlKind::Momentary);
        assert_eq!(Control::Side.id(), 0x01);
        assert_eq!(Control::DialCw.id(), 0x4f);
    }
}
