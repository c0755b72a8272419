// TourBox uinput Output
// Virtual keyboard device that injects key events through /dev/uinput

use evdev::uinput::VirtualDeviceBuilder;
use evdev::{AttributeSet, EventType, InputEvent};

use super::{KeySink, SinkError};
use crate::key::{char_code, KeyToken};

const SHIFT_CODE: u16 = 42;
const SHIFT_R_CODE: u16 = 54;
const CTRL_CODE: u16 = 29;
const U_CODE: u16 = 22;
const ENTER_CODE: u16 = 28;

/// Modifier bookkeeping for the virtual keyboard
#[derive(Debug, Default)]
struct ModifierState {
    /// Modifier codes currently down, in press order
    held: Vec<u16>,
    /// Literal codes pressed with a shift we added ourselves
    shifted_literals: Vec<u16>,
}

impl ModifierState {
    fn track(&mut self, key: KeyToken, down: bool) {
        if let KeyToken::Named(named) = key {
            if named.is_modifier() {
                let code = named.code();
                self.held.retain(|&held| held != code);
                if down {
                    self.held.push(code);
                }
            }
        }
    }

    fn shift_held(&self) -> bool {
        self.held.iter().any(|&code| code == SHIFT_CODE || code == SHIFT_R_CODE)
    }

    /// Whether pressing `code` needs a synthetic shift around it
    fn press_needs_shift(&mut self, code: u16, shifted: bool) -> bool {
        if !shifted || self.shift_held() {
            return false;
        }
        self.shifted_literals.push(code);
        true
    }

    /// Whether releasing `code` must also lift a synthetic shift
    fn release_needs_shift(&mut self, code: u16) -> bool {
        match self.shifted_literals.iter().position(|&c| c == code) {
            Some(index) => {
                self.shifted_literals.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Virtual uinput keyboard
pub struct VirtualKeyboard {
    device: evdev::uinput::VirtualDevice,
    modifiers: ModifierState,
}

impl VirtualKeyboard {
    /// Create the virtual device. Needs write access to /dev/uinput.
    pub fn new() -> Result<Self, SinkError> {
        let mut keys = AttributeSet::new();
        for code in 0..256u16 {
            keys.insert(evdev::Key::new(code));
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(|e| SinkError::DeviceCreation(e.to_string()))?
            .name("TourBox (virtual) Keyboard")
            .with_keys(&keys)
            .map_err(|e| SinkError::DeviceCreation(e.to_string()))?
            .build()
            .map_err(|e| SinkError::DeviceCreation(e.to_string()))?;

        log::info!("Created virtual keyboard device");
        Ok(Self {
            device,
            modifiers: ModifierState::default(),
        })
    }

    fn write_code(&mut self, code: u16, down: bool) -> Result<(), SinkError> {
        let key_event = InputEvent::new(EventType::KEY, code, i32::from(down));
        // The kernel only processes the key event after a SYN
        let syn_event = InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);
        self.device.emit(&[key_event, syn_event])?;
        Ok(())
    }

    fn tap_code(&mut self, code: u16) -> Result<(), SinkError> {
        self.write_code(code, true)?;
        self.write_code(code, false)
    }

    fn token_code(key: KeyToken) -> Result<(u16, bool), SinkError> {
        match key {
            KeyToken::Named(named) => Ok((named.code(), false)),
            KeyToken::Literal(c) => char_code(c).ok_or(SinkError::Unmappable(key)),
        }
    }

    fn send_char(&mut self, c: char) -> Result<(), SinkError> {
        match char_code(c) {
            Some((code, true)) => {
                self.write_code(SHIFT_CODE, true)?;
                self.tap_code(code)?;
                self.write_code(SHIFT_CODE, false)
            }
            Some((code, false)) => self.tap_code(code),
            None => self.send_unicode(c),
        }
    }

    /// Ctrl+Shift+U, hex codepoint, Enter
    fn send_unicode(&mut self, c: char) -> Result<(), SinkError> {
        self.write_code(CTRL_CODE, true)?;
        self.write_code(SHIFT_CODE, true)?;
        self.tap_code(U_CODE)?;
        self.write_code(SHIFT_CODE, false)?;
        self.write_code(CTRL_CODE, false)?;

        for digit in format!("{:x}", c as u32).chars() {
            let (code, _) =
                char_code(digit).ok_or(SinkError::Unmappable(KeyToken::Literal(digit)))?;
            self.tap_code(code)?;
        }
        self.tap_code(ENTER_CODE)
    }
}

impl KeySink for VirtualKeyboard {
    fn press(&mut self, key: KeyToken) -> Result<(), SinkError> {
        let (code, shifted) = Self::token_code(key)?;
        // An already held shift covers the literal; lifting ours would drop it
        if self.modifiers.press_needs_shift(code, shifted) {
            self.write_code(SHIFT_CODE, true)?;
        }
        self.write_code(code, true)?;
        self.modifiers.track(key, true);
        Ok(())
    }

    fn release(&mut self, key: KeyToken) -> Result<(), SinkError> {
        let (code, _) = Self::token_code(key)?;
        self.write_code(code, false)?;
        if self.modifiers.release_needs_shift(code) {
            self.write_code(SHIFT_CODE, false)?;
        }
        self.modifiers.track(key, false);
        Ok(())
    }

    fn type_text(&mut self, text: &str) -> Result<(), SinkError> {
        // Held modifiers would turn typed characters into shortcuts.
        let held = self.modifiers.held.clone();
        for &code in held.iter().rev() {
            self.write_code(code, false)?;
        }

        for c in text.chars() {
            self.send_char(c)?;
            // Some apps drop characters that arrive with zero gap
            std::thread::sleep(std::time::Duration::from_millis(1));
        }

        for &code in &held {
            self.write_code(code, true)?;
        }
        Ok(())
    }
}

impl Drop for VirtualKeyboard {
    fn drop(&mut self) {
        let mut held = std::mem::take(&mut self.modifiers.held);
        if !self.modifiers.shifted_literals.is_empty() {
            held.push(SHIFT_CODE);
        }
        for code in held.into_iter().rev() {
            let _ = self.write_code(code, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;

    #[test]
    fn test_token_code() {
        assert_eq!(
            VirtualKeyboard::token_code(KeyToken::Named(Key::Cmd)).unwrap(),
            (125, false)
        );
        assert_eq!(
            VirtualKeyboard::token_code(KeyToken::Literal('c')).unwrap(),
            (46, false)
        );
        assert_eq!(
            VirtualKeyboard::token_code(KeyToken::Literal('?')).unwrap(),
            (53, true)
        );
        assert!(matches!(
            VirtualKeyboard::token_code(KeyToken::Literal('é')),
            Err(SinkError::Unmappable(_))
        ));
    }

    #[test]
    fn test_shifted_literal_adds_and_lifts_its_own_shift() {
        let mut state = ModifierState::default();
        let (code, shifted) = VirtualKeyboard::token_code(KeyToken::Literal('?')).unwrap();

        assert!(state.press_needs_shift(code, shifted));
        assert!(state.release_needs_shift(code));
        assert!(!state.release_needs_shift(code));
    }

    #[test]
    fn test_held_shift_is_not_lifted_by_shifted_literal() {
        let mut state = ModifierState::default();
        let shift = KeyToken::Named(Key::Shift);
        let (code, shifted) = VirtualKeyboard::token_code(KeyToken::Literal('?')).unwrap();

        // shift+? as one combo
        state.track(shift, true);
        assert!(!state.press_needs_shift(code, shifted));
        assert!(!state.release_needs_shift(code));
        assert_eq!(state.held, vec![SHIFT_CODE]);

        state.track(shift, false);
        assert!(state.held.is_empty());
    }

    #[test]
    fn test_right_shift_also_covers_shifted_literal() {
        let mut state = ModifierState::default();
        state.track(KeyToken::Named(Key::ShiftR), true);
        assert!(!state.press_needs_shift(53, true));
    }

    #[test]
    fn test_plain_literal_never_needs_shift() {
        let mut state = ModifierState::default();
        assert!(!state.press_needs_shift(46, false));
        assert!(!state.release_needs_shift(46));
    }

    #[test]
    fn test_unicode_fallback_codes_are_fixed() {
        assert_eq!(Key::Shift.code(), SHIFT_CODE);
        assert_eq!(Key::ShiftR.code(), SHIFT_R_CODE);
        assert_eq!(Key::Ctrl.code(), CTRL_CODE);
        assert_eq!(Key::Enter.code(), ENTER_CODE);
        assert_eq!(char_code('u'), Some((U_CODE, false)));
    }
}
