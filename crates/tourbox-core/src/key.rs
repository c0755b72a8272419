// TourBox Key Tokens
// Symbolic key table used by action strings, plus Linux key codes for output

use std::fmt;

use strum_macros::{EnumIter, EnumString, IntoStaticStr};

/// A named key from the symbolic key table.
///
/// Names are the lower-case forms accepted in action strings (`cmd`, `page_up`, `f5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Key {
    // Modifiers
    Cmd,
    Ctrl,
    Alt,
    Shift,
    CmdL,
    CmdR,
    CtrlL,
    CtrlR,
    AltL,
    AltR,
    ShiftL,
    ShiftR,
    // Navigation
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    // Whitespace and control keys
    Space,
    Enter,
    Tab,
    Esc,
    Backspace,
    Delete,
    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
}

impl Key {
    /// Action-string name of this key
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Resolve a (lower-case, trimmed) action-string part
    pub fn from_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// Returns true for the shift/ctrl/alt/cmd family
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Key::Cmd
                | Key::Ctrl
                | Key::Alt
                | Key::Shift
                | Key::CmdL
                | Key::CmdR
                | Key::CtrlL
                | Key::CtrlR
                | Key::AltL
                | Key::AltR
                | Key::ShiftL
                | Key::ShiftR
        )
    }

    /// Linux input-event-codes.h code. `cmd` is the Meta (Super) key.
    pub fn code(self) -> u16 {
        match self {
            Key::Cmd | Key::CmdL => 125,
            Key::CmdR => 126,
            Key::Ctrl | Key::CtrlL => 29,
            Key::CtrlR => 97,
            Key::Alt | Key::AltL => 56,
            Key::AltR => 100,
            Key::Shift | Key::ShiftL => 42,
            Key::ShiftR => 54,
            Key::Up => 103,
            Key::Down => 108,
            Key::Left => 105,
            Key::Right => 106,
            Key::Home => 102,
            Key::End => 107,
            Key::PageUp => 104,
            Key::PageDown => 109,
            Key::Space => 57,
            Key::Enter => 28,
            Key::Tab => 15,
            Key::Esc => 1,
            Key::Backspace => 14,
            Key::Delete => 111,
            Key::F1 => 59,
            Key::F2 => 60,
            Key::F3 => 61,
            Key::F4 => 62,
            Key::F5 => 63,
            Key::F6 => 64,
            Key::F7 => 65,
            Key::F8 => 66,
            Key::F9 => 67,
            Key::F10 => 68,
            Key::F11 => 87,
            Key::F12 => 88,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pressable token: a named key or a single literal character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyToken {
    Named(Key),
    Literal(char),
}

impl From<Key> for KeyToken {
    fn from(key: Key) -> Self {
        KeyToken::Named(key)
    }
}

impl From<char> for KeyToken {
    fn from(c: char) -> Self {
        KeyToken::Literal(c)
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyToken::Named(key) => write!(f, "{}", key),
            KeyToken::Literal(c) => write!(f, "{}", c),
        }
    }
}

/// Linux key code for a letter or digit on a US layout
fn alnum_code(c: char) -> Option<u16> {
    let code = match c {
        'q' => 16,
        'w' => 17,
        'e' => 18,
        'r' => 19,
        't' => 20,
        'y' => 21,
        'u' => 22,
        'i' => 23,
        'o' => 24,
        'p' => 25,
        'a' => 30,
        's' => 31,
        'd' => 32,
        'f' => 33,
        'g' => 34,
        'h' => 35,
        'j' => 36,
        'k' => 37,
        'l' => 38,
        'z' => 44,
        'x' => 45,
        'c' => 46,
        'v' => 47,
        'b' => 48,
        'n' => 49,
        'm' => 50,
        '1'..='9' => c as u16 - '1' as u16 + 2,
        '0' => 11,
        _ => return None,
    };
    Some(code)
}

/// Linux key code for an ASCII character, and whether it needs shift (US layout).
pub fn char_code(c: char) -> Option<(u16, bool)> {
    if c.is_ascii_lowercase() || c.is_ascii_digit() {
        return alnum_code(c).map(|code| (code, false));
    }
    if c.is_ascii_uppercase() {
        return alnum_code(c.to_ascii_lowercase()).map(|code| (code, true));
    }

    let entry = match c {
        ' ' => (57, false),
        '\n' => (28, false),
        '\t' => (15, false),
        '-' => (12, false),
        '_' => (12, true),
        '=' => (13, false),
        '+' => (13, true),
        '[' => (26, false),
        '{' => (26, true),
        ']' => (27, false),
        '}' => (27, true),
        '\\' => (43, false),
        '|' => (43, true),
        ';' => (39, false),
        ':' => (39, true),
        '\'' => (40, false),
        '"' => (40, true),
        ',' => (51, false),
        '<' => (51, true),
        '.' => (52, false),
        '>' => (52, true),
        '/' => (53, false),
        '?' => (53, true),
        '`' => (41, false),
        '~' => (41, true),
        '!' => (2, true),
        '@' => (3, true),
        '#' => (4, true),
        '$' => (5, true),
        '%' => (6, true),
        '^' => (7, true),
        '&' => (8, true),
        '*' => (9, true),
        '(' => (10, true),
        ')' => (11, true),
        _ => return None,
    };
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_key_from_name() {
        assert_eq!(Key::from_name("cmd"), Some(Key::Cmd));
        assert_eq!(Key::from_name("shift_r"), Some(Key::ShiftR));
        assert_eq!(Key::from_name("page_down"), Some(Key::PageDown));
        assert_eq!(Key::from_name("esc"), Some(Key::Esc));
        assert_eq!(Key::from_name("f12"), Some(Key::F12));
        assert_eq!(Key::from_name("f13"), None);
        assert_eq!(Key::from_name("c"), None);
    }

    #[test]
    fn test_every_name_round_trips() {
        for key in Key::iter() {
            assert_eq!(Key::from_name(key.name()), Some(key));
        }
    }

    #[test]
    fn test_modifiers() {
        assert!(Key::Cmd.is_modifier());
        assert!(Key::AltR.is_modifier());
        assert!(!Key::Enter.is_modifier());
        assert!(!Key::F1.is_modifier());
    }

    #[test]
    fn test_key_codes() {
        assert_eq!(Key::Cmd.code(), 125);
        assert_eq!(Key::Enter.code(), 28);
        assert_eq!(Key::F1.code(), 59);
        assert_eq!(Key::F11.code(), 87);
        assert_eq!(Key::PageUp.code(), 104);
    }

    #[test]
    fn test_char_code() {
        assert_eq!(char_code('a'), Some((30, false)));
        assert_eq!(char_code('C'), Some((46, true)));
        assert_eq!(char_code('1'), Some((2, false)));
        assert_eq!(char_code('9'), Some((10, false)));
        assert_eq!(char_code('0'), Some((11, false)));
        assert_eq!(char_code(']'), Some((27, false)));
        assert_eq!(char_code('/'), Some((53, false)));
        assert_eq!(char_code('?'), Some((53, true)));
        assert_eq!(char_code('é'), None);
    }

    #[test]
    fn test_token_display() {
        assert_eq!(KeyToken::Named(Key::PageUp).to_string(), "page_up");
        assert_eq!(KeyToken::Literal('=').to_string(), "=");
    }
}
