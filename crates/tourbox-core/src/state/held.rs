// TourBox Held State
// Per-control record of key tokens pressed and not yet released

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::control::Control;
use crate::key::KeyToken;

/// Key tokens of one held control, in press order
pub type HeldKeys = SmallVec<[KeyToken; 4]>;

/// Tracks which controls are holding keys down.
///
/// A control with an entry is `Held`; without one it is `Idle`. Entries keep
/// insertion order so cleanup releases the most recently held control first.
#[derive(Debug, Clone, Default)]
pub struct HeldState {
    held: IndexMap<Control, HeldKeys>,
}

impl HeldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the keys pressed for a control, returning any stale entry
    pub fn hold(&mut self, control: Control, keys: HeldKeys) -> Option<HeldKeys> {
        let stale = self.held.shift_remove(&control);
        self.held.insert(control, keys);
        stale
    }

    /// Remove and return a control's entry
    pub fn take(&mut self, control: Control) -> Option<HeldKeys> {
        self.held.shift_remove(&control)
    }

    /// Keys a control is holding, if any
    pub fn get(&self, control: Control) -> Option<&[KeyToken]> {
        self.held.get(&control).map(|keys| keys.as_slice())
    }

    pub fn is_held(&self, control: Control) -> bool {
        self.held.contains_key(&control)
    }

    /// Remove every entry, most recently held first
    pub fn drain(&mut self) -> Vec<(Control, HeldKeys)> {
        let mut entries: Vec<_> = self.held.drain(..).collect();
        entries.reverse();
        entries
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use smallvec::smallvec;

    fn cmd_v() -> HeldKeys {
        smallvec![KeyToken::Named(Key::Cmd), KeyToken::Literal('v')]
    }

    #[test]
    fn test_hold_and_take() {
        let mut state = HeldState::new();
        assert!(!state.is_held(Control::Top));

        assert!(state.hold(Control::Top, cmd_v()).is_none());
        assert!(state.is_held(Control::Top));
        assert_eq!(state.get(Control::Top), Some(cmd_v().as_slice()));

        assert_eq!(state.take(Control::Top), Some(cmd_v()));
        assert!(state.is_empty());
    }

    #[test]
    fn test_hold_returns_stale_entry() {
        let mut state = HeldState::new();
        state.hold(Control::Top, cmd_v());
        let stale = state.hold(Control::Top, smallvec![KeyToken::Named(Key::Enter)]);
        assert_eq!(stale, Some(cmd_v()));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_take_missing_is_none() {
        let mut state = HeldState::new();
        assert!(state.take(Control::Side).is_none());
        assert!(state.is_empty());
    }

    #[test]
    fn test_drain_is_most_recent_first() {
        let mut state = HeldState::new();
        state.hold(Control::Side, smallvec![KeyToken::Literal('a')]);
        state.hold(Control::Top, smallvec![KeyToken::Literal('b')]);
        state.hold(Control::Tall, smallvec![KeyToken::Literal('c')]);
        // Re-holding moves a control to the end
        state.hold(Control::Side, smallvec![KeyToken::Literal('d')]);

        let order: Vec<Control> = state.drain().into_iter().map(|(c, _)| c).collect();
        assert_eq!(order, vec![Control::Side, Control::Tall, Control::Top]);
        assert!(state.is_empty());
    }
}
