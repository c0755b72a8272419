// TourBox Dispatch Engine
// Turns decoded control events into key presses, releases, text and shell launches

use smallvec::SmallVec;

use crate::config::{
    parse_action, ActionProgram, ActionSpec, ActionStep, Mapping, Profile, TriggerMode,
};
use crate::control::{Control, ControlKind};
use crate::edge::Edge;
use crate::key::KeyToken;
use crate::output::{CommandSpawner, KeySink};
use crate::protocol::ControlEvent;
use crate::state::{HeldKeys, HeldState};

/// What one dispatch did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Program(s) ran to completion on press
    Tapped,
    /// Keys pressed and left down until release
    Held,
    /// Held keys released
    Released,
    /// Release with nothing held; keys parsed afresh and released
    FallbackReleased,
    /// Edge has no effect for this control or mapping
    Ignored,
    /// Known control with no mapping in the profile
    Unmapped,
    /// Identifier not in the control table
    UnknownControl,
}

/// Stateful dispatcher. Owns the held-key record and the output side.
///
/// Events must be fed in arrival order from a single consumer.
pub struct Engine<S, C> {
    sink: S,
    spawner: C,
    held: HeldState,
}

impl<S: KeySink, C: CommandSpawner> Engine<S, C> {
    pub fn new(sink: S, spawner: C) -> Self {
        Self {
            sink,
            spawner,
            held: HeldState::new(),
        }
    }

    pub fn held(&self) -> &HeldState {
        &self.held
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn spawner(&self) -> &C {
        &self.spawner
    }

    /// Handle one decoded event against `profile`
    pub fn dispatch(&mut self, profile: &Profile, event: ControlEvent) -> Dispatch {
        let descriptor = match event.descriptor() {
            Ok(descriptor) => descriptor,
            Err(unknown) => {
                log::warn!("{}", unknown);
                return Dispatch::UnknownControl;
            }
        };
        let control = descriptor.control;

        match (descriptor.kind, event.edge) {
            (ControlKind::Momentary, Edge::Press) => self.momentary_press(profile, control),
            (ControlKind::Momentary, Edge::Release) => self.momentary_release(profile, control),
            (ControlKind::Rotary, Edge::Press) => self.rotary_press(profile, control),
            (ControlKind::Rotary, Edge::Release) => {
                log::debug!("Ignoring release from rotary control {}", control);
                Dispatch::Ignored
            }
        }
    }

    /// Release every held control, most recently held first
    pub fn release_all(&mut self) -> usize {
        let entries = self.held.drain();
        let count = entries.len();
        for (control, keys) in entries {
            log::debug!("Force-releasing {}", control);
            self.release_keys(keys.iter().copied());
        }
        count
    }

    fn momentary_press(&mut self, profile: &Profile, control: Control) -> Dispatch {
        if let Some(stale) = self.held.take(control) {
            log::warn!("{} pressed while already held; releasing stale keys", control);
            self.release_keys(stale.iter().copied());
        }

        let Some(mapping) = profile.get(control) else {
            log::debug!("No mapping for {}", control);
            return Dispatch::Unmapped;
        };

        match (&mapping.action, mapping.mode) {
            (ActionSpec::Simple(action), TriggerMode::Hold) => {
                log::info!("{} -> {} (hold)", control, action);
                let program = resolve(control, action);
                let keys = self.run_press(&program);
                if keys.is_empty() {
                    return Dispatch::Tapped;
                }
                self.held.hold(control, keys);
                Dispatch::Held
            }
            _ => {
                self.tap_mapping(control, mapping);
                Dispatch::Tapped
            }
        }
    }

    fn momentary_release(&mut self, profile: &Profile, control: Control) -> Dispatch {
        // Held keys go up even if a reload has since changed the mapping
        if let Some(keys) = self.held.take(control) {
            log::debug!("{} released", control);
            self.release_keys(keys.iter().copied());
            return Dispatch::Released;
        }

        let Some(mapping) = profile.get(control) else {
            log::debug!("No mapping for {}", control);
            return Dispatch::Unmapped;
        };

        match (&mapping.action, mapping.mode) {
            (ActionSpec::Simple(action), TriggerMode::Hold) => {
                log::debug!("{} released with nothing held; releasing {}", control, action);
                let program = resolve(control, action);
                self.release_keys(program.keys());
                Dispatch::FallbackReleased
            }
            _ => {
                log::debug!("{} released; nothing to do", control);
                Dispatch::Ignored
            }
        }
    }

    fn rotary_press(&mut self, profile: &Profile, control: Control) -> Dispatch {
        let Some(mapping) = profile.get(control) else {
            log::debug!("No mapping for {}", control);
            return Dispatch::Unmapped;
        };
        self.tap_mapping(control, mapping);
        Dispatch::Tapped
    }

    fn tap_mapping(&mut self, control: Control, mapping: &Mapping) {
        log::info!("{} -> {}", control, mapping.action);
        for action in mapping.action.actions() {
            let program = resolve(control, action);
            let keys = self.run_press(&program);
            self.release_keys(keys.iter().copied());
        }
    }

    /// Run the press side of a program and return the key tokens it pressed
    fn run_press(&mut self, program: &ActionProgram) -> HeldKeys {
        let mut pressed: HeldKeys = SmallVec::new();
        for step in program.steps() {
            match step {
                ActionStep::Key(key) => {
                    if let Err(e) = self.sink.press(*key) {
                        log::warn!("Failed to press {}: {}", key, e);
                    }
                    pressed.push(*key);
                }
                ActionStep::TypeText(text) => {
                    if let Err(e) = self.sink.type_text(text) {
                        log::warn!("Failed to type {:?}: {}", text, e);
                    }
                }
                ActionStep::Shell(command) => {
                    if let Err(e) = self.spawner.spawn_detached(command) {
                        log::error!("{}", e);
                    }
                }
            }
        }
        pressed
    }

    /// Release `keys` in reverse of the given order
    fn release_keys<I>(&mut self, keys: I)
    where
        I: DoubleEndedIterator<Item = KeyToken>,
    {
        for key in keys.rev() {
            if let Err(e) = self.sink.release(key) {
                log::warn!("Failed to release {}: {}", key, e);
            }
        }
    }
}

/// Parse an action for dispatch. A grammar error degrades to a no-op.
fn resolve(control: Control, action: &str) -> ActionProgram {
    match parse_action(action) {
        Ok(program) => {
            for part in program.unknown() {
                log::warn!("Unknown key '{}' in action '{}' for {}", part, action, control);
            }
            program
        }
        Err(e) => {
            log::warn!("Invalid action '{}' for {}: {}", action, control, e);
            ActionProgram::empty()
        }
    }
}
