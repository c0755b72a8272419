// TourBox Built-in Profile
// Used when no profile document is given

use super::profile::{Mapping, Profile};
use crate::control::Control;

/// Name of the built-in profile
pub const DEFAULT_PROFILE_NAME: &str = "Default Universal";

/// The built-in profile: universal shortcuts for a developer workflow.
///
/// Every binding is a tap, so a button press fires the whole shortcut and the
/// matching release has nothing left to do.
pub fn default_profile() -> Profile {
    let bindings: [(Control, &str, &str); 20] = [
        // Main buttons - universal actions
        (Control::Side, "cmd+c", "Copy"),
        (Control::Top, "cmd+v", "Paste"),
        (Control::Tall, "cmd+z", "Undo"),
        (Control::Short, "cmd+shift+z", "Redo"),
        // D-pad - navigation
        (Control::DpadUp, "up", "Up"),
        (Control::DpadDown, "down", "Down"),
        (Control::DpadLeft, "left", "Left"),
        (Control::DpadRight, "right", "Right"),
        // C buttons - common actions
        (Control::C1, "cmd+s", "Save"),
        (Control::C2, "cmd+w", "Close Tab"),
        // Scroll wheel
        (Control::ScrollUp, "cmd+shift+]", "Next Tab"),
        (Control::ScrollDown, "cmd+shift+[", "Prev Tab"),
        (Control::ScrollClick, "cmd+t", "New Tab"),
        // Knob - zoom
        (Control::KnobCw, "cmd+=", "Zoom In"),
        (Control::KnobCcw, "cmd+-", "Zoom Out"),
        (Control::KnobClick, "cmd+0", "Reset Zoom"),
        // Dial - scroll
        (Control::DialCw, "page_down", "Page Down"),
        (Control::DialCcw, "page_up", "Page Up"),
        (Control::DialClick, "home", "Home"),
        // Summon
        (Control::Tour, "cmd+space", "Spotlight"),
    ];

    bindings.into_iter().fold(
        Profile::new(
            DEFAULT_PROFILE_NAME,
            "Universal shortcuts for developer workflow",
        ),
        |profile, (control, action, description)| {
            profile.with_mapping(control, Mapping::tap(action).with_description(description))
        },
    )
}
