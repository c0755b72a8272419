// TourBox Config API
// Action grammar, profile documents and the built-in profile

pub mod action_parser;
pub mod builtin;
pub mod handle;
pub mod paths;
pub mod profile;

pub use action_parser::{parse_action, ActionProgram, ActionStep, GrammarError};
pub use builtin::{default_profile, DEFAULT_PROFILE_NAME};
pub use handle::{ProfileHandle, ReloadOutcome};
pub use paths::{profiles_dir, resolve_profile};
pub use profile::{ActionSpec, Mapping, Profile, ProfileError, ProfileFormat, TriggerMode};
