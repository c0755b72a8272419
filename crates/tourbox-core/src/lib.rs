// TourBox Core Library
// Protocol decoding, profiles and the dispatch engine for the TourBox controller

pub mod config;
pub mod control;
pub mod edge;
pub mod engine;
pub mod event;
pub mod key;
pub mod output;
pub mod protocol;
pub mod state;
pub mod transport;

pub use config::{
    default_profile, parse_action, ActionProgram, ActionSpec, ActionStep, GrammarError, Mapping,
    Profile, ProfileError, ProfileHandle, TriggerMode,
};
pub use control::{Control, ControlDescriptor, ControlKind};
pub use edge::Edge;
pub use engine::{Dispatch, Engine};
pub use event::{monitor, RunLoop, RunStats, RunnerOptions};
pub use key::{Key, KeyToken};
pub use output::{
    CommandSpawner, DryRun, KeySink, ShellSpawnError, ShellSpawner, SinkCall, SinkError,
};
pub use protocol::{decode, unlock, ControlEvent, UnknownControl, UnlockStatus};
pub use state::HeldState;
pub use transport::{find_port, SerialPort, Transport, TransportError};

#[cfg(feature = "uinput")]
pub use output::VirtualKeyboard;
