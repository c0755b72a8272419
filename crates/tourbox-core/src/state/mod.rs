// TourBox Engine State

mod held;

pub use held::{HeldKeys, HeldState};
