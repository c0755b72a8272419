// TourBox Event Handling
// Read loop that drives the engine

pub mod runner;

pub use runner::{monitor, RunLoop, RunStats, RunnerOptions};
