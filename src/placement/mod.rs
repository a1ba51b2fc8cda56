//! Placement state machine
//!
//! Turns the per-frame stream of hit candidates plus commit, reset and mode
//! intents into a single committed [`PlacementResult`].

pub mod machine;
pub mod state;

pub use machine::PlacementMachine;
pub use state::{ClearReason, PlacementEvent, PlacementPhase, PlacementResult, PlacementState};
