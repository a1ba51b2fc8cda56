use glam::{Quat, Vec3};

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use crate::detection::{HitCandidate, SurfaceType};

/// A committed placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementResult {
    pub position: Vec3,
    pub orientation: Quat,
    pub surface_type: SurfaceType,
    /// Frame number of the commit, monotonic per machine.
    pub committed_at_frame: u64,
    pub committed_at: Instant,
}

impl PlacementResult {
    pub(crate) fn from_candidate(candidate: &HitCandidate, frame: u64) -> Self {
        Self {
            position: candidate.point(),
            orientation: candidate.orientation(),
            surface_type: candidate.surface_type(),
            committed_at_frame: frame,
            committed_at: Instant::now(),
        }
    }
}

/// Placement state with its data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementState {
    /// No eligible candidate this frame.
    Searching,
    /// Live preview of this frame's candidate.
    Valid(HitCandidate),
    /// Frozen until reset.
    Placed(PlacementResult),
}

impl PlacementState {
    #[must_use]
    pub fn phase(&self) -> PlacementPhase {
        match self {
            Self::Searching => PlacementPhase::Searching,
            Self::Valid(_) => PlacementPhase::Valid,
            Self::Placed(_) => PlacementPhase::Placed,
        }
    }
}

/// Data-less view of [`PlacementState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementPhase {
    Searching,
    Valid,
    Placed,
}

/// Why a placement (or preview) was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    Reset,
    ModeChanged,
    SessionEnded,
}

/// Transitions reported to the frame loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementEvent {
    PhaseChanged {
        from: PlacementPhase,
        to: PlacementPhase,
    },
    Committed(PlacementResult),
    /// A committed placement was discarded. The rendered object should go.
    Cleared {
        reason: ClearReason,
    },
}
