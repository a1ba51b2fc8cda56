use crate::detection::{HitCandidate, PlacementMode};
use crate::placement::state::{
    ClearReason, PlacementEvent, PlacementPhase, PlacementResult, PlacementState,
};

type PlacedCallback = Box<dyn FnMut(&PlacementResult)>;

/// Placement state machine
///
/// `Searching -> Valid -> Placed`. `Valid` is re-evaluated every frame and
/// lost with the candidate. `Placed` is only reachable by committing a `Valid`
/// state and stays frozen until a reset, a mode change or a session end.
pub struct PlacementMachine {
    mode: PlacementMode,
    state: PlacementState,
    frame: u64,
    events: Vec<PlacementEvent>,
    on_placed: Option<PlacedCallback>,
}

impl Default for PlacementMachine {
    fn default() -> Self {
        Self::new(PlacementMode::default())
    }
}

impl PlacementMachine {
    #[must_use]
    pub fn new(mode: PlacementMode) -> Self {
        Self {
            mode,
            state: PlacementState::Searching,
            frame: 0,
            events: Vec::new(),
            on_placed: None,
        }
    }

    /// Invoked with the result every time a commit succeeds.
    pub fn set_on_placed(&mut self, callback: impl FnMut(&PlacementResult) + 'static) {
        self.on_placed = Some(Box::new(callback));
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> PlacementMode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &PlacementState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> PlacementPhase {
        self.state.phase()
    }

    /// Frames seen so far.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[must_use]
    pub fn placement(&self) -> Option<&PlacementResult> {
        match &self.state {
            PlacementState::Placed(result) => Some(result),
            _ => None,
        }
    }

    #[must_use]
    pub fn preview(&self) -> Option<&HitCandidate> {
        match &self.state {
            PlacementState::Valid(candidate) => Some(candidate),
            _ => None,
        }
    }

    /// Feeds this frame's candidate. Ignored while placed. Candidates that
    /// do not match the current mode count as no candidate.
    pub fn advance_frame(&mut self, candidate: Option<HitCandidate>) -> PlacementPhase {
        self.frame += 1;

        if !matches!(self.state, PlacementState::Placed(_)) {
            let next = candidate
                .filter(|c| self.mode.accepts(c.surface_type()))
                .map_or(PlacementState::Searching, PlacementState::Valid);
            self.transition(next);
        }
        self.phase()
    }

    /// Freezes the current `Valid` candidate. A no-op in any other state.
    pub fn commit(&mut self) -> Option<PlacementResult> {
        let PlacementState::Valid(candidate) = self.state else {
            log::debug!("Commit ignored in {:?}", self.phase());
            return None;
        };

        let result = PlacementResult::from_candidate(&candidate, self.frame);
        self.transition(PlacementState::Placed(result));
        self.events.push(PlacementEvent::Committed(result));
        log::info!(
            "Placed on {} at ({:.3}, {:.3}, {:.3})",
            result.surface_type,
            result.position.x,
            result.position.y,
            result.position.z
        );

        if let Some(callback) = self.on_placed.as_mut() {
            callback(&result);
        }
        Some(result)
    }

    /// Returns to `Searching`.
    pub fn reset(&mut self) {
        self.clear(ClearReason::Reset);
    }

    /// Switches mode. Any placement or preview is discarded. Returns `false`
    /// if the mode was already active.
    pub fn set_mode(&mut self, mode: PlacementMode) -> bool {
        if mode == self.mode {
            return false;
        }
        log::debug!("Placement mode {:?} -> {mode:?}", self.mode);
        self.mode = mode;
        self.clear(ClearReason::ModeChanged);
        true
    }

    pub fn toggle_mode(&mut self) -> PlacementMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    pub fn session_ended(&mut self) {
        self.clear(ClearReason::SessionEnded);
    }

    /// Takes the events accumulated since the last call.
    pub fn drain_events(&mut self) -> Vec<PlacementEvent> {
        std::mem::take(&mut self.events)
    }

    fn clear(&mut self, reason: ClearReason) {
        let was_placed = matches!(self.state, PlacementState::Placed(_));
        self.transition(PlacementState::Searching);
        if was_placed {
            self.events.push(PlacementEvent::Cleared { reason });
        }
    }

    fn transition(&mut self, next: PlacementState) {
        let from = self.state.phase();
        let to = next.phase();
        self.state = next;
        if from != to {
            self.events.push(PlacementEvent::PhaseChanged { from, to });
        }
    }
}
