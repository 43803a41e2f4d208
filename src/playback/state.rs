//! Reader phase and shared reader state.
//!
//! [`ReaderState`] is the single source of truth the host renders from: the
//! line store, the scheduler, the current phase and any error message.
//! [`SharedState`] is `Arc<Mutex<ReaderState>>`; the session runner mutates
//! it, the host reads it.

use std::sync::{Arc, Mutex};

use crate::config::ReaderProfile;
use crate::document::{LineStore, LineView};

use super::scheduler::Scheduler;
use super::session::Progress;

// ---------------------------------------------------------------------------
// ReaderPhase
// ---------------------------------------------------------------------------

/// Phases of a reader session.
///
/// ```text
/// Loading ──parsed──▶ Idle ──play──▶ Playing ──pause──▶ Stopping ──cancel──▶ Idle
///                                      └──window / document end──▶ Idle
/// engine unavailable ──▶ Error (document stays readable)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReaderPhase {
    #[default]
    Loading,
    Idle,
    Playing,
    Stopping,
    Error,
}

impl ReaderPhase {
    /// Whether the engine is (or may still be) speaking.
    ///
    /// ```
    /// use read_aloud::playback::ReaderPhase;
    ///
    /// assert!(ReaderPhase::Playing.is_busy());
    /// assert!(ReaderPhase::Stopping.is_busy());
    /// assert!(!ReaderPhase::Idle.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(self, ReaderPhase::Playing | ReaderPhase::Stopping)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReaderPhase::Loading => "Loading",
            ReaderPhase::Idle => "Paused",
            ReaderPhase::Playing => "Reading",
            ReaderPhase::Stopping => "Stopping",
            ReaderPhase::Error => "Error",
        }
    }
}

// ---------------------------------------------------------------------------
// ReaderState
// ---------------------------------------------------------------------------

/// A scroll the host should perform on its list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub index: usize,
    pub animated: bool,
}

#[derive(Debug)]
pub struct ReaderState {
    pub phase: ReaderPhase,
    pub store: LineStore,
    pub scheduler: Scheduler,
    /// Message to show while `phase == Error`, or after a failed command.
    pub error_message: Option<String>,
    /// Scrolls not yet taken by the host, oldest first.
    pub scrolls: Vec<ScrollRequest>,
}

impl ReaderState {
    pub fn new(profile: &ReaderProfile) -> Self {
        Self {
            phase: ReaderPhase::Loading,
            store: LineStore::from_profile(Vec::new(), profile),
            scheduler: Scheduler::new(profile.reading.clone()),
            error_message: None,
            scrolls: Vec::new(),
        }
    }

    /// Recompute `phase` from the scheduler.  `Loading` and `Error` are left
    /// to the runner.
    pub fn sync_phase(&mut self) {
        if matches!(self.phase, ReaderPhase::Loading | ReaderPhase::Error) {
            return;
        }
        let session = self.scheduler.session();
        self.phase = match (session.is_playing, session.stop_requested) {
            (true, true) => ReaderPhase::Stopping,
            (true, false) => ReaderPhase::Playing,
            (false, _) => ReaderPhase::Idle,
        };
    }

    /// Take every pending scroll request.
    pub fn take_scrolls(&mut self) -> Vec<ScrollRequest> {
        std::mem::take(&mut self.scrolls)
    }

    /// Render projection of line `index`.
    pub fn view(&mut self, index: usize) -> Option<LineView> {
        self.store.view(index)
    }

    pub fn progress(&self) -> Progress {
        self.scheduler.progress(&self.store)
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`ReaderState`].
///
/// Cheap to clone (`Arc` clone).  Lock with `.lock().unwrap()` for a short
/// critical section; do **not** hold the lock across `.await` points.
pub type SharedState = Arc<Mutex<ReaderState>>;

pub fn new_shared_state(profile: &ReaderProfile) -> SharedState {
    Arc::new(Mutex::new(ReaderState::new(profile)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
