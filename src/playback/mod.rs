//! Read-aloud playback: the scheduler state machine and the async session
//! that connects it to a speech engine and a host.
//!
//! # Architecture
//!
//! ```text
//! ReaderCommand (mpsc)          SpeechEvent (mpsc)
//!        │                              │
//!        └──────────────┬───────────────┘
//!                       ▼
//! ReaderSession::run()  ← async tokio task
//!        │
//!        ├─ Scheduler transition (under the state lock) → Vec<Effect>
//!        ├─ SetVoice / Speak / Stop → SpeechEngine
//!        └─ ScrollTo               → ReaderState::scrolls
//!
//! SharedState (Arc<Mutex<ReaderState>>) ←─── read by the host
//! ```
//!
//! [`Scheduler`] itself is synchronous and engine-agnostic: every user
//! action and engine event is a method returning the effects to carry out.

pub mod runner;
pub mod scheduler;
pub mod session;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{ReaderCommand, ReaderSession};
pub use scheduler::Scheduler;
pub use session::{Effect, PlaybackSession, Progress, SessionSummary};
pub use state::{new_shared_state, ReaderPhase, ReaderState, ScrollRequest, SharedState};
