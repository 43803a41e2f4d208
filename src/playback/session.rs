//! Playback session state and the values handed to the host.

use crate::speech::{Utterance, UtteranceId};
use crate::text::VoiceStyle;

/// Mutable state of one read-aloud session.
///
/// While playing, `selected_index <= last_scheduled_index < line count`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSession {
    pub selected_index: usize,
    /// Last line a single Play may reach; `0` when no window is active.
    pub last_scheduled_index: usize,
    /// Index of the voice segment being spoken on the selected line.
    pub current_speech_id: usize,
    pub is_playing: bool,
    /// A stop was sent to the engine and its cancel is still pending.
    pub stop_requested: bool,
    /// Correlation id of the utterance the engine is working on.
    pub in_flight: Option<UtteranceId>,
    /// First row the host last reported as visible.
    pub first_visible: Option<usize>,
}

/// A command for the speech engine or the host, produced by a scheduler
/// transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Make `VoiceStyle` the engine's active parameters.
    SetVoice(VoiceStyle),
    Speak(Utterance),
    /// Cancel the in-flight utterance.
    Stop,
    /// Ask the host to scroll row `index` into view.
    ScrollTo { index: usize, animated: bool },
}

/// Reading position handed to persistence when a document is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Trimmed text of the selected line.
    pub last_line_text: String,
    pub last_index: usize,
    pub line_count: usize,
}

/// How far through the document the reader is.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// `selected / line count`, in percent.
    pub percent: f32,
    /// `selected/last_scheduled (count)` during a window, `selected/count`
    /// otherwise.
    pub label: String,
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}% {}", self.percent, self.label)
    }
}
