//! Speech synthesis boundary.
//!
//! The scheduler never talks to an engine directly; the session runner
//! applies its effects through [`SpeechEngine`] and feeds the engine's
//! [`SpeechEvent`]s back in.

pub mod console;
pub mod engine;

pub use console::ConsoleSpeechEngine;
pub use engine::{
    SpeechEngine, SpeechError, SpeechEvent, SpeechEventKind, Utterance, UtteranceId, Voice,
};

#[cfg(test)]
pub use engine::{EngineCall, MockSpeechEngine};
