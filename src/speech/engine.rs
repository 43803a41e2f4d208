//! Speech engine trait, its event protocol and a test double.
//!
//! # Overview
//!
//! [`SpeechEngine`] is the interface the session runner drives.  It is
//! object-safe and `Send` so it can be held as a `Box<dyn SpeechEngine>`
//! inside the async runner.
//!
//! Engines are single-voice: at most one utterance is spoken at a time.
//! Every accepted utterance produces a `Start` event followed by either
//! `Finish` or `Cancel`, delivered on the [`SpeechEvent`] channel the engine
//! was constructed with and tagged with the utterance's [`UtteranceId`].
//!
//! [`MockSpeechEngine`] (available under `#[cfg(test)]`) records every call
//! and can optionally answer with events immediately.

use thiserror::Error;

use crate::text::VoiceStyle;

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// All errors that can arise from a speech engine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SpeechError {
    /// No synthesis engine is available; the host should prompt the user to
    /// install one.  Playback cannot start.
    #[error("No speech engine installed")]
    NoEngineInstalled,

    /// The engine rejected a command.
    #[error("Speech engine error: {0}")]
    Engine(String),
}

// ---------------------------------------------------------------------------
// Protocol types
// ---------------------------------------------------------------------------

/// Correlation id of one speech request.
pub type UtteranceId = u64;

/// One speech request.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    /// Padded text to synthesize.
    pub text: String,
    pub voice_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechEventKind {
    Start,
    Finish,
    Cancel,
}

/// Engine callback for one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeechEvent {
    pub kind: SpeechEventKind,
    pub utterance: UtteranceId,
}

impl SpeechEvent {
    pub fn start(utterance: UtteranceId) -> Self {
        Self {
            kind: SpeechEventKind::Start,
            utterance,
        }
    }

    pub fn finish(utterance: UtteranceId) -> Self {
        Self {
            kind: SpeechEventKind::Finish,
            utterance,
        }
    }

    pub fn cancel(utterance: UtteranceId) -> Self {
        Self {
            kind: SpeechEventKind::Cancel,
            utterance,
        }
    }
}

/// A voice the engine can speak with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub language: String,
}

// ---------------------------------------------------------------------------
// SpeechEngine trait
// ---------------------------------------------------------------------------

/// Object-safe interface for text-to-speech engines.
///
/// # Contract
///
/// - `speak` is only called while no other utterance is in flight.
/// - `stop` cancels the in-flight utterance, if any; its `Cancel` event may
///   arrive after a `Finish` that was already queued.
pub trait SpeechEngine: Send {
    /// Check that the engine is usable.
    fn status(&self) -> Result<(), SpeechError>;

    /// Voices available for `VoiceStyle::voice_id`.
    fn voices(&self) -> Result<Vec<Voice>, SpeechError>;

    /// Set pitch, rate and voice for subsequent utterances.
    fn apply_voice(&mut self, voice: &VoiceStyle) -> Result<(), SpeechError>;

    /// Start speaking `utterance`.
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError>;

    /// Cancel the in-flight utterance.
    fn stop(&mut self) -> Result<(), SpeechError>;
}

// Compile-time assertion: Box<dyn SpeechEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechEngine>) {}
};

// ---------------------------------------------------------------------------
// MockSpeechEngine  (test-only)
// ---------------------------------------------------------------------------

/// A command received by [`MockSpeechEngine`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    ListVoices,
    ApplyVoice(VoiceStyle),
    Speak(Utterance),
    Stop,
}

/// A test double that records every command.
///
/// With [`auto_reply`](MockSpeechEngine::auto_reply) it also answers each
/// `speak` with `Start` + `Finish` on the event channel, as an engine whose
/// utterances complete before any `stop` could reach them.
#[cfg(test)]
pub struct MockSpeechEngine {
    installed: bool,
    calls: std::sync::Arc<std::sync::Mutex<Vec<EngineCall>>>,
    events: Option<tokio::sync::mpsc::Sender<SpeechEvent>>,
}

#[cfg(test)]
impl MockSpeechEngine {
    /// A silent mock: records calls, sends no events.
    pub fn new() -> Self {
        Self {
            installed: true,
            calls: Default::default(),
            events: None,
        }
    }

    /// A mock whose `status` reports [`SpeechError::NoEngineInstalled`].
    pub fn not_installed() -> Self {
        Self {
            installed: false,
            ..Self::new()
        }
    }

    /// A mock that answers commands on `events`.
    pub fn auto_reply(events: tokio::sync::mpsc::Sender<SpeechEvent>) -> Self {
        Self {
            events: Some(events),
            ..Self::new()
        }
    }

    /// Shared handle to the recorded calls; stays valid after the mock is
    /// boxed and moved into a runner.
    pub fn calls(&self) -> std::sync::Arc<std::sync::Mutex<Vec<EngineCall>>> {
        self.calls.clone()
    }

    fn emit(&self, event: SpeechEvent) {
        if let Some(tx) = &self.events {
            tx.try_send(event).expect("mock event channel full");
        }
    }
}

#[cfg(test)]
impl SpeechEngine for MockSpeechEngine {
    fn status(&self) -> Result<(), SpeechError> {
        if self.installed {
            Ok(())
        } else {
            Err(SpeechError::NoEngineInstalled)
        }
    }

    fn voices(&self) -> Result<Vec<Voice>, SpeechError> {
        self.status()?;
        self.calls.lock().unwrap().push(EngineCall::ListVoices);
        Ok(vec![Voice {
            id: "mock".into(),
            name: "Mock".into(),
            language: "zh-CN".into(),
        }])
    }

    fn apply_voice(&mut self, voice: &VoiceStyle) -> Result<(), SpeechError> {
        self.calls
            .lock()
            .unwrap()
            .push(EngineCall::ApplyVoice(voice.clone()));
        Ok(())
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError> {
        self.calls
            .lock()
            .unwrap()
            .push(EngineCall::Speak(utterance.clone()));
        self.emit(SpeechEvent::start(utterance.id));
        self.emit(SpeechEvent::finish(utterance.id));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SpeechError> {
        self.calls.lock().unwrap().push(EngineCall::Stop);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn utterance(id: UtteranceId) -> Utterance {
        Utterance {
            id,
            text: "你好".into(),
            voice_id: None,
        }
    }

    #[test]
    fn mock_records_calls() {
        let mut engine = MockSpeechEngine::new();
        let calls = engine.calls();

        engine.apply_voice(&VoiceStyle::default()).unwrap();
        engine.speak(&utterance(1)).unwrap();
        engine.stop().unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1], EngineCall::Speak(utterance(1)));
        assert_eq!(calls[2], EngineCall::Stop);
    }

    #[test]
    fn not_installed_reports_error() {
        let engine = MockSpeechEngine::not_installed();
        assert_eq!(engine.status(), Err(SpeechError::NoEngineInstalled));
        assert!(engine.voices().is_err());
    }

    #[tokio::test]
    async fn auto_reply_emits_start_then_finish() {
        let (tx, mut rx) = tokio::sync::mpsc::channel(8);
        let mut engine = MockSpeechEngine::auto_reply(tx);

        engine.speak(&utterance(7)).unwrap();
        assert_eq!(rx.recv().await, Some(SpeechEvent::start(7)));
        assert_eq!(rx.recv().await, Some(SpeechEvent::finish(7)));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            SpeechError::NoEngineInstalled.to_string(),
            "No speech engine installed"
        );
    }
}
