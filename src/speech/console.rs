//! A speech engine that prints utterances instead of synthesizing them.
//!
//! Each utterance is written to stdout with its voice label, then `Start`
//! and (after `pace`) `Finish` are sent from a spawned tokio task.  `stop`
//! aborts that task and sends `Cancel`.  Must be used inside a tokio runtime.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::engine::{SpeechEngine, SpeechError, SpeechEvent, Utterance, UtteranceId, Voice};
use crate::text::VoiceStyle;

pub struct ConsoleSpeechEngine {
    events: mpsc::Sender<SpeechEvent>,
    pace: Duration,
    voice: VoiceStyle,
    current: Option<(UtteranceId, JoinHandle<()>)>,
}

impl std::fmt::Debug for ConsoleSpeechEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSpeechEngine")
            .field("pace", &self.pace)
            .field("voice", &self.voice)
            .finish_non_exhaustive()
    }
}

impl ConsoleSpeechEngine {
    /// `pace` is how long each utterance "takes" before `Finish` is sent.
    pub fn new(events: mpsc::Sender<SpeechEvent>, pace: Duration) -> Self {
        Self {
            events,
            pace,
            voice: VoiceStyle::default(),
            current: None,
        }
    }
}

impl SpeechEngine for ConsoleSpeechEngine {
    fn status(&self) -> Result<(), SpeechError> {
        if self.events.is_closed() {
            return Err(SpeechError::Engine("event channel closed".into()));
        }
        Ok(())
    }

    fn voices(&self) -> Result<Vec<Voice>, SpeechError> {
        Ok(vec![Voice {
            id: "console".into(),
            name: "Console".into(),
            language: "und".into(),
        }])
    }

    fn apply_voice(&mut self, voice: &VoiceStyle) -> Result<(), SpeechError> {
        self.voice = voice.clone();
        Ok(())
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError> {
        let label = self.voice.label().unwrap_or_default();
        let voice_id = utterance.voice_id.as_deref().unwrap_or("default");
        println!("[{voice_id} {label}] {}", utterance.text.trim());

        let tx = self.events.clone();
        let id = utterance.id;
        let pace = self.pace;
        let task = tokio::spawn(async move {
            if tx.send(SpeechEvent::start(id)).await.is_err() {
                return;
            }
            tokio::time::sleep(pace).await;
            let _ = tx.send(SpeechEvent::finish(id)).await;
        });

        if let Some((previous, handle)) = self.current.replace((id, task)) {
            if !handle.is_finished() {
                log::warn!("console engine: utterance {previous} still running, aborting");
                handle.abort();
            }
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SpeechError> {
        let Some((id, handle)) = self.current.take() else {
            return Ok(());
        };
        if handle.is_finished() {
            return Ok(());
        }
        handle.abort();

        let tx = self.events.clone();
        tokio::spawn(async move {
            let _ = tx.send(SpeechEvent::cancel(id)).await;
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
