//! Async reader session: drives the scheduler from host commands and
//! speech-engine events received over `tokio::sync::mpsc` channels.
//!
//! # Flow
//!
//! ```text
//! open
//!   ├─▶ ReadingPosition::load (persistence)
//!   ├─▶ SpeechEngine::status              → Error phase when unavailable
//!   └─▶ spawn_blocking(parse_document)    → store swapped under the lock
//!
//! loop select!
//!   ├─ ReaderCommand  → Scheduler transition → effects
//!   └─ SpeechEvent    → Scheduler transition → effects
//!        effects ─▶ SpeechEngine (outside the lock) / scroll queue
//!
//! Close ─▶ stop engine if playing, ReadingPosition::save, reply summary
//! ```
//!
//! Scheduler transitions run with the [`SharedState`] lock held; engine
//! calls never do.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};

use crate::config::ReaderProfile;
use crate::document::{parse_document, LineStore};
use crate::error::ReaderError;
use crate::library::{PersistenceStore, ReadingPosition};
use crate::speech::{SpeechEngine, SpeechEvent, SpeechEventKind};

use super::scheduler::Scheduler;
use super::session::{Effect, SessionSummary};
use super::state::{ReaderPhase, ReaderState, ScrollRequest, SharedState};

/// Host intent delivered to a running [`ReaderSession`].
#[derive(Debug)]
pub enum ReaderCommand {
    LinePressed(usize),
    PlayToggle,
    /// First visible row of the host's list.
    ViewportChanged(usize),
    Locate,
    /// Re-parse the document with new settings.  Ignored while playing.
    Reload(Box<ReaderProfile>),
    /// Persist the position and end the session.
    Close(oneshot::Sender<SessionSummary>),
}

/// One opened document being read aloud.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use tokio::sync::mpsc;
/// use read_aloud::config::ReaderConfig;
/// use read_aloud::library::MemoryStore;
/// use read_aloud::playback::{new_shared_state, ReaderCommand, ReaderSession};
/// use read_aloud::speech::ConsoleSpeechEngine;
///
/// # async fn example() -> anyhow::Result<()> {
/// let profile = ReaderConfig::load()?.compile()?;
/// let state = new_shared_state(&profile);
///
/// let (event_tx, event_rx) = mpsc::channel(16);
/// let (command_tx, command_rx) = mpsc::channel(16);
/// let session = ReaderSession::new(
///     state.clone(),
///     Box::new(ConsoleSpeechEngine::new(event_tx, Duration::from_millis(300))),
///     Box::new(MemoryStore::new()),
///     "book-key",
///     "第一章\n你好。",
///     profile,
/// );
/// let task = tokio::spawn(session.run(command_rx, event_rx));
///
/// command_tx.send(ReaderCommand::PlayToggle).await?;
/// # drop(command_tx);
/// let summary = task.await??;
/// # Ok(())
/// # }
/// ```
pub struct ReaderSession {
    state: SharedState,
    engine: Box<dyn SpeechEngine>,
    persistence: Box<dyn PersistenceStore>,
    book_key: String,
    raw_text: Arc<str>,
    profile: Arc<ReaderProfile>,
    engine_ready: bool,
    plays_ended: watch::Sender<u64>,
}

impl ReaderSession {
    pub fn new(
        state: SharedState,
        engine: Box<dyn SpeechEngine>,
        persistence: Box<dyn PersistenceStore>,
        book_key: impl Into<String>,
        raw_text: impl Into<Arc<str>>,
        profile: ReaderProfile,
    ) -> Self {
        Self {
            state,
            engine,
            persistence,
            book_key: book_key.into(),
            raw_text: raw_text.into(),
            profile: Arc::new(profile),
            engine_ready: false,
            plays_ended: watch::channel(0).0,
        }
    }

    /// Number of plays that have come to an end, for hosts that wait for
    /// playback to finish.  Subscribe before spawning [`run`](Self::run).
    pub fn plays_ended(&self) -> watch::Receiver<u64> {
        self.plays_ended.subscribe()
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Open the document and serve commands and engine events until a
    /// `Close` arrives or the command channel is closed.
    ///
    /// Returns the persisted reading position.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<ReaderCommand>,
        mut events: mpsc::Receiver<SpeechEvent>,
    ) -> Result<SessionSummary, ReaderError> {
        self.open().await?;

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => {
                        if let Some(summary) = self.handle_command(command).await? {
                            return Ok(summary);
                        }
                    }
                    None => {
                        log::debug!("reader: command channel closed");
                        return self.close();
                    }
                },
                Some(event) = events.recv() => self.handle_event(event),
            }
        }
    }

    // -----------------------------------------------------------------------
    // Session boundaries
    // -----------------------------------------------------------------------

    async fn open(&mut self) -> Result<(), ReaderError> {
        let position = ReadingPosition::load(self.persistence.as_ref(), &self.book_key)?;

        match self.engine.status() {
            Ok(()) => {
                self.engine_ready = true;
                match self.engine.voices() {
                    Ok(voices) => log::debug!("reader: {} voices available", voices.len()),
                    Err(e) => log::warn!("reader: could not list voices: {e}"),
                }
            }
            Err(e) => {
                log::error!("reader: speech engine unavailable: {e}");
                let mut st = self.state.lock().unwrap();
                st.error_message = Some(e.to_string());
            }
        }

        self.reparse(position.viewing_index).await?;
        log::info!(
            "reader: opened {} at line {}",
            self.book_key,
            position.viewing_index
        );
        Ok(())
    }

    /// Parse the raw text on the blocking pool and swap the new store in.
    async fn reparse(&mut self, selected: usize) -> Result<(), ReaderError> {
        {
            let mut st = self.state.lock().unwrap();
            st.phase = ReaderPhase::Loading;
        }

        let raw = Arc::clone(&self.raw_text);
        let profile = Arc::clone(&self.profile);
        let mut store: LineStore =
            tokio::task::spawn_blocking(move || parse_document(&raw, &profile)).await?;

        let mut st = self.state.lock().unwrap();
        st.scheduler.reconfigure(self.profile.reading.clone());
        st.scheduler.restore(&mut store, selected);
        st.store = store;
        st.phase = if self.engine_ready {
            ReaderPhase::Idle
        } else {
            ReaderPhase::Error
        };
        log::debug!("reader: {} lines ready", st.store.len());
        Ok(())
    }

    fn close(&mut self) -> Result<SessionSummary, ReaderError> {
        let (summary, playing) = {
            let st = self.state.lock().unwrap();
            (st.scheduler.close(&st.store), st.scheduler.is_playing())
        };
        if playing {
            if let Err(e) = self.engine.stop() {
                log::warn!("reader: engine stop on close failed: {e}");
            }
        }

        ReadingPosition::from(&summary).save(self.persistence.as_mut(), &self.book_key)?;
        log::info!(
            "reader: closed {} at line {} of {}",
            self.book_key,
            summary.last_index,
            summary.line_count
        );
        Ok(summary)
    }

    // -----------------------------------------------------------------------
    // Event handlers
    // -----------------------------------------------------------------------

    /// Returns the summary once the session is closed.
    async fn handle_command(
        &mut self,
        command: ReaderCommand,
    ) -> Result<Option<SessionSummary>, ReaderError> {
        let effects = match command {
            ReaderCommand::LinePressed(index) => self.transition(|scheduler, store| {
                if index < store.len() {
                    scheduler.select(store, index)
                } else {
                    log::warn!("reader: line {index} pressed past {} lines", store.len());
                    Vec::new()
                }
            }),
            ReaderCommand::PlayToggle => {
                if !self.engine_ready {
                    log::warn!("reader: play refused, no speech engine");
                    return Ok(None);
                }
                self.transition(|scheduler, store| scheduler.toggle(store))
            }
            ReaderCommand::ViewportChanged(first) => self.transition(|scheduler, _| {
                scheduler.viewport_changed(first);
                Vec::new()
            }),
            ReaderCommand::Locate => self.transition(|scheduler, store| scheduler.locate(store)),
            ReaderCommand::Reload(profile) => {
                let selected = {
                    let st = self.state.lock().unwrap();
                    if st.scheduler.is_playing() {
                        log::warn!("reader: reload ignored while playing");
                        return Ok(None);
                    }
                    st.scheduler.selected_index()
                };
                self.profile = Arc::new(*profile);
                self.reparse(selected).await?;
                Vec::new()
            }
            ReaderCommand::Close(reply) => {
                let summary = self.close()?;
                let _ = reply.send(summary.clone());
                return Ok(Some(summary));
            }
        };

        self.apply(effects);
        Ok(None)
    }

    fn handle_event(&mut self, event: SpeechEvent) {
        let id = event.utterance;
        let effects = self.transition(|scheduler, store| match event.kind {
            SpeechEventKind::Start => scheduler.on_start(store, id),
            SpeechEventKind::Finish => scheduler.on_finish(store, id),
            SpeechEventKind::Cancel => scheduler.on_cancel(store, id),
        });
        self.apply(effects);
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Run one scheduler transition under the state lock.
    fn transition(
        &self,
        f: impl FnOnce(&mut Scheduler, &mut LineStore) -> Vec<Effect>,
    ) -> Vec<Effect> {
        let mut guard = self.state.lock().unwrap();
        let st: &mut ReaderState = &mut guard;
        let effects = f(&mut st.scheduler, &mut st.store);
        st.sync_phase();

        let ended = st.scheduler.plays_ended();
        self.plays_ended.send_if_modified(|seen| {
            let changed = *seen != ended;
            *seen = ended;
            changed
        });
        effects
    }

    /// Carry out scheduler effects.  Called without the state lock.
    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SetVoice(voice) => {
                    if let Err(e) = self.engine.apply_voice(&voice) {
                        log::warn!("reader: could not apply voice {voice:?}: {e}");
                    }
                }
                Effect::Speak(utterance) => {
                    if let Err(e) = self.engine.speak(&utterance) {
                        log::error!("reader: speak failed: {e}");
                        self.transition(|scheduler, store| {
                            scheduler.on_cancel(store, utterance.id)
                        });
                        self.state.lock().unwrap().error_message = Some(e.to_string());
                    }
                }
                Effect::Stop => {
                    if let Err(e) = self.engine.stop() {
                        log::warn!("reader: engine stop failed: {e}");
                        let in_flight = self.state.lock().unwrap().scheduler.session().in_flight;
                        if let Some(id) = in_flight {
                            self.transition(|scheduler, store| scheduler.on_cancel(store, id));
                        }
                    }
                }
                Effect::ScrollTo { index, animated } => {
                    self.state
                        .lock()
                        .unwrap()
                        .scrolls
                        .push(ScrollRequest { index, animated });
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
