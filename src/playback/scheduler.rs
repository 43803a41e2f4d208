//! Read-aloud state machine.
//!
//! Every transition takes the [`LineStore`] it mutates and returns the
//! [`Effect`]s the caller must carry out, in order.  The scheduler never
//! calls an engine itself, so it is driven identically by the async runner
//! and by tests.
//!
//! ```text
//! Idle ──play──▶ Playing ──finish (line exhausted)──▶ advance
//!                   │                                   ├─ next line in window ─▶ Playing
//!                   │                                   ├─ window end (stop)    ─▶ Idle, next line selected
//!                   │                                   └─ document end         ─▶ Idle, last line read
//!                   └──pause──▶ Stopping ──cancel / finish──▶ Idle
//! ```

use crate::config::{ReadingOptions, WindowPolicy};
use crate::document::LineStore;
use crate::speech::{Utterance, UtteranceId};

use super::session::{Effect, PlaybackSession, Progress, SessionSummary};

#[derive(Debug, Clone)]
pub struct Scheduler {
    options: ReadingOptions,
    session: PlaybackSession,
    next_utterance: UtteranceId,
    plays_ended: u64,
}

impl Scheduler {
    pub fn new(options: ReadingOptions) -> Self {
        Self {
            options,
            session: PlaybackSession::default(),
            next_utterance: 1,
            plays_ended: 0,
        }
    }

    /// Swap in new reading options.  The session itself is left alone; call
    /// [`restore`](Self::restore) once the re-parsed store is ready.
    pub fn reconfigure(&mut self, options: ReadingOptions) {
        self.options = options;
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn options(&self) -> &ReadingOptions {
        &self.options
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_playing
    }

    pub fn selected_index(&self) -> usize {
        self.session.selected_index
    }

    /// How many plays have come to an end, whether at the window end, the
    /// document end or through a cancel.  Never reset.
    pub fn plays_ended(&self) -> u64 {
        self.plays_ended
    }

    // -----------------------------------------------------------------------
    // Session boundaries
    // -----------------------------------------------------------------------

    /// Start over on `store` (a freshly parsed document) with `index`
    /// selected, clamped to the last line.
    pub fn restore(&mut self, store: &mut LineStore, index: usize) {
        let first_visible = self.session.first_visible;
        self.session = PlaybackSession {
            first_visible,
            ..PlaybackSession::default()
        };
        if store.is_empty() {
            return;
        }
        let index = index.min(store.len() - 1);
        self.session.selected_index = index;
        store.set_selected(index, true);
        log::debug!("scheduler: restored at line {index} of {}", store.len());
    }

    /// Reading position to persist when the document is closed.
    pub fn close(&self, store: &LineStore) -> SessionSummary {
        let index = self.session.selected_index;
        SessionSummary {
            last_line_text: store
                .get(index)
                .map(|line| line.text().trim().to_owned())
                .unwrap_or_default(),
            last_index: index,
            line_count: store.len(),
        }
    }

    // -----------------------------------------------------------------------
    // User intent
    // -----------------------------------------------------------------------

    /// The user pressed line `index`.
    ///
    /// While playing the selection is locked; the line is only scrolled into
    /// view.
    pub fn select(&mut self, store: &mut LineStore, index: usize) -> Vec<Effect> {
        if index >= store.len() {
            debug_assert!(false, "select({index}) past {} lines", store.len());
            log::warn!("scheduler: ignoring selection of line {index} past the end");
            return Vec::new();
        }
        if self.session.is_playing {
            return vec![Effect::ScrollTo {
                index,
                animated: true,
            }];
        }

        store.set_selected(self.session.selected_index, false);
        store.set_selected(index, true);
        self.session.selected_index = index;
        log::debug!("scheduler: selected line {index}");
        Vec::new()
    }

    /// Start reading from the selected line.
    pub fn play(&mut self, store: &mut LineStore) -> Vec<Effect> {
        if self.session.is_playing || store.is_empty() {
            return Vec::new();
        }

        let selected = self.session.selected_index.min(store.len() - 1);
        self.session.selected_index = selected;
        self.session.last_scheduled_index =
            (selected + self.options.schedule_length).min(store.len() - 1);
        self.session.current_speech_id = 0;
        self.session.is_playing = true;
        self.session.stop_requested = false;
        store.set_selected(selected, true);

        log::debug!(
            "scheduler: play {selected}..={}",
            self.session.last_scheduled_index
        );

        match store.ensure_voice_segments(selected) {
            Some(_) => self.speak_next(store),
            None => self.advance(store),
        }
    }

    /// Ask the engine to cancel.  Playback ends when the cancel arrives.
    pub fn pause(&mut self, store: &mut LineStore) -> Vec<Effect> {
        if !self.session.is_playing || self.session.stop_requested {
            return Vec::new();
        }
        if self.session.in_flight.is_none() {
            self.settle_cancelled(store);
            return Vec::new();
        }
        self.session.stop_requested = true;
        log::debug!("scheduler: stop requested");
        vec![Effect::Stop]
    }

    /// Play when idle, pause when playing.
    pub fn toggle(&mut self, store: &mut LineStore) -> Vec<Effect> {
        if self.session.is_playing {
            self.pause(store)
        } else {
            self.play(store)
        }
    }

    /// The host reports the first visible row of its list.
    pub fn viewport_changed(&mut self, first_visible: usize) {
        self.session.first_visible = Some(first_visible);
    }

    /// Bring the selected line back into view: jump next to it, then scroll
    /// the last row with animation.
    pub fn locate(&self, store: &LineStore) -> Vec<Effect> {
        let selected = self.session.selected_index;
        if store.is_empty() || self.session.first_visible == Some(selected) {
            return Vec::new();
        }
        let nudge = match self.session.first_visible {
            Some(first) if first > selected => (selected + 1).min(store.len() - 1),
            _ => selected.saturating_sub(1),
        };
        vec![
            Effect::ScrollTo {
                index: nudge,
                animated: false,
            },
            Effect::ScrollTo {
                index: selected,
                animated: true,
            },
        ]
    }

    /// `selected/last_scheduled (count)` while a window is active,
    /// `selected/count` otherwise.
    pub fn progress(&self, store: &LineStore) -> Progress {
        let count = store.len();
        let selected = self.session.selected_index;
        let percent = if count == 0 {
            0.0
        } else {
            selected as f32 / count as f32 * 100.0
        };
        let label = match self.session.last_scheduled_index {
            0 => format!("{selected}/{count}"),
            last => format!("{selected}/{last} ({count})"),
        };
        Progress { percent, label }
    }

    // -----------------------------------------------------------------------
    // Engine events
    // -----------------------------------------------------------------------

    pub fn on_start(&mut self, store: &mut LineStore, id: UtteranceId) -> Vec<Effect> {
        if self.session.in_flight != Some(id) {
            log::debug!("scheduler: stray start for utterance {id}");
            return Vec::new();
        }

        let selected = self.session.selected_index;
        store.set_reading(selected, true);

        let drifted = match self.session.first_visible {
            None => true,
            Some(first) => (first + 1).abs_diff(selected) > self.options.follow_tolerance,
        };
        if drifted {
            vec![Effect::ScrollTo {
                index: selected,
                animated: true,
            }]
        } else {
            Vec::new()
        }
    }

    pub fn on_finish(&mut self, store: &mut LineStore, id: UtteranceId) -> Vec<Effect> {
        if !self.session.is_playing || self.session.in_flight != Some(id) {
            log::debug!("scheduler: stray finish for utterance {id}");
            return Vec::new();
        }
        self.session.in_flight = None;

        if self.session.stop_requested {
            self.settle_cancelled(store);
            return Vec::new();
        }

        self.session.current_speech_id += 1;
        let last = store
            .get(self.session.selected_index)
            .and_then(|line| line.last_speech_id());
        match last {
            Some(last) if self.session.current_speech_id <= last => self.speak_next(store),
            _ => self.advance(store),
        }
    }

    /// Idempotent: a second cancel, or one for an utterance that is no
    /// longer in flight, changes nothing.
    pub fn on_cancel(&mut self, store: &mut LineStore, id: UtteranceId) -> Vec<Effect> {
        match self.session.in_flight {
            Some(in_flight) if in_flight != id => {
                log::debug!("scheduler: stray cancel for utterance {id}");
            }
            _ if !self.session.is_playing => {
                log::debug!("scheduler: cancel for utterance {id} while idle");
            }
            _ => self.settle_cancelled(store),
        }
        Vec::new()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn settle_cancelled(&mut self, store: &mut LineStore) {
        store.set_reading(self.session.selected_index, false);
        self.session.last_scheduled_index = 0;
        self.session.current_speech_id = 0;
        self.session.is_playing = false;
        self.plays_ended += 1;
        self.session.stop_requested = false;
        self.session.in_flight = None;
        log::debug!(
            "scheduler: stopped at line {}",
            self.session.selected_index
        );
    }

    fn speak_next(&mut self, store: &mut LineStore) -> Vec<Effect> {
        debug_assert!(self.session.in_flight.is_none(), "utterance already in flight");

        let selected = self.session.selected_index;
        let Some(segment) = store.voice_segment(selected, self.session.current_speech_id) else {
            debug_assert!(false, "no voice segment to speak on line {selected}");
            log::warn!("scheduler: line {selected} has nothing left to speak");
            return self.advance(store);
        };

        let id = self.next_utterance;
        self.next_utterance += 1;
        self.session.in_flight = Some(id);

        let text = format!(
            "{}{}{}",
            self.options.speech_prefix, segment.text, self.options.speech_suffix
        );
        let voice = segment.style.clone();
        let utterance = Utterance {
            id,
            text,
            voice_id: voice.voice_id.clone(),
        };
        vec![Effect::SetVoice(voice), Effect::Speak(utterance)]
    }

    /// Move past the selected line until a speakable line is found or the
    /// window ends.
    fn advance(&mut self, store: &mut LineStore) -> Vec<Effect> {
        loop {
            let selected = self.session.selected_index;

            if selected + 1 >= store.len() {
                store.set_read(selected, true);
                store.set_reading(selected, false);
                self.session.is_playing = false;
                self.plays_ended += 1;
                self.session.last_scheduled_index = 0;
                self.session.current_speech_id = 0;
                log::info!("scheduler: reached the end of the document");
                return Vec::new();
            }

            let next = selected + 1;
            store.ensure_voice_segments(next);
            store.set_read(selected, true);
            store.set_reading(selected, false);
            store.set_selected(selected, false);

            if selected >= self.session.last_scheduled_index {
                match self.options.window_policy {
                    WindowPolicy::Stop => {
                        store.set_selected(next, true);
                        self.session.selected_index = next;
                        self.session.last_scheduled_index = 0;
                        self.session.current_speech_id = 0;
                        self.session.is_playing = false;
                self.plays_ended += 1;
                        log::debug!("scheduler: window ended, line {next} selected");
                        return Vec::new();
                    }
                    WindowPolicy::Extend => {
                        self.session.last_scheduled_index =
                            (next + self.options.schedule_length).min(store.len() - 1);
                        log::debug!(
                            "scheduler: window extended to {}",
                            self.session.last_scheduled_index
                        );
                    }
                }
            }

            store.set_selected(next, true);
            self.session.selected_index = next;
            self.session.current_speech_id = 0;

            if store.get(next).is_some_and(|line| line.is_speakable()) {
                store.set_reading(next, true);
                return self.speak_next(store);
            }
            log::debug!("scheduler: skipping silent line {next}");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
