//! Indexed line collection backing both rendering and playback.

use super::line::{Line, LineStatus};
use crate::config::{LinePalette, ReaderProfile};
use crate::text::{Segment, StylePainter, TextStyle, VoiceSegmentBuilder, VoiceStyle};

/// Read-only projection of one line for the host's list view.
#[derive(Debug, Clone, PartialEq)]
pub struct LineView {
    pub index: usize,
    pub segments: Vec<Segment<TextStyle>>,
    pub status: LineStatus,
    /// Row background color for `status`.
    pub background: String,
}

/// All lines of one opened document.
///
/// Text segments are painted lazily and memoized against a generation
/// counter; [`restyle`](Self::restyle) bumps it so every row repaints on its
/// next view.  Voice segments are built on demand by the scheduler and kept
/// until the store is replaced by a re-parse.
#[derive(Debug, Clone)]
pub struct LineStore {
    lines: Vec<Line>,
    painter: StylePainter<TextStyle>,
    voice: VoiceSegmentBuilder,
    palette: LinePalette,
    generation: u64,
}

impl LineStore {
    pub fn new(
        texts: Vec<String>,
        painter: StylePainter<TextStyle>,
        voice: VoiceSegmentBuilder,
        palette: LinePalette,
    ) -> Self {
        let lines = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Line::new(index, text))
            .collect();
        Self {
            lines,
            painter,
            voice,
            palette,
            generation: 0,
        }
    }

    /// Build a store for already split line texts using `profile`'s painters.
    pub fn from_profile(texts: Vec<String>, profile: &ReaderProfile) -> Self {
        Self::new(
            texts,
            profile.text_painter.clone(),
            profile.voice.clone(),
            profile.render.palette.clone(),
        )
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self, index: usize) -> Option<LineStatus> {
        self.get(index).map(Line::status)
    }

    /// Number of lines currently marked reading.  At most one while the
    /// scheduler's invariants hold.
    pub fn reading_count(&self) -> usize {
        self.lines.iter().filter(|l| l.is_reading).count()
    }

    // -----------------------------------------------------------------------
    // Text segments
    // -----------------------------------------------------------------------

    /// Painted segments of line `index`, painting it first if its memo is
    /// missing or stale.
    pub fn text_segments(&mut self, index: usize) -> Option<&[Segment<TextStyle>]> {
        let generation = self.generation;
        let line = self.lines.get_mut(index)?;

        let fresh = matches!(&line.text_segments, Some((g, _)) if *g == generation);
        if !fresh {
            let painted = self.painter.paint(line.text());
            line.text_segments = Some((generation, painted));
        }
        line.text_segments.as_ref().map(|(_, s)| s.as_slice())
    }

    /// Swap the visual painter and invalidate every memoized paint.
    pub fn restyle(&mut self, painter: StylePainter<TextStyle>, palette: LinePalette) {
        self.painter = painter;
        self.palette = palette;
        self.generation += 1;
        log::debug!("line store restyled, generation {}", self.generation);
    }

    /// Project line `index` for rendering.
    pub fn view(&mut self, index: usize) -> Option<LineView> {
        let segments = self.text_segments(index)?.to_vec();
        let status = self.lines[index].status();
        let background = match status {
            LineStatus::None => &self.palette.line,
            LineStatus::Scheduled => &self.palette.scheduled,
            LineStatus::Read => &self.palette.read,
            LineStatus::Selected => &self.palette.selected,
            LineStatus::Reading => &self.palette.reading,
        }
        .clone();

        Some(LineView {
            index,
            segments,
            status,
            background,
        })
    }

    // -----------------------------------------------------------------------
    // Voice segments
    // -----------------------------------------------------------------------

    /// Build the voice segments of line `index` unless they already exist.
    /// Returns the line's last speech id.
    pub fn ensure_voice_segments(&mut self, index: usize) -> Option<usize> {
        let line = self.lines.get_mut(index)?;
        if line.voice_segments.is_none() {
            let segments = self.voice.build(line.text());
            log::debug!("line {index}: built {} voice segments", segments.len());
            line.voice_segments = Some(segments);
        }
        line.last_speech_id()
    }

    /// Voice segment `speech_id` of line `index`.
    pub fn voice_segment(&self, index: usize, speech_id: usize) -> Option<&Segment<VoiceStyle>> {
        self.lines
            .get(index)?
            .voice_segments
            .as_ref()?
            .get(speech_id)
    }

    // -----------------------------------------------------------------------
    // Flags
    // -----------------------------------------------------------------------

    pub fn set_selected(&mut self, index: usize, value: bool) {
        if let Some(line) = self.lines.get_mut(index) {
            line.is_selected = value;
        }
    }

    pub fn set_reading(&mut self, index: usize, value: bool) {
        if let Some(line) = self.lines.get_mut(index) {
            line.is_reading = value;
        }
    }

    pub fn set_read(&mut self, index: usize, value: bool) {
        if let Some(line) = self.lines.get_mut(index) {
            line.is_read = value;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
