//! Line text → speakable voice segments.

use super::edit::EditPipeline;
use super::paint::{Segment, StylePainter};
use super::style::VoiceStyle;

/// Segments whose trimmed text is this many characters or fewer are never
/// sent to the speech engine.
const MIN_SPEAKABLE_CHARS: usize = 1;

/// Paints a line in the voice domain and cleans each run up for synthesis.
#[derive(Debug, Clone, Default)]
pub struct VoiceSegmentBuilder {
    painter: StylePainter<VoiceStyle>,
    edits: EditPipeline,
}

impl VoiceSegmentBuilder {
    pub fn new(painter: StylePainter<VoiceStyle>, edits: EditPipeline) -> Self {
        Self { painter, edits }
    }

    /// The voice style used where no paint rule matched.
    pub fn base_style(&self) -> &VoiceStyle {
        self.painter.base()
    }

    /// Build the speakable segments of `text`, in source order.
    ///
    /// 1. paint with the voice rules,
    /// 2. trim every segment,
    /// 3. drop segments of one character or less (stray punctuation),
    /// 4. apply the voice edits to the survivors.
    pub fn build(&self, text: &str) -> Vec<Segment<VoiceStyle>> {
        self.painter
            .paint(text)
            .into_iter()
            .filter_map(|segment| {
                let trimmed = segment.text.trim();
                if trimmed.chars().count() <= MIN_SPEAKABLE_CHARS {
                    return None;
                }
                Some(Segment::new(self.edits.apply(trimmed), segment.style))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
