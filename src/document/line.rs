//! A single line record and its derived display status.

use crate::text::{Segment, TextStyle, VoiceStyle};

/// Display status of a line, derived from its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    None,
    Scheduled,
    Read,
    Selected,
    Reading,
}

impl std::fmt::Display for LineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Scheduled => "scheduled",
            Self::Read => "read",
            Self::Selected => "selected",
            Self::Reading => "reading",
        };
        f.write_str(s)
    }
}

/// One display-and-speech unit of the document.
#[derive(Debug, Clone)]
pub struct Line {
    index: usize,
    text: String,
    /// Painted segments tagged with the store generation they were painted at.
    pub(super) text_segments: Option<(u64, Vec<Segment<TextStyle>>)>,
    pub(super) voice_segments: Option<Vec<Segment<VoiceStyle>>>,
    pub(super) is_selected: bool,
    pub(super) is_reading: bool,
    pub(super) is_read: bool,
}

impl Line {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            text_segments: None,
            voice_segments: None,
            is_selected: false,
            is_reading: false,
            is_read: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    pub fn is_reading(&self) -> bool {
        self.is_reading
    }

    pub fn is_read(&self) -> bool {
        self.is_read
    }

    /// Voice segments, once the scheduler has built them.
    pub fn voice_segments(&self) -> Option<&[Segment<VoiceStyle>]> {
        self.voice_segments.as_deref()
    }

    /// Index of the last speakable segment; `None` when the line has not been
    /// scheduled or has nothing to say.
    pub fn last_speech_id(&self) -> Option<usize> {
        self.voice_segments
            .as_ref()
            .and_then(|segments| segments.len().checked_sub(1))
    }

    /// Whether the line has at least one speakable segment.
    pub fn is_speakable(&self) -> bool {
        self.last_speech_id().is_some()
    }

    /// Reading > Selected > Read > Scheduled > None.
    pub fn status(&self) -> LineStatus {
        if self.is_reading {
            LineStatus::Reading
        } else if self.is_selected {
            LineStatus::Selected
        } else if self.is_read {
            LineStatus::Read
        } else if self.voice_segments.is_some() {
            LineStatus::Scheduled
        } else {
            LineStatus::None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
