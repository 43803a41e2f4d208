//! Text-processing building blocks for the reader.
//!
//! Everything here is pure and deterministic; the document parser and the
//! playback scheduler compose these pieces.
//!
//! ```text
//! raw text ─▶ normalize ─▶ EditPipeline (pre-edits) ─▶ Segmenter
//!          ─▶ EditPipeline (per-line edits) ─▶ lines
//!
//! line ─▶ StylePainter<TextStyle>  ─▶ display segments
//! line ─▶ VoiceSegmentBuilder      ─▶ speakable segments
//!            (StylePainter<VoiceStyle> + trim/filter + voice EditPipeline)
//! ```

pub mod edit;
pub mod normalize;
pub mod paint;
pub mod split;
pub mod style;
pub mod voice;
pub mod zh_number;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use edit::{normalize_replacement, EditPipeline, EditRule};
pub use normalize::{decode_html_entities, to_full_width, to_half_width};
pub use paint::{paint, PaintRule, Segment, StylePainter};
pub use split::Segmenter;
pub use style::{Style, TextStyle, VoiceStyle};
pub use voice::VoiceSegmentBuilder;
pub use zh_number::{pad_number, parse_zh_number, sort_title};
