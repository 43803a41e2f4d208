//! Style records for the two painting domains.
//!
//! Both [`TextStyle`] and [`VoiceStyle`] are "partial" records: every field is
//! optional, so the same type serves as a fully-populated base style and as a
//! patch that only carries the attributes a paint rule wants to change.
//!
//! ```
//! use read_aloud::text::{Style, TextStyle};
//!
//! let base = TextStyle { color: Some("#fff".into()), font_size: Some(18.0), ..Default::default() };
//! let patch = TextStyle { color: Some("#f00".into()), ..Default::default() };
//! let merged = base.merged(&patch);
//! assert_eq!(merged.color.as_deref(), Some("#f00"));
//! assert_eq!(merged.font_size, Some(18.0));
//! ```

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Style trait
// ---------------------------------------------------------------------------

/// A mergeable style record.
///
/// [`StylePainter`](crate::text::StylePainter) is generic over this trait so
/// the visual and vocal domains share one painting algorithm.
pub trait Style: Clone + Default + PartialEq + std::fmt::Debug {
    /// Return a copy of `self` with every field that `patch` defines
    /// overwritten.  Fields `patch` leaves as `None` keep their base value.
    fn merged(&self, patch: &Self) -> Self;
}

fn pick<T: Clone>(base: &Option<T>, patch: &Option<T>) -> Option<T> {
    patch.clone().or_else(|| base.clone())
}

// ---------------------------------------------------------------------------
// TextStyle
// ---------------------------------------------------------------------------

/// Visual attributes of a run of text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    /// Foreground color, e.g. `"#F7F7EF"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Font size in points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    /// `"normal"`, `"bold"` or a numeric weight such as `"600"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// `"normal"` or `"italic"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

impl Style for TextStyle {
    fn merged(&self, patch: &Self) -> Self {
        Self {
            color: pick(&self.color, &patch.color),
            font_size: pick(&self.font_size, &patch.font_size),
            font_weight: pick(&self.font_weight, &patch.font_weight),
            font_family: pick(&self.font_family, &patch.font_family),
            font_style: pick(&self.font_style, &patch.font_style),
            line_height: pick(&self.line_height, &patch.line_height),
            background_color: pick(&self.background_color, &patch.background_color),
        }
    }
}

// ---------------------------------------------------------------------------
// VoiceStyle
// ---------------------------------------------------------------------------

/// Synthesis attributes of a run of speech.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceStyle {
    /// Engine-specific voice identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    /// Pitch multiplier, `1.0` is the engine default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f32>,
    /// Speaking-rate multiplier, `1.0` is the engine default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f32>,
}

impl Style for VoiceStyle {
    fn merged(&self, patch: &Self) -> Self {
        Self {
            voice_id: pick(&self.voice_id, &patch.voice_id),
            pitch: pick(&self.pitch, &patch.pitch),
            rate: pick(&self.rate, &patch.rate),
        }
    }
}

impl VoiceStyle {
    /// Short `P0.9 R0.7` label for status displays; `None` unless both pitch
    /// and rate are set.
    pub fn label(&self) -> Option<String> {
        match (self.pitch, self.rate) {
            (Some(pitch), Some(rate)) => Some(format!("P{pitch:.1} R{rate:.1}")),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_fields_win() {
        let base = VoiceStyle {
            voice_id: Some("ting".into()),
            pitch: Some(0.9),
            rate: Some(0.7),
        };
        let patch = VoiceStyle {
            voice_id: Some("mei".into()),
            ..Default::default()
        };
        let merged = base.merged(&patch);
        assert_eq!(merged.voice_id.as_deref(), Some("mei"));
        assert_eq!(merged.pitch, Some(0.9));
        assert_eq!(merged.rate, Some(0.7));
    }

    #[test]
    fn empty_patch_is_identity() {
        let base = TextStyle {
            color: Some("#F7F7EF".into()),
            font_weight: Some("normal".into()),
            ..Default::default()
        };
        assert_eq!(base.merged(&TextStyle::default()), base);
    }

    #[test]
    fn voice_label_requires_pitch_and_rate() {
        let full = VoiceStyle {
            voice_id: None,
            pitch: Some(0.9),
            rate: Some(0.7),
        };
        assert_eq!(full.label().as_deref(), Some("P0.9 R0.7"));
        assert!(VoiceStyle::default().label().is_none());
    }
}
