//! Row heights for the host's virtualized list.
//!
//! Heights only size the list; they never influence parsing or playback.

use crate::config::RenderConfig;
use crate::text::TextStyle;

/// Font size assumed when the style leaves it unset.
const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Measures the rendered text height of each string at a given style.
pub trait HeightMeasurer {
    /// One height per input string, in points.  A non-positive height is
    /// treated as unmeasured.
    fn measure(&self, texts: &[&str], style: &TextStyle) -> Vec<f32>;
}

/// Width-based estimate: every character is one em wide and lines wrap at
/// `width`.
#[derive(Debug, Clone)]
pub struct EstimatedMeasurer {
    pub width: f32,
}

impl HeightMeasurer for EstimatedMeasurer {
    fn measure(&self, texts: &[&str], style: &TextStyle) -> Vec<f32> {
        let font_size = style.font_size.unwrap_or(DEFAULT_FONT_SIZE);
        let line_height = style.line_height.unwrap_or(font_size * 1.4);
        let per_row = (self.width / font_size).floor().max(1.0) as usize;

        texts
            .iter()
            .map(|text| {
                let chars = text.chars().count().max(1);
                let rows = chars.div_ceil(per_row);
                rows as f32 * line_height
            })
            .collect()
    }
}

/// Cumulative row geometry of a document.
#[derive(Debug, Clone, Default)]
pub struct LineLayout {
    heights: Vec<f32>,
    offsets: Vec<f32>,
}

impl LineLayout {
    /// Measure `texts` and add the configured padding and spacing.
    pub fn measure(texts: &[&str], render: &RenderConfig, measurer: &dyn HeightMeasurer) -> Self {
        let fallback = render.text_style.font_size.unwrap_or(DEFAULT_FONT_SIZE);
        let chrome = 2.0 * render.line_padding_y + render.line_spacing;
        let measured = measurer.measure(texts, &render.text_style);

        let heights: Vec<f32> = (0..texts.len())
            .map(|i| {
                let h = measured.get(i).copied().unwrap_or(0.0);
                let content = if h > 0.0 { h } else { fallback };
                content + chrome
            })
            .collect();

        let mut offsets = Vec::with_capacity(heights.len());
        let mut y = 0.0;
        for h in &heights {
            offsets.push(y);
            y += h;
        }

        Self { heights, offsets }
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn row_height(&self, index: usize) -> Option<f32> {
        self.heights.get(index).copied()
    }

    /// Top edge of row `index`.
    pub fn offset_of(&self, index: usize) -> Option<f32> {
        self.offsets.get(index).copied()
    }

    pub fn total_height(&self) -> f32 {
        match (self.offsets.last(), self.heights.last()) {
            (Some(o), Some(h)) => o + h,
            _ => 0.0,
        }
    }

    /// Row containing vertical position `y`.
    pub fn row_at(&self, y: f32) -> Option<usize> {
        if self.is_empty() || y < 0.0 || y >= self.total_height() {
            return None;
        }
        let index = self.offsets.partition_point(|&top| top <= y);
        Some(index.saturating_sub(1))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedMeasurer(Vec<f32>);

    impl HeightMeasurer for FixedMeasurer {
        fn measure(&self, _texts: &[&str], _style: &TextStyle) -> Vec<f32> {
            self.0.clone()
        }
    }

    fn render() -> RenderConfig {
        RenderConfig {
            line_padding_y: 5.0,
            line_spacing: 2.0,
            text_style: TextStyle {
                font_size: Some(10.0),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn heights_include_padding_and_fallback() {
        let layout = LineLayout::measure(
            &["a", "b", "c"],
            &render(),
            &FixedMeasurer(vec![20.0, 0.0]),
        );
        assert_eq!(layout.row_height(0), Some(32.0));
        assert_eq!(layout.row_height(1), Some(22.0));
        assert_eq!(layout.row_height(2), Some(22.0));
        assert_eq!(layout.offset_of(2), Some(54.0));
        assert_eq!(layout.total_height(), 76.0);
    }

    #[test]
    fn row_lookup() {
        let layout = LineLayout::measure(&["a", "b"], &render(), &FixedMeasurer(vec![10.0, 10.0]));
        assert_eq!(layout.row_at(0.0), Some(0));
        assert_eq!(layout.row_at(21.9), Some(0));
        assert_eq!(layout.row_at(22.0), Some(1));
        assert_eq!(layout.row_at(44.0), None);
        assert_eq!(layout.row_at(-1.0), None);
    }

    #[test]
    fn estimate_wraps_by_width() {
        let measurer = EstimatedMeasurer { width: 40.0 };
        let style = TextStyle {
            font_size: Some(10.0),
            line_height: Some(12.0),
            ..Default::default()
        };
        assert_eq!(measurer.measure(&["abcd", "abcde", ""], &style), vec![12.0, 24.0, 12.0]);
    }
}
