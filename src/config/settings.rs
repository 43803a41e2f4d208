//! Reader settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files.  Rule patterns are kept
//! as strings here; [`ReaderConfig::compile`](crate::config::ReaderConfig::compile)
//! turns them into a [`ReaderProfile`](crate::config::ReaderProfile).
//!
//! Scalar fields are declared before nested tables in every struct so the
//! TOML output never places a plain value after a sub-table.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::text::{TextStyle, VoiceStyle};

// ---------------------------------------------------------------------------
// Rule entries
// ---------------------------------------------------------------------------

/// A `(pattern, replacement)` pair as written in `settings.toml`.
///
/// `replace` uses `$1` / `$&` references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRuleConfig {
    pub pattern: String,
    pub replace: String,
}

impl EditRuleConfig {
    pub fn new(pattern: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replace: replace.into(),
        }
    }
}

/// A `(pattern, style patch)` pair as written in `settings.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintRuleConfig<S> {
    pub pattern: String,
    pub style: S,
}

impl<S> PaintRuleConfig<S> {
    pub fn new(pattern: impl Into<String>, style: S) -> Self {
        Self {
            pattern: pattern.into(),
            style,
        }
    }
}

// ---------------------------------------------------------------------------
// PreprocessConfig
// ---------------------------------------------------------------------------

/// Whole-document normalization applied before splitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Decode HTML entities (`&amp;`, `&#8220;` …).
    pub decode_html: bool,
    /// Convert ASCII to full-width forms.
    pub to_full_width: bool,
    /// Convert full-width forms to ASCII.  Applied after `to_full_width`.
    pub to_half_width: bool,
    /// Edit rules applied to the whole document.
    pub pre_edits: Vec<EditRuleConfig>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            decode_html: true,
            to_full_width: false,
            to_half_width: false,
            pre_edits: vec![
                EditRuleConfig::new("★☆.*☆★", ""),
                EditRuleConfig::new(" *([a-zA-Z0-9 ]+) *", " $1 "),
                EditRuleConfig::new("!", "! "),
                EditRuleConfig::new("\\?", "? "),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// SplitConfig
// ---------------------------------------------------------------------------

/// How the document is cut into lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Delimiter pattern; matches are not part of any line.
    pub pattern: String,
    /// Drop zero-length lines before numbering.
    pub remove_empty_lines: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            pattern: " *[\\n\\r]+ *".into(),
            remove_empty_lines: true,
        }
    }
}

// ---------------------------------------------------------------------------
// RenderConfig
// ---------------------------------------------------------------------------

/// Row background colors, one per line status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinePalette {
    pub page: String,
    pub line: String,
    pub selected: String,
    pub scheduled: String,
    pub reading: String,
    pub read: String,
}

impl Default for LinePalette {
    fn default() -> Self {
        Self {
            page: "#000".into(),
            line: "#00000022".into(),
            selected: "#ffffff44".into(),
            scheduled: "#00ccff44".into(),
            reading: "#ffcccc44".into(),
            read: "#ff008822".into(),
        }
    }
}

fn color(c: &str) -> TextStyle {
    TextStyle {
        color: Some(c.into()),
        ..Default::default()
    }
}

/// Visual styling of lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Horizontal padding of a row, in points.
    pub line_padding_x: f32,
    /// Vertical padding above and below a row's text, in points.
    pub line_padding_y: f32,
    /// Extra space between rows, in points.
    pub line_spacing: f32,
    /// Base style every line starts from.
    pub text_style: TextStyle,
    pub palette: LinePalette,
    /// Paint rules, applied in order.
    pub text_paints: Vec<PaintRuleConfig<TextStyle>>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            line_padding_x: 0.0,
            line_padding_y: 15.0,
            line_spacing: 0.0,
            text_style: TextStyle {
                color: Some("#F7F7EF".into()),
                font_size: Some(18.0),
                font_weight: Some("normal".into()),
                font_family: Some("PingFang SC".into()),
                font_style: Some("normal".into()),
                line_height: None,
                background_color: Some("#00000000".into()),
            },
            palette: LinePalette::default(),
            text_paints: vec![
                PaintRuleConfig::new(
                    "第.+[卷章].+",
                    TextStyle {
                        color: Some("#65D9EF".into()),
                        font_weight: Some("bold".into()),
                        ..Default::default()
                    },
                ),
                PaintRuleConfig::new("“+.+?”+", color("#E6DB73")),
                PaintRuleConfig::new("「+.+?」+", color("#E6DB73")),
                PaintRuleConfig::new("[a-zA-Z ]+", color("#B4E1D2")),
                PaintRuleConfig::new("[0-9]+", color("#AE81FF")),
                PaintRuleConfig::new("[零〇一二两三四五六七八九十百千万亿兆]+", color("#AE81FF")),
                PaintRuleConfig::new("《+.+?》+", color("#F92671")),
                PaintRuleConfig::new("【+.+?】+", color("#F92671")),
                PaintRuleConfig::new("『+.+?』+", color("#F92671")),
                PaintRuleConfig::new(
                    "[我你他她它]们?",
                    TextStyle {
                        font_style: Some("italic".into()),
                        ..Default::default()
                    },
                ),
                PaintRuleConfig::new("（+.+?）+", color("#74705E")),
                PaintRuleConfig::new("\\(+.+?\\)+", color("#74705E")),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// ReadingConfig
// ---------------------------------------------------------------------------

/// What happens when playback reaches the end of the look-ahead window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowPolicy {
    /// Stop and select the next line; the user presses Play to continue.
    Stop,
    /// Re-extend the window from the next line and keep reading.
    Extend,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self::Stop
    }
}

fn voice(id: &str) -> VoiceStyle {
    VoiceStyle {
        voice_id: Some(id.into()),
        ..Default::default()
    }
}

const QUOTE_VOICE: &str = "com.apple.ttsbundle.Mei-Jia-premium";

/// Read-aloud behaviour and voice styling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    /// How many lines past the selected one a single Play may read.
    pub schedule_length: usize,
    pub window_policy: WindowPolicy,
    /// Rows of drift between the viewport and the reading line tolerated
    /// before an auto-scroll is requested.
    pub follow_tolerance: usize,
    /// Padding spoken before every segment, keeps engines from clipping the
    /// first syllable.
    pub speech_prefix: String,
    /// Padding spoken after every segment.
    pub speech_suffix: String,
    /// Base voice every line starts from.
    pub voice_style: VoiceStyle,
    /// Voice paint rules, applied in order.
    pub voice_paints: Vec<PaintRuleConfig<VoiceStyle>>,
    /// Edits applied to each speakable segment.
    pub voice_edits: Vec<EditRuleConfig>,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            schedule_length: 100,
            window_policy: WindowPolicy::default(),
            follow_tolerance: 3,
            speech_prefix: "　　".into(),
            speech_suffix: "    ".into(),
            voice_style: VoiceStyle {
                voice_id: Some("com.apple.ttsbundle.Ting-Ting-compact".into()),
                pitch: Some(1.0),
                rate: Some(0.6),
            },
            voice_paints: vec![
                PaintRuleConfig::new("“+.+?”+", voice(QUOTE_VOICE)),
                PaintRuleConfig::new("「+.+?」+", voice(QUOTE_VOICE)),
                PaintRuleConfig::new(
                    "‘+.+?’+",
                    VoiceStyle {
                        voice_id: Some(QUOTE_VOICE.into()),
                        pitch: Some(0.7),
                        rate: Some(0.5),
                    },
                ),
                PaintRuleConfig::new(
                    "『+.+?』+",
                    VoiceStyle {
                        voice_id: Some(QUOTE_VOICE.into()),
                        pitch: Some(0.7),
                        rate: Some(0.5),
                    },
                ),
                PaintRuleConfig::new(
                    "（+.+?）+",
                    VoiceStyle {
                        voice_id: None,
                        pitch: Some(0.6),
                        rate: Some(0.6),
                    },
                ),
                PaintRuleConfig::new(
                    "\\(+.+?\\)+",
                    VoiceStyle {
                        voice_id: None,
                        pitch: Some(0.6),
                        rate: Some(0.6),
                    },
                ),
            ],
            voice_edits: vec![
                EditRuleConfig::new("[“”‘’（）\\(\\)「」『』]", ""),
                EditRuleConfig::new("^…+", ""),
                EditRuleConfig::new("(.)…+", "$1$1$1。"),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// ReaderConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level reader configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use read_aloud::config::ReaderConfig;
///
/// // Load (returns Default, with the shipped edits, when file is missing)
/// let config = ReaderConfig::load().unwrap();
///
/// // Compile once; the profile is what the parser and scheduler consume.
/// let profile = config.compile().unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub preprocess: PreprocessConfig,
    pub split: SplitConfig,
    pub render: RenderConfig,
    pub reading: ReadingConfig,
    /// Edit rules applied to every line after splitting.
    pub edits: Vec<EditRuleConfig>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            preprocess: PreprocessConfig::default(),
            split: SplitConfig::default(),
            render: RenderConfig::default(),
            reading: ReadingConfig::default(),
            edits: Self::default_edits(),
        }
    }
}

impl ReaderConfig {
    /// The per-line edits shipped by default: indent every line with two
    /// ideographic spaces and pad curly-quoted speech with spaces.
    pub fn default_edits() -> Vec<EditRuleConfig> {
        vec![
            EditRuleConfig::new("^", "　　"),
            EditRuleConfig::new(" *(“.+?”) *", " $1 "),
            EditRuleConfig::new(" *(‘.+?’) *", " $1 "),
        ]
    }

    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns the shipped defaults when the file does not exist yet
    /// (first-run scenario).
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// A default `ReaderConfig` survives a TOML round trip.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = ReaderConfig::default();
        original.save_to(&path).expect("save");

        let loaded = ReaderConfig::load_from(&path).expect("load");

        assert_eq!(original.preprocess.decode_html, loaded.preprocess.decode_html);
        assert_eq!(original.preprocess.pre_edits, loaded.preprocess.pre_edits);
        assert_eq!(original.split.pattern, loaded.split.pattern);
        assert_eq!(original.edits, loaded.edits);
        assert_eq!(original.render.text_style, loaded.render.text_style);
        assert_eq!(original.render.text_paints, loaded.render.text_paints);
        assert_eq!(original.render.palette, loaded.render.palette);
        assert_eq!(original.reading.schedule_length, loaded.reading.schedule_length);
        assert_eq!(original.reading.voice_style, loaded.reading.voice_style);
        assert_eq!(original.reading.voice_paints, loaded.reading.voice_paints);
        assert_eq!(original.reading.voice_edits, loaded.reading.voice_edits);
        assert_eq!(original.reading.speech_prefix, loaded.reading.speech_prefix);
    }

    /// `load_from` on a non-existent path returns the shipped defaults.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = ReaderConfig::load_from(&path).expect("should not error");

        assert_eq!(config.edits, ReaderConfig::default_edits());
        assert_eq!(config.reading.schedule_length, 100);
        assert_eq!(config.split.pattern, " *[\\n\\r]+ *");
    }

    #[test]
    fn default_values() {
        let cfg = ReaderConfig::default();

        assert!(cfg.preprocess.decode_html);
        assert!(!cfg.preprocess.to_full_width);
        assert!(cfg.split.remove_empty_lines);
        assert_eq!(cfg.edits, ReaderConfig::default_edits());
        assert_eq!(cfg.render.text_paints.len(), 12);
        assert_eq!(cfg.render.line_padding_y, 15.0);
        assert_eq!(cfg.reading.window_policy, WindowPolicy::Stop);
        assert_eq!(cfg.reading.follow_tolerance, 3);
        assert_eq!(cfg.reading.voice_edits.len(), 3);
    }

    /// Partial files fill the rest from defaults.
    #[test]
    fn partial_file_uses_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            "[reading]\nschedule_length = 5\nwindow_policy = \"extend\"\n",
        )
        .unwrap();

        let cfg = ReaderConfig::load_from(&path).expect("load");
        assert_eq!(cfg.reading.schedule_length, 5);
        assert_eq!(cfg.reading.window_policy, WindowPolicy::Extend);
        assert_eq!(cfg.reading.voice_edits.len(), 3);
        assert_eq!(cfg.edits, ReaderConfig::default_edits());
    }

    /// An explicit empty list is kept, not replaced by the shipped edits.
    #[test]
    fn explicit_empty_edits_survive_load() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("no-edits.toml");
        std::fs::write(&path, "edits = []\n").unwrap();

        let cfg = ReaderConfig::load_from(&path).expect("load");
        assert!(cfg.edits.is_empty());
        assert_eq!(cfg.reading.schedule_length, 100);
    }

    #[test]
    fn modified_values_survive_round_trip() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = ReaderConfig::default();
        cfg.preprocess.to_half_width = true;
        cfg.split.remove_empty_lines = false;
        cfg.reading.schedule_length = 7;
        cfg.reading.window_policy = WindowPolicy::Extend;
        cfg.edits = vec![EditRuleConfig::new("a", "b")];

        cfg.save_to(&path).expect("save");
        let loaded = ReaderConfig::load_from(&path).expect("load");

        assert!(loaded.preprocess.to_half_width);
        assert!(!loaded.split.remove_empty_lines);
        assert_eq!(loaded.reading.schedule_length, 7);
        assert_eq!(loaded.reading.window_policy, WindowPolicy::Extend);
        assert_eq!(loaded.edits, vec![EditRuleConfig::new("a", "b")]);
    }
}
