//! Compiled, immutable form of [`ReaderConfig`].
//!
//! Every pattern string is compiled exactly once here.  A malformed pattern
//! is reported as a [`ConfigError`] naming the rule set and rule index; the
//! text pipeline itself never sees an invalid rule.

use regex::Regex;
use thiserror::Error;

use super::settings::{EditRuleConfig, PaintRuleConfig, ReaderConfig, RenderConfig, WindowPolicy};
use crate::text::{
    decode_html_entities, to_full_width, to_half_width, EditPipeline, EditRule, PaintRule,
    Segmenter, Style, StylePainter, TextStyle, VoiceSegmentBuilder, VoiceStyle,
};

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors raised while compiling a [`ReaderConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid pattern {pattern:?} in {rule_set} rule #{index}: {source}")]
    InvalidPattern {
        rule_set: &'static str,
        index: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid split pattern {pattern:?}: {source}")]
    InvalidSplitPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

// ---------------------------------------------------------------------------
// Profile pieces
// ---------------------------------------------------------------------------

/// Whole-document normalization and pre-edits.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    pub decode_html: bool,
    pub to_full_width: bool,
    pub to_half_width: bool,
    pub pre_edits: EditPipeline,
}

impl Preprocessor {
    pub fn apply(&self, text: &str) -> String {
        let mut text = if self.decode_html {
            decode_html_entities(text)
        } else {
            text.to_owned()
        };
        if self.to_full_width {
            text = to_full_width(&text);
        }
        if self.to_half_width {
            text = to_half_width(&text);
        }
        self.pre_edits.apply(&text)
    }
}

/// Scheduler knobs, copied out of `ReadingConfig`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingOptions {
    pub schedule_length: usize,
    pub window_policy: WindowPolicy,
    pub follow_tolerance: usize,
    pub speech_prefix: String,
    pub speech_suffix: String,
}

impl Default for ReadingOptions {
    fn default() -> Self {
        Self {
            schedule_length: 100,
            window_policy: WindowPolicy::Stop,
            follow_tolerance: 3,
            speech_prefix: String::new(),
            speech_suffix: String::new(),
        }
    }
}

/// Everything the parser, the renderer and the scheduler need, compiled.
///
/// A profile is never mutated; a settings change compiles a new one and the
/// document is re-parsed from its raw text.
#[derive(Debug, Clone)]
pub struct ReaderProfile {
    pub preprocess: Preprocessor,
    pub segmenter: Segmenter,
    pub edits: EditPipeline,
    pub text_painter: StylePainter<TextStyle>,
    pub voice: VoiceSegmentBuilder,
    pub render: RenderConfig,
    pub reading: ReadingOptions,
}

impl Default for ReaderProfile {
    /// A profile that splits on newlines and applies no rules.
    fn default() -> Self {
        Self {
            preprocess: Preprocessor::default(),
            segmenter: Segmenter::new(Regex::new("\n").expect("newline pattern is valid"), true),
            edits: EditPipeline::default(),
            text_painter: StylePainter::default(),
            voice: VoiceSegmentBuilder::default(),
            render: RenderConfig::default(),
            reading: ReadingOptions::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

fn compile_edits(
    rule_set: &'static str,
    rules: &[EditRuleConfig],
) -> Result<EditPipeline, ConfigError> {
    rules
        .iter()
        .enumerate()
        .map(|(index, rule)| {
            EditRule::new(&rule.pattern, &rule.replace).map_err(|source| {
                ConfigError::InvalidPattern {
                    rule_set,
                    index,
                    pattern: rule.pattern.clone(),
                    source,
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(EditPipeline::new)
}

fn compile_painter<S: Style>(
    rule_set: &'static str,
    base: &S,
    rules: &[PaintRuleConfig<S>],
) -> Result<StylePainter<S>, ConfigError> {
    rules
        .iter()
        .enumerate()
        .map(|(index, rule)| {
            PaintRule::new(&rule.pattern, rule.style.clone()).map_err(|source| {
                ConfigError::InvalidPattern {
                    rule_set,
                    index,
                    pattern: rule.pattern.clone(),
                    source,
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|compiled| StylePainter::new(base.clone(), compiled))
}

impl ReaderConfig {
    /// Compile every rule set into a [`ReaderProfile`].
    pub fn compile(&self) -> Result<ReaderProfile, ConfigError> {
        let split_pattern =
            Regex::new(&self.split.pattern).map_err(|source| ConfigError::InvalidSplitPattern {
                pattern: self.split.pattern.clone(),
                source,
            })?;

        let voice_painter: StylePainter<VoiceStyle> = compile_painter(
            "voice_paints",
            &self.reading.voice_style,
            &self.reading.voice_paints,
        )?;

        let profile = ReaderProfile {
            preprocess: Preprocessor {
                decode_html: self.preprocess.decode_html,
                to_full_width: self.preprocess.to_full_width,
                to_half_width: self.preprocess.to_half_width,
                pre_edits: compile_edits("pre_edits", &self.preprocess.pre_edits)?,
            },
            segmenter: Segmenter::new(split_pattern, self.split.remove_empty_lines),
            edits: compile_edits("edits", &self.edits)?,
            text_painter: compile_painter(
                "text_paints",
                &self.render.text_style,
                &self.render.text_paints,
            )?,
            voice: VoiceSegmentBuilder::new(
                voice_painter,
                compile_edits("voice_edits", &self.reading.voice_edits)?,
            ),
            render: self.render.clone(),
            reading: ReadingOptions {
                schedule_length: self.reading.schedule_length,
                window_policy: self.reading.window_policy,
                follow_tolerance: self.reading.follow_tolerance,
                speech_prefix: self.reading.speech_prefix.clone(),
                speech_suffix: self.reading.speech_suffix.clone(),
            },
        };

        log::debug!(
            "compiled profile: {} pre-edits, {} edits, {} text paints, {} voice edits",
            profile.preprocess.pre_edits.rules().len(),
            profile.edits.rules().len(),
            profile.text_painter.rules().len(),
            self.reading.voice_edits.len(),
        );

        Ok(profile)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_compiles() {
        let profile = ReaderConfig::default()
            .compile()
            .expect("defaults must compile");
        assert_eq!(profile.text_painter.rules().len(), 12);
        assert_eq!(profile.edits.rules().len(), 3);
        assert_eq!(profile.reading.schedule_length, 100);
    }

    #[test]
    fn bad_edit_names_rule_set_and_index() {
        let mut cfg = ReaderConfig::default();
        cfg.reading.voice_edits.push(EditRuleConfig::new("(", ""));

        match cfg.compile() {
            Err(ConfigError::InvalidPattern {
                rule_set, index, ..
            }) => {
                assert_eq!(rule_set, "voice_edits");
                assert_eq!(index, 3);
            }
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }

    #[test]
    fn bad_paint_rule_is_reported() {
        let mut cfg = ReaderConfig::default();
        cfg.render.text_paints[0].pattern = "[".into();

        let err = cfg.compile().unwrap_err();
        assert!(err.to_string().contains("text_paints rule #0"));
    }

    #[test]
    fn bad_split_pattern_is_reported() {
        let mut cfg = ReaderConfig::default();
        cfg.split.pattern = "*".into();
        assert!(matches!(
            cfg.compile(),
            Err(ConfigError::InvalidSplitPattern { .. })
        ));
    }

    #[test]
    fn preprocessor_runs_normalization_before_pre_edits() {
        let pre = Preprocessor {
            decode_html: true,
            to_full_width: false,
            to_half_width: false,
            pre_edits: EditPipeline::new(vec![EditRule::new("&", "and").unwrap()]),
        };
        // The decoded ampersand is then rewritten by the pre-edit.
        assert_eq!(pre.apply("a &amp; b"), "a and b");
    }

    #[test]
    fn default_profile_splits_on_newlines() {
        let profile = ReaderProfile::default();
        assert_eq!(profile.segmenter.split("a\n\nb"), vec!["a", "b"]);
    }
}
