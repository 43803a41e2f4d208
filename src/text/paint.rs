//! Sequential regex painting.
//!
//! [`StylePainter::paint`] turns one string into an ordered list of
//! [`Segment`]s.  Each [`PaintRule`] is run over every segment produced by the
//! rules before it, so a later rule can subdivide a region an earlier rule
//! already styled and layer its patch on top of the accumulated style.
//!
//! ```text
//! "AB"  ── R1 "A" → {red} ──────▶  ["A" {red}] ["B" {}]
//!       ── R2 "[AB]+" → {bold} ─▶  ["A" {red,bold}] ["B" {bold}]
//! ```
//!
//! R2 never sees `"AB"` as a whole because `"A"` and `"B"` already live in
//! different segments; it matches inside each segment instead.

use regex::Regex;

use super::style::Style;

// ---------------------------------------------------------------------------
// Segment / PaintRule
// ---------------------------------------------------------------------------

/// A maximal run of characters sharing one composed style.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<S> {
    pub text: String,
    pub style: S,
}

impl<S> Segment<S> {
    pub fn new(text: impl Into<String>, style: S) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// A compiled `(pattern, style patch)` pair.
#[derive(Debug, Clone)]
pub struct PaintRule<S> {
    pub pattern: Regex,
    pub patch: S,
}

impl<S> PaintRule<S> {
    /// # Errors
    ///
    /// Returns the underlying [`regex::Error`] when `pattern` is malformed.
    pub fn new(pattern: &str, patch: S) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            patch,
        })
    }
}

// ---------------------------------------------------------------------------
// StylePainter
// ---------------------------------------------------------------------------

/// A base style plus an ordered rule list for one style domain.
#[derive(Debug, Clone, Default)]
pub struct StylePainter<S> {
    base: S,
    rules: Vec<PaintRule<S>>,
}

impl<S: Style> StylePainter<S> {
    pub fn new(base: S, rules: Vec<PaintRule<S>>) -> Self {
        Self { base, rules }
    }

    pub fn base(&self) -> &S {
        &self.base
    }

    pub fn rules(&self) -> &[PaintRule<S>] {
        &self.rules
    }

    /// Paint `text` with this painter's base style and rules.
    pub fn paint(&self, text: &str) -> Vec<Segment<S>> {
        paint(text, &self.base, &self.rules)
    }
}

/// Paint `text` starting from `base`, applying `rules` in order.
///
/// Concatenating the `text` of the returned segments always reproduces the
/// input exactly; zero-length pieces are never emitted.
pub fn paint<S: Style>(text: &str, base: &S, rules: &[PaintRule<S>]) -> Vec<Segment<S>> {
    let mut segments = vec![Segment::new(text, base.clone())];

    for rule in rules {
        let mut next = Vec::with_capacity(segments.len());

        for segment in &segments {
            let mut cursor = 0;
            for m in rule.pattern.find_iter(&segment.text) {
                next.push(Segment::new(
                    &segment.text[cursor..m.start()],
                    segment.style.clone(),
                ));
                next.push(Segment::new(m.as_str(), segment.style.merged(&rule.patch)));
                cursor = m.end();
            }
            next.push(Segment::new(&segment.text[cursor..], segment.style.clone()));
        }

        next.retain(|s| !s.text.is_empty());
        segments = next;
    }

    segments.retain(|s| !s.text.is_empty());
    segments
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{TextStyle, VoiceStyle};

    fn color(c: &str) -> TextStyle {
        TextStyle {
            color: Some(c.into()),
            ..Default::default()
        }
    }

    fn weight(w: &str) -> TextStyle {
        TextStyle {
            font_weight: Some(w.into()),
            ..Default::default()
        }
    }

    fn joined<S>(segments: &[Segment<S>]) -> String {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn no_rules_yields_single_segment() {
        let segs = paint("你好", &TextStyle::default(), &[]);
        assert_eq!(segs, vec![Segment::new("你好", TextStyle::default())]);
    }

    #[test]
    fn empty_text_yields_nothing() {
        let rules = vec![PaintRule::new("x", color("red")).unwrap()];
        assert!(paint("", &TextStyle::default(), &rules).is_empty());
    }

    #[test]
    fn prefix_match_suffix() {
        let rules = vec![PaintRule::new("「.+?」", color("#E6DB73")).unwrap()];
        let segs = paint("他说「谢谢」了", &TextStyle::default(), &rules);
        let texts: Vec<&str> = segs.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["他说", "「谢谢」", "了"]);
        assert_eq!(segs[1].style.color.as_deref(), Some("#E6DB73"));
        assert!(segs[0].style.color.is_none());
    }

    #[test]
    fn reconstruction_holds_for_overlapping_rules() {
        let rules = vec![
            PaintRule::new("第.+[卷章].+", weight("bold")).unwrap(),
            PaintRule::new("[0-9]+", color("#AE81FF")).unwrap(),
            PaintRule::new("[零〇一二两三四五六七八九十百千万亿兆]+", color("#AE81FF")).unwrap(),
            PaintRule::new("[我你他她它]们?", TextStyle {
                font_style: Some("italic".into()),
                ..Default::default()
            })
            .unwrap(),
            PaintRule::new("x*", color("empty-matches")).unwrap(),
        ];
        for text in ["第十二章 我们走了", "abc 123 def", "", "他", "（注）第3卷"] {
            let segs = paint(text, &TextStyle::default(), &rules);
            assert_eq!(joined(&segs), text);
            assert!(segs.iter().all(|s| !s.text.is_empty()));
        }
    }

    #[test]
    fn later_rule_layers_on_earlier_patch() {
        let r1 = PaintRule::new("A", color("red")).unwrap();
        let r2 = PaintRule::new("AB", weight("bold")).unwrap();

        // [R1, R2]: "AB" is already split, so R2 cannot match and "A" stays red only.
        let segs = paint("AB", &TextStyle::default(), &[r1.clone(), r2.clone()]);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].text, "A");
        assert_eq!(segs[0].style, color("red"));
        assert_eq!(segs[1].style, TextStyle::default());

        // [R2, R1]: "AB" becomes bold, then "A" is subdivided and gains red.
        let segs = paint("AB", &TextStyle::default(), &[r2, r1]);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].text, "A");
        assert_eq!(
            segs[0].style,
            TextStyle {
                color: Some("red".into()),
                font_weight: Some("bold".into()),
                ..Default::default()
            }
        );
        assert_eq!(segs[1].text, "B");
        assert_eq!(segs[1].style, weight("bold"));
    }

    #[test]
    fn overlapping_match_composes_both_patches() {
        // R2 matches all of "AB" on unsplit text and each half once R1 has run.
        let r1 = PaintRule::new("A", color("red")).unwrap();
        let r2 = PaintRule::new("[AB]+", weight("bold")).unwrap();
        let red_bold = TextStyle {
            color: Some("red".into()),
            font_weight: Some("bold".into()),
            ..Default::default()
        };

        let segs = paint("AB", &TextStyle::default(), &[r1.clone(), r2.clone()]);
        assert_eq!(segs[0].text, "A");
        assert_eq!(segs[0].style, red_bold);
        assert_eq!(segs[1].style, weight("bold"));

        let segs = paint("AB", &TextStyle::default(), &[r2, r1]);
        assert_eq!(segs[0].style, red_bold);
        assert_eq!(segs[1].style, weight("bold"));
    }

    #[test]
    fn later_patch_overrides_same_field() {
        let r1 = PaintRule::new("谢谢", color("red")).unwrap();
        let r2 = PaintRule::new("谢", color("blue")).unwrap();
        let segs = paint("谢谢", &TextStyle::default(), &[r1, r2]);
        assert!(segs.iter().all(|s| s.style.color.as_deref() == Some("blue")));
    }

    #[test]
    fn voice_domain_uses_same_algorithm() {
        let base = VoiceStyle {
            voice_id: Some("ting".into()),
            pitch: Some(1.0),
            rate: Some(0.6),
        };
        let painter = StylePainter::new(
            base.clone(),
            vec![PaintRule::new(
                "“+.+?”+",
                VoiceStyle {
                    voice_id: Some("mei".into()),
                    ..Default::default()
                },
            )
            .unwrap()],
        );
        let segs = painter.paint("他说“走吧”。");
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[1].style.voice_id.as_deref(), Some("mei"));
        assert_eq!(segs[1].style.rate, Some(0.6));
        assert_eq!(segs[0].style, base);
    }
}
