//! Document → line splitting.

use regex::Regex;

/// Splits a normalized document into line texts.
#[derive(Debug, Clone)]
pub struct Segmenter {
    pattern: Regex,
    remove_empty: bool,
}

impl Segmenter {
    pub fn new(pattern: Regex, remove_empty: bool) -> Self {
        Self {
            pattern,
            remove_empty,
        }
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Split `text` on every delimiter match.  Delimiters are not part of the
    /// output; with `remove_empty` zero-length pieces are dropped, so the
    /// caller can number the result densely from 0.
    ///
    /// ```
    /// use read_aloud::text::Segmenter;
    /// use regex::Regex;
    ///
    /// let seg = Segmenter::new(Regex::new(r" *[\n\r]+ *").unwrap(), true);
    /// assert_eq!(seg.split("a\n\nb \n c"), vec!["a", "b", "c"]);
    /// ```
    pub fn split(&self, text: &str) -> Vec<String> {
        self.pattern
            .split(text)
            .filter(|piece| !(self.remove_empty && piece.is_empty()))
            .map(str::to_owned)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{EditPipeline, EditRule};

    const DEFAULT_SPLIT: &str = " *[\\n\\r]+ *";

    fn segmenter(remove_empty: bool) -> Segmenter {
        Segmenter::new(Regex::new(DEFAULT_SPLIT).unwrap(), remove_empty)
    }

    #[test]
    fn blank_runs_collapse() {
        let lines = segmenter(true).split("第一章 开始\n\n你好。\n「谢谢」");
        assert_eq!(lines, vec!["第一章 开始", "你好。", "「谢谢」"]);
    }

    #[test]
    fn empty_pieces_kept_when_not_removing() {
        // Leading and trailing delimiters produce empty pieces.
        let lines = segmenter(false).split("\na\r\nb\n");
        assert_eq!(lines, vec!["", "a", "b", ""]);
    }

    #[test]
    fn empty_pieces_dropped_when_removing() {
        let lines = segmenter(true).split("\na\r\nb\n");
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn empty_document() {
        assert!(segmenter(true).split("").is_empty());
        assert_eq!(segmenter(false).split(""), vec![""]);
    }

    #[test]
    fn resplitting_preedited_text_is_stable() {
        let pre = EditPipeline::new(vec![
            EditRule::new("★☆.*☆★", "").unwrap(),
            EditRule::new(" *([a-zA-Z0-9 ]+) *", " $1 ").unwrap(),
            EditRule::new("!", "! ").unwrap(),
            EditRule::new("\\?", "? ").unwrap(),
        ]);
        let text = pre.apply("★☆广告☆★\nHello world!\n\n  第2章\r\n什么?  \n");
        let seg = segmenter(true);

        let once = seg.split(&text);
        let twice: Vec<String> = once.iter().flat_map(|line| seg.split(line)).collect();
        assert_eq!(once.len(), twice.len());
    }
}
