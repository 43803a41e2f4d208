//! Raw document text → line texts → [`LineStore`].

use super::store::LineStore;
use crate::config::ReaderProfile;

/// Normalize, pre-edit, split and per-line edit `raw`.
///
/// Empty-line removal happens at split time, before the per-line edits, so
/// indices are dense from 0.
pub fn parse_lines(raw: &str, profile: &ReaderProfile) -> Vec<String> {
    let normalized = profile.preprocess.apply(raw);
    profile
        .segmenter
        .split(&normalized)
        .into_iter()
        .map(|line| profile.edits.apply(&line))
        .collect()
}

/// Parse `raw` into a fresh [`LineStore`].  Pure; safe to run on a blocking
/// worker.
pub fn parse_document(raw: &str, profile: &ReaderProfile) -> LineStore {
    let texts = parse_lines(raw, profile);
    log::debug!("parsed {} bytes into {} lines", raw.len(), texts.len());
    LineStore::from_profile(texts, profile)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EditRuleConfig, ReaderConfig};

    fn bare_config() -> ReaderConfig {
        let mut cfg = ReaderConfig::default();
        cfg.preprocess.pre_edits.clear();
        cfg.edits.clear();
        cfg
    }

    #[test]
    fn splits_chapter_sample_into_three_lines() {
        let profile = bare_config().compile().unwrap();
        let lines = parse_lines("第一章 开始\n\n你好。\n「谢谢」", &profile);
        assert_eq!(lines, vec!["第一章 开始", "你好。", "「谢谢」"]);
    }

    #[test]
    fn per_line_edits_run_after_split() {
        let mut cfg = bare_config();
        cfg.edits = vec![EditRuleConfig::new("^", ">")];
        let profile = cfg.compile().unwrap();

        assert_eq!(parse_lines("a\nb", &profile), vec![">a", ">b"]);
    }

    #[test]
    fn html_entities_are_decoded_before_splitting() {
        let profile = bare_config().compile().unwrap();
        assert_eq!(
            parse_lines("&ldquo;hi&rdquo;&#10;bye", &profile),
            vec!["“hi”", "bye"]
        );
    }

    #[test]
    fn default_edits_indent_and_pad_quotes() {
        let mut cfg = bare_config();
        cfg.edits = ReaderConfig::default_edits();
        let profile = cfg.compile().unwrap();
        let store = parse_document("第一章\n  他说“好”  \n", &profile);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0).unwrap().text(), "　　第一章");
        assert_eq!(store.get(1).unwrap().text(), "　　他说 “好” ");
    }

    #[test]
    fn empty_document_has_no_lines() {
        let profile = bare_config().compile().unwrap();
        assert!(parse_document("\n\n", &profile).is_empty());
    }
}
