//! Ordered regex replace rules.
//!
//! An [`EditPipeline`] is applied in three places: once to the whole decoded
//! document (pre-edits), to every split line (edits) and to every speakable
//! voice segment (voice edits).  Each rule replaces *all* of its matches and
//! later rules only ever see the cumulative output of earlier ones.

use regex::Regex;

// ---------------------------------------------------------------------------
// EditRule
// ---------------------------------------------------------------------------

/// A compiled `(pattern, replacement)` pair.
#[derive(Debug, Clone)]
pub struct EditRule {
    pattern: Regex,
    replacement: String,
}

impl EditRule {
    /// Compile `pattern` and normalise `replacement` to the `regex` crate's
    /// expansion syntax.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`regex::Error`] when `pattern` is malformed.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: normalize_replacement(replacement),
        })
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Replace every match of this rule in `text`.
    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement.as_str())
            .into_owned()
    }
}

/// Rewrite `$1`, `$&` and `$<name>` references as `${1}`, `${0}` and
/// `${name}`.
///
/// The `regex` crate reads `$1abc` as a reference to a group named `1abc`, so
/// bare numeric references are braced.  A `$` that does not start a
/// reference is kept literally.
pub fn normalize_replacement(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len() + 8);
    let mut chars = replacement.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('$') => {
                chars.next();
                out.push_str("$$");
            }
            Some('&') => {
                chars.next();
                out.push_str("${0}");
            }
            Some(d) if d.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                    digits.push(d);
                    chars.next();
                }
                out.push_str("${");
                out.push_str(&digits);
                out.push('}');
            }
            Some('<') => {
                chars.next();
                let mut name = String::new();
                let mut closed = false;
                for n in chars.by_ref() {
                    if n == '>' {
                        closed = true;
                        break;
                    }
                    name.push(n);
                }
                if closed {
                    out.push_str("${");
                    out.push_str(&name);
                    out.push('}');
                } else {
                    out.push_str("$$<");
                    out.push_str(&name);
                }
            }
            // Already in `${...}` form.
            Some('{') => out.push('$'),
            _ => out.push_str("$$"),
        }
    }

    out
}

// ---------------------------------------------------------------------------
// EditPipeline
// ---------------------------------------------------------------------------

/// An ordered list of [`EditRule`]s.
#[derive(Debug, Clone, Default)]
pub struct EditPipeline {
    rules: Vec<EditRule>,
}

impl EditPipeline {
    pub fn new(rules: Vec<EditRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[EditRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule in order, each against the previous rule's output.
    ///
    /// ```
    /// use read_aloud::text::{EditPipeline, EditRule};
    ///
    /// let pipeline = EditPipeline::new(vec![
    ///     EditRule::new("a", "b").unwrap(),
    ///     EditRule::new("b", "c").unwrap(),
    /// ]);
    /// assert_eq!(pipeline.apply("ab"), "cc");
    /// ```
    pub fn apply(&self, text: &str) -> String {
        let mut current = text.to_owned();
        for rule in &self.rules {
            current = rule.apply(&current);
        }
        current
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
