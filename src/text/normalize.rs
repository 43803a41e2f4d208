//! Whole-document normalization run before the pre-edit rules.
//!
//! * [`decode_html_entities`]: `&amp;`, `&hellip;`, `&#8220;`, `&#x201C;` …
//! * [`to_full_width`] / [`to_half_width`]: ASCII ⇄ full-width forms
//!   (U+FF01–U+FF5E, ideographic space U+3000).

/// Longest entity body (between `&` and `;`) we try to decode.
const MAX_ENTITY_LEN: usize = 10;

const FULL_WIDTH_OFFSET: u32 = 0xFEE0;
const IDEOGRAPHIC_SPACE: char = '\u{3000}';

// ---------------------------------------------------------------------------
// HTML entities
// ---------------------------------------------------------------------------

/// Replace named and numeric HTML entities with the characters they denote.
/// Unknown or malformed entities are left untouched.
///
/// ```
/// use read_aloud::text::decode_html_entities;
///
/// assert_eq!(decode_html_entities("a &amp; b&#33; &ldquo;hi&rdquo;"), "a & b! “hi”");
/// assert_eq!(decode_html_entities("&bogus; &"), "&bogus; &");
/// ```
pub fn decode_html_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        let decoded = after
            .char_indices()
            .take(MAX_ENTITY_LEN + 1)
            .find(|&(_, c)| c == ';')
            .and_then(|(semi, _)| decode_entity(&after[..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        return decode_numeric_entity(numeric);
    }
    let c = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{A0}',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "laquo" => '«',
        "raquo" => '»',
        "middot" => '·',
        "bull" => '•',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "times" => '×',
        "divide" => '÷',
        "deg" => '°',
        _ => return None,
    };
    Some(c)
}

fn decode_numeric_entity(digits: &str) -> Option<char> {
    let value = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(value)
}

// ---------------------------------------------------------------------------
// Full / half width
// ---------------------------------------------------------------------------

/// Map printable ASCII to its full-width form and spaces to U+3000.
///
/// ```
/// use read_aloud::text::to_full_width;
///
/// assert_eq!(to_full_width("Ab 1!"), "Ａｂ　１！");
/// ```
pub fn to_full_width(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            ' ' => IDEOGRAPHIC_SPACE,
            '!'..='~' => char::from_u32(c as u32 + FULL_WIDTH_OFFSET).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Inverse of [`to_full_width`].
pub fn to_half_width(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            IDEOGRAPHIC_SPACE => ' ',
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - FULL_WIDTH_OFFSET).unwrap_or(c),
            _ => c,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_entities() {
        assert_eq!(decode_html_entities("&#20320;&#x597D;&#X3002;"), "你好。");
    }

    #[test]
    fn malformed_entities_are_kept() {
        assert_eq!(decode_html_entities("&#xZZ; &#;"), "&#xZZ; &#;");
        assert_eq!(decode_html_entities("AT&T rocks"), "AT&T rocks");
        assert_eq!(decode_html_entities("&&amp;"), "&&");
    }

    #[test]
    fn entity_body_length_is_bounded() {
        let long = "&averyveryverylongname;";
        assert_eq!(decode_html_entities(long), long);
    }

    #[test]
    fn multibyte_neighbours() {
        assert_eq!(decode_html_entities("“你&hellip;”"), "“你…”");
    }

    #[test]
    fn width_round_trip_on_ascii() {
        let text = "Chapter 12: Hello, World?";
        assert_eq!(to_half_width(&to_full_width(text)), text);
    }

    #[test]
    fn non_ascii_untouched() {
        assert_eq!(to_full_width("第一章"), "第一章");
        assert_eq!(to_half_width("第一章"), "第一章");
    }
}
