//! Small Chinese-numeral parsing used to build library sort keys.
//!
//! Only numbers up to 99 are understood (一, 十二, 二十, 九十九); that covers
//! volume and chapter numbers in titles.  Anything longer is left alone.

use std::sync::LazyLock;

use regex::Regex;

static ZH_NUMBER_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[零一二三四五六七八九十]+").unwrap());

fn digit(c: char) -> Option<u32> {
    let value = match c {
        '零' => 0,
        '一' => 1,
        '二' => 2,
        '三' => 3,
        '四' => 4,
        '五' => 5,
        '六' => 6,
        '七' => 7,
        '八' => 8,
        '九' => 9,
        _ => return None,
    };
    Some(value)
}

/// Parse a run of Chinese numerals.
///
/// ```
/// use read_aloud::text::parse_zh_number;
///
/// assert_eq!(parse_zh_number("三"), Some(3));
/// assert_eq!(parse_zh_number("十"), Some(10));
/// assert_eq!(parse_zh_number("十二"), Some(12));
/// assert_eq!(parse_zh_number("二十"), Some(20));
/// assert_eq!(parse_zh_number("四十五"), Some(45));
/// assert_eq!(parse_zh_number("一百二十"), None);
/// ```
pub fn parse_zh_number(text: &str) -> Option<u32> {
    let chars: Vec<char> = text.chars().collect();
    // Tens position: 十 on its own means one ten.
    let tens = |c: char| if c == '十' { Some(1) } else { digit(c) };
    // Units position: a trailing 十 contributes nothing.
    let units = |c: char| if c == '十' { Some(0) } else { digit(c) };

    match chars.as_slice() {
        [] => Some(0),
        ['十'] => Some(10),
        [c] => digit(*c),
        [t, u] => Some(tens(*t)? * 10 + units(*u)?),
        [t, '十', u] => Some(tens(*t)? * 10 + units(*u)?),
        _ => None,
    }
}

/// Left-pad `value` with zeros to at least `width` digits.
pub fn pad_number(value: u32, width: usize) -> String {
    format!("{value:0width$}")
}

/// Sort key for a book title: the first numeral run is replaced by its
/// zero-padded value so "第十二卷" sorts after "第二卷".
///
/// ```
/// use read_aloud::text::sort_title;
///
/// assert_eq!(sort_title("第二卷"), "第02卷");
/// assert!(sort_title("第二卷") < sort_title("第十二卷"));
/// ```
pub fn sort_title(title: &str) -> String {
    ZH_NUMBER_RUN
        .replace(title, |caps: &regex::Captures<'_>| {
            match parse_zh_number(&caps[0]) {
                Some(n) => pad_number(n, 2),
                None => caps[0].to_owned(),
            }
        })
        .into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_digits() {
        assert_eq!(parse_zh_number("零"), Some(0));
        assert_eq!(parse_zh_number("九"), Some(9));
    }

    #[test]
    fn three_char_form() {
        assert_eq!(parse_zh_number("九十九"), Some(99));
        assert_eq!(parse_zh_number("二十一"), Some(21));
    }

    #[test]
    fn unknown_characters() {
        assert_eq!(parse_zh_number("甲"), None);
        assert_eq!(parse_zh_number("十甲"), None);
    }

    #[test]
    fn padding() {
        assert_eq!(pad_number(7, 2), "07");
        assert_eq!(pad_number(123, 2), "123");
    }

    #[test]
    fn sort_title_only_rewrites_first_run() {
        assert_eq!(sort_title("第三卷 第五章"), "第03卷 第五章");
        assert_eq!(sort_title("Plain title"), "Plain title");
    }

    #[test]
    fn sort_title_keeps_unparseable_runs() {
        assert_eq!(sort_title("一二三四"), "一二三四");
    }
}
