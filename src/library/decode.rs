//! Raw book bytes → text.
//!
//! Decoding is backed by `encoding_rs`, so labels follow the WHATWG Encoding
//! Standard (`"utf-8"`, `"gbk"`, `"gb2312"`, `"big5"`, …).

use encoding_rs::DecoderResult;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DecodeError {
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Cannot open this document: invalid {encoding} data at byte {offset}")]
    InvalidData { encoding: Encoding, offset: usize },

    #[error("Cannot open this document: odd number of bytes for {0}")]
    OddLength(Encoding),
}

/// Text encodings a book may be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Gbk,
    Gb18030,
    Big5,
    Utf16Le,
    Utf16Be,
    ShiftJis,
    EucJp,
    EucKr,
}

impl Encoding {
    /// Every encoding offered to the user, most common first.
    pub const ALL: [Encoding; 9] = [
        Self::Utf8,
        Self::Gbk,
        Self::Gb18030,
        Self::Big5,
        Self::Utf16Le,
        Self::Utf16Be,
        Self::ShiftJis,
        Self::EucJp,
        Self::EucKr,
    ];

    /// Parse a WHATWG label such as `"UTF-8"`, `"gb2312"` or `"utf-16be"`.
    pub fn from_label(label: &str) -> Result<Self, DecodeError> {
        encoding_rs::Encoding::for_label(label.trim().as_bytes())
            .and_then(|codec| Self::ALL.into_iter().find(|e| e.codec() == codec))
            .ok_or_else(|| DecodeError::UnsupportedEncoding(label.to_owned()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Gbk => "gbk",
            Self::Gb18030 => "gb18030",
            Self::Big5 => "big5",
            Self::Utf16Le => "utf-16le",
            Self::Utf16Be => "utf-16be",
            Self::ShiftJis => "shift_jis",
            Self::EucJp => "euc-jp",
            Self::EucKr => "euc-kr",
        }
    }

    fn codec(&self) -> &'static encoding_rs::Encoding {
        match self {
            Self::Utf8 => encoding_rs::UTF_8,
            Self::Gbk => encoding_rs::GBK,
            Self::Gb18030 => encoding_rs::GB18030,
            Self::Big5 => encoding_rs::BIG5,
            Self::Utf16Le => encoding_rs::UTF_16LE,
            Self::Utf16Be => encoding_rs::UTF_16BE,
            Self::ShiftJis => encoding_rs::SHIFT_JIS,
            Self::EucJp => encoding_rs::EUC_JP,
            Self::EucKr => encoding_rs::EUC_KR,
        }
    }

    fn is_utf16(&self) -> bool {
        matches!(self, Self::Utf16Le | Self::Utf16Be)
    }

    /// Guess the encoding from a byte-order mark, defaulting to UTF-8.
    pub fn detect(bytes: &[u8]) -> Self {
        match encoding_rs::Encoding::for_bom(bytes) {
            Some((codec, _)) if codec == encoding_rs::UTF_16LE => Self::Utf16Le,
            Some((codec, _)) if codec == encoding_rs::UTF_16BE => Self::Utf16Be,
            _ => Self::Utf8,
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Encoding {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

impl Serialize for Encoding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Encoding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Self::from_label(&label).map_err(serde::de::Error::custom)
    }
}

/// Turns stored bytes into document text.  Errors are surfaced to the user
/// as "cannot open this document" and never retried.
pub trait Decoder {
    fn decode(&self, bytes: &[u8], encoding: Encoding) -> Result<String, DecodeError>;
}

/// Strict decoder: malformed input is an error, never replaced.  A leading
/// byte-order mark matching `encoding` is stripped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDecoder;

impl Decoder for TextDecoder {
    fn decode(&self, bytes: &[u8], encoding: Encoding) -> Result<String, DecodeError> {
        let codec = encoding.codec();
        let skipped = match encoding_rs::Encoding::for_bom(bytes) {
            Some((bom_codec, len)) if bom_codec == codec => len,
            _ => 0,
        };
        let body = &bytes[skipped..];
        if encoding.is_utf16() && body.len() % 2 != 0 {
            return Err(DecodeError::OddLength(encoding));
        }

        let mut decoder = codec.new_decoder_without_bom_handling();
        let mut text = String::with_capacity(body.len());
        let mut consumed = 0;
        loop {
            let (result, read) =
                decoder.decode_to_string_without_replacement(&body[consumed..], &mut text, true);
            consumed += read;
            match result {
                DecoderResult::InputEmpty => return Ok(text),
                DecoderResult::OutputFull => {
                    let rest = body.len() - consumed;
                    text.reserve(
                        decoder
                            .max_utf8_buffer_length_without_replacement(rest)
                            .unwrap_or(rest.saturating_mul(3))
                            .max(4),
                    );
                }
                DecoderResult::Malformed(bad, after) => {
                    let start = consumed.saturating_sub(after as usize + bad as usize);
                    return Err(DecodeError::InvalidData {
                        encoding,
                        offset: skipped + start,
                    });
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
    const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];

    #[test]
    fn utf8_with_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("第一章".as_bytes());
        assert_eq!(TextDecoder.decode(&bytes, Encoding::Utf8).unwrap(), "第一章");
    }

    #[test]
    fn invalid_utf8_reports_offset() {
        let err = TextDecoder.decode(b"ab\xFFcd", Encoding::Utf8).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidData {
                encoding: Encoding::Utf8,
                offset: 2
            }
        );
    }

    #[test]
    fn utf16_both_orders() {
        let le: Vec<u8> = "你好"
            .encode_utf16()
            .flat_map(|u| u.to_le_bytes())
            .collect();
        let be: Vec<u8> = "你好"
            .encode_utf16()
            .flat_map(|u| u.to_be_bytes())
            .collect();
        assert_eq!(TextDecoder.decode(&le, Encoding::Utf16Le).unwrap(), "你好");
        assert_eq!(TextDecoder.decode(&be, Encoding::Utf16Be).unwrap(), "你好");
    }

    #[test]
    fn utf16_bom_detected_and_stripped() {
        let mut bytes = UTF16LE_BOM.to_vec();
        bytes.extend("hi".encode_utf16().flat_map(|u| u.to_le_bytes()));
        let encoding = Encoding::detect(&bytes);
        assert_eq!(encoding, Encoding::Utf16Le);
        assert_eq!(TextDecoder.decode(&bytes, encoding).unwrap(), "hi");
    }

    #[test]
    fn utf16_odd_length_and_lone_surrogate() {
        assert_eq!(
            TextDecoder.decode(&[0x41], Encoding::Utf16Le),
            Err(DecodeError::OddLength(Encoding::Utf16Le))
        );
        assert!(matches!(
            TextDecoder.decode(&[0x00, 0xD8], Encoding::Utf16Le),
            Err(DecodeError::InvalidData { offset: 0, .. })
        ));
    }

    #[test]
    fn utf16_offset_counts_bytes_after_surrogate_pairs() {
        // 😀 as a surrogate pair, then a lone high surrogate at byte 4.
        let bytes = [0x3D, 0xD8, 0x00, 0xDE, 0x00, 0xD8];
        assert_eq!(
            TextDecoder.decode(&bytes, Encoding::Utf16Le),
            Err(DecodeError::InvalidData {
                encoding: Encoding::Utf16Le,
                offset: 4
            })
        );
    }

    #[test]
    fn gbk_round_trip() {
        let (bytes, _, unmappable) = encoding_rs::GBK.encode("第一章 开始\n「谢谢」");
        assert!(!unmappable);
        assert_eq!(
            TextDecoder.decode(&bytes, Encoding::Gbk).unwrap(),
            "第一章 开始\n「谢谢」"
        );
        assert!(TextDecoder.decode(&bytes, Encoding::Utf8).is_err());
    }

    #[test]
    fn big5_decodes() {
        let (bytes, _, _) = encoding_rs::BIG5.encode("繁體");
        assert_eq!(TextDecoder.decode(&bytes, Encoding::Big5).unwrap(), "繁體");
    }

    #[test]
    fn labels() {
        assert_eq!(Encoding::from_label("UTF-8").unwrap(), Encoding::Utf8);
        assert_eq!("utf-16be".parse::<Encoding>().unwrap(), Encoding::Utf16Be);
        assert_eq!(Encoding::from_label("gbk").unwrap(), Encoding::Gbk);
        assert_eq!(Encoding::from_label("gb2312").unwrap(), Encoding::Gbk);
        assert_eq!(Encoding::from_label(" Big5 ").unwrap(), Encoding::Big5);
        assert!(matches!(
            Encoding::from_label("klingon"),
            Err(DecodeError::UnsupportedEncoding(_))
        ));
        assert_eq!(Encoding::Utf16Le.to_string(), "utf-16le");
    }

    #[test]
    fn every_label_parses_back() {
        for encoding in Encoding::ALL {
            assert_eq!(Encoding::from_label(encoding.label()).unwrap(), encoding);
        }
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&Encoding::Gb18030).unwrap();
        assert_eq!(json, "\"gb18030\"");
        let parsed: Encoding = serde_json::from_str("\"GB2312\"").unwrap();
        assert_eq!(parsed, Encoding::Gbk);
    }
}
