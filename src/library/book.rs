//! Book records and reading positions.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::decode::Encoding;
use super::store::{PersistenceStore, StoreError};
use crate::playback::SessionSummary;
use crate::text::sort_title;

/// Where the reader left a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingPosition {
    /// Trimmed text of the line that was selected.
    pub viewing_line: String,
    pub viewing_index: usize,
    pub line_count: usize,
}

impl From<&SessionSummary> for ReadingPosition {
    fn from(summary: &SessionSummary) -> Self {
        Self {
            viewing_line: summary.last_line_text.clone(),
            viewing_index: summary.last_index,
            line_count: summary.line_count,
        }
    }
}

impl ReadingPosition {
    /// Position stored for `key`; default when the entry or its fields are
    /// missing.
    pub fn load(store: &dyn PersistenceStore, key: &str) -> Result<Self, StoreError> {
        let Some(entry) = store.get(key)? else {
            return Ok(Self::default());
        };
        Ok(serde_json::from_value(entry).unwrap_or_else(|e| {
            log::warn!("stored position for {key} unreadable: {e}");
            Self::default()
        }))
    }

    /// Merge this position into the entry for `key`.
    pub fn save(&self, store: &mut dyn PersistenceStore, key: &str) -> Result<(), StoreError> {
        let patch = serde_json::to_value(self).map_err(|source| StoreError::Encode {
            key: key.to_owned(),
            source,
        })?;
        store.update(key, patch)?;
        Ok(())
    }
}

/// Content hash used as a book's key.
pub fn content_key(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// A book in the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// SHA-256 of the stored bytes.
    pub hash: String,
    pub title: String,
    pub sort_title: String,
    #[serde(default)]
    pub encoding: Encoding,
    /// Size of the stored bytes.
    pub size: u64,
    #[serde(flatten)]
    pub position: ReadingPosition,
}

impl Book {
    pub fn new(title: impl Into<String>, bytes: &[u8], encoding: Encoding) -> Self {
        let title = title.into();
        Self {
            hash: content_key(bytes),
            sort_title: sort_title(&title),
            title,
            encoding,
            size: bytes.len() as u64,
            position: ReadingPosition::default(),
        }
    }

    /// Share of the book already passed, in percent.
    pub fn progress_percent(&self) -> f32 {
        if self.position.line_count == 0 {
            return 0.0;
        }
        self.position.viewing_index as f32 / self.position.line_count as f32 * 100.0
    }

    /// One-line description for listings: `title • 12.5% • line`.
    pub fn summary_line(&self) -> String {
        let mut out = self.title.clone();
        if self.position.viewing_index > 0 {
            out.push_str(&format!(" • {:.1}%", self.progress_percent()));
            if !self.position.viewing_line.is_empty() {
                out.push_str(" • ");
                out.push_str(&self.position.viewing_line);
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::MemoryStore;

    #[test]
    fn content_key_is_sha256_hex() {
        assert_eq!(
            content_key(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn new_book_sorts_by_padded_numerals() {
        let two = Book::new("第二卷", b"x", Encoding::Utf8);
        let twelve = Book::new("第十二卷", b"y", Encoding::Utf8);
        assert!(two.sort_title < twelve.sort_title);
        assert_eq!(two.size, 1);
    }

    #[test]
    fn progress_and_summary_line() {
        let mut book = Book::new("Novel", b"abc", Encoding::Utf8);
        assert_eq!(book.progress_percent(), 0.0);
        assert_eq!(book.summary_line(), "Novel");

        book.position = ReadingPosition {
            viewing_line: "第三章".into(),
            viewing_index: 25,
            line_count: 200,
        };
        assert_eq!(book.progress_percent(), 12.5);
        assert_eq!(book.summary_line(), "Novel • 12.5% • 第三章");
    }

    #[test]
    fn position_save_and_load() {
        let mut store = MemoryStore::new();
        assert_eq!(
            ReadingPosition::load(&store, "k").unwrap(),
            ReadingPosition::default()
        );

        let summary = SessionSummary {
            last_line_text: "你好".into(),
            last_index: 4,
            line_count: 9,
        };
        ReadingPosition::from(&summary).save(&mut store, "k").unwrap();

        let loaded = ReadingPosition::load(&store, "k").unwrap();
        assert_eq!(loaded.viewing_index, 4);
        assert_eq!(loaded.viewing_line, "你好");
    }

    #[test]
    fn book_record_round_trips_through_store() {
        let mut store = MemoryStore::new();
        let book = Book::new("第一卷", "正文".as_bytes(), Encoding::Utf8);
        store
            .update(&book.hash, serde_json::to_value(&book).unwrap())
            .unwrap();
        ReadingPosition {
            viewing_line: "x".into(),
            viewing_index: 1,
            line_count: 2,
        }
        .save(&mut store, &book.hash)
        .unwrap();

        let stored: Book = serde_json::from_value(store.get(&book.hash).unwrap().unwrap()).unwrap();
        assert_eq!(stored.title, "第一卷");
        assert_eq!(stored.position.line_count, 2);
    }
}
