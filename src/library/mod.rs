//! Book library: records, stored files and reading positions.
//!
//! Every book is one [`PersistenceStore`] entry keyed by the SHA-256 of its
//! bytes; the bytes themselves live in `books_dir` under the same name.

pub mod book;
pub mod decode;
pub mod store;

use std::path::PathBuf;

pub use book::{content_key, Book, ReadingPosition};
pub use decode::{DecodeError, Decoder, Encoding, TextDecoder};
pub use store::{JsonFileStore, MemoryStore, PersistenceStore, StoreError};

use crate::error::ReaderError;

/// Books known to the reader.
pub struct Library {
    store: Box<dyn PersistenceStore>,
    books_dir: PathBuf,
}

impl Library {
    pub fn new(store: Box<dyn PersistenceStore>, books_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            books_dir: books_dir.into(),
        }
    }

    pub fn store(&self) -> &dyn PersistenceStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn PersistenceStore {
        self.store.as_mut()
    }

    /// Hand the backing store to a reader session.
    pub fn into_store(self) -> Box<dyn PersistenceStore> {
        self.store
    }

    /// Copy `bytes` into the library under `title`.  Importing the same
    /// bytes again returns the existing record.
    pub fn import(&mut self, title: &str, bytes: &[u8]) -> Result<Book, ReaderError> {
        let hash = content_key(bytes);
        if let Some(existing) = self.book(&hash)? {
            log::debug!("library: {title} already imported as {hash}");
            return Ok(existing);
        }

        let book = Book::new(title, bytes, Encoding::detect(bytes));
        let path = self.book_path(&book.hash);
        std::fs::create_dir_all(&self.books_dir).map_err(|source| StoreError::Io {
            path: self.books_dir.clone(),
            source,
        })?;
        std::fs::write(&path, bytes).map_err(|source| StoreError::Io { path, source })?;

        let record = serde_json::to_value(&book).map_err(|source| StoreError::Encode {
            key: book.hash.clone(),
            source,
        })?;
        self.store.update(&book.hash, record)?;
        log::info!("library: imported {title} ({} bytes)", book.size);
        Ok(book)
    }

    pub fn book(&self, hash: &str) -> Result<Option<Book>, ReaderError> {
        let Some(value) = self.store.get(hash)? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(book) => Ok(Some(book)),
            Err(e) => {
                log::warn!("library: skipping unreadable record {hash}: {e}");
                Ok(None)
            }
        }
    }

    /// All books ordered by sort title.
    pub fn books(&self) -> Result<Vec<Book>, ReaderError> {
        let mut books = Vec::new();
        for key in self.store.keys()? {
            if let Some(book) = self.book(&key)? {
                books.push(book);
            }
        }
        books.sort_by(|a, b| a.sort_title.cmp(&b.sort_title));
        Ok(books)
    }

    /// Change the encoding used to decode a book.
    pub fn set_encoding(&mut self, hash: &str, encoding: Encoding) -> Result<(), ReaderError> {
        self.store
            .update(hash, serde_json::json!({ "encoding": encoding }))?;
        Ok(())
    }

    /// Read and decode the stored text of `book`.
    pub fn load_text(&self, book: &Book, decoder: &dyn Decoder) -> Result<String, ReaderError> {
        let path = self.book_path(&book.hash);
        let bytes = std::fs::read(&path).map_err(|source| StoreError::Io { path, source })?;
        Ok(decoder.decode(&bytes, book.encoding)?)
    }

    /// Forget `hash` and delete its stored bytes.
    pub fn remove(&mut self, hash: &str) -> Result<(), ReaderError> {
        self.store.remove(hash)?;
        let path = self.book_path(hash);
        if let Err(e) = std::fs::remove_file(&path) {
            log::warn!("library: could not delete {}: {e}", path.display());
        }
        Ok(())
    }

    fn book_path(&self, hash: &str) -> PathBuf {
        self.books_dir.join(hash)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
