//! Where the reader keeps its files, resolved with the `dirs` crate.
//!
//! ```text
//! <config>/read-aloud/settings.toml      ReaderConfig (TOML)
//! <data>/read-aloud/library.json         book records, encodings, positions
//! <data>/read-aloud/books/<sha256>       imported book bytes, never re-encoded
//! ```
//!
//! `<config>` is `%APPDATA%`, `~/Library/Application Support` or
//! `~/.config`; `<data>` is `%LOCALAPPDATA%`, `~/Library/Application Support`
//! or `~/.local/share`. Settings can be deleted to reset the reader without
//! losing the library.

use std::path::{Path, PathBuf};

/// Resolved locations of the reader's settings and library.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Holds `settings.toml` only.
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,
    /// Root of the library: `library.json` and `books/`.
    pub data_dir: PathBuf,
    /// One JSON object per book, keyed by its content hash.
    pub library_file: PathBuf,
    /// One file per imported book, named by its content hash, so importing
    /// the same bytes twice reuses the record.
    pub books_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "read-aloud";

    /// Platform directories, or the working directory when the platform has
    /// none.
    pub fn new() -> Self {
        let config_root = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        let data_root = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::under(&config_root, &data_root)
    }

    /// The same layout below explicit roots.
    pub fn under(config_root: &Path, data_root: &Path) -> Self {
        let config_dir = config_root.join(Self::APP_NAME);
        let data_dir = data_root.join(Self::APP_NAME);

        Self {
            settings_file: config_dir.join("settings.toml"),
            library_file: data_dir.join("library.json"),
            books_dir: data_dir.join("books"),
            config_dir,
            data_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_paths_end_in_reader_files() {
        let paths = AppPaths::new();
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths
            .library_file
            .file_name()
            .is_some_and(|n| n == "library.json"));
        assert!(paths.books_dir.ends_with("read-aloud/books"));
    }

    #[test]
    fn settings_and_library_live_apart() {
        let paths = AppPaths::under(Path::new("/cfg"), Path::new("/data"));
        assert_eq!(paths.settings_file, Path::new("/cfg/read-aloud/settings.toml"));
        assert_eq!(paths.library_file, Path::new("/data/read-aloud/library.json"));
        assert_eq!(paths.books_dir, Path::new("/data/read-aloud/books"));
        assert!(paths.library_file.starts_with(&paths.data_dir));
        assert!(!paths.settings_file.starts_with(&paths.data_dir));
    }
}
