//! Configuration module for the reader.
//!
//! Provides `ReaderConfig` (top-level settings), its per-stage sections,
//! `AppPaths` for cross-platform data directories, TOML persistence via
//! `ReaderConfig::load` / `ReaderConfig::save`, and compilation into the
//! immutable `ReaderProfile` consumed by the parser and the scheduler.

pub mod paths;
pub mod profile;
pub mod rules;
pub mod settings;

pub use paths::AppPaths;
pub use profile::{ConfigError, Preprocessor, ReaderProfile, ReadingOptions};
pub use settings::{
    EditRuleConfig, LinePalette, PaintRuleConfig, PreprocessConfig, ReaderConfig, ReadingConfig,
    RenderConfig, SplitConfig, WindowPolicy,
};
