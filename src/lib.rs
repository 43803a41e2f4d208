//! Read-aloud text reader.
//!
//! Turns a plain-text book into display lines through a configurable regex
//! pipeline and reads them aloud one segment at a time.
//!
//! - [`text`]: edit, split, paint and voice-segment building blocks
//! - [`config`]: TOML settings compiled into a [`config::ReaderProfile`]
//! - [`document`]: parsed lines, their status and row layout
//! - [`speech`]: the speech-engine boundary
//! - [`playback`]: scheduler state machine and async reader session
//! - [`library`]: book records, text decoding and position persistence

pub mod config;
pub mod document;
pub mod error;
pub mod library;
pub mod playback;
pub mod speech;
pub mod text;

pub use error::ReaderError;
