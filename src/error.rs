//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::library::{DecodeError, StoreError};
use crate::speech::SpeechError;

/// Any error the reader surfaces to its host.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Speech(#[from] SpeechError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A background parse task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for ReaderError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Task(e.to_string())
    }
}
