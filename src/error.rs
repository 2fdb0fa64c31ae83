//! Custom error types for the drill engine

use thiserror::Error;

use crate::drill::PhraseId;

/// Main error type for the drill engine
#[derive(Error, Debug)]
pub enum DrillError {
    #[error("Speech session error: {0}")]
    Session(#[from] SessionError),

    #[error("Drill sequence error: {0}")]
    Sequence(#[from] SequenceError),

    #[error("Content store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Speech capture and playback errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The platform has no speech capture capability. Not retryable.
    #[error("Speech recognition is not available on this platform")]
    CapabilityUnavailable,

    /// The capability failed mid-capture. The caller may begin a new attempt.
    #[error("Speech recognition failed: {0}")]
    RecognitionFailure(String),

    #[error("Playback is disabled while listening")]
    PlaybackBlocked,

    /// The listening deadline cannot be represented on this clock
    #[error("Listening window out of range: {0:?}")]
    WindowOutOfRange(std::time::Duration),
}

/// Drill sequencing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("Invalid drill set: {0}")]
    InvalidDrillSet(String),

    #[error("Word index {index} is out of range (drill has {len} words)")]
    OutOfRangeJump { index: usize, len: usize },

    #[error("Unknown phrase: {0}")]
    UnknownPhrase(PhraseId),
}

/// Content store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Failed to load drill content: {0}")]
    ContentLoad(String),

    #[error("Corpus not found: {0}")]
    CorpusNotFound(String),

    #[error("Failed to save favorite: {0}")]
    FavoriteWrite(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration value: {field} = {value}")]
    InvalidValue { field: String, value: String },
}

pub type Result<T> = std::result::Result<T, DrillError>;
