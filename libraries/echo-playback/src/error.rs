//! Error types for playback control

use thiserror::Error;

/// Playback errors
///
/// None of these are fatal to the containing application. The core
/// transport intents swallow them and fall back to a paused player.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlaybackError {
    /// Queue is empty
    #[error("Queue is empty")]
    QueueEmpty,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Current track has no known duration yet
    #[error("Duration of the current track is unknown")]
    DurationUnknown,

    /// Media element refused to start playback
    #[error("Playback rejected by media element: {0}")]
    MediaRejected(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
