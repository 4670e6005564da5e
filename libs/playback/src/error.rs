//! Error types for playback sessions

use thiserror::Error;

/// The platform refused a play request (typically an autoplay policy).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Playback request rejected by the platform")]
pub struct PlayRejected;

/// The host environment refused to enter or leave fullscreen.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Fullscreen request denied: {0}")]
pub struct FullscreenDenied(pub String);

/// Errors reported to the owner of a playback session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// Fullscreen could not be toggled; playback is unaffected
    #[error(transparent)]
    Fullscreen(#[from] FullscreenDenied),

    /// The session has been torn down
    #[error("Playback session is closed")]
    SessionClosed,
}

/// Type alias for Result with PlaybackError
pub type PlaybackResult<T> = Result<T, PlaybackError>;
