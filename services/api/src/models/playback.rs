//! Playback resolution payloads

use playback::PlaybackTarget;
use serde::{Deserialize, Serialize};

/// Query parameters for a movie's playback target
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaybackQuery {
    /// Resolve the trailer instead of the feature
    #[serde(default)]
    pub trailer: bool,
}

/// Request to resolve an arbitrary media reference
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveRequest {
    pub url: String,
}

/// What a player needs to open a movie
#[derive(Debug, Clone, Serialize)]
pub struct MoviePlayback {
    pub title: String,
    pub poster: String,
    pub target: PlaybackTarget,
}
