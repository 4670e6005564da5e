//! API models for request and response payloads

pub mod movie;
pub mod playback;
