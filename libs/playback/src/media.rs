//! Collaborators a playback session drives
//!
//! The session never decodes or renders anything itself. It issues transport
//! commands to a [`MediaElement`], asks a [`FullscreenHost`] for exclusive
//! viewport rendering and holds a window-level keyboard subscription through
//! a [`KeyboardHost`].

use tracing::debug;

use crate::{
    driver::KeySink,
    error::{FullscreenDenied, PlayRejected},
};

/// Native media element performing decode and render of direct resources
pub trait MediaElement: Send {
    /// Request playback. Rejection is expected under autoplay policies.
    fn play(&mut self) -> Result<(), PlayRejected>;
    fn pause(&mut self);
    fn seek_to(&mut self, seconds: f64);
    fn set_volume(&mut self, volume: f64);
    fn set_muted(&mut self, muted: bool);
}

/// Stand-in element for embed surfaces, whose transport lives inside the frame
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopElement;

impl MediaElement for NoopElement {
    fn play(&mut self) -> Result<(), PlayRejected> {
        Ok(())
    }

    fn pause(&mut self) {}

    fn seek_to(&mut self, _seconds: f64) {}

    fn set_volume(&mut self, _volume: f64) {}

    fn set_muted(&mut self, _muted: bool) {}
}

/// Host environment able to render the playback surface full-viewport
pub trait FullscreenHost: Send {
    fn enter(&mut self) -> Result<(), FullscreenDenied>;
    fn exit(&mut self) -> Result<(), FullscreenDenied>;
}

/// Window-level keyboard event source
pub trait KeyboardHost: Send {
    /// Start forwarding key presses into `sink` until [`detach`](Self::detach)
    fn attach(&mut self, sink: KeySink);
    fn detach(&mut self);
}

/// Scoped keyboard subscription, detached when dropped
pub struct KeyboardSubscription {
    host: Box<dyn KeyboardHost>,
}

impl KeyboardSubscription {
    pub fn attach(mut host: Box<dyn KeyboardHost>, sink: KeySink) -> Self {
        host.attach(sink);
        debug!("Keyboard shortcuts attached");
        Self { host }
    }
}

impl Drop for KeyboardSubscription {
    fn drop(&mut self) {
        self.host.detach();
        debug!("Keyboard shortcuts detached");
    }
}

impl std::fmt::Debug for KeyboardSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardSubscription").finish_non_exhaustive()
    }
}
