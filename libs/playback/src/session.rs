//! Transport state for a single playback instance
//!
//! A [`PlaybackSession`] owns its [`PlaybackState`] exclusively. State only
//! changes in response to user input, the controls deadline, or callbacks
//! from the media element, and every handler runs to completion before the
//! next one.
//!
//! Phases move `Loading -> Playing <-> Paused -> Ended`; `Failed` is terminal.
//! Fullscreen and mute are flags orthogonal to the phase.

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use crate::{
    controls::ControlsTimer,
    embed::PlaybackTarget,
    error::PlaybackResult,
    keyboard::{Key, Shortcut},
    media::{FullscreenHost, MediaElement},
    timecode::format_time,
};

/// Where a session currently sits in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Loading,
    Playing,
    Paused,
    Ended,
    /// Decode or network failure. No retry.
    Failed,
}

/// Snapshot of a session's transport and overlay state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackState {
    pub phase: Phase,
    /// Playback intent; true from the start because autoplay is attempted
    pub is_playing: bool,
    pub is_muted: bool,
    /// 0.0..=1.0, kept while muted
    pub volume: f64,
    pub current_time: f64,
    /// 0 until metadata arrives
    pub duration: f64,
    pub buffered_ratio: f64,
    /// current_time / duration, 0 while duration is unknown
    pub progress_ratio: f64,
    pub is_fullscreen: bool,
    pub controls_visible: bool,
    pub error: Option<String>,
}

impl PlaybackState {
    fn initial() -> Self {
        Self {
            phase: Phase::Loading,
            is_playing: true,
            is_muted: false,
            volume: 1.0,
            current_time: 0.0,
            duration: 0.0,
            buffered_ratio: 0.0,
            progress_ratio: 0.0,
            is_fullscreen: false,
            controls_visible: true,
            error: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn elapsed_label(&self) -> String {
        format_time(self.current_time)
    }

    pub fn total_label(&self) -> String {
        format_time(self.duration)
    }
}

/// Which surface renders the media
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceMode {
    /// Native element; transport commands and keyboard shortcuts apply
    Direct,
    /// Third-party frame; only overlay chrome and fullscreen are ours
    Embed,
}

/// Result of routing a key press
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyOutcome {
    Ignored,
    Applied(Shortcut),
    CloseRequested,
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn sanitize_seconds(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

pub struct PlaybackSession {
    state: PlaybackState,
    mode: SurfaceMode,
    media: Box<dyn MediaElement>,
    fullscreen: Box<dyn FullscreenHost>,
    controls: ControlsTimer,
}

impl PlaybackSession {
    pub fn new(
        target: &PlaybackTarget,
        media: Box<dyn MediaElement>,
        fullscreen: Box<dyn FullscreenHost>,
    ) -> Self {
        let mode = if target.is_embed() {
            SurfaceMode::Embed
        } else {
            SurfaceMode::Direct
        };

        Self {
            state: PlaybackState::initial(),
            mode,
            media,
            fullscreen,
            controls: ControlsTimer::new(),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn mode(&self) -> SurfaceMode {
        self.mode
    }

    fn transport_enabled(&self) -> bool {
        self.mode == SurfaceMode::Direct && self.state.phase != Phase::Failed
    }

    fn intended_phase(&self) -> Phase {
        if self.state.is_playing {
            Phase::Playing
        } else {
            Phase::Paused
        }
    }

    fn settle_phase(&mut self) {
        if matches!(self.state.phase, Phase::Playing | Phase::Paused) {
            self.state.phase = self.intended_phase();
        }
    }

    fn leave_loading(&mut self) {
        if self.state.phase == Phase::Loading {
            self.state.phase = self.intended_phase();
        }
    }

    fn recompute_progress(&mut self) {
        self.state.progress_ratio = if self.state.duration > 0.0 {
            unit(self.state.current_time / self.state.duration)
        } else {
            0.0
        };
    }

    fn clamp_time(&self, seconds: f64) -> f64 {
        if seconds.is_nan() {
            0.0
        } else {
            seconds.clamp(0.0, self.state.duration)
        }
    }

    /// Attempt autoplay. A rejection parks the session in `Paused` silently.
    pub fn start(&mut self) {
        if self.mode == SurfaceMode::Embed {
            debug!("Embed surface autoplays through its URL");
            return;
        }

        if let Err(e) = self.media.play() {
            debug!("{}, waiting for user action", e);
            self.state.is_playing = false;
            self.state.phase = Phase::Paused;
        }
    }

    fn play(&mut self) {
        match self.media.play() {
            Ok(()) => self.state.is_playing = true,
            Err(e) => {
                debug!("{}", e);
                self.state.is_playing = false;
            }
        }
        self.settle_phase();
    }

    /// Toggle between playing and paused. In `Ended` this restarts from the
    /// beginning; in `Failed` it does nothing.
    pub fn toggle_play(&mut self) {
        if !self.transport_enabled() {
            return;
        }

        match self.state.phase {
            Phase::Ended => self.restart(),
            _ if self.state.is_playing => {
                self.media.pause();
                self.state.is_playing = false;
                self.settle_phase();
            }
            _ => self.play(),
        }
    }

    /// Rewind to the start and play
    pub fn restart(&mut self) {
        if !self.transport_enabled() {
            return;
        }

        debug!("Restarting playback");
        self.media.seek_to(0.0);
        self.state.current_time = 0.0;
        self.recompute_progress();
        self.state.phase = Phase::Paused;
        self.play();
    }

    fn seek_absolute(&mut self, seconds: f64) {
        let target = self.clamp_time(seconds);
        self.media.seek_to(target);
        self.state.current_time = target;
        self.recompute_progress();

        if self.state.phase == Phase::Ended && target < self.state.duration {
            self.state.phase = Phase::Paused;
        }
    }

    /// Move by `relative` seconds, clamped to `[0, duration]`
    pub fn seek(&mut self, relative: f64) {
        if !self.transport_enabled() {
            return;
        }
        self.seek_absolute(self.state.current_time + relative);
    }

    /// Jump to a fraction of the duration (progress-bar click)
    pub fn seek_to_ratio(&mut self, ratio: f64) {
        if !self.transport_enabled() {
            return;
        }
        self.seek_absolute(unit(ratio) * self.state.duration);
    }

    /// Set volume in `[0, 1]`. Zero mutes, anything louder unmutes.
    pub fn set_volume(&mut self, volume: f64) {
        let volume = unit(volume);
        self.state.volume = volume;
        self.state.is_muted = volume == 0.0;

        if self.mode == SurfaceMode::Direct {
            self.media.set_volume(volume);
            self.media.set_muted(self.state.is_muted);
        }
    }

    /// Flip mute without touching the stored volume
    pub fn toggle_mute(&mut self) {
        self.state.is_muted = !self.state.is_muted;
        if self.mode == SurfaceMode::Direct {
            self.media.set_muted(self.state.is_muted);
        }
    }

    /// Enter or leave fullscreen. A denial is returned and changes nothing else.
    pub fn toggle_fullscreen(&mut self) -> PlaybackResult<()> {
        let result = if self.state.is_fullscreen {
            self.fullscreen.exit()
        } else {
            self.fullscreen.enter()
        };

        match result {
            Ok(()) => {
                self.state.is_fullscreen = !self.state.is_fullscreen;
                Ok(())
            }
            Err(e) => {
                warn!("{}", e);
                Err(e.into())
            }
        }
    }

    pub fn on_metadata_loaded(&mut self, duration: f64) {
        if self.state.phase == Phase::Failed {
            return;
        }

        self.state.duration = sanitize_seconds(duration);
        self.state.current_time = self.clamp_time(self.state.current_time);
        self.recompute_progress();
        self.leave_loading();
        debug!("Metadata loaded, duration {}", self.state.total_label());
    }

    pub fn on_time_update(&mut self, current_time: f64) {
        if self.state.phase == Phase::Failed {
            return;
        }

        let current_time = sanitize_seconds(current_time);
        self.state.current_time = if self.state.duration > 0.0 {
            current_time.min(self.state.duration)
        } else {
            current_time
        };
        self.recompute_progress();
    }

    pub fn on_buffering_update(&mut self, buffered_end: f64) {
        self.state.buffered_ratio = if self.state.duration > 0.0 {
            unit(buffered_end / self.state.duration)
        } else {
            0.0
        };
    }

    /// The element stalled waiting for data
    pub fn on_waiting(&mut self) {
        if matches!(self.state.phase, Phase::Playing | Phase::Paused) {
            self.state.phase = Phase::Loading;
        }
    }

    /// The element (or embed frame) can render again
    pub fn on_can_play(&mut self) {
        self.leave_loading();
    }

    pub fn on_ended(&mut self) {
        self.state.is_playing = false;
        if self.state.phase != Phase::Failed {
            self.state.phase = Phase::Ended;
        }
    }

    /// Terminal load/decode failure
    pub fn on_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!("Playback failed: {}", message);
        self.state.phase = Phase::Failed;
        self.state.is_playing = false;
        self.state.error = Some(message);
    }

    pub fn pointer_moved(&mut self, now: Instant) {
        self.state.controls_visible = true;
        self.controls.arm(now);
    }

    pub fn pointer_left(&mut self) {
        self.controls.disarm();
        if self.state.is_playing {
            self.state.controls_visible = false;
        }
    }

    /// Pending controls deadline, if any
    pub fn controls_deadline(&self) -> Option<Instant> {
        self.controls.deadline()
    }

    /// Apply an expired controls deadline. Returns true if controls hid.
    pub fn poll_controls(&mut self, now: Instant) -> bool {
        if !self.controls.is_due(now) {
            return false;
        }

        self.controls.disarm();
        if self.state.is_playing && self.state.controls_visible {
            self.state.controls_visible = false;
            return true;
        }
        false
    }

    /// Route a key press. Embed sessions never react to keys.
    pub fn handle_key(&mut self, key: Key) -> PlaybackResult<KeyOutcome> {
        if self.mode == SurfaceMode::Embed {
            return Ok(KeyOutcome::Ignored);
        }

        let Some(shortcut) = Shortcut::for_key(key) else {
            return Ok(KeyOutcome::Ignored);
        };

        match shortcut {
            Shortcut::TogglePlay => self.toggle_play(),
            Shortcut::ToggleFullscreen => self.toggle_fullscreen()?,
            Shortcut::ToggleMute => self.toggle_mute(),
            Shortcut::Seek(seconds) => self.seek(seconds),
            Shortcut::Close => return Ok(KeyOutcome::CloseRequested),
        }

        Ok(KeyOutcome::Applied(shortcut))
    }

    /// Release scoped resources: the controls deadline and any fullscreen lock
    pub fn teardown(&mut self) {
        self.controls.disarm();

        if self.state.is_fullscreen {
            match self.fullscreen.exit() {
                Ok(()) => self.state.is_fullscreen = false,
                Err(e) => warn!("Failed to leave fullscreen on teardown: {}", e),
            }
        }
    }
}
