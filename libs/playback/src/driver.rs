//! Event loop that owns a playback session
//!
//! Each session runs as one tokio task. Input, decoder callbacks and the
//! controls deadline are processed one at a time, so the session itself needs
//! no locking. Snapshots of the state are published on a `watch` channel.

use std::time::Duration;

use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::{sleep, Instant},
};
use tracing::{debug, info, warn};

use crate::{
    embed::{resolve_playback, PlaybackTarget},
    error::{PlaybackError, PlaybackResult},
    keyboard::Key,
    media::{FullscreenHost, KeyboardHost, KeyboardSubscription, MediaElement, NoopElement},
    session::{KeyOutcome, PlaybackSession, PlaybackState},
};

const EVENT_BUFFER: usize = 64;

/// Callback run once when the session ends
pub type OnClose = Box<dyn FnOnce() + Send>;

/// Everything a session reacts to
#[derive(Debug)]
pub enum SessionEvent {
    PointerMoved,
    PointerLeft,
    Key(Key),
    TogglePlay,
    Restart,
    Seek(f64),
    SeekToRatio(f64),
    SetVolume(f64),
    ToggleMute,
    ToggleFullscreen {
        reply: oneshot::Sender<PlaybackResult<()>>,
    },
    MetadataLoaded {
        duration: f64,
    },
    TimeUpdate {
        current_time: f64,
    },
    BufferingUpdate {
        buffered_end: f64,
    },
    Waiting,
    /// Direct element can play, or the embed frame finished loading
    CanPlay,
    Ended,
    Error(String),
    Close,
}

pub struct SessionConfig {
    pub media_reference: String,
    pub poster_url: Option<String>,
    pub title: String,
    pub on_close: Option<OnClose>,
}

impl SessionConfig {
    pub fn new(media_reference: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            media_reference: media_reference.into(),
            poster_url: None,
            title: title.into(),
            on_close: None,
        }
    }

    pub fn with_poster(mut self, poster_url: impl Into<String>) -> Self {
        self.poster_url = Some(poster_url.into());
        self
    }

    pub fn with_on_close(mut self, on_close: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(on_close));
        self
    }
}

/// Key press channel handed to a [`KeyboardHost`] on attach.
///
/// Holds a weak sender: only the [`SessionHandle`] keeps the session alive.
#[derive(Debug, Clone)]
pub struct KeySink {
    events: mpsc::WeakSender<SessionEvent>,
}

impl KeySink {
    pub(crate) fn new(events: &mpsc::Sender<SessionEvent>) -> Self {
        Self {
            events: events.downgrade(),
        }
    }

    /// Forward a key press from the window. Returns false once the session has
    /// ended, or when its event queue is full and the press is dropped.
    pub fn send(&self, key: Key) -> bool {
        let Some(events) = self.events.upgrade() else {
            debug!("Key press {:?} after session end", key);
            return false;
        };

        match events.try_send(SessionEvent::Key(key)) {
            Ok(()) => true,
            Err(e) => {
                debug!("Key press {:?} dropped: {}", key, e);
                false
            }
        }
    }
}

/// Host collaborators handed to a new session
pub struct PlaybackHost {
    pub media: Box<dyn MediaElement>,
    pub fullscreen: Box<dyn FullscreenHost>,
    pub keyboard: Box<dyn KeyboardHost>,
}

/// Scoped resources of a running session, released on drop
struct ActiveSession {
    session: PlaybackSession,
    state: watch::Sender<PlaybackState>,
    keyboard: Option<KeyboardSubscription>,
    on_close: Option<OnClose>,
}

impl ActiveSession {
    fn publish(&self) {
        let current = self.session.state();
        self.state.send_if_modified(|published| {
            if published == current {
                false
            } else {
                *published = current.clone();
                true
            }
        });
    }

    /// Apply one event. Returns true when the session should end.
    fn apply(&mut self, event: SessionEvent) -> bool {
        let session = &mut self.session;
        match event {
            SessionEvent::PointerMoved => session.pointer_moved(Instant::now()),
            SessionEvent::PointerLeft => session.pointer_left(),
            SessionEvent::Key(key) => match session.handle_key(key) {
                Ok(KeyOutcome::CloseRequested) => return true,
                Ok(_) => {}
                Err(e) => debug!("Shortcut {:?} not applied: {}", key, e),
            },
            SessionEvent::TogglePlay => session.toggle_play(),
            SessionEvent::Restart => session.restart(),
            SessionEvent::Seek(seconds) => session.seek(seconds),
            SessionEvent::SeekToRatio(ratio) => session.seek_to_ratio(ratio),
            SessionEvent::SetVolume(volume) => session.set_volume(volume),
            SessionEvent::ToggleMute => session.toggle_mute(),
            SessionEvent::ToggleFullscreen { reply } => {
                if reply.send(session.toggle_fullscreen()).is_err() {
                    debug!("Fullscreen requester went away");
                }
            }
            SessionEvent::MetadataLoaded { duration } => session.on_metadata_loaded(duration),
            SessionEvent::TimeUpdate { current_time } => session.on_time_update(current_time),
            SessionEvent::BufferingUpdate { buffered_end } => {
                session.on_buffering_update(buffered_end)
            }
            SessionEvent::Waiting => session.on_waiting(),
            SessionEvent::CanPlay => session.on_can_play(),
            SessionEvent::Ended => session.on_ended(),
            SessionEvent::Error(message) => session.on_error(message),
            SessionEvent::Close => return true,
        }
        false
    }
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        self.session.teardown();
        self.publish();
        self.keyboard.take();

        if let Some(on_close) = self.on_close.take() {
            on_close();
        }
        info!("Playback session closed");
    }
}

async fn run(mut active: ActiveSession, mut events: mpsc::Receiver<SessionEvent>) {
    let hide_controls = sleep(Duration::ZERO);
    tokio::pin!(hide_controls);

    loop {
        let deadline = active.session.controls_deadline();
        if let Some(deadline) = deadline {
            hide_controls.as_mut().reset(deadline);
        }

        let finished = tokio::select! {
            _ = &mut hide_controls, if deadline.is_some() => {
                if active.session.poll_controls(Instant::now()) {
                    debug!("Controls hidden after inactivity");
                }
                false
            }
            event = events.recv() => match event {
                Some(event) => active.apply(event),
                None => {
                    debug!("Session handle dropped");
                    true
                }
            },
        };

        active.publish();
        if finished {
            break;
        }
    }
}

/// Resolve the configured media, start playback and run the session on a
/// new task. Must be called within a tokio runtime.
pub fn spawn_session(config: SessionConfig, host: PlaybackHost) -> SessionHandle {
    let target = resolve_playback(&config.media_reference);
    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);

    let (media, keyboard): (Box<dyn MediaElement>, _) = if target.is_embed() {
        (Box::new(NoopElement), None)
    } else {
        let sink = KeySink::new(&events_tx);
        (
            host.media,
            Some(KeyboardSubscription::attach(host.keyboard, sink)),
        )
    };

    let mut session = PlaybackSession::new(&target, media, host.fullscreen);
    session.start();

    let (state_tx, state_rx) = watch::channel(session.state().clone());

    info!(
        "Starting playback session for '{}' ({:?})",
        config.title,
        session.mode()
    );

    let active = ActiveSession {
        session,
        state: state_tx,
        keyboard,
        on_close: config.on_close,
    };
    let task = tokio::spawn(run(active, events_rx));

    SessionHandle {
        events: events_tx,
        state: state_rx,
        target,
        title: config.title,
        poster_url: config.poster_url,
        task,
    }
}

/// Caller-side API of a running session. Dropping it ends the session.
#[derive(Debug)]
pub struct SessionHandle {
    events: mpsc::Sender<SessionEvent>,
    state: watch::Receiver<PlaybackState>,
    target: PlaybackTarget,
    title: String,
    poster_url: Option<String>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub async fn send(&self, event: SessionEvent) -> PlaybackResult<()> {
        self.events
            .send(event)
            .await
            .map_err(|_| PlaybackError::SessionClosed)
    }

    pub async fn toggle_fullscreen(&self) -> PlaybackResult<()> {
        let (reply, response) = oneshot::channel();
        self.send(SessionEvent::ToggleFullscreen { reply }).await?;
        response.await.map_err(|_| PlaybackError::SessionClosed)?
    }

    /// Latest published state
    pub fn state(&self) -> PlaybackState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state.clone()
    }

    pub fn target(&self) -> &PlaybackTarget {
        &self.target
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn poster_url(&self) -> Option<&str> {
        self.poster_url.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }

    /// End the session and wait for its teardown to finish
    pub async fn close(self) {
        if self.events.send(SessionEvent::Close).await.is_err() {
            debug!("Session already closed");
        }
        if let Err(e) = self.task.await {
            warn!("Playback session task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::testing::*;
    use crate::session::Phase;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tokio::time::advance;

    const DIRECT: &str = "https://cdn.example.com/movie.mp4";

    fn host(recorder: &Recorder) -> PlaybackHost {
        PlaybackHost {
            media: element(recorder),
            fullscreen: fullscreen(recorder),
            keyboard: keyboard(recorder),
        }
    }

    fn counting_config(reference: &str, closed: &Arc<AtomicUsize>) -> SessionConfig {
        let closed = closed.clone();
        SessionConfig::new(reference, "Test Movie").with_on_close(move || {
            closed.fetch_add(1, Ordering::SeqCst);
        })
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_controls_hide_three_seconds_after_last_move() {
        let recorder = Recorder::default();
        let handle = spawn_session(SessionConfig::new(DIRECT, "Test Movie"), host(&recorder));

        handle
            .send(SessionEvent::MetadataLoaded { duration: 120.0 })
            .await
            .unwrap();
        handle.send(SessionEvent::PointerMoved).await.unwrap();
        settle().await;

        advance(Duration::from_millis(1000)).await;
        handle.send(SessionEvent::PointerMoved).await.unwrap();
        settle().await;

        advance(Duration::from_millis(2500)).await;
        settle().await;
        assert!(handle.state().controls_visible);

        advance(Duration::from_millis(500)).await;
        settle().await;
        assert!(!handle.state().controls_visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_controls_stay_visible_while_paused() {
        let recorder = Recorder::default();
        let handle = spawn_session(SessionConfig::new(DIRECT, "Test Movie"), host(&recorder));

        handle
            .send(SessionEvent::MetadataLoaded { duration: 120.0 })
            .await
            .unwrap();
        handle.send(SessionEvent::TogglePlay).await.unwrap();
        handle.send(SessionEvent::PointerMoved).await.unwrap();
        settle().await;

        advance(Duration::from_secs(5)).await;
        settle().await;
        let state = handle.state();
        assert_eq!(state.phase, Phase::Paused);
        assert!(state.controls_visible);
    }

    #[tokio::test]
    async fn test_state_is_published() {
        let recorder = Recorder::default();
        let handle = spawn_session(SessionConfig::new(DIRECT, "Test Movie"), host(&recorder));
        let mut updates = handle.subscribe();

        handle
            .send(SessionEvent::MetadataLoaded { duration: 60.0 })
            .await
            .unwrap();
        updates.changed().await.unwrap();

        let state = updates.borrow().clone();
        assert_eq!(state.duration, 60.0);
        assert_eq!(state.phase, Phase::Playing);
    }

    #[tokio::test]
    async fn test_escape_tears_down_once() {
        let recorder = Recorder::default();
        let closed = Arc::new(AtomicUsize::new(0));
        let handle = spawn_session(counting_config(DIRECT, &closed), host(&recorder));
        assert_eq!(recorder.count(&Call::AttachKeyboard), 1);

        handle.toggle_fullscreen().await.unwrap();
        assert!(handle.state().is_fullscreen);

        handle.send(SessionEvent::Key(Key::Escape)).await.unwrap();
        settle().await;
        assert!(handle.is_closed());
        assert_eq!(
            handle.send(SessionEvent::TogglePlay).await,
            Err(PlaybackError::SessionClosed)
        );
        assert!(!handle.state().is_fullscreen);

        handle.close().await;
        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.count(&Call::ExitFullscreen), 1);
        assert_eq!(recorder.count(&Call::DetachKeyboard), 1);
    }

    #[tokio::test]
    async fn test_keyboard_host_drives_session() {
        let recorder = Recorder::default();
        let handle = spawn_session(SessionConfig::new(DIRECT, "Test Movie"), host(&recorder));
        let mut updates = handle.subscribe();

        assert!(recorder.press(Key::Char('m')));
        updates.changed().await.unwrap();
        assert!(handle.state().is_muted);

        assert!(recorder.press(Key::Escape));
        settle().await;
        assert!(handle.is_closed());
        assert!(!recorder.press(Key::Char('m')));

        handle.close().await;
        assert_eq!(recorder.count(&Call::DetachKeyboard), 1);
    }

    #[tokio::test]
    async fn test_dropping_handle_tears_down() {
        let recorder = Recorder::default();
        let closed = Arc::new(AtomicUsize::new(0));
        let handle = spawn_session(counting_config(DIRECT, &closed), host(&recorder));

        drop(handle);
        settle().await;
        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.count(&Call::DetachKeyboard), 1);
    }

    #[tokio::test]
    async fn test_failed_session_still_closes() {
        let recorder = Recorder::default();
        let closed = Arc::new(AtomicUsize::new(0));
        let handle = spawn_session(counting_config(DIRECT, &closed), host(&recorder));

        handle
            .send(SessionEvent::Error("network error".to_string()))
            .await
            .unwrap();
        handle.send(SessionEvent::TogglePlay).await.unwrap();
        settle().await;
        assert_eq!(handle.state().phase, Phase::Failed);
        assert!(!handle.state().is_playing);

        handle.close().await;
        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.count(&Call::DetachKeyboard), 1);
    }

    #[tokio::test]
    async fn test_fullscreen_denial_reaches_caller() {
        let recorder = Recorder::default();
        let mut playback_host = host(&recorder);
        playback_host.fullscreen = Box::new(RecordingFullscreen {
            recorder: recorder.clone(),
            deny: true,
        });
        let handle = spawn_session(SessionConfig::new(DIRECT, "Test Movie"), playback_host);

        let result = handle.toggle_fullscreen().await;
        assert!(matches!(result, Err(PlaybackError::Fullscreen(_))));
        assert!(!handle.state().is_fullscreen);
        assert!(handle.state().is_playing);
        handle.close().await;
    }

    #[tokio::test]
    async fn test_embed_session() {
        let recorder = Recorder::default();
        let config = SessionConfig::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "Trailer")
            .with_poster("https://img.example.com/poster.jpg");
        let handle = spawn_session(config, host(&recorder));

        let embed = handle.target().embed().unwrap();
        assert_eq!(
            embed.embed_url,
            "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1&rel=0"
        );
        assert_eq!(handle.title(), "Trailer");
        assert_eq!(handle.poster_url(), Some("https://img.example.com/poster.jpg"));

        handle.send(SessionEvent::Key(Key::Escape)).await.unwrap();
        handle.send(SessionEvent::CanPlay).await.unwrap();
        settle().await;
        assert!(!handle.is_closed());
        assert_eq!(handle.state().phase, Phase::Playing);

        handle.close().await;
        // no keyboard subscription and no transport calls for embeds
        assert!(recorder.calls().is_empty());
    }
}
