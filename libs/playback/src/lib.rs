//! Playable media resolution and playback sessions
//!
//! A media reference is first classified by host, then resolved either to a
//! provider embed (YouTube, Vimeo) or to direct playback through a native
//! media element. [`driver::spawn_session`] runs one [`session::PlaybackSession`]
//! per player on its own task.
//!
//! ```rust,no_run
//! use playback::embed::{resolve_playback, PlaybackTarget};
//!
//! match resolve_playback("https://youtu.be/dQw4w9WgXcQ") {
//!     PlaybackTarget::Embed(target) => println!("frame src: {}", target.embed_url),
//!     PlaybackTarget::Direct { url } => println!("video src: {}", url),
//! }
//! ```

pub mod classifier;
pub mod controls;
pub mod driver;
pub mod embed;
pub mod error;
pub mod keyboard;
pub mod media;
pub mod session;
pub mod timecode;

pub use classifier::{classify, Provider};
pub use driver::{spawn_session, KeySink, PlaybackHost, SessionConfig, SessionEvent, SessionHandle};
pub use embed::{resolve_embed, resolve_playback, EmbedTarget, PlaybackTarget};
pub use error::{PlaybackError, PlaybackResult};
pub use session::{Phase, PlaybackState};
