//! Embed resolution for recognized video hosts
//!
//! Turns a classified media reference into the provider's autoplaying embed
//! URL. When a provider host is recognized but no video id can be found the
//! reference is handed back as a direct resource; the native player then
//! reports whatever load failure follows.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

use crate::classifier::{HostKind, Provider, classify};

/// `allow` attribute for the sandboxed embed frame
pub const EMBED_FRAME_ALLOW: &str = "autoplay; fullscreen; picture-in-picture; encrypted-media";

/// Referrer policy for the sandboxed embed frame
pub const EMBED_REFERRER_POLICY: &str = "strict-origin-when-cross-origin";

/// A provider-hosted player substituting for direct playback
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedTarget {
    pub provider: Provider,
    pub video_id: String,
    pub embed_url: String,
    /// `allow` attribute the frame must carry
    pub allow: &'static str,
    pub referrer_policy: &'static str,
}

impl EmbedTarget {
    fn new(provider: Provider, video_id: String) -> Self {
        let embed_url = match provider {
            Provider::YouTube => {
                format!("https://www.youtube.com/embed/{}?autoplay=1&rel=0", video_id)
            }
            Provider::Vimeo => format!("https://player.vimeo.com/video/{}?autoplay=1", video_id),
        };

        Self {
            provider,
            video_id,
            embed_url,
            allow: EMBED_FRAME_ALLOW,
            referrer_policy: EMBED_REFERRER_POLICY,
        }
    }
}

/// How a media reference should be rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlaybackTarget {
    /// Third-party embed frame; transport is opaque to the host page
    Embed(EmbedTarget),
    /// Native media element fed with the original reference
    Direct { url: String },
}

impl PlaybackTarget {
    pub fn is_embed(&self) -> bool {
        matches!(self, PlaybackTarget::Embed(_))
    }

    pub fn embed(&self) -> Option<&EmbedTarget> {
        match self {
            PlaybackTarget::Embed(target) => Some(target),
            PlaybackTarget::Direct { .. } => None,
        }
    }
}

fn non_empty_segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

fn vimeo_id_regex() -> &'static Regex {
    static VIMEO_ID_REGEX: OnceLock<Regex> = OnceLock::new();
    VIMEO_ID_REGEX.get_or_init(|| Regex::new(r"^\d+$").expect("Failed to compile vimeo id regex"))
}

fn youtube_short_link_id(url: &Url) -> Option<String> {
    non_empty_segments(url).first().map(|s| s.to_string())
}

fn youtube_id(url: &Url) -> Option<String> {
    let from_query = url
        .query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty());

    from_query.or_else(|| non_empty_segments(url).last().map(|s| s.to_string()))
}

fn vimeo_id(url: &Url) -> Option<String> {
    let regex = vimeo_id_regex();
    non_empty_segments(url)
        .into_iter()
        .find(|segment| regex.is_match(segment))
        .map(str::to_string)
}

/// Resolve the embed target for a media reference, if it has one
pub fn resolve_embed(reference: &str) -> Option<EmbedTarget> {
    let classification = classify(reference);
    let url = classification.url.as_ref()?;

    let video_id = match classification.kind {
        HostKind::YouTubeShortLink => youtube_short_link_id(url),
        HostKind::YouTube => youtube_id(url),
        HostKind::Vimeo => vimeo_id(url),
        HostKind::Direct => return None,
    };

    let provider = classification.provider()?;
    match video_id {
        Some(video_id) => Some(EmbedTarget::new(provider, video_id)),
        None => {
            debug!(
                "No {:?} video id in {}, falling back to direct playback",
                provider, reference
            );
            None
        }
    }
}

/// Decide how to render a media reference. Never fails.
pub fn resolve_playback(reference: &str) -> PlaybackTarget {
    match resolve_embed(reference) {
        Some(target) => PlaybackTarget::Embed(target),
        None => PlaybackTarget::Direct {
            url: reference.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embed_url(reference: &str) -> Option<String> {
        resolve_embed(reference).map(|t| t.embed_url)
    }

    #[test]
    fn test_youtube_short_link() {
        for id in ["dQw4w9WgXcQ", "a", "abc-DEF_123"] {
            assert_eq!(
                embed_url(&format!("https://youtu.be/{id}")),
                Some(format!("https://www.youtube.com/embed/{id}?autoplay=1&rel=0"))
            );
        }
    }

    #[test]
    fn test_youtube_short_link_ignores_query() {
        let target = resolve_embed("https://youtu.be/dQw4w9WgXcQ?t=42").unwrap();
        assert_eq!(target.video_id, "dQw4w9WgXcQ");
    }

    #[test]
    fn test_youtube_watch_ignores_extra_params() {
        let target = resolve_embed("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=30").unwrap();
        assert_eq!(target.provider, Provider::YouTube);
        assert_eq!(target.video_id, "dQw4w9WgXcQ");
        assert_eq!(
            target.embed_url,
            "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1&rel=0"
        );

        let target = resolve_embed("https://m.youtube.com/watch?t=30&v=xyz&list=PL1").unwrap();
        assert_eq!(target.video_id, "xyz");
    }

    #[test]
    fn test_youtube_embed_and_shorts_paths() {
        assert_eq!(
            resolve_embed("https://www.youtube.com/embed/abc123").map(|t| t.video_id),
            Some("abc123".to_string())
        );
        assert_eq!(
            resolve_embed("https://youtube.com/shorts/short1/").map(|t| t.video_id),
            Some("short1".to_string())
        );
    }

    #[test]
    fn test_youtube_empty_v_falls_back_to_path() {
        assert_eq!(
            resolve_embed("https://www.youtube.com/embed/abc?v=").map(|t| t.video_id),
            Some("abc".to_string())
        );
    }

    #[test]
    fn test_youtube_without_id_is_unresolved() {
        assert!(resolve_embed("https://www.youtube.com/").is_none());
        assert!(resolve_embed("https://youtu.be/").is_none());
    }

    #[test]
    fn test_vimeo_plain() {
        assert_eq!(
            embed_url("https://vimeo.com/123456789"),
            Some("https://player.vimeo.com/video/123456789?autoplay=1".to_string())
        );
    }

    #[test]
    fn test_vimeo_first_numeric_segment() {
        let target = resolve_embed("https://vimeo.com/groups/abc/videos/123456789").unwrap();
        assert_eq!(target.provider, Provider::Vimeo);
        assert_eq!(target.video_id, "123456789");

        let target = resolve_embed("https://player.vimeo.com/video/76979871?h=8272103f6e").unwrap();
        assert_eq!(target.video_id, "76979871");
    }

    #[test]
    fn test_vimeo_without_numeric_segment_is_unresolved() {
        assert!(resolve_embed("https://vimeo.com/channels/staffpicks").is_none());
        assert!(resolve_embed("https://vimeo.com/12ab").is_none());
    }

    #[test]
    fn test_direct_file_has_no_embed() {
        assert!(resolve_embed("https://cdn.example.com/movie.mp4").is_none());
        assert_eq!(
            resolve_playback("https://cdn.example.com/movie.mp4"),
            PlaybackTarget::Direct {
                url: "https://cdn.example.com/movie.mp4".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_reference_resolves_to_direct() {
        let target = resolve_playback("not a url");
        assert!(!target.is_embed());
        assert_eq!(
            target,
            PlaybackTarget::Direct {
                url: "not a url".to_string()
            }
        );
    }

    #[test]
    fn test_unresolvable_provider_falls_back_to_direct() {
        let target = resolve_playback("https://vimeo.com/about");
        assert_eq!(
            target,
            PlaybackTarget::Direct {
                url: "https://vimeo.com/about".to_string()
            }
        );
    }

    #[test]
    fn test_playback_target_serialization() {
        let target = resolve_playback("https://youtu.be/abc");
        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json["kind"], "embed");
        assert_eq!(json["provider"], "youtube");
        assert_eq!(json["video_id"], "abc");
        assert_eq!(json["allow"], EMBED_FRAME_ALLOW);
        assert_eq!(json["referrer_policy"], "strict-origin-when-cross-origin");

        let json = serde_json::to_value(resolve_playback("https://cdn.example.com/a.mp4")).unwrap();
        assert_eq!(json["kind"], "direct");
        assert_eq!(json["url"], "https://cdn.example.com/a.mp4");
    }
}
