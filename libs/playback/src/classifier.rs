//! Media reference classification
//!
//! Decides whether a media reference points at one of the supported video
//! hosts or at a direct media resource. Classification never fails: a
//! reference that does not parse as a URL is simply a direct resource, and
//! the native player reports the load error later.

use serde::Serialize;
use tracing::debug;
use url::Url;

/// Third-party video providers with an embeddable player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// youtube.com / youtu.be
    YouTube,
    /// vimeo.com
    Vimeo,
}

/// Which URL shape the host table matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    /// `youtu.be/<id>`
    YouTubeShortLink,
    /// `youtube.com` and `m.youtube.com` (watch, embed and shorts paths)
    YouTube,
    /// `vimeo.com` and `player.vimeo.com`
    Vimeo,
    /// Anything else, including references that are not URLs at all
    Direct,
}

impl HostKind {
    /// Provider behind this host, if any
    pub fn provider(self) -> Option<Provider> {
        match self {
            HostKind::YouTubeShortLink | HostKind::YouTube => Some(Provider::YouTube),
            HostKind::Vimeo => Some(Provider::Vimeo),
            HostKind::Direct => None,
        }
    }
}

/// Result of classifying a media reference
#[derive(Debug, Clone)]
pub struct Classification {
    /// Matched host kind
    pub kind: HostKind,
    /// The parsed URL, absent when the reference was malformed
    pub url: Option<Url>,
}

impl Classification {
    /// Provider behind the classified reference, if any
    pub fn provider(&self) -> Option<Provider> {
        self.kind.provider()
    }
}

/// Match a bare hostname against the supported provider table.
///
/// A single leading `www.` is ignored.
pub fn host_kind(host: &str) -> HostKind {
    let host = host.strip_prefix("www.").unwrap_or(host);

    match host {
        "youtu.be" => HostKind::YouTubeShortLink,
        "youtube.com" | "m.youtube.com" => HostKind::YouTube,
        "vimeo.com" | "player.vimeo.com" => HostKind::Vimeo,
        _ => HostKind::Direct,
    }
}

/// Classify a media reference
pub fn classify(reference: &str) -> Classification {
    let url = match Url::parse(reference.trim()) {
        Ok(url) => url,
        Err(e) => {
            debug!("Media reference is not a URL ({}), treating as direct", e);
            return Classification {
                kind: HostKind::Direct,
                url: None,
            };
        }
    };

    let kind = url.host_str().map(host_kind).unwrap_or(HostKind::Direct);

    Classification {
        kind,
        url: Some(url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_youtube_hosts() {
        assert_eq!(classify("https://youtu.be/abc").kind, HostKind::YouTubeShortLink);
        assert_eq!(
            classify("https://www.youtube.com/watch?v=abc").kind,
            HostKind::YouTube
        );
        assert_eq!(
            classify("https://m.youtube.com/watch?v=abc").kind,
            HostKind::YouTube
        );
        assert_eq!(
            classify("https://youtube.com/shorts/abc").provider(),
            Some(Provider::YouTube)
        );
    }

    #[test]
    fn test_vimeo_hosts() {
        assert_eq!(classify("https://vimeo.com/1").kind, HostKind::Vimeo);
        assert_eq!(classify("https://www.vimeo.com/1").kind, HostKind::Vimeo);
        assert_eq!(
            classify("https://player.vimeo.com/video/1").kind,
            HostKind::Vimeo
        );
    }

    #[test]
    fn test_host_matching_is_case_insensitive() {
        assert_eq!(classify("https://WWW.YouTube.COM/watch?v=x").kind, HostKind::YouTube);
    }

    #[test]
    fn test_lookalike_hosts_are_direct() {
        assert_eq!(classify("https://notyoutube.com/watch?v=x").kind, HostKind::Direct);
        assert_eq!(classify("https://youtube.com.evil.io/x").kind, HostKind::Direct);
        assert_eq!(classify("https://music.youtube.com/watch?v=x").kind, HostKind::Direct);
        // only one www. is stripped
        assert_eq!(classify("https://www.www.vimeo.com/1").kind, HostKind::Direct);
    }

    #[test]
    fn test_direct_file_has_no_provider() {
        let classification = classify("https://cdn.example.com/movie.mp4");
        assert_eq!(classification.kind, HostKind::Direct);
        assert!(classification.provider().is_none());
        assert!(classification.url.is_some());
    }

    #[test]
    fn test_malformed_reference_is_direct() {
        for reference in ["not a url", "", "://missing-scheme", "/relative/movie.mp4"] {
            let classification = classify(reference);
            assert_eq!(classification.kind, HostKind::Direct, "{reference:?}");
            assert!(classification.url.is_none(), "{reference:?}");
        }
    }

    #[test]
    fn test_url_without_host_is_direct() {
        let classification = classify("data:video/mp4;base64,AAAA");
        assert_eq!(classification.kind, HostKind::Direct);
    }
}
