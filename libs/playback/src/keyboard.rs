//! Keyboard shortcuts for direct playback

/// Seconds skipped by the arrow-key shortcuts
pub const SEEK_STEP_SECONDS: f64 = 10.0;

/// A key press as reported by the host window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Char(char),
    ArrowLeft,
    ArrowRight,
    Escape,
    Other,
}

impl Key {
    /// Map a DOM-style key name (`" "`, `"k"`, `"ArrowLeft"`, ...) to a key
    pub fn from_name(name: &str) -> Self {
        match name {
            " " | "Space" | "Spacebar" => Key::Space,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "Escape" | "Esc" => Key::Escape,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other,
                }
            }
        }
    }
}

/// Actions bound to keys
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shortcut {
    TogglePlay,
    ToggleFullscreen,
    ToggleMute,
    Seek(f64),
    Close,
}

impl Shortcut {
    /// Shortcut bound to `key`. Letter bindings are case-sensitive.
    pub fn for_key(key: Key) -> Option<Self> {
        match key {
            Key::Space | Key::Char('k') => Some(Shortcut::TogglePlay),
            Key::Char('f') => Some(Shortcut::ToggleFullscreen),
            Key::Char('m') => Some(Shortcut::ToggleMute),
            Key::ArrowLeft => Some(Shortcut::Seek(-SEEK_STEP_SECONDS)),
            Key::ArrowRight => Some(Shortcut::Seek(SEEK_STEP_SECONDS)),
            Key::Escape => Some(Shortcut::Close),
            Key::Char(_) | Key::Other => None,
        }
    }
}
