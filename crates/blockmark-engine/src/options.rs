use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables of the editor engine. Every field has a serde default so partial
/// config files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    /// Window in which consecutive content updates of one block share an undo step.
    pub history_debounce_ms: u64,
    /// Maximum number of undo snapshots kept; the oldest is dropped first.
    /// Undo walks back at most this many steps, so a longer edit sequence can
    /// no longer return to its starting document.
    pub history_limit: usize,
    /// Repeats of the same global shortcut inside this interval are suppressed.
    pub shortcut_min_interval_ms: u64,
    /// Maximum vertical distance between the pointer and a drop zone center.
    pub drop_proximity_px: f32,
    /// Register the built-in block and markdown plugins on startup.
    pub builtin_plugins: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            history_debounce_ms: 300,
            history_limit: 100,
            shortcut_min_interval_ms: 80,
            drop_proximity_px: 48.0,
            builtin_plugins: true,
        }
    }
}

impl EditorOptions {
    pub fn history_debounce(&self) -> Duration {
        Duration::from_millis(self.history_debounce_ms)
    }

    pub fn shortcut_min_interval(&self) -> Duration {
        Duration::from_millis(self.shortcut_min_interval_ms)
    }
}
