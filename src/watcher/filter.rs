//! Suppression of repeated creation events.
//!
//! Some backends report a single creation more than once (FSEvents in
//! particular coalesces flags and can repeat a create). The filter lets the
//! first event for a path through and drops repeats inside a short window.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Tracks recently admitted paths.
#[derive(Debug)]
pub struct CreationFilter {
    /// Admitted paths: path -> time admitted.
    recent: HashMap<PathBuf, Instant>,
    /// How long a repeat for the same path is suppressed.
    window: Duration,
}

impl CreationFilter {
    /// Create a new filter with the given window in milliseconds.
    pub fn new(window_ms: u64) -> Self {
        Self {
            recent: HashMap::new(),
            window: Duration::from_millis(window_ms),
        }
    }

    /// Returns `true` if `path` should be reported.
    pub fn admit(&mut self, path: &Path) -> bool {
        let now = Instant::now();
        let window = self.window;
        self.recent
            .retain(|_, admitted| now.duration_since(*admitted) < window);

        if self.recent.contains_key(path) {
            return false;
        }
        self.recent.insert(path.to_path_buf(), now);
        true
    }

    pub fn tracked_count(&self) -> usize {
        self.recent.len()
    }
}
