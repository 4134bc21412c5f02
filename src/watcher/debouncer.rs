//! Duplicate suppression for file change events.
//!
//! Editors emit several raw events per logical save; the debouncer
//! collapses a burst for the same path into one forwarded event.

use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

use super::graph::path_key;

/// Suppresses duplicate events per path inside a short window.
///
/// Entries expire lazily, on the next lookup for that path; nothing sweeps
/// the table. It only ever holds actively changing paths, so it stays
/// small.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    seen: HashMap<String, Instant>,
}

impl Debouncer {
    /// Default suppression window in milliseconds.
    pub const DEFAULT_WINDOW_MS: u64 = 200;

    pub fn new(window_ms: u64) -> Self {
        Self {
            window: Duration::from_millis(window_ms),
            seen: HashMap::new(),
        }
    }

    /// Admit or suppress an event for `path`.
    ///
    /// Returns true when the event should be forwarded; false when it is a
    /// duplicate inside the suppression window. Admitting refreshes the
    /// window for the path.
    pub fn admit(&mut self, path: &Path) -> bool {
        let key = path_key(path);
        let now = Instant::now();

        if let Some(expiry) = self.seen.get(&key) {
            if *expiry > now {
                return false;
            }
        }

        self.seen.insert(key, now + self.window);
        true
    }

    #[allow(dead_code)]
    pub fn entry_count(&self) -> usize {
        self.seen.len()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW_MS)
    }
}
