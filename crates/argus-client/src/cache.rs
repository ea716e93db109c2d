use std::sync::{Arc, RwLock};

use argus_detect::DetectionSet;

/// Holds the single current detection set for a session.
///
/// A newly arrived set replaces the previous one wholesale
/// (last-write-wins, no merging). Handles are cheap clones sharing the
/// same state; readers get a snapshot.
#[derive(Clone, Default)]
pub struct DetectionCache {
    inner: Arc<RwLock<DetectionSet>>,
}

impl DetectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current set atomically.
    pub fn replace(&self, detections: DetectionSet) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = detections;
    }

    /// Snapshot of the current set.
    pub fn current(&self) -> DetectionSet {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty()
    }
}
