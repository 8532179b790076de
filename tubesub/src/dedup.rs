//! Duplicate suppression for redelivered notifications.

use dashmap::DashSet;

use crate::types::VideoId;

/// Process-lifetime set of previously observed video ids.
///
/// The store grows monotonically and never evicts; it is created once at
/// subscriber start, mutated on every successfully parsed notification,
/// and does not survive a restart. The `contains`/`record` surface is kept
/// narrow so a bounded or persisted implementation can slot in behind it.
#[derive(Debug, Default)]
pub struct DedupStore {
    seen: DashSet<VideoId>,
}

impl DedupStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the id has been recorded before.
    pub fn contains(&self, video_id: &VideoId) -> bool {
        self.seen.contains(video_id)
    }

    /// Record an id. No-op when the id is empty: distinct malformed
    /// notifications must not collapse onto one key.
    pub fn record(&self, video_id: &VideoId) {
        if !video_id.is_empty() {
            self.seen.insert(video_id.clone());
        }
    }

    /// Atomic check-and-record.
    ///
    /// Returns `true` iff the id had not been recorded before this call.
    /// Concurrent callers racing on one id get exactly one `true`, so two
    /// simultaneous deliveries of the same video cannot both classify as
    /// new. Empty ids report as first sightings without being recorded.
    pub fn first_sighting(&self, video_id: &VideoId) -> bool {
        if video_id.is_empty() {
            return true;
        }
        self.seen.insert(video_id.clone())
    }

    /// Number of distinct ids recorded so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
