//! Dashboard store - holds the latest consolidated snapshot
//!
//! The snapshot is only ever replaced wholesale, never merged, so readers
//! can never observe a half-built state. Fetches are sequenced: `begin`
//! hands out a monotonically increasing ticket and `commit` discards any
//! result that was overtaken by a later fetch, closing the race where a
//! slow stale response overwrites a newer one.

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::models::DashboardData;

/// Global dashboard store instance
static DASHBOARD_STORE: OnceLock<Arc<DashboardStore>> = OnceLock::new();

#[derive(Default)]
struct Inner {
    /// Sequence of the most recently issued fetch
    latest_seq: u64,
    /// Sequence that produced the stored snapshot
    data_seq: u64,
    data: Option<Arc<DashboardData>>,
}

/// In-memory store for the dashboard snapshot
pub struct DashboardStore {
    inner: RwLock<Inner>,
}

impl DashboardStore {
    /// Get or initialize the global dashboard store
    pub fn get() -> Arc<DashboardStore> {
        DASHBOARD_STORE
            .get_or_init(|| {
                Arc::new(DashboardStore {
                    inner: RwLock::new(Inner::default()),
                })
            })
            .clone()
    }

    #[cfg(test)]
    fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Register a new fetch and return its sequence ticket
    pub fn begin(&self) -> u64 {
        let mut inner = self.inner.write();
        inner.latest_seq += 1;
        inner.latest_seq
    }

    /// Replace the snapshot, unless a later fetch has been issued since
    ///
    /// Returns false when the result was discarded as stale.
    pub fn commit(&self, seq: u64, data: DashboardData) -> bool {
        let mut inner = self.inner.write();
        if seq < inner.latest_seq || seq < inner.data_seq {
            return false;
        }
        inner.data_seq = seq;
        inner.data = Some(Arc::new(data));
        true
    }

    /// Current snapshot, if any fetch has completed
    pub fn current(&self) -> Option<Arc<DashboardData>> {
        self.inner.read().data.clone()
    }

    /// Drop the stored snapshot (on disconnect)
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.data = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Period;

    fn snapshot(username: &str) -> DashboardData {
        DashboardData {
            username: username.to_string(),
            period: Period::Overall,
            user: serde_json::from_value(serde_json::json!({ "name": username })).unwrap(),
            top_artists: Vec::new(),
            top_tracks: Vec::new(),
            top_albums: Vec::new(),
            recent_tracks: Vec::new(),
            top_tags: Vec::new(),
            genre_breakdown: Vec::new(),
            similar_artists: Vec::new(),
        }
    }

    #[test]
    fn test_commit_and_read_back() {
        let store = DashboardStore::new();
        assert!(store.current().is_none());

        let seq = store.begin();
        assert!(store.commit(seq, snapshot("alice")));
        assert_eq!(store.current().unwrap().username, "alice");
    }

    #[test]
    fn test_stale_commit_is_discarded() {
        let store = DashboardStore::new();

        let old = store.begin();
        let new = store.begin();

        // the newer fetch lands first
        assert!(store.commit(new, snapshot("fresh")));
        // the superseded fetch finishes late and must not overwrite
        assert!(!store.commit(old, snapshot("stale")));

        assert_eq!(store.current().unwrap().username, "fresh");
    }

    #[test]
    fn test_clear_drops_snapshot() {
        let store = DashboardStore::new();
        let seq = store.begin();
        store.commit(seq, snapshot("alice"));

        store.clear();
        assert!(store.current().is_none());
    }
}
