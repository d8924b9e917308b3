//! Counter snapshots shared with readers outside the processing worker

use crate::aggregate::{Totals, TransitionCount};
use crate::counter::TransitionCounter;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Point-in-time copy of the counter's read model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountsSnapshot {
    /// Processing run this snapshot belongs to
    pub run_id: Uuid,
    /// Index of the last applied frame, if any
    pub frame_index: Option<u64>,
    pub frames_processed: u64,
    pub totals: Totals,
    pub transitions: Vec<TransitionCount>,
    pub assigned_tracks: usize,
    pub taken_at: DateTime<Utc>,
}

impl CountsSnapshot {
    /// Snapshot of a run that has not applied any frame yet
    pub fn empty(run_id: Uuid, exit_zone_count: usize) -> Self {
        Self {
            run_id,
            frame_index: None,
            frames_processed: 0,
            totals: Totals {
                per_exit_zone: vec![0; exit_zone_count],
                grand_total: 0,
            },
            transitions: Vec::new(),
            assigned_tracks: 0,
            taken_at: Utc::now(),
        }
    }

    /// Capture the counter's current read model
    pub fn capture(
        run_id: Uuid,
        counter: &TransitionCounter,
        frame_index: Option<u64>,
        frames_processed: u64,
    ) -> Self {
        Self {
            run_id,
            frame_index,
            frames_processed,
            totals: counter.totals(),
            transitions: counter.transition_counts(),
            assigned_tracks: counter.assigned_track_count(),
            taken_at: Utc::now(),
        }
    }
}

/// Cloneable handle to the latest published snapshot.
///
/// The worker replaces the whole snapshot after each frame, so readers never
/// observe a partially applied update.
#[derive(Debug, Clone)]
pub struct SnapshotHandle {
    inner: Arc<RwLock<CountsSnapshot>>,
}

impl SnapshotHandle {
    pub fn new(initial: CountsSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Copy of the latest snapshot
    pub fn latest(&self) -> CountsSnapshot {
        self.inner.read().clone()
    }

    /// Copy of the latest totals only
    pub fn totals(&self) -> Totals {
        self.inner.read().totals.clone()
    }

    pub(crate) fn publish(&self, snapshot: CountsSnapshot) {
        *self.inner.write() = snapshot;
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot() {
        let snapshot = CountsSnapshot::empty(Uuid::new_v4(), 4);
        assert_eq!(snapshot.frame_index, None);
        assert_eq!(snapshot.totals.per_exit_zone, vec![0; 4]);
        assert!(snapshot.transitions.is_empty());
    }

    #[test]
    fn test_handle_publish_visible_to_clones() {
        let run_id = Uuid::new_v4();
        let handle = SnapshotHandle::new(CountsSnapshot::empty(run_id, 2));
        let reader = handle.clone();

        let mut next = CountsSnapshot::empty(run_id, 2);
        next.frame_index = Some(3);
        next.totals = Totals {
            per_exit_zone: vec![1, 2],
            grand_total: 3,
        };
        handle.publish(next.clone());

        assert_eq!(reader.latest(), next);
        assert_eq!(reader.totals().grand_total, 3);
    }

    #[test]
    fn test_snapshot_serializes() {
        let snapshot = CountsSnapshot::empty(Uuid::new_v4(), 1);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["totals"]["grand_total"], 0);
        assert!(json["frame_index"].is_null());
    }
}
