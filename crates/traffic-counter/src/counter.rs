//! Transition counter: entry assignment and one-time exit crediting
//!
//! Every track is bound to the first entry zone it is observed in. When a
//! bound track is later observed inside an exit zone, its identity is added
//! to the `(exit, entry)` bucket of the transition table. Buckets are sets,
//! so dwelling inside an exit zone for many frames credits the track once.

use crate::aggregate::{self, Totals, TransitionCount};
use crate::zones::ZonePartition;
use traffic_core::{Detection, EntryZoneId, ExitZoneId, LabeledDetection, TrackId, Transition};

use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, trace};

/// exit zone -> entry zone -> tracks that completed that crossing
pub type TransitionTable = BTreeMap<ExitZoneId, BTreeMap<EntryZoneId, BTreeSet<TrackId>>>;

/// Stateful counter for one video
#[derive(Debug, Clone, Default)]
pub struct TransitionCounter {
    /// First-seen entry zone per track; never overwritten
    assignments: HashMap<TrackId, EntryZoneId>,
    table: TransitionTable,
    /// Triples first credited by the most recent update
    recent: Vec<Transition>,
    exit_zone_count: usize,
}

impl TransitionCounter {
    /// Create a counter reporting on `exit_zone_count` exit zones
    pub fn new(exit_zone_count: usize) -> Self {
        Self {
            exit_zone_count,
            ..Default::default()
        }
    }

    /// Apply one frame.
    ///
    /// `per_entry_zone[i]` and `per_exit_zone[j]` hold the detections inside
    /// entry zone `i` and exit zone `j`. Returns the detections of `all` whose
    /// track has an entry zone, labelled with it, in input order.
    pub fn update(
        &mut self,
        all: &[Detection],
        per_entry_zone: &[Vec<&Detection>],
        per_exit_zone: &[Vec<&Detection>],
    ) -> Vec<LabeledDetection> {
        self.recent.clear();

        for (zone_in, detections) in per_entry_zone.iter().enumerate() {
            for detection in detections {
                self.assignments
                    .entry(detection.track_id)
                    .or_insert_with(|| {
                        trace!("Track {} assigned to entry zone {}", detection.track_id, zone_in);
                        EntryZoneId(zone_in)
                    });
            }
        }

        for (zone_out, detections) in per_exit_zone.iter().enumerate() {
            let exit_zone = ExitZoneId(zone_out);

            for detection in detections {
                let track_id = detection.track_id;
                let Some(&entry_zone) = self.assignments.get(&track_id) else {
                    continue;
                };

                let inserted = self
                    .table
                    .entry(exit_zone)
                    .or_default()
                    .entry(entry_zone)
                    .or_default()
                    .insert(track_id);

                if inserted {
                    debug!("Track {} credited {} -> {}", track_id, entry_zone, exit_zone);
                    self.recent.push(Transition {
                        exit_zone,
                        entry_zone,
                        track_id,
                    });
                }
            }
        }

        all.iter()
            .filter_map(|detection| {
                self.assignments
                    .get(&detection.track_id)
                    .map(|&entry_zone| LabeledDetection {
                        detection: detection.clone(),
                        entry_zone,
                    })
            })
            .collect()
    }

    /// Apply one frame from a resolved zone partition
    pub fn update_partition(
        &mut self,
        all: &[Detection],
        partition: &ZonePartition<'_>,
    ) -> Vec<LabeledDetection> {
        self.update(all, &partition.entries, &partition.exits)
    }

    /// Per-exit-zone totals and grand total
    pub fn totals(&self) -> Totals {
        aggregate::totals(&self.table, self.exit_zone_count)
    }

    /// Per (exit, entry) breakdown of credited tracks
    pub fn transition_counts(&self) -> Vec<TransitionCount> {
        aggregate::transition_counts(&self.table)
    }

    /// Transitions first credited by the most recent update
    pub fn recent_transitions(&self) -> &[Transition] {
        &self.recent
    }

    pub fn entry_zone_of(&self, track_id: TrackId) -> Option<EntryZoneId> {
        self.assignments.get(&track_id).copied()
    }

    pub fn assigned_track_count(&self) -> usize {
        self.assignments.len()
    }

    /// Tracks credited with the given crossing
    pub fn tracks_in(&self, exit_zone: ExitZoneId, entry_zone: EntryZoneId) -> Option<&BTreeSet<TrackId>> {
        self.table.get(&exit_zone)?.get(&entry_zone)
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn exit_zone_count(&self) -> usize {
        self.exit_zone_count
    }

    /// Drop all state ahead of the next video
    pub fn reset(&mut self) {
        self.assignments.clear();
        self.table.clear();
        self.recent.clear();
    }
}

// ============================================================================
// TESTS
// ============================================================================
