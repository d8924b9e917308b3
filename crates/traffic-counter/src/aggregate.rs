//! Read-only aggregation of the transition table

use crate::counter::TransitionTable;
use traffic_core::{EntryZoneId, ExitZoneId, TrackId};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Directional totals derived from the transition table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Distinct tracks credited to each exit zone, indexed by exit zone
    pub per_exit_zone: Vec<usize>,
    /// Sum of `per_exit_zone`
    pub grand_total: usize,
}

impl Totals {
    /// Total for one exit zone; zero for an unknown zone
    pub fn for_exit(&self, exit_zone: ExitZoneId) -> usize {
        self.per_exit_zone.get(exit_zone.index()).copied().unwrap_or(0)
    }

    pub fn zone_count(&self) -> usize {
        self.per_exit_zone.len()
    }
}

/// Number of tracks credited with one (entry, exit) crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionCount {
    pub exit_zone: ExitZoneId,
    pub entry_zone: EntryZoneId,
    pub count: usize,
}

/// Reduce the table into per-exit-zone totals.
///
/// The result covers at least `exit_zone_count` zones; zones with no credited
/// tracks report zero.
pub fn totals(table: &TransitionTable, exit_zone_count: usize) -> Totals {
    let width = table
        .keys()
        .next_back()
        .map(|last| last.index() + 1)
        .unwrap_or(0)
        .max(exit_zone_count);

    let mut per_exit_zone = vec![0; width];

    for (exit_zone, by_entry) in table {
        let distinct: BTreeSet<TrackId> = by_entry.values().flatten().copied().collect();
        per_exit_zone[exit_zone.index()] = distinct.len();
    }

    let grand_total = per_exit_zone.iter().sum();

    Totals {
        per_exit_zone,
        grand_total,
    }
}

/// Flatten the table into (exit, entry, count) rows ordered by exit then entry
pub fn transition_counts(table: &TransitionTable) -> Vec<TransitionCount> {
    table
        .iter()
        .flat_map(|(&exit_zone, by_entry)| {
            by_entry.iter().map(move |(&entry_zone, tracks)| TransitionCount {
                exit_zone,
                entry_zone,
                count: tracks.len(),
            })
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
