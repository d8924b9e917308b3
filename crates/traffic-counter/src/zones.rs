//! Entry/exit zones and per-frame zone membership resolution

use traffic_core::{Anchor, CoreError, CoreResult, Detection, Point, Polygon};

use std::fmt;
use tracing::trace;

/// Geometric membership test for a single zone
pub trait ZoneGeometry: Send {
    /// Whether the anchor point lies inside the zone
    fn contains(&self, point: &Point) -> bool;
}

impl ZoneGeometry for Polygon {
    fn contains(&self, point: &Point) -> bool {
        Polygon::contains(self, point)
    }
}

/// Designation of a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneKind {
    Entry,
    Exit,
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneKind::Entry => write!(f, "entry"),
            ZoneKind::Exit => write!(f, "exit"),
        }
    }
}

/// A configured region of the frame
pub struct Zone {
    kind: ZoneKind,
    index: usize,
    geometry: Box<dyn ZoneGeometry>,
}

impl Zone {
    pub fn entry(index: usize, polygon: Polygon) -> Self {
        Self::with_geometry(ZoneKind::Entry, index, Box::new(polygon))
    }

    pub fn exit(index: usize, polygon: Polygon) -> Self {
        Self::with_geometry(ZoneKind::Exit, index, Box::new(polygon))
    }

    pub fn with_geometry(kind: ZoneKind, index: usize, geometry: Box<dyn ZoneGeometry>) -> Self {
        Self {
            kind,
            index,
            geometry,
        }
    }

    pub fn kind(&self) -> ZoneKind {
        self.kind
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Detections whose anchor point falls inside this zone, in input order
    pub fn trigger<'a>(&self, detections: &'a [Detection], anchor: Anchor) -> Vec<&'a Detection> {
        detections
            .iter()
            .filter(|d| self.geometry.contains(&d.anchor_point(anchor)))
            .collect()
    }
}

impl fmt::Debug for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Zone")
            .field("kind", &self.kind)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// Per-zone detection sub-lists for one frame
#[derive(Debug, Default)]
pub struct ZonePartition<'a> {
    /// `entries[i]` holds the detections inside entry zone `i`
    pub entries: Vec<Vec<&'a Detection>>,
    /// `exits[j]` holds the detections inside exit zone `j`
    pub exits: Vec<Vec<&'a Detection>>,
}

/// The parallel entry and exit zone lists of one camera view
#[derive(Debug)]
pub struct ZoneSet {
    entries: Vec<Zone>,
    exits: Vec<Zone>,
    anchor: Anchor,
}

impl ZoneSet {
    /// Create a zone set; both lists must have the same length
    pub fn new(entries: Vec<Zone>, exits: Vec<Zone>, anchor: Anchor) -> CoreResult<Self> {
        if entries.len() != exits.len() {
            return Err(CoreError::zone_count_mismatch(entries.len(), exits.len()));
        }

        Ok(Self {
            entries,
            exits,
            anchor,
        })
    }

    /// Create a zone set from polygon lists, indexing zones by position
    pub fn from_polygons(
        entries: Vec<Polygon>,
        exits: Vec<Polygon>,
        anchor: Anchor,
    ) -> CoreResult<Self> {
        let entries = entries
            .into_iter()
            .enumerate()
            .map(|(i, p)| Zone::entry(i, p))
            .collect();
        let exits = exits
            .into_iter()
            .enumerate()
            .map(|(i, p)| Zone::exit(i, p))
            .collect();

        Self::new(entries, exits, anchor)
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn exit_count(&self) -> usize {
        self.exits.len()
    }

    pub fn entries(&self) -> &[Zone] {
        &self.entries
    }

    pub fn exits(&self) -> &[Zone] {
        &self.exits
    }

    /// Partition a frame's detections by entry and exit zone membership
    pub fn resolve<'a>(&self, detections: &'a [Detection]) -> ZonePartition<'a> {
        let entries: Vec<Vec<&Detection>> = self
            .entries
            .iter()
            .map(|zone| zone.trigger(detections, self.anchor))
            .collect();
        let exits: Vec<Vec<&Detection>> = self
            .exits
            .iter()
            .map(|zone| zone.trigger(detections, self.anchor))
            .collect();

        trace!(
            "Resolved {} detections: entry hits {:?}, exit hits {:?}",
            detections.len(),
            entries.iter().map(Vec::len).collect::<Vec<_>>(),
            exits.iter().map(Vec::len).collect::<Vec<_>>()
        );

        ZonePartition { entries, exits }
    }
}

// ============================================================================
// TESTS
// ============================================================================
