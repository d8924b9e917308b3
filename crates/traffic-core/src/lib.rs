//! # Traffic Core
//!
//! Core domain types for the zone-transition traffic counter.
//! This crate provides the shared vocabulary used by the counting engine,
//! the telemetry exporter and the command-line runner.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod error;
pub mod geo;

pub use error::{CoreError, CoreResult};
pub use geo::*;

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Track identity assigned by the external multi-object tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub u64);

impl TrackId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for TrackId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Zero-based index into the configured entry zone list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryZoneId(pub usize);

impl EntryZoneId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for EntryZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "in-{}", self.0)
    }
}

/// Zero-based index into the configured exit zone list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExitZoneId(pub usize);

impl ExitZoneId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ExitZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "out-{}", self.0)
    }
}

// ============================================================================
// DETECTION MODELS
// ============================================================================

/// Axis-aligned bounding box in pixel coordinates (x1, y1, x2, y2)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Resolve the anchor point used for zone membership
    pub fn anchor(&self, anchor: Anchor) -> Point {
        let cx = (self.x1 + self.x2) / 2.0;
        let cy = (self.y1 + self.y2) / 2.0;

        match anchor {
            Anchor::Center => Point::new(cx, cy),
            Anchor::TopCenter => Point::new(cx, self.y1),
            Anchor::BottomCenter => Point::new(cx, self.y2),
            Anchor::CenterLeft => Point::new(self.x1, cy),
            Anchor::CenterRight => Point::new(self.x2, cy),
            Anchor::TopLeft => Point::new(self.x1, self.y1),
            Anchor::TopRight => Point::new(self.x2, self.y1),
            Anchor::BottomLeft => Point::new(self.x1, self.y2),
            Anchor::BottomRight => Point::new(self.x2, self.y2),
        }
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(xyxy: [f64; 4]) -> Self {
        Self::new(xyxy[0], xyxy[1], xyxy[2], xyxy[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.x1, bbox.y1, bbox.x2, bbox.y2]
    }
}

/// Point of a bounding box that triggers zone membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    #[default]
    Center,
    TopCenter,
    BottomCenter,
    CenterLeft,
    CenterRight,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// A single tracked detection supplied by the external tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub track_id: TrackId,
    /// Detection category from the model; never used for counting
    #[serde(default)]
    pub class_id: u32,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
    pub bbox: BoundingBox,
}

fn default_confidence() -> f32 {
    1.0
}

impl Detection {
    pub fn new(track_id: impl Into<TrackId>, bbox: BoundingBox) -> Self {
        Self {
            track_id: track_id.into(),
            class_id: 0,
            confidence: 1.0,
            bbox,
        }
    }

    pub fn with_class(mut self, class_id: u32) -> Self {
        self.class_id = class_id;
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Anchor point of this detection
    pub fn anchor_point(&self, anchor: Anchor) -> Point {
        self.bbox.anchor(anchor)
    }
}

/// A detection whose track has been assigned an entry zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledDetection {
    pub detection: Detection,
    pub entry_zone: EntryZoneId,
}

impl LabeledDetection {
    pub fn track_id(&self) -> TrackId {
        self.detection.track_id
    }
}

/// All detections observed in one video frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub index: u64,
    pub detections: Vec<Detection>,
}

impl Frame {
    pub fn new(index: u64, detections: Vec<Detection>) -> Self {
        Self { index, detections }
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

// ============================================================================
// TRANSITION MODELS
// ============================================================================

/// A credited (entry zone, exit zone) crossing for one track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    pub exit_zone: ExitZoneId,
    pub entry_zone: EntryZoneId,
    pub track_id: TrackId,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.track_id, self.entry_zone, self.exit_zone)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_center() {
        let bbox = BoundingBox::new(100.0, 100.0, 150.0, 200.0);
        assert_eq!(bbox.center(), Point::new(125.0, 150.0));
        assert_eq!(bbox.width(), 50.0);
        assert_eq!(bbox.height(), 100.0);
    }

    #[test]
    fn test_bbox_anchors() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 20.0);

        assert_eq!(bbox.anchor(Anchor::Center), Point::new(5.0, 10.0));
        assert_eq!(bbox.anchor(Anchor::TopCenter), Point::new(5.0, 0.0));
        assert_eq!(bbox.anchor(Anchor::BottomCenter), Point::new(5.0, 20.0));
        assert_eq!(bbox.anchor(Anchor::CenterLeft), Point::new(0.0, 10.0));
        assert_eq!(bbox.anchor(Anchor::CenterRight), Point::new(10.0, 10.0));
        assert_eq!(bbox.anchor(Anchor::TopLeft), Point::new(0.0, 0.0));
        assert_eq!(bbox.anchor(Anchor::TopRight), Point::new(10.0, 0.0));
        assert_eq!(bbox.anchor(Anchor::BottomLeft), Point::new(0.0, 20.0));
        assert_eq!(bbox.anchor(Anchor::BottomRight), Point::new(10.0, 20.0));
    }

    #[test]
    fn test_detection_deserialize() {
        let json = r#"{"track_id": 7, "class_id": 2, "bbox": [1.0, 2.0, 3.0, 4.0]}"#;
        let detection: Detection = serde_json::from_str(json).unwrap();

        assert_eq!(detection.track_id, TrackId(7));
        assert_eq!(detection.class_id, 2);
        assert_eq!(detection.confidence, 1.0);
        assert_eq!(detection.bbox, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_anchor_serde_names() {
        let anchor: Anchor = serde_json::from_str("\"bottom_center\"").unwrap();
        assert_eq!(anchor, Anchor::BottomCenter);
        assert_eq!(Anchor::default(), Anchor::Center);
    }

    #[test]
    fn test_transition_display() {
        let transition = Transition {
            exit_zone: ExitZoneId(0),
            entry_zone: EntryZoneId(2),
            track_id: TrackId(7),
        };
        assert_eq!(transition.to_string(), "#7 in-2 -> out-0");
    }
}
