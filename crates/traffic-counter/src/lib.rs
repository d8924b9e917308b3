//! # Traffic Counter - Zone Transition Counting
//!
//! Turns per-frame tracked detections into directional traffic counts.
//!
//! ## Pipeline
//! 1. [`ZoneSet::resolve`] partitions a frame's detections by entry and exit
//!    zone membership of their anchor point
//! 2. [`TransitionCounter::update`] binds each track to its first entry zone
//!    and credits `(exit, entry)` crossings once per track
//! 3. [`TransitionCounter::totals`] reduces the transition table into
//!    per-exit-zone totals and a grand total
//!
//! [`FrameProcessor`] runs the three steps per frame on a single worker and
//! publishes a [`CountsSnapshot`] after each frame for readers elsewhere.

pub mod aggregate;
pub mod config;
pub mod counter;
pub mod engine;
pub mod state;
pub mod zones;

pub use aggregate::{Totals, TransitionCount};
pub use config::ZoneConfig;
pub use counter::{TransitionCounter, TransitionTable};
pub use engine::{EngineStats, FrameOutcome, FrameProcessor, RunSummary};
pub use state::{CountsSnapshot, SnapshotHandle};
pub use zones::{Zone, ZoneGeometry, ZoneKind, ZonePartition, ZoneSet};

pub use tokio_util::sync::CancellationToken;
