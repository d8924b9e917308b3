//! Frame processing: resolve zones, update the counter, publish snapshots

use crate::aggregate::Totals;
use crate::counter::TransitionCounter;
use crate::state::{CountsSnapshot, SnapshotHandle};
use crate::zones::ZoneSet;
use traffic_core::{Frame, LabeledDetection, Transition};

use std::convert::Infallible;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

/// Result of applying one frame
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub frame_index: u64,
    /// Detections of tracks with an entry zone, for the renderer
    pub detections: Vec<LabeledDetection>,
    /// Transitions first credited in this frame
    pub new_transitions: Vec<Transition>,
}

/// Processing statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EngineStats {
    pub frames_processed: u64,
    pub detections_seen: u64,
    pub detections_labeled: u64,
    pub transitions_recorded: u64,
}

/// Summary of a processing run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub frames_processed: u64,
    /// Whether the run stopped on cancellation rather than end of input
    pub cancelled: bool,
    pub totals: Totals,
}

/// Single-writer processor owning the zones and the counter for one video
#[derive(Debug)]
pub struct FrameProcessor {
    zones: ZoneSet,
    counter: TransitionCounter,
    snapshot: SnapshotHandle,
    stats: EngineStats,
    run_id: Uuid,
}

impl FrameProcessor {
    /// Create a processor for the given zones
    pub fn new(zones: ZoneSet) -> Self {
        let run_id = Uuid::new_v4();
        let counter = TransitionCounter::new(zones.exit_count());
        let snapshot = SnapshotHandle::new(CountsSnapshot::empty(run_id, zones.exit_count()));

        info!(
            "Frame processor ready: {} entry zones, {} exit zones, anchor {:?}",
            zones.entry_count(),
            zones.exit_count(),
            zones.anchor()
        );

        Self {
            zones,
            counter,
            snapshot,
            stats: EngineStats::default(),
            run_id,
        }
    }

    /// Handle for readers in other execution contexts
    pub fn snapshot_handle(&self) -> SnapshotHandle {
        self.snapshot.clone()
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn counter(&self) -> &TransitionCounter {
        &self.counter
    }

    pub fn zones(&self) -> &ZoneSet {
        &self.zones
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub fn totals(&self) -> Totals {
        self.counter.totals()
    }

    /// Apply one frame and publish the resulting snapshot
    pub fn process_frame(&mut self, frame: &Frame) -> FrameOutcome {
        let partition = self.zones.resolve(&frame.detections);
        let detections = self.counter.update_partition(&frame.detections, &partition);
        let new_transitions = self.counter.recent_transitions().to_vec();

        self.stats.frames_processed += 1;
        self.stats.detections_seen += frame.detections.len() as u64;
        self.stats.detections_labeled += detections.len() as u64;
        self.stats.transitions_recorded += new_transitions.len() as u64;

        for transition in &new_transitions {
            info!("Frame {}: transition {}", frame.index, transition);
        }

        self.snapshot.publish(CountsSnapshot::capture(
            self.run_id,
            &self.counter,
            Some(frame.index),
            self.stats.frames_processed,
        ));

        FrameOutcome {
            frame_index: frame.index,
            detections,
            new_transitions,
        }
    }

    /// Process frames until the input ends or `cancel` fires
    pub fn run<I>(&mut self, frames: I, cancel: &CancellationToken) -> RunSummary
    where
        I: IntoIterator<Item = Frame>,
    {
        match self.run_with(frames.into_iter().map(Ok::<_, Infallible>), cancel, |_, _| {}) {
            Ok(summary) => summary,
            Err(never) => match never {},
        }
    }

    /// Process fallible frames, calling `observe` after each applied frame.
    ///
    /// Cancellation is checked at every frame boundary; an input error stops
    /// the run and is returned after the frames before it were applied.
    pub fn run_with<I, E, F>(
        &mut self,
        frames: I,
        cancel: &CancellationToken,
        mut observe: F,
    ) -> Result<RunSummary, E>
    where
        I: IntoIterator<Item = Result<Frame, E>>,
        F: FnMut(&FrameOutcome, Duration),
    {
        let start_frames = self.stats.frames_processed;
        let mut cancelled = false;

        for frame in frames {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let frame = frame?;
            let started = Instant::now();
            let outcome = self.process_frame(&frame);
            observe(&outcome, started.elapsed());
        }

        // Cancellation that lands after the last frame still counts
        if !cancelled && cancel.is_cancelled() {
            cancelled = true;
        }

        let frames_processed = self.stats.frames_processed - start_frames;
        if cancelled {
            info!("Run {} stopped after {} frames", self.run_id, frames_processed);
        } else {
            debug!("Run {} reached end of input after {} frames", self.run_id, frames_processed);
        }

        Ok(RunSummary {
            run_id: self.run_id,
            frames_processed,
            cancelled,
            totals: self.counter.totals(),
        })
    }

    /// Clear all counting state ahead of the next video
    pub fn reset(&mut self) {
        self.counter.reset();
        self.stats = EngineStats::default();
        self.run_id = Uuid::new_v4();
        self.snapshot
            .publish(CountsSnapshot::empty(self.run_id, self.zones.exit_count()));

        info!("Frame processor reset, new run {}", self.run_id);
    }
}

// ============================================================================
// TESTS
// ============================================================================
