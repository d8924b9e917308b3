//! # Traffic Telemetry - Metrics
//!
//! Prometheus metrics for the zone-transition counting pipeline:
//! - Frame throughput and processing time
//! - Detections seen and labelled with an entry zone
//! - Credited transitions per (exit, entry) pair
//! - Current per-exit-zone totals

use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};
use traffic_core::Transition;
use tracing::info;

/// Metrics collector for the counting pipeline
pub struct MetricsCollector {
    registry: Registry,

    // Frame metrics
    frames_processed: IntCounter,
    frame_processing_time: Histogram,

    // Detection metrics
    detections_total: IntCounter,
    labeled_detections: IntGauge,
    assigned_tracks: IntGauge,

    // Counting metrics
    transitions_total: IntCounterVec,
    exit_zone_total: IntGaugeVec,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let frames_processed = IntCounter::new(
            "traffic_counter_frames_processed_total",
            "Total frames applied to the counter",
        )?;
        registry.register(Box::new(frames_processed.clone()))?;

        let frame_processing_time = Histogram::with_opts(
            HistogramOpts::new(
                "traffic_counter_frame_processing_seconds",
                "Zone resolution and counter update time per frame",
            )
            .buckets(vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05]),
        )?;
        registry.register(Box::new(frame_processing_time.clone()))?;

        let detections_total = IntCounter::new(
            "traffic_counter_detections_total",
            "Total tracked detections received",
        )?;
        registry.register(Box::new(detections_total.clone()))?;

        let labeled_detections = IntGauge::new(
            "traffic_counter_labeled_detections",
            "Detections with an entry zone in the latest frame",
        )?;
        registry.register(Box::new(labeled_detections.clone()))?;

        let assigned_tracks = IntGauge::new(
            "traffic_counter_assigned_tracks",
            "Tracks bound to an entry zone",
        )?;
        registry.register(Box::new(assigned_tracks.clone()))?;

        let transitions_total = IntCounterVec::new(
            Opts::new(
                "traffic_counter_transitions_total",
                "Tracks credited with an entry to exit crossing",
            ),
            &["exit_zone", "entry_zone"],
        )?;
        registry.register(Box::new(transitions_total.clone()))?;

        let exit_zone_total = IntGaugeVec::new(
            Opts::new(
                "traffic_counter_exit_zone_total",
                "Distinct tracks credited to each exit zone",
            ),
            &["zone"],
        )?;
        registry.register(Box::new(exit_zone_total.clone()))?;

        info!("Metrics collector initialized");

        Ok(Self {
            registry,
            frames_processed,
            frame_processing_time,
            detections_total,
            labeled_detections,
            assigned_tracks,
            transitions_total,
            exit_zone_total,
        })
    }

    /// Get Prometheus registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Export metrics in Prometheus text format
    pub fn export(&self) -> prometheus::Result<String> {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    // ========================================================================
    // FRAME METRICS
    // ========================================================================

    /// Record one applied frame
    pub fn record_frame(&self, processing_time_secs: f64, detections: u64, labeled: usize) {
        self.frames_processed.inc();
        self.frame_processing_time.observe(processing_time_secs);
        self.detections_total.inc_by(detections);
        self.labeled_detections.set(labeled as i64);
    }

    pub fn set_assigned_tracks(&self, count: usize) {
        self.assigned_tracks.set(count as i64);
    }

    // ========================================================================
    // COUNTING METRICS
    // ========================================================================

    /// Record a newly credited transition
    pub fn record_transition(&self, transition: &Transition) {
        self.transitions_total
            .with_label_values(&[
                &transition.exit_zone.index().to_string(),
                &transition.entry_zone.index().to_string(),
            ])
            .inc();
    }

    /// Set the current total for a labelled exit zone
    pub fn set_exit_zone_total(&self, zone: &str, count: usize) {
        self.exit_zone_total
            .with_label_values(&[zone])
            .set(count as i64);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use traffic_core::{EntryZoneId, ExitZoneId, TrackId};

    #[test]
    fn test_metrics_creation() {
        let metrics = MetricsCollector::new();
        assert!(metrics.is_ok());
    }

    #[test]
    fn test_metrics_export() {
        let metrics = MetricsCollector::new().unwrap();

        metrics.record_frame(0.0004, 12, 5);
        metrics.set_assigned_tracks(7);

        let export = metrics.export().unwrap();
        assert!(export.contains("traffic_counter_frames_processed_total 1"));
        assert!(export.contains("traffic_counter_detections_total 12"));
        assert!(export.contains("traffic_counter_assigned_tracks 7"));
    }

    #[test]
    fn test_transition_metrics() {
        let metrics = MetricsCollector::new().unwrap();

        let transition = Transition {
            exit_zone: ExitZoneId(0),
            entry_zone: EntryZoneId(2),
            track_id: TrackId(7),
        };
        metrics.record_transition(&transition);
        metrics.record_transition(&transition);
        metrics.set_exit_zone_total("North", 1);

        let export = metrics.export().unwrap();
        assert!(export.contains(r#"traffic_counter_transitions_total{entry_zone="2",exit_zone="0"} 2"#));
        assert!(export.contains(r#"traffic_counter_exit_zone_total{zone="North"} 1"#));
    }
}
