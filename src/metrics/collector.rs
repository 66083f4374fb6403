//! Metrics collection and registry.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of tracker state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Frames processed so far.
    pub frames_processed: u64,
    /// Frames with an accepted blob.
    pub detections: u64,
    /// Frames that reported the previous box.
    pub fallbacks: u64,
    /// Current run of fallback frames.
    pub miss_streak: u64,
    /// Whether the monitor considers the object tracked.
    pub is_tracking: bool,
    /// Area of the current bounding box in pixels.
    pub box_area: u64,
    /// Current center.
    pub center_x: u32,
    pub center_y: u32,
}

/// Prometheus metrics registry for the tracker.
pub struct MetricsRegistry {
    registry: Registry,

    frames_processed: IntCounter,
    detections: IntCounter,
    fallbacks: IntCounter,
    miss_streak: IntGauge,
    tracking_status: IntGauge,

    box_area: IntGauge,
    center_x: IntGauge,
    center_y: IntGauge,
}

impl MetricsRegistry {
    /// Creates a new registry with all tracker metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let frames_processed = IntCounter::new(
            "rodent_tracker_frames_processed_total",
            "Total number of frames processed",
        )?;
        let detections = IntCounter::new(
            "rodent_tracker_detections_total",
            "Frames in which a plausible blob was found",
        )?;
        let fallbacks = IntCounter::new(
            "rodent_tracker_fallbacks_total",
            "Frames that reported the last known position",
        )?;
        let miss_streak = IntGauge::new(
            "rodent_tracker_miss_streak",
            "Consecutive frames without a detection",
        )?;
        let tracking_status = IntGauge::new(
            "rodent_tracker_tracking_status",
            "Current tracking status (1=tracking, 0=searching or lost)",
        )?;

        let box_area = IntGauge::new(
            "rodent_tracker_box_area_pixels",
            "Area of the current bounding box",
        )?;
        let center_x = IntGauge::new("rodent_tracker_center_x", "Current center x coordinate")?;
        let center_y = IntGauge::new("rodent_tracker_center_y", "Current center y coordinate")?;

        registry.register(Box::new(frames_processed.clone()))?;
        registry.register(Box::new(detections.clone()))?;
        registry.register(Box::new(fallbacks.clone()))?;
        registry.register(Box::new(miss_streak.clone()))?;
        registry.register(Box::new(tracking_status.clone()))?;
        registry.register(Box::new(box_area.clone()))?;
        registry.register(Box::new(center_x.clone()))?;
        registry.register(Box::new(center_y.clone()))?;

        Ok(Self {
            registry,
            frames_processed,
            detections,
            fallbacks,
            miss_streak,
            tracking_status,
            box_area,
            center_x,
            center_y,
        })
    }

    /// Updates all metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        // Counters only move forward; apply the difference.
        advance(&self.frames_processed, snapshot.frames_processed);
        advance(&self.detections, snapshot.detections);
        advance(&self.fallbacks, snapshot.fallbacks);

        self.miss_streak.set(snapshot.miss_streak as i64);
        self.tracking_status.set(i64::from(snapshot.is_tracking));
        self.box_area.set(snapshot.box_area as i64);
        self.center_x.set(i64::from(snapshot.center_x));
        self.center_y.set(i64::from(snapshot.center_y));
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

impl MetricsSnapshot {
    /// Builds a snapshot from the monitor and the latest report.
    pub fn from_components(
        metrics: &crate::analysis::TrackingMetrics,
        report: &crate::extraction::PositionReport,
    ) -> Self {
        let rect = report.bounding_box;
        Self {
            frames_processed: metrics.total_frames,
            detections: metrics.detections,
            fallbacks: metrics.fallbacks,
            miss_streak: metrics.miss_streak,
            is_tracking: metrics.state == crate::analysis::TrackingState::Tracking,
            box_area: u64::from(rect.width) * u64::from(rect.height),
            center_x: report.center_x,
            center_y: report.center_y,
        }
    }
}
