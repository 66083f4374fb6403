//! Detection health monitoring.
//!
//! Counts how often the extractor finds a plausible blob and flags the
//! object as lost after a run of fallback frames.

use crate::capture::MonitorConfig;
use crate::extraction::PositionReport;

/// Tracking state derived from the detection history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrackingState {
    /// No detection yet.
    #[default]
    Searching,
    /// Detections are arriving.
    Tracking,
    /// Too many consecutive frames without a detection.
    Lost,
}

impl std::fmt::Display for TrackingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Searching => write!(f, "searching"),
            Self::Tracking => write!(f, "tracking"),
            Self::Lost => write!(f, "lost"),
        }
    }
}

/// Running detection counters.
#[derive(Debug, Clone, Default)]
pub struct TrackingMetrics {
    /// Frames observed.
    pub total_frames: u64,
    /// Frames with an accepted blob.
    pub detections: u64,
    /// Frames that fell back to the previous box.
    pub fallbacks: u64,
    /// Consecutive fallback frames up to now.
    pub miss_streak: u64,
    /// Longest fallback run seen.
    pub longest_miss_streak: u64,
    /// Times the object was found again after being lost.
    pub reacquisitions: u64,
    pub state: TrackingState,
}

impl TrackingMetrics {
    /// Fraction of frames with a detection; zero before any frame.
    pub fn detection_ratio(&self) -> f64 {
        if self.total_frames == 0 {
            return 0.0;
        }
        self.detections as f64 / self.total_frames as f64
    }
}

/// Follows detection health across a stream.
pub struct TrackingMonitor {
    metrics: TrackingMetrics,
    lost_after_frames: u64,
}

impl TrackingMonitor {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            metrics: TrackingMetrics::default(),
            lost_after_frames: config.lost_after_frames.max(1),
        }
    }

    /// Records one report and updates the tracking state.
    pub fn observe(&mut self, report: &PositionReport) -> &TrackingMetrics {
        let m = &mut self.metrics;
        m.total_frames += 1;

        if report.detected {
            m.detections += 1;
            m.miss_streak = 0;

            match m.state {
                TrackingState::Searching => {
                    tracing::info!(
                        frame = m.total_frames,
                        center_x = report.center_x,
                        center_y = report.center_y,
                        "Object acquired"
                    );
                }
                TrackingState::Lost => {
                    m.reacquisitions += 1;
                    tracing::warn!(
                        frame = m.total_frames,
                        center_x = report.center_x,
                        center_y = report.center_y,
                        "Object reacquired"
                    );
                }
                TrackingState::Tracking => {}
            }
            m.state = TrackingState::Tracking;
        } else {
            m.fallbacks += 1;
            m.miss_streak += 1;
            m.longest_miss_streak = m.longest_miss_streak.max(m.miss_streak);

            if m.state == TrackingState::Tracking && m.miss_streak >= self.lost_after_frames {
                tracing::warn!(
                    frame = m.total_frames,
                    streak = m.miss_streak,
                    "Object lost, reporting last known position"
                );
                m.state = TrackingState::Lost;
            }
        }

        &self.metrics
    }

    pub fn metrics(&self) -> &TrackingMetrics {
        &self.metrics
    }

    pub fn state(&self) -> TrackingState {
        self.metrics.state
    }
}

impl Default for TrackingMonitor {
    fn default() -> Self {
        Self::new(&MonitorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::BoundingBox;
    use crate::preprocess::Mask;

    fn report(detected: bool) -> PositionReport {
        PositionReport {
            center_x: 10,
            center_y: 10,
            half_width: 5,
            half_height: 5,
            binary_mask: Mask::zeros(2, 2),
            bounding_box: BoundingBox {
                x: 5,
                y: 5,
                width: 10,
                height: 10,
            },
            detected,
        }
    }

    fn monitor(lost_after_frames: u64) -> TrackingMonitor {
        TrackingMonitor::new(&MonitorConfig { lost_after_frames })
    }

    #[test]
    fn test_starts_searching() {
        let mut monitor = monitor(3);
        assert_eq!(monitor.state(), TrackingState::Searching);

        // Misses before the first detection never count as lost.
        for _ in 0..10 {
            monitor.observe(&report(false));
        }
        assert_eq!(monitor.state(), TrackingState::Searching);
        assert_eq!(monitor.metrics().fallbacks, 10);
    }

    #[test]
    fn test_lost_after_streak() {
        let mut monitor = monitor(3);
        monitor.observe(&report(true));
        assert_eq!(monitor.state(), TrackingState::Tracking);

        monitor.observe(&report(false));
        monitor.observe(&report(false));
        assert_eq!(monitor.state(), TrackingState::Tracking);

        monitor.observe(&report(false));
        assert_eq!(monitor.state(), TrackingState::Lost);
        assert_eq!(monitor.metrics().miss_streak, 3);
    }

    #[test]
    fn test_reacquired() {
        let mut monitor = monitor(2);
        monitor.observe(&report(true));
        monitor.observe(&report(false));
        monitor.observe(&report(false));
        monitor.observe(&report(false));
        monitor.observe(&report(true));

        let m = monitor.metrics();
        assert_eq!(m.state, TrackingState::Tracking);
        assert_eq!(m.reacquisitions, 1);
        assert_eq!(m.miss_streak, 0);
        assert_eq!(m.longest_miss_streak, 3);
    }

    #[test]
    fn test_detection_ratio() {
        let mut monitor = monitor(5);
        assert_eq!(monitor.metrics().detection_ratio(), 0.0);

        monitor.observe(&report(true));
        monitor.observe(&report(false));
        monitor.observe(&report(true));
        monitor.observe(&report(true));
        assert!((monitor.metrics().detection_ratio() - 0.75).abs() < 1e-12);
    }
}
