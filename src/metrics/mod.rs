//! Prometheus metrics for tracking runs.
//!
//! # Metrics Exposed
//!
//! - `rodent_tracker_frames_processed_total` - Frames processed
//! - `rodent_tracker_detections_total` - Frames with an accepted blob
//! - `rodent_tracker_fallbacks_total` - Frames that repeated the last box
//! - `rodent_tracker_miss_streak` - Current run of fallback frames
//! - `rodent_tracker_tracking_status` - 1 while tracking, 0 otherwise
//! - `rodent_tracker_box_area_pixels` - Area of the current box
//! - `rodent_tracker_center_x`, `rodent_tracker_center_y` - Current center
//!
//! With the `metrics` feature, [`MetricsServer`] serves them over HTTP.
//!
//! # Example
//!
//! ```no_run
//! use rodent_tracker::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! registry.update(&MetricsSnapshot {
//!     frames_processed: 120,
//!     detections: 100,
//!     fallbacks: 20,
//!     miss_streak: 0,
//!     is_tracking: true,
//!     box_area: 600,
//!     center_x: 150,
//!     center_y: 90,
//! });
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, MetricsState, ServerError, SharedMetricsState};
