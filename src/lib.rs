//! Rodent Tracker Library
//!
//! Locates a single moving animal in a fixed-camera video stream and
//! reports its position frame by frame.
//!
//! # Architecture
//!
//! ```text
//! capture → preprocess → background → preprocess → blob → extraction
//!                                                            ↓
//!                                              analysis / metrics
//! ```
//!
//! [`Extractor`] owns one stream's state: an adaptive background model and
//! the last accepted bounding box. Each frame is median-filtered, run
//! through the background model, filtered again, binarized at near-maximal
//! foreground likelihood, and reduced to its largest connected blob. A
//! blob larger than the area threshold replaces the bounding box; otherwise
//! the previous box is reported again. The image kernels and both
//! background models are OpenCV's.
//!
//! # Example
//!
//! ```no_run
//! use rodent_tracker::{
//!     analysis::{TrackingMonitor, Trajectory},
//!     capture::{Camera, CaptureConfig, MockCamera},
//!     extraction::{Extractor, TrackerConfig},
//! };
//!
//! let mut camera = MockCamera::new();
//! camera.open(&CaptureConfig::default()).unwrap();
//!
//! let mut extractor = Extractor::new(TrackerConfig::default()).unwrap();
//! let mut monitor = TrackingMonitor::default();
//! let mut trajectory = Trajectory::new();
//!
//! for _ in 0..200 {
//!     let frame = camera.capture().unwrap();
//!     let report = extractor.get_position(&frame).unwrap();
//!     monitor.observe(&report);
//!     trajectory.record(&frame, &report);
//! }
//!
//! println!("path length: {:.1} px", trajectory.path_length());
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod background;
pub mod blob;
pub mod capture;
pub mod extraction;
pub mod metrics;
pub mod preprocess;

// Re-export commonly used types at crate root
pub use analysis::{TrackingMetrics, TrackingMonitor, Trajectory};
pub use background::{BackgroundAlgorithm, BackgroundConfig, BackgroundModel};
pub use capture::{Camera, CaptureConfig, Frame, MockCamera};
pub use extraction::{BoundingBox, ExtractError, Extractor, PositionReport, TrackerConfig};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
