//! Run-level analysis of extractor output.
//!
//! These types consume [`PositionReport`](crate::extraction::PositionReport)s
//! after the fact and never feed back into tracking.

mod monitor;
mod trajectory;

pub use monitor::{TrackingMetrics, TrackingMonitor, TrackingState};
pub use trajectory::{TrackSample, Trajectory, CSV_HEADER};
