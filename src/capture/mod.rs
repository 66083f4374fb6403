//! Frame sources and capture configuration.
//!
//! This module provides abstractions for acquiring frames in capture order
//! from a synthetic arena, a raw video stream, or (with the `camera`
//! feature) a live camera. Sources never process frames themselves.

mod camera;
mod config;
mod frame;
#[cfg(feature = "camera")]
mod live;
mod raw;

pub use camera::{ArenaScene, Camera, CameraError, MockCamera};
pub use config::{CaptureConfig, ConfigError, FileConfig, MonitorConfig, OutputConfig};
pub use frame::{Frame, Geometry};
#[cfg(feature = "camera")]
pub use live::NokhwaCamera;
pub use raw::{RawSource, RawVideoCamera};
