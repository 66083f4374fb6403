//! Capture and file configuration.
//!
//! Stream geometry is fixed when the source is opened; the extractor
//! rejects frames that deviate from it.

use crate::extraction::TrackerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Highest frame rate accepted from a source.
const MAX_FPS: u32 = 1000;

/// Configuration for a frame source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Camera device index or identifier.
    pub device_id: u32,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Samples per pixel: 1 (grayscale) or 3 (color).
    pub channels: u8,
    /// Target frames per second.
    pub fps: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_id: 0,
            width: 300,
            height: 300,
            channels: 1,
            fps: 30,
        }
    }
}

impl CaptureConfig {
    /// Creates a new configuration with the specified dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.channels != 1 && self.channels != 3 {
            return Err(ConfigError::InvalidChannels(self.channels));
        }
        if self.fps == 0 || self.fps > MAX_FPS {
            return Err(ConfigError::InvalidFrameRate);
        }
        Ok(())
    }

    /// Bytes in one frame of this geometry.
    pub fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    #[error("unsupported channel count {0} (must be 1 or 3)")]
    InvalidChannels(u8),
    #[error("invalid frame rate (must be 1-1000 fps)")]
    InvalidFrameRate,
    #[error("filter kernel size must be positive")]
    ZeroKernelSize,
    #[error("filter kernel size {0} must be odd")]
    EvenKernelSize(u32),
    #[error("blob area threshold must be positive")]
    ZeroAreaThreshold,
    #[error("background history must be positive")]
    InvalidHistory,
    #[error("invalid background threshold: {0}")]
    InvalidThreshold(&'static str),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Tracking monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Consecutive frames without a detection before the object counts as lost.
    pub lost_after_frames: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            lost_after_frames: 15,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Frames to process; 0 runs until end of stream or interrupt.
    pub frame_count: u64,
    /// Trajectory CSV destination.
    pub csv_path: Option<PathBuf>,
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            frame_count: 300,
            csv_path: None,
            metrics_port: 0,
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.capture.validate()?;
        config.tracker.validate()?;
        Ok(config)
    }
}
