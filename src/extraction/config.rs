//! Tracker configuration.

use crate::background::BackgroundConfig;
use crate::capture::ConfigError;
use crate::preprocess::validate_kernel_size;
use serde::{Deserialize, Serialize};

/// Construction-time settings for an [`Extractor`](super::Extractor).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Median kernel side length; positive and odd.
    pub filter_kernel_size: u32,
    /// Background model strategy and tunables.
    pub background: BackgroundConfig,
    /// Blobs must be strictly larger than this many pixels.
    pub blob_area_threshold: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            filter_kernel_size: 5,
            background: BackgroundConfig::default(),
            blob_area_threshold: 500,
        }
    }
}

impl TrackerConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_kernel_size(self.filter_kernel_size)?;
        if self.blob_area_threshold == 0 {
            return Err(ConfigError::ZeroAreaThreshold);
        }
        self.background.validate()
    }
}
