//! Per-frame position extraction.
//!
//! Turns each camera frame into the position of the largest moving
//! object in view. The pipeline for one frame is:
//!
//! ```text
//! denoise → background model → denoise mask → threshold → largest blob → position state
//! ```
//!
//! When no blob is plausible the last known box is reported again.

mod config;
mod position;

pub use config::TrackerConfig;
pub use position::{BoundingBox, PositionReport, PositionState};

use crate::background::{self, BackgroundModel};
use crate::blob::BlobSelector;
use crate::capture::{ConfigError, Frame, Geometry};
use crate::preprocess::{BinaryThreshold, MedianFilter};

/// Errors returned for a frame the extractor cannot process.
///
/// For `InvalidFrame` and `DimensionMismatch` the extractor is left exactly
/// as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid frame: buffer length does not match {0} or a dimension is zero")]
    InvalidFrame(Geometry),
    #[error("frame geometry changed: expected {expected}, got {got}")]
    DimensionMismatch { expected: Geometry, got: Geometry },
    /// An OpenCV kernel failed, for example on an unsupported channel count.
    #[error("vision backend error {code}: {message}")]
    Vision { code: i32, message: String },
}

impl From<opencv::Error> for ExtractError {
    fn from(e: opencv::Error) -> Self {
        Self::Vision {
            code: e.code,
            message: e.message,
        }
    }
}

/// Tracks one video stream.
///
/// Owns the background model and the last accepted bounding box. One
/// extractor per stream; frames must be fed in capture order.
pub struct Extractor {
    config: TrackerConfig,
    filter: MedianFilter,
    model: Box<dyn BackgroundModel>,
    threshold: BinaryThreshold,
    selector: BlobSelector,
    state: PositionState,
    geometry: Option<Geometry>,
    frames_processed: u64,
}

impl Extractor {
    /// Creates an extractor, failing fast on an invalid configuration.
    pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let extractor = Self {
            filter: MedianFilter::new(config.filter_kernel_size)?,
            model: background::create(&config.background)?,
            threshold: BinaryThreshold::default(),
            selector: BlobSelector::new(config.blob_area_threshold)?,
            state: PositionState::new(),
            geometry: None,
            frames_processed: 0,
            config,
        };

        tracing::info!(
            algorithm = %extractor.config.background.algorithm,
            kernel = extractor.config.filter_kernel_size,
            area_threshold = extractor.config.blob_area_threshold,
            "Extractor created"
        );
        Ok(extractor)
    }

    /// Processes one frame and reports the current position.
    ///
    /// The first frame fixes the stream geometry. Later frames of a
    /// different geometry are rejected.
    pub fn get_position(&mut self, frame: &Frame) -> Result<PositionReport, ExtractError> {
        self.check_frame(frame)?;

        let denoised = self.filter.denoise(frame)?;
        let likelihood = self.model.apply(&denoised)?;
        self.geometry = Some(frame.geometry());
        let smoothed = self.filter.denoise_mask(&likelihood)?;
        let binary = self.threshold.apply(&smoothed)?;

        let candidate = self.selector.select(&binary)?;
        let detected = self.state.update(candidate.as_ref());
        self.frames_processed += 1;

        let report = self.state.report(binary, detected);
        tracing::trace!(
            sequence = frame.sequence(),
            center_x = report.center_x,
            center_y = report.center_y,
            detected,
            "Position"
        );
        Ok(report)
    }

    fn check_frame(&self, frame: &Frame) -> Result<(), ExtractError> {
        let got = frame.geometry();
        if !frame.is_valid() {
            return Err(ExtractError::InvalidFrame(got));
        }
        match self.geometry {
            Some(expected) if expected != got => {
                Err(ExtractError::DimensionMismatch { expected, got })
            }
            _ => Ok(()),
        }
    }

    /// Last accepted bounding box (all zero before the first detection).
    pub fn bounding_box(&self) -> BoundingBox {
        self.state.bounding_box()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Geometry locked in by the first frame, if any.
    pub fn geometry(&self) -> Option<Geometry> {
        self.geometry
    }

    /// Frames successfully processed so far.
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("algorithm", &self.model.algorithm())
            .field("bounding_box", &self.state.bounding_box())
            .field("frames_processed", &self.frames_processed)
            .finish_non_exhaustive()
    }
}
