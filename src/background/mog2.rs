//! Adaptive Gaussian mixture background model.
//!
//! Wraps OpenCV's `BackgroundSubtractorMOG2`: each pixel holds a small
//! mixture of Gaussians, the heaviest components describe the background,
//! and a darker pixel with a consistent colour is flagged as shadow.

use super::{
    history_frames, learning_rate, BackgroundAlgorithm, BackgroundConfig, BackgroundModel,
    SHADOW_TAU,
};
use crate::capture::{Frame, Geometry};
use crate::preprocess::mask::SHADOW;
use crate::preprocess::{mat, Mask};
use opencv::core::{Mat, Ptr};
use opencv::prelude::*;
use opencv::video::{self, BackgroundSubtractorMOG2};

/// Mixture-of-Gaussians background model.
pub struct Mog2Model {
    history: u32,
    var_threshold: f32,
    detect_shadows: bool,
    subtractor: Option<Ptr<BackgroundSubtractorMOG2>>,
    geometry: Option<Geometry>,
    frames: u64,
}

impl Mog2Model {
    pub fn new(config: &BackgroundConfig) -> Self {
        Self {
            history: config.history,
            var_threshold: config.var_threshold,
            detect_shadows: config.detect_shadows,
            subtractor: None,
            geometry: None,
            frames: 0,
        }
    }

    /// Starts a fresh subtractor from `input` and reports it as background.
    fn bootstrap(&mut self, geometry: Geometry, input: &Mat) -> opencv::Result<Mask> {
        let mut subtractor = video::create_background_subtractor_mog2(
            history_frames(self.history),
            f64::from(self.var_threshold),
            self.detect_shadows,
        )?;
        subtractor.set_shadow_value(i32::from(SHADOW))?;
        subtractor.set_shadow_threshold(SHADOW_TAU)?;

        // OpenCV labels its first frame all foreground; only the model update is kept.
        let mut discarded = Mat::default();
        subtractor.apply(input, &mut discarded, learning_rate(1, self.history))?;

        self.subtractor = Some(subtractor);
        self.geometry = Some(geometry);
        self.frames = 1;
        tracing::debug!(%geometry, "MOG2 model bootstrapped");
        Ok(Mask::zeros(geometry.width, geometry.height))
    }
}

impl BackgroundModel for Mog2Model {
    fn apply(&mut self, frame: &Frame) -> opencv::Result<Mask> {
        let geometry = frame.geometry();
        let input = mat::frame_to_mat(frame)?;

        match self.subtractor.as_mut() {
            Some(subtractor) if self.geometry == Some(geometry) => {
                let rate = learning_rate(self.frames + 1, self.history);
                let mut foreground = Mat::default();
                subtractor.apply(&input, &mut foreground, rate)?;
                self.frames += 1;
                mat::mask_from_mat(&foreground)
            }
            _ => self.bootstrap(geometry, &input),
        }
    }

    fn frames_seen(&self) -> u64 {
        self.frames
    }

    fn algorithm(&self) -> BackgroundAlgorithm {
        BackgroundAlgorithm::Mog2
    }
}
