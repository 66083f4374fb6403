//! Non-parametric nearest-neighbour background model.
//!
//! Wraps OpenCV's `BackgroundSubtractorKNN`: each pixel keeps a history of
//! raw samples in short, mid and long term tiers, and is background when
//! enough samples lie within the distance threshold.
//!
//! OpenCV draws the tier refresh schedule from its thread-local RNG. The
//! model reseeds that RNG from its own ChaCha8 stream before every frame,
//! so two models built from the same configuration produce identical
//! masks even when their frames are interleaved on one thread.

use super::{
    history_frames, learning_rate, BackgroundAlgorithm, BackgroundConfig, BackgroundModel,
    SHADOW_TAU,
};
use crate::capture::{Frame, Geometry};
use crate::preprocess::mask::SHADOW;
use crate::preprocess::{mat, Mask};
use opencv::core::{self, Mat, Ptr};
use opencv::prelude::*;
use opencv::video::{self, BackgroundSubtractorKNN};
use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};

/// K-nearest-neighbour background model.
pub struct KnnModel {
    history: u32,
    dist2_threshold: f32,
    detect_shadows: bool,
    seed: u64,
    subtractor: Option<Ptr<BackgroundSubtractorKNN>>,
    geometry: Option<Geometry>,
    rng: ChaCha8Rng,
    frames: u64,
}

impl KnnModel {
    pub fn new(config: &BackgroundConfig) -> Self {
        Self {
            history: config.history,
            dist2_threshold: config.dist2_threshold,
            detect_shadows: config.detect_shadows,
            seed: config.seed,
            subtractor: None,
            geometry: None,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            frames: 0,
        }
    }

    /// Starts a fresh subtractor from `input` and reports it as background.
    fn bootstrap(&mut self, geometry: Geometry, input: &Mat) -> opencv::Result<Mask> {
        let mut subtractor = video::create_background_subtractor_knn(
            history_frames(self.history),
            f64::from(self.dist2_threshold),
            self.detect_shadows,
        )?;
        subtractor.set_shadow_value(i32::from(SHADOW))?;
        subtractor.set_shadow_threshold(SHADOW_TAU)?;

        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        core::set_rng_seed(self.rng.next_u32() as i32)?;
        let mut discarded = Mat::default();
        subtractor.apply(input, &mut discarded, learning_rate(1, self.history))?;

        self.subtractor = Some(subtractor);
        self.geometry = Some(geometry);
        self.frames = 1;
        tracing::debug!(%geometry, seed = self.seed, "KNN model bootstrapped");
        Ok(Mask::zeros(geometry.width, geometry.height))
    }
}

impl BackgroundModel for KnnModel {
    fn apply(&mut self, frame: &Frame) -> opencv::Result<Mask> {
        let geometry = frame.geometry();
        let input = mat::frame_to_mat(frame)?;

        match self.subtractor.as_mut() {
            Some(subtractor) if self.geometry == Some(geometry) => {
                core::set_rng_seed(self.rng.next_u32() as i32)?;
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
        BackgroundAlgorithm::Knn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::mask::FOREGROUND;

    fn uniform(value: u8, seq: u64) -> Frame {
        Frame::new(vec![value; 12 * 12], 12, 12, seq)
    }

    fn with_patch(bg: u8, fg: u8, seq: u64) -> Frame {
        let mut pixels = vec![bg; 12 * 12];
        for y in 2..6 {
            for x in 2..6 {
                pixels[y * 12 + x] = fg;
            }
        }
        Frame::new(pixels, 12, 12, seq)
    }

    fn model() -> KnnModel {
        KnnModel::new(&BackgroundConfig::with_algorithm(BackgroundAlgorithm::Knn))
    }

    #[test]
    fn test_first_frame_is_background() {
        let mut knn = model();
        assert_eq!(knn.apply(&with_patch(50, 200, 1)).unwrap().count_nonzero(), 0);
        assert_eq!(knn.frames_seen(), 1);
    }

    #[test]
    fn test_bright_object_is_foreground() {
        let mut knn = model();
        for seq in 1..=10 {
            knn.apply(&uniform(50, seq)).unwrap();
        }
        let mask = knn.apply(&with_patch(50, 200, 11)).unwrap();
        assert_eq!(mask.get(3, 3), FOREGROUND);
        assert_eq!(mask.count_nonzero(), 16);

        let mask = knn.apply(&uniform(50, 12)).unwrap();
        assert_eq!(mask.count_nonzero(), 0);
    }

    #[test]
    fn test_darker_patch_is_shadow() {
        let mut knn = model();
        for seq in 1..=10 {
            knn.apply(&uniform(200, seq)).unwrap();
        }
        let mask = knn.apply(&with_patch(200, 150, 11)).unwrap();
        assert_eq!(mask.get(3, 3), SHADOW);
    }

    #[test]
    fn test_interleaved_models_agree() {
        let mut a = model();
        let mut b = model();
        for seq in 1..=40 {
            let frame = if seq % 4 == 0 {
                with_patch(70, 210, seq)
            } else {
                uniform(70, seq)
            };
            assert_eq!(a.apply(&frame).unwrap(), b.apply(&frame).unwrap(), "frame {seq}");
        }
    }

    #[test]
    fn test_geometry_change_rebootstraps() {
        let mut knn = model();
        knn.apply(&uniform(50, 1)).unwrap();
        knn.apply(&uniform(50, 2)).unwrap();
        let mask = knn.apply(&Frame::new(vec![200; 20], 5, 4, 3)).unwrap();
        assert_eq!(mask.width(), 5);
        assert_eq!(mask.count_nonzero(), 0);
        assert_eq!(knn.frames_seen(), 1);
    }
}
