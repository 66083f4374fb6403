//! Adaptive background modeling.
//!
//! A background model learns the static scene online and labels each
//! pixel of the incoming frame as background, shadow or foreground.
//!
//! # Ordering
//!
//! Every call to [`BackgroundModel::apply`] mutates the model. Frames must
//! be applied in capture order, one at a time; the `&mut self` receiver and
//! exclusive ownership by the extractor enforce this.
//!
//! # Strategies
//!
//! - [`Mog2Model`]: per-pixel adaptive mixture of Gaussians.
//! - [`KnnModel`]: per-pixel non-parametric sample history.
//!
//! Both wrap the OpenCV subtractors of the same name. They bootstrap from
//! the first frame they see and report it as all-background, where OpenCV
//! alone would report every pixel of that frame as foreground.

mod knn;
mod mog2;

pub use knn::KnnModel;
pub use mog2::Mog2Model;

use crate::capture::{ConfigError, Frame};
use crate::preprocess::Mask;
use serde::{Deserialize, Serialize};

/// Brightness ratio below which a darker pixel is no longer a shadow.
pub(crate) const SHADOW_TAU: f64 = 0.5;

/// Background subtraction strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundAlgorithm {
    /// Parametric mixture of Gaussians.
    #[default]
    Mog2,
    /// Non-parametric nearest-neighbour history.
    Knn,
}

impl std::str::FromStr for BackgroundAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mog2" => Ok(Self::Mog2),
            "knn" => Ok(Self::Knn),
            other => Err(format!("unknown background algorithm: {other}")),
        }
    }
}

impl std::fmt::Display for BackgroundAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mog2 => write!(f, "mog2"),
            Self::Knn => write!(f, "knn"),
        }
    }
}

/// Background model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Which strategy to build.
    pub algorithm: BackgroundAlgorithm,
    /// Frames of history; bounds how slowly the model forgets.
    pub history: u32,
    /// Report darker colour-consistent pixels as shadow instead of foreground.
    pub detect_shadows: bool,
    /// MOG2: squared Mahalanobis distance for a pixel to count as background.
    pub var_threshold: f32,
    /// KNN: squared distance for a sample to count as a neighbour.
    pub dist2_threshold: f32,
    /// KNN: seed for the per-frame sample refresh schedule.
    pub seed: u64,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            algorithm: BackgroundAlgorithm::Mog2,
            history: 500,
            detect_shadows: true,
            var_threshold: 16.0,
            dist2_threshold: 400.0,
            seed: 0x5eed,
        }
    }
}

impl BackgroundConfig {
    /// Creates a default configuration for the given strategy.
    pub fn with_algorithm(algorithm: BackgroundAlgorithm) -> Self {
        Self {
            algorithm,
            ..Default::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history == 0 {
            return Err(ConfigError::InvalidHistory);
        }
        if !(self.var_threshold.is_finite() && self.var_threshold > 0.0) {
            return Err(ConfigError::InvalidThreshold("var_threshold must be positive"));
        }
        if !(self.dist2_threshold.is_finite() && self.dist2_threshold > 0.0) {
            return Err(ConfigError::InvalidThreshold("dist2_threshold must be positive"));
        }
        Ok(())
    }
}

/// A stateful, causal background model.
pub trait BackgroundModel: Send {
    /// Updates the model with `frame` and returns its likelihood mask.
    ///
    /// Mask values: 0 background, 127 shadow, 255 foreground.
    fn apply(&mut self, frame: &Frame) -> opencv::Result<Mask>;

    /// Number of frames the model has learned from.
    fn frames_seen(&self) -> u64;

    /// The strategy this model implements.
    fn algorithm(&self) -> BackgroundAlgorithm;
}

/// Builds the model selected by `config`.
pub fn create(config: &BackgroundConfig) -> Result<Box<dyn BackgroundModel>, ConfigError> {
    config.validate()?;
    let model: Box<dyn BackgroundModel> = match config.algorithm {
        BackgroundAlgorithm::Mog2 => Box::new(Mog2Model::new(config)),
        BackgroundAlgorithm::Knn => Box::new(KnnModel::new(config)),
    };
    tracing::debug!(algorithm = %config.algorithm, history = config.history, "Background model created");
    Ok(model)
}

/// Learning rate for the `frame_number`-th frame (1-based).
///
/// Learns quickly while the history fills up, then settles at `1 / history`.
pub fn learning_rate(frame_number: u64, history: u32) -> f64 {
    let span = frame_number
        .saturating_mul(2)
        .min(history as u64)
        .max(1);
    1.0 / span as f64
}

/// History length in the form OpenCV takes it.
pub(crate) fn history_frames(history: u32) -> i32 {
    i32::try_from(history).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_learning_rate_schedule() {
        assert_eq!(learning_rate(1, 500), 0.5);
        assert_eq!(learning_rate(10, 500), 0.05);
        assert_eq!(learning_rate(10_000, 500), 1.0 / 500.0);
        assert_eq!(learning_rate(1, 1), 1.0);
    }

    #[test]
    fn test_algorithm_parse() {
        assert_eq!("MOG2".parse::<BackgroundAlgorithm>(), Ok(BackgroundAlgorithm::Mog2));
        assert_eq!("knn".parse::<BackgroundAlgorithm>(), Ok(BackgroundAlgorithm::Knn));
        assert!("gmg".parse::<BackgroundAlgorithm>().is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BackgroundConfig {
            history: 0,
            ..Default::default()
        };
        assert!(matches!(create(&config), Err(ConfigError::InvalidHistory)));

        let config = BackgroundConfig {
            var_threshold: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            create(&config),
            Err(ConfigError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_create_selects_algorithm() {
        let model = create(&BackgroundConfig::with_algorithm(BackgroundAlgorithm::Knn)).unwrap();
        assert_eq!(model.algorithm(), BackgroundAlgorithm::Knn);
        assert_eq!(model.frames_seen(), 0);
    }
}
