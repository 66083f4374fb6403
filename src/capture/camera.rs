//! Frame source abstraction.
//!
//! This module provides a trait-based abstraction over frame sources,
//! allowing real cameras, recorded streams and a synthetic arena to be
//! swapped behind the same interface.

use super::{CaptureConfig, Frame};
use std::f64::consts::PI;
use thiserror::Error;

/// Errors that can occur during capture.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    #[error("failed to open camera: {0}")]
    OpenFailed(String),
    #[error("failed to configure camera: {0}")]
    ConfigFailed(String),
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    #[error("no frame available")]
    FrameUnavailable,
    #[error("end of stream")]
    EndOfStream,
    #[error("camera not initialized")]
    NotInitialized,
}

impl CameraError {
    /// Returns true if the caller should skip this tick and try again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::FrameUnavailable | Self::CaptureFailed(_))
    }
}

/// Trait for frame sources.
///
/// Frames must be delivered in capture order.
pub trait Camera {
    /// Opens and initializes the source with the given configuration.
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError>;

    /// Captures a single frame.
    fn capture(&mut self) -> Result<Frame, CameraError>;

    /// Checks if the source is currently open.
    fn is_open(&self) -> bool;

    /// Closes the source and releases resources.
    fn close(&mut self);
}

/// Layout of the synthetic arena rendered by [`MockCamera`].
#[derive(Debug, Clone)]
pub struct ArenaScene {
    /// Number of empty frames before the rodent enters.
    pub entry_frame: u64,
    /// Frames for one full loop of the walking path.
    pub period_frames: u64,
    /// Mean floor intensity.
    pub floor_value: u8,
    /// Rodent body intensity.
    pub rodent_value: u8,
}

impl Default for ArenaScene {
    fn default() -> Self {
        Self {
            entry_frame: 100,
            period_frames: 240,
            floor_value: 180,
            rodent_value: 40,
        }
    }
}

impl ArenaScene {
    /// Semi-axes of the rodent ellipse for a frame of the given size.
    pub fn rodent_radii(&self, width: u32, height: u32) -> (f64, f64) {
        let rx = (width as f64 / 10.0).max(4.0);
        let ry = (height as f64 / 16.0).max(3.0);
        (rx, ry)
    }

    /// Center of the rodent at `sequence`, or `None` before it enters.
    ///
    /// The path is a figure-eight that stays clear of the arena walls.
    pub fn rodent_center(&self, sequence: u64, width: u32, height: u32) -> Option<(f64, f64)> {
        if sequence <= self.entry_frame {
            return None;
        }
        let t = (sequence - self.entry_frame) as f64 / self.period_frames.max(1) as f64;
        let (rx, ry) = self.rodent_radii(width, height);
        let span_x = (width as f64 / 2.0 - rx - 2.0).max(0.0);
        let span_y = (height as f64 / 2.0 - ry - 2.0).max(0.0);
        let cx = width as f64 / 2.0 + span_x * (2.0 * PI * t).sin();
        let cy = height as f64 / 2.0 + span_y * (4.0 * PI * t).sin();
        Some((cx, cy))
    }

    fn floor_at(&self, x: u32, y: u32) -> u8 {
        // Fixed texture so the median filter has something to chew on.
        let texture = ((x * 7 + y * 13) % 17) as i32 - 8;
        (self.floor_value as i32 + texture).clamp(0, 255) as u8
    }

    /// Renders one frame of the scene.
    pub fn render(&self, config: &CaptureConfig, sequence: u64) -> Frame {
        let (w, h) = (config.width, config.height);
        let channels = config.channels as usize;
        let center = self.rodent_center(sequence, w, h);
        let (rx, ry) = self.rodent_radii(w, h);

        let mut pixels = Vec::with_capacity(config.frame_bytes());
        for y in 0..h {
            for x in 0..w {
                let inside = center.is_some_and(|(cx, cy)| {
                    let dx = (x as f64 - cx) / rx;
                    let dy = (y as f64 - cy) / ry;
                    dx * dx + dy * dy <= 1.0
                });
                let value = if inside {
                    self.rodent_value
                } else {
                    self.floor_at(x, y)
                };
                for c in 0..channels {
                    pixels.push(value.saturating_add((c * 6) as u8));
                }
            }
        }

        Frame::with_channels(pixels, w, h, config.channels, sequence)
    }
}

/// Mock camera that renders a synthetic arena with one walking rodent.
#[derive(Debug, Default)]
pub struct MockCamera {
    config: Option<CaptureConfig>,
    scene: ArenaScene,
    sequence: u64,
}

impl MockCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock camera rendering a custom scene.
    pub fn with_scene(scene: ArenaScene) -> Self {
        Self {
            scene,
            ..Self::default()
        }
    }

    /// Returns the scene being rendered.
    pub fn scene(&self) -> &ArenaScene {
        &self.scene
    }
}

impl Camera for MockCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;
        self.config = Some(config.clone());
        self.sequence = 0;
        tracing::info!("MockCamera opened with config: {:?}", config);
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let config = self.config.as_ref().ok_or(CameraError::NotInitialized)?;
        self.sequence += 1;
        Ok(self.scene.render(config, self.sequence))
    }

    fn is_open(&self) -> bool {
        self.config.is_some()
    }

    fn close(&mut self) {
        self.config = None;
        tracing::info!("MockCamera closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_camera_lifecycle() {
        let mut camera = MockCamera::new();
        let config = CaptureConfig::default();

        assert!(!camera.is_open());

        camera.open(&config).unwrap();
        assert!(camera.is_open());

        let frame = camera.capture().unwrap();
        assert!(frame.is_valid());
        assert_eq!(frame.sequence(), 1);

        let frame2 = camera.capture().unwrap();
        assert_eq!(frame2.sequence(), 2);

        camera.close();
        assert!(!camera.is_open());
    }

    #[test]
    fn test_capture_without_open() {
        let mut camera = MockCamera::new();
        assert!(matches!(
            camera.capture(),
            Err(CameraError::NotInitialized)
        ));
    }

    #[test]
    fn test_rodent_absent_before_entry() {
        let scene = ArenaScene::default();
        assert!(scene.rodent_center(scene.entry_frame, 300, 300).is_none());
        assert!(scene.rodent_center(scene.entry_frame + 1, 300, 300).is_some());
    }

    #[test]
    fn test_rodent_drawn_dark() {
        let scene = ArenaScene::default();
        let config = CaptureConfig::default();
        let seq = scene.entry_frame + 1;
        let (cx, cy) = scene.rodent_center(seq, config.width, config.height).unwrap();
        let frame = scene.render(&config, seq);

        let idx = cy as usize * config.width as usize + cx as usize;
        assert_eq!(frame.pixels()[idx], scene.rodent_value);
    }

    #[test]
    fn test_color_render_size() {
        let config = CaptureConfig {
            channels: 3,
            ..CaptureConfig::with_dimensions(40, 30)
        };
        let frame = ArenaScene::default().render(&config, 1);
        assert!(frame.is_valid());
        assert_eq!(frame.pixels().len(), 40 * 30 * 3);
    }

    #[test]
    fn test_transient_errors() {
        assert!(CameraError::FrameUnavailable.is_transient());
        assert!(!CameraError::EndOfStream.is_transient());
    }
}
