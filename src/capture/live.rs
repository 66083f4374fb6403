//! Live camera input via `nokhwa`.

use super::{Camera, CameraError, CaptureConfig, Frame};
use nokhwa::pixel_format::{LumaFormat, RgbFormat};
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};

/// Frame source backed by a physical camera.
pub struct NokhwaCamera {
    device: Option<nokhwa::Camera>,
    config: Option<CaptureConfig>,
    sequence: u64,
}

impl NokhwaCamera {
    pub fn new() -> Self {
        Self {
            device: None,
            config: None,
            sequence: 0,
        }
    }
}

impl Default for NokhwaCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera for NokhwaCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;

        let wanted = CameraFormat::new(
            Resolution::new(config.width, config.height),
            FrameFormat::MJPEG,
            config.fps,
        );
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(wanted));

        let mut device = nokhwa::Camera::new(CameraIndex::Index(config.device_id), requested)
            .map_err(|e| CameraError::DeviceNotFound(e.to_string()))?;
        device
            .open_stream()
            .map_err(|e| CameraError::OpenFailed(e.to_string()))?;

        let actual = device.resolution();
        if actual.width() != config.width || actual.height() != config.height {
            let _ = device.stop_stream();
            return Err(CameraError::ConfigFailed(format!(
                "camera negotiated {}x{}, requested {}x{}",
                actual.width(),
                actual.height(),
                config.width,
                config.height
            )));
        }

        self.device = Some(device);
        self.config = Some(config.clone());
        self.sequence = 0;
        tracing::info!(device = config.device_id, "Camera opened with config: {:?}", config);
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let config = self.config.as_ref().ok_or(CameraError::NotInitialized)?;
        let device = self.device.as_mut().ok_or(CameraError::NotInitialized)?;

        let buffer = device
            .frame()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;

        let pixels = if config.channels == 1 {
            buffer
                .decode_image::<LumaFormat>()
                .map_err(|e| CameraError::CaptureFailed(e.to_string()))?
                .into_raw()
        } else {
            buffer
                .decode_image::<RgbFormat>()
                .map_err(|e| CameraError::CaptureFailed(e.to_string()))?
                .into_raw()
        };

        self.sequence += 1;
        Ok(Frame::with_channels(
            pixels,
            config.width,
            config.height,
            config.channels,
            self.sequence,
        ))
    }

    fn is_open(&self) -> bool {
        self.device.is_some()
    }

    fn close(&mut self) {
        if let Some(mut device) = self.device.take() {
            if let Err(e) = device.stop_stream() {
                tracing::warn!("Failed to stop camera stream: {}", e);
            }
        }
        self.config = None;
        tracing::info!("Camera closed");
    }
}
