//! Median filtering.
//!
//! Suppresses impulse noise while keeping blob edges sharper than a
//! mean or Gaussian blur would. Borders replicate the edge pixel.

use super::{mat, Mask};
use crate::capture::{ConfigError, Frame};
use opencv::core::Mat;
use opencv::imgproc;

/// Square median filter with a fixed odd kernel.
#[derive(Debug, Clone, Copy)]
pub struct MedianFilter {
    kernel_size: u32,
}

impl MedianFilter {
    /// Creates a filter; the kernel size must be a positive odd integer.
    pub fn new(kernel_size: u32) -> Result<Self, ConfigError> {
        validate_kernel_size(kernel_size)?;
        Ok(Self { kernel_size })
    }

    /// Returns the kernel size.
    pub fn kernel_size(&self) -> u32 {
        self.kernel_size
    }

    /// Filters every channel of a frame independently.
    ///
    /// Frames with 1, 3 or 4 channels are supported.
    pub fn denoise(&self, frame: &Frame) -> opencv::Result<Frame> {
        let filtered = self.blur(&mat::frame_to_mat(frame)?)?;
        mat::frame_from_mat(&filtered, frame.sequence())
    }

    /// Filters a single-channel mask.
    pub fn denoise_mask(&self, mask: &Mask) -> opencv::Result<Mask> {
        let filtered = self.blur(&mat::mask_to_mat(mask)?)?;
        mat::mask_from_mat(&filtered)
    }

    fn blur(&self, src: &Mat) -> opencv::Result<Mat> {
        let ksize = i32::try_from(self.kernel_size).map_err(|_| {
            opencv::Error::new(
                opencv::core::StsOutOfRange,
                format!("kernel size {} too large", self.kernel_size),
            )
        })?;
        let mut dst = Mat::default();
        imgproc::median_blur(src, &mut dst, ksize)?;
        Ok(dst)
    }
}

impl Default for MedianFilter {
    fn default() -> Self {
        Self { kernel_size: 5 }
    }
}

/// Checks that a kernel size is positive and odd.
pub fn validate_kernel_size(kernel_size: u32) -> Result<(), ConfigError> {
    if kernel_size == 0 {
        return Err(ConfigError::ZeroKernelSize);
    }
    if kernel_size % 2 == 0 {
        return Err(ConfigError::EvenKernelSize(kernel_size));
    }
    Ok(())
}
