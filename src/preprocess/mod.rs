//! Noise reduction and binarization.
//!
//! The extractor runs the median filter twice: once on the raw frame
//! before background modeling, and once on the likelihood mask before
//! it is binarized. All kernels run on OpenCV; [`Frame`] and [`Mask`]
//! buffers are copied into a `Mat` and back at each stage.
//!
//! [`Frame`]: crate::capture::Frame

pub mod mask;
pub(crate) mod mat;
mod median;
mod threshold;

pub use mask::Mask;
pub use median::{validate_kernel_size, MedianFilter};
pub use threshold::{BinaryThreshold, FOREGROUND_FLOOR};
