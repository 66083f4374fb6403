//! Conversions between the crate's pixel buffers and OpenCV matrices.
//!
//! Frames and masks own tightly packed row-major `u8` buffers. OpenCV
//! works on `Mat`, so every stage copies in, runs the kernel and copies
//! the result back out.

use super::Mask;
use crate::capture::Frame;
use opencv::core::{self, Mat, Scalar};
use opencv::prelude::*;

/// `Mat` element type for `channels` interleaved 8-bit channels.
fn u8_type(channels: u8) -> opencv::Result<i32> {
    match channels {
        1 => Ok(core::CV_8UC1),
        2 => Ok(core::CV_8UC2),
        3 => Ok(core::CV_8UC3),
        4 => Ok(core::CV_8UC4),
        n => Err(opencv::Error::new(
            core::StsUnsupportedFormat,
            format!("unsupported channel count {n}"),
        )),
    }
}

fn to_mat(pixels: &[u8], width: u32, height: u32, channels: u8) -> opencv::Result<Mat> {
    let expected = width as usize * height as usize * channels as usize;
    if pixels.len() != expected {
        return Err(opencv::Error::new(
            core::StsUnmatchedSizes,
            format!(
                "buffer of {} bytes does not hold {width}x{height}x{channels}",
                pixels.len()
            ),
        ));
    }
    if expected == 0 {
        return Ok(Mat::default());
    }

    let rows = i32::try_from(height).map_err(|_| too_large(height))?;
    let cols = i32::try_from(width).map_err(|_| too_large(width))?;
    let mut mat = Mat::new_rows_cols_with_default(rows, cols, u8_type(channels)?, Scalar::all(0.0))?;
    mat.data_bytes_mut()?.copy_from_slice(pixels);
    Ok(mat)
}

fn too_large(dim: u32) -> opencv::Error {
    opencv::Error::new(core::StsOutOfRange, format!("dimension {dim} too large"))
}

/// Returns `(width, height, channels, bytes)` of an 8-bit matrix.
fn from_mat(mat: &Mat) -> opencv::Result<(u32, u32, u8, Vec<u8>)> {
    if mat.empty() {
        return Ok((0, 0, 1, Vec::new()));
    }
    if mat.depth() != core::CV_8U {
        return Err(opencv::Error::new(
            core::StsUnsupportedFormat,
            format!("expected an 8-bit matrix, got depth {}", mat.depth()),
        ));
    }

    let owned;
    let mat = if mat.is_continuous() {
        mat
    } else {
        owned = mat.try_clone()?;
        &owned
    };

    Ok((
        mat.cols() as u32,
        mat.rows() as u32,
        mat.channels() as u8,
        mat.data_bytes()?.to_vec(),
    ))
}

pub(crate) fn frame_to_mat(frame: &Frame) -> opencv::Result<Mat> {
    to_mat(frame.pixels(), frame.width(), frame.height(), frame.channels())
}

pub(crate) fn frame_from_mat(mat: &Mat, sequence: u64) -> opencv::Result<Frame> {
    let (width, height, channels, pixels) = from_mat(mat)?;
    Ok(Frame::with_channels(pixels, width, height, channels, sequence))
}

pub(crate) fn mask_to_mat(mask: &Mask) -> opencv::Result<Mat> {
    to_mat(mask.data(), mask.width(), mask.height(), 1)
}

pub(crate) fn mask_from_mat(mat: &Mat) -> opencv::Result<Mask> {
    let (width, height, channels, data) = from_mat(mat)?;
    if channels != 1 {
        return Err(opencv::Error::new(
            core::StsUnsupportedFormat,
            format!("expected a single-channel mask, got {channels} channels"),
        ));
    }
    Ok(Mask::new(data, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_layout_preserved() {
        let pixels: Vec<u8> = (0..4 * 3 * 3).map(|v| v as u8).collect();
        let frame = Frame::with_channels(pixels.clone(), 4, 3, 3, 9);

        let mat = frame_to_mat(&frame).unwrap();
        assert_eq!((mat.cols(), mat.rows(), mat.channels()), (4, 3, 3));

        let back = frame_from_mat(&mat, 9).unwrap();
        assert_eq!(back.pixels(), &pixels[..]);
        assert_eq!(back.geometry(), frame.geometry());
    }

    #[test]
    fn test_short_buffer_rejected() {
        let frame = Frame::new(vec![0u8; 10], 8, 8, 1);
        let err = frame_to_mat(&frame).unwrap_err();
        assert_eq!(err.code, core::StsUnmatchedSizes);
    }

    #[test]
    fn test_mask_requires_single_channel() {
        let mat = frame_to_mat(&Frame::with_channels(vec![0u8; 12], 2, 2, 3, 1)).unwrap();
        assert!(mask_from_mat(&mat).is_err());
    }
}
