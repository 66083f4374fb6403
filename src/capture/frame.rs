//! Frame type representing a captured image with metadata.

use std::time::Instant;

/// Width, height and channel count of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl Geometry {
    /// Single-channel geometry.
    pub fn gray(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            channels: 1,
        }
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.channels)
    }
}

/// A single captured frame from a video source.
///
/// Pixels are stored row-major with channels interleaved
/// (1 channel for grayscale, 3 for color).
#[derive(Clone)]
pub struct Frame {
    /// Raw pixel data.
    pixels: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// Samples per pixel.
    channels: u8,
    /// Capture timestamp.
    timestamp: Instant,
    /// Monotonic sequence number.
    sequence: u64,
}

impl Frame {
    /// Creates a new grayscale frame.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self::with_channels(pixels, width, height, 1, sequence)
    }

    /// Creates a new frame with the given number of interleaved channels.
    pub fn with_channels(
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        channels: u8,
        sequence: u64,
    ) -> Self {
        Self {
            pixels,
            width,
            height,
            channels,
            timestamp: Instant::now(),
            sequence,
        }
    }

    /// Returns a reference to the raw pixel data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the number of interleaved channels.
    #[inline]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Returns the frame geometry.
    #[inline]
    pub fn geometry(&self) -> Geometry {
        Geometry {
            width: self.width,
            height: self.height,
            channels: self.channels,
        }
    }

    /// Returns the capture timestamp.
    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Validates that the frame is non-empty and the buffer matches its geometry.
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.channels > 0
            && self.pixels.len() == self.pixel_count() * self.channels as usize
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let pixels = vec![0u8; 640 * 480];
        let frame = Frame::new(pixels, 640, 480, 1);

        assert_eq!(frame.width(), 640);
        assert_eq!(frame.height(), 480);
        assert_eq!(frame.channels(), 1);
        assert_eq!(frame.sequence(), 1);
        assert!(frame.is_valid());
    }

    #[test]
    fn test_color_frame_valid() {
        let frame = Frame::with_channels(vec![0u8; 4 * 3 * 3], 4, 3, 3, 7);
        assert!(frame.is_valid());
        assert_eq!(frame.pixel_count(), 12);
    }

    #[test]
    fn test_frame_invalid_size() {
        let pixels = vec![0u8; 100]; // Wrong size
        let frame = Frame::new(pixels, 640, 480, 1);

        assert!(!frame.is_valid());
    }

    #[test]
    fn test_empty_frame_invalid() {
        let frame = Frame::new(Vec::new(), 0, 0, 1);
        assert!(!frame.is_valid());
    }
}
