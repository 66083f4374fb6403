//! Single-channel mask type.

/// Mask value for background pixels.
pub const BACKGROUND: u8 = 0;
/// Mask value the background models emit for shadow pixels.
pub const SHADOW: u8 = 127;
/// Mask value for foreground pixels.
pub const FOREGROUND: u8 = 255;

/// A single-channel 8-bit image.
///
/// Used both for the likelihood output of a background model
/// (background / shadow / foreground) and for the binary mask.
#[derive(Clone, PartialEq, Eq)]
pub struct Mask {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Mask {
    /// Wraps existing row-major data.
    ///
    /// `data.len()` must equal `width * height`.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize);
        Self {
            data,
            width,
            height,
        }
    }

    /// Creates an all-background mask.
    pub fn zeros(width: u32, height: u32) -> Self {
        Self::new(vec![BACKGROUND; width as usize * height as usize], width, height)
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Value at `(x, y)`.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Number of non-background pixels.
    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&v| v != BACKGROUND).count()
    }

    /// Consumes the mask, returning its pixel buffer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl std::fmt::Debug for Mask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mask")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("nonzero", &self.count_nonzero())
            .finish()
    }
}
