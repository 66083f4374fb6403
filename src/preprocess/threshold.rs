//! Binarization of the background-model output.
//!
//! Background models emit a mid-range value for shadows and the maximum
//! value for true foreground. Keeping only a narrow band at the top drops
//! shadow pixels, which would otherwise distort blob shape and area.

use super::{mat, Mask};
use opencv::core::{self, Mat, Scalar};

/// Lowest likelihood value still counted as foreground.
pub const FOREGROUND_FLOOR: u8 = 254;

/// Maps a likelihood mask to a 0/255 binary mask.
#[derive(Debug, Clone, Copy)]
pub struct BinaryThreshold {
    lower: u8,
    upper: u8,
}

impl BinaryThreshold {
    /// Creates a threshold keeping values in `lower..=upper`.
    pub fn new(lower: u8, upper: u8) -> Self {
        Self { lower, upper }
    }

    /// Returns true if `value` is in the foreground band.
    #[inline]
    pub fn is_foreground(&self, value: u8) -> bool {
        (self.lower..=self.upper).contains(&value)
    }

    /// Binarizes a mask: values in the band become 255, the rest 0.
    pub fn apply(&self, mask: &Mask) -> opencv::Result<Mask> {
        let src = mat::mask_to_mat(mask)?;
        let mut dst = Mat::default();
        core::in_range(
            &src,
            &Scalar::all(f64::from(self.lower)),
            &Scalar::all(f64::from(self.upper)),
            &mut dst,
        )?;
        mat::mask_from_mat(&dst)
    }
}

impl Default for BinaryThreshold {
    fn default() -> Self {
        Self::new(FOREGROUND_FLOOR, u8::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::mask::SHADOW;

    #[test]
    fn test_drops_shadow_keeps_foreground() {
        let mask = Mask::new(vec![0, SHADOW, 253, 254, 255], 5, 1);
        let binary = BinaryThreshold::default().apply(&mask).unwrap();
        assert_eq!(binary.data(), &[0, 0, 0, 255, 255]);
    }

    #[test]
    fn test_output_is_binary() {
        let mask = Mask::new((0..=255).collect(), 16, 16);
        let binary = BinaryThreshold::default().apply(&mask).unwrap();
        assert!(binary.data().iter().all(|&v| v == 0 || v == 255));
        assert_eq!(binary.count_nonzero(), 2);
    }

    proptest::proptest! {
        #[test]
        fn prop_only_band_survives(data in proptest::collection::vec(proptest::num::u8::ANY, 1..256)) {
            let len = data.len() as u32;
            let threshold = BinaryThreshold::default();
            let binary = threshold.apply(&Mask::new(data.clone(), len, 1)).unwrap();

            for (raw, out) in data.iter().zip(binary.data()) {
                let expected = if *raw >= FOREGROUND_FLOOR { 255 } else { 0 };
                proptest::prop_assert_eq!(*out, expected);
                proptest::prop_assert_eq!(threshold.is_foreground(*raw), *out == 255);
            }
        }
    }
}
