//! Plausible-blob selection.

use super::components::{find_components, CandidateRegion};
use crate::capture::ConfigError;
use crate::preprocess::Mask;

/// Picks the largest foreground region if it is big enough to be the animal.
///
/// Small regions are usually illumination changes. The largest region is
/// not always the animal (a large shadow patch can win); only the area
/// floor guards against that.
#[derive(Debug, Clone, Copy)]
pub struct BlobSelector {
    area_threshold: u32,
}

impl BlobSelector {
    /// Creates a selector; regions must be strictly larger than `area_threshold`.
    pub fn new(area_threshold: u32) -> Result<Self, ConfigError> {
        if area_threshold == 0 {
            return Err(ConfigError::ZeroAreaThreshold);
        }
        Ok(Self { area_threshold })
    }

    pub fn area_threshold(&self) -> u32 {
        self.area_threshold
    }

    /// Returns the largest region of `mask`, or `None` if there is none or
    /// it does not exceed the area threshold.
    pub fn select(&self, mask: &Mask) -> opencv::Result<Option<CandidateRegion>> {
        let Some(largest) = largest_region(find_components(mask)?) else {
            return Ok(None);
        };

        if largest.area <= f64::from(self.area_threshold) {
            tracing::debug!(
                area = largest.area,
                threshold = self.area_threshold,
                "Largest blob rejected"
            );
            return Ok(None);
        }

        tracing::debug!(area = largest.area, rect = ?largest.rect, "Blob accepted");
        Ok(Some(largest))
    }
}

impl Default for BlobSelector {
    fn default() -> Self {
        Self {
            area_threshold: 500,
        }
    }
}

/// Largest region by area; the earliest wins a tie.
fn largest_region(regions: Vec<CandidateRegion>) -> Option<CandidateRegion> {
    regions
        .into_iter()
        .fold(None, |best: Option<CandidateRegion>, r| match best {
            Some(b) if b.area >= r.area => Some(b),
            _ => Some(r),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::BoundingBox;

    fn mask_with_rects(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> Mask {
        let mut data = vec![0u8; (width * height) as usize];
        for &(x, y, w, h) in rects {
            for yy in y..y + h {
                for xx in x..x + w {
                    data[(yy * width + xx) as usize] = 255;
                }
            }
        }
        Mask::new(data, width, height)
    }

    #[test]
    fn test_zero_threshold_rejected() {
        assert!(matches!(
            BlobSelector::new(0),
            Err(ConfigError::ZeroAreaThreshold)
        ));
    }

    #[test]
    fn test_no_components() {
        let selector = BlobSelector::default();
        assert!(selector.select(&Mask::zeros(50, 50)).unwrap().is_none());
    }

    #[test]
    fn test_picks_largest() {
        let mask = mask_with_rects(100, 100, &[(2, 2, 30, 20), (50, 50, 40, 30)]);
        let region = BlobSelector::default().select(&mask).unwrap().unwrap();
        assert_eq!(region.area, 39.0 * 29.0);
        assert_eq!(
            region.rect,
            BoundingBox {
                x: 50,
                y: 50,
                width: 40,
                height: 30
            }
        );
    }

    #[test]
    fn test_largest_below_threshold() {
        // 20x20 pixels enclose 19 * 19 = 361, plus a smaller blob.
        let mask = mask_with_rects(100, 100, &[(10, 10, 20, 20), (60, 60, 5, 5)]);
        assert!(BlobSelector::default().select(&mask).unwrap().is_none());
    }

    #[test]
    fn test_area_equal_to_threshold_rejected() {
        // 26x21 pixels enclose exactly 25 * 20 = 500.
        let mask = mask_with_rects(60, 60, &[(5, 5, 26, 21)]);
        assert!(BlobSelector::new(500).unwrap().select(&mask).unwrap().is_none());
        assert!(BlobSelector::new(499).unwrap().select(&mask).unwrap().is_some());
    }

    #[test]
    fn test_tie_keeps_first_in_scan_order() {
        let mask = mask_with_rects(100, 100, &[(60, 5, 30, 20), (5, 40, 30, 20)]);
        let region = BlobSelector::default().select(&mask).unwrap().unwrap();
        assert_eq!(region.rect.x, 60);
        assert_eq!(region.rect.y, 5);
    }
}
