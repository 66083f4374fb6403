//! Position state carried between frames.

use crate::blob::CandidateRegion;
use crate::preprocess::Mask;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Horizontal radius, truncated.
    #[inline]
    pub fn half_width(&self) -> u32 {
        self.width / 2
    }

    /// Vertical radius, truncated.
    #[inline]
    pub fn half_height(&self) -> u32 {
        self.height / 2
    }

    /// Center point, offset from the origin by the truncated radii.
    #[inline]
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.half_width(), self.y + self.half_height())
    }

    /// Returns true for the initial all-zero box.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Position of the tracked animal for one frame.
#[derive(Clone)]
pub struct PositionReport {
    pub center_x: u32,
    pub center_y: u32,
    pub half_width: u32,
    pub half_height: u32,
    /// Thresholded foreground mask the position was derived from.
    pub binary_mask: Mask,
    /// The box behind this report.
    pub bounding_box: BoundingBox,
    /// Whether this frame produced the box, as opposed to carrying it over.
    pub detected: bool,
}

impl std::fmt::Debug for PositionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionReport")
            .field("center", &(self.center_x, self.center_y))
            .field("radii", &(self.half_width, self.half_height))
            .field("detected", &self.detected)
            .finish_non_exhaustive()
    }
}

/// Last accepted bounding box.
///
/// Starts at all zeros and is only ever overwritten by an accepted
/// candidate; frames without one leave it untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionState {
    bounding_box: BoundingBox,
}

impl PositionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies this frame's selection; returns true if the box changed hands.
    pub fn update(&mut self, candidate: Option<&CandidateRegion>) -> bool {
        match candidate {
            Some(region) => {
                self.bounding_box = region.rect;
                true
            }
            None => false,
        }
    }

    /// Builds the report for the current box.
    pub fn report(&self, binary_mask: Mask, detected: bool) -> PositionReport {
        let (center_x, center_y) = self.bounding_box.center();
        PositionReport {
            center_x,
            center_y,
            half_width: self.bounding_box.half_width(),
            half_height: self.bounding_box.half_height(),
            binary_mask,
            bounding_box: self.bounding_box,
            detected,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn region(x: u32, y: u32, width: u32, height: u32) -> CandidateRegion {
        CandidateRegion {
            area: f64::from(width.saturating_sub(1)) * f64::from(height.saturating_sub(1)),
            rect: BoundingBox {
                x,
                y,
                width,
                height,
            },
        }
    }

    #[test]
    fn test_initial_box_is_zero() {
        let state = PositionState::new();
        let report = state.report(Mask::zeros(4, 4), false);
        assert_eq!(state.bounding_box(), BoundingBox::default());
        assert_eq!((report.center_x, report.center_y), (0, 0));
        assert_eq!((report.half_width, report.half_height), (0, 0));
    }

    #[test]
    fn test_odd_size_truncates() {
        let mut state = PositionState::new();
        state.update(Some(&region(10, 20, 7, 5)));
        let report = state.report(Mask::zeros(1, 1), true);
        assert_eq!(report.half_width, 3);
        assert_eq!(report.half_height, 2);
        assert_eq!(report.center_x, 13);
        assert_eq!(report.center_y, 22);
    }

    #[test]
    fn test_none_keeps_previous() {
        let mut state = PositionState::new();
        assert!(state.update(Some(&region(5, 6, 30, 20))));
        assert!(!state.update(None));
        assert_eq!(
            state.bounding_box(),
            BoundingBox {
                x: 5,
                y: 6,
                width: 30,
                height: 20
            }
        );
    }

    proptest! {
        #[test]
        fn prop_box_tracks_last_accepted(
            steps in proptest::collection::vec(
                proptest::option::of((0u32..2000, 0u32..2000, 1u32..500, 1u32..500)),
                0..40,
            )
        ) {
            let mut state = PositionState::new();
            let mut expected = BoundingBox::default();

            for step in steps {
                let candidate = step.map(|(x, y, w, h)| region(x, y, w, h));
                let before = state.bounding_box();
                state.update(candidate.as_ref());

                match candidate {
                    Some(r) => expected = r.rect,
                    None => prop_assert_eq!(state.bounding_box(), before),
                }
                prop_assert_eq!(state.bounding_box(), expected);
            }
        }

        #[test]
        fn prop_radii_are_floored(x in 0u32..5000, y in 0u32..5000, w in 0u32..5000, h in 0u32..5000) {
            let mut state = PositionState::new();
            state.update(Some(&region(x, y, w, h)));
            let report = state.report(Mask::zeros(1, 1), true);

            prop_assert_eq!(report.half_width, w / 2);
            prop_assert_eq!(report.half_height, h / 2);
            prop_assert_eq!(report.center_x, x + w / 2);
            prop_assert_eq!(report.center_y, y + h / 2);
        }
    }
}
