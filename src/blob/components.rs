//! Connected component extraction from contours.

use crate::extraction::BoundingBox;
use crate::preprocess::{mat, Mask};
use opencv::core::{Point, Vec4i, Vector};
use opencv::imgproc;

/// A connected foreground region of one binary mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateRegion {
    /// Area enclosed by the region's outer contour.
    pub area: f64,
    /// Axis-aligned bounding rectangle.
    pub rect: BoundingBox,
}

/// Finds all 8-connected foreground components.
///
/// Each component is described by its outer contour: the area is the
/// polygon area through the boundary pixel centres, so a filled `w x h`
/// rectangle measures `(w - 1) * (h - 1)`. Holes are boundaries of their
/// component and never become components of their own. Components are
/// returned in raster-scan order of their first pixel.
pub fn find_components(mask: &Mask) -> opencv::Result<Vec<CandidateRegion>> {
    if mask.width() == 0 || mask.height() == 0 {
        return Ok(Vec::new());
    }

    let image = mat::mask_to_mat(mask)?;
    let mut contours: Vector<Vector<Point>> = Vector::new();
    let mut hierarchy: Vector<Vec4i> = Vector::new();
    imgproc::find_contours_with_hierarchy(
        &image,
        &mut contours,
        &mut hierarchy,
        imgproc::RETR_CCOMP,
        imgproc::CHAIN_APPROX_SIMPLE,
        Point::new(0, 0),
    )?;

    let mut regions = Vec::with_capacity(contours.len());
    for (contour, links) in contours.iter().zip(hierarchy.iter()) {
        // Index 3 is the parent; only holes have one.
        if links.0[3] >= 0 {
            continue;
        }
        let Some(origin) = contour.iter().min_by_key(|p| (p.y, p.x)) else {
            continue;
        };

        let area = imgproc::contour_area(&contour, false)?;
        let rect = imgproc::bounding_rect(&contour)?;
        regions.push((
            (origin.y, origin.x),
            CandidateRegion {
                area,
                rect: BoundingBox {
                    x: rect.x.max(0) as u32,
                    y: rect.y.max(0) as u32,
                    width: rect.width.max(0) as u32,
                    height: rect.height.max(0) as u32,
                },
            },
        ));
    }

    regions.sort_by_key(|(origin, _)| *origin);
    Ok(regions.into_iter().map(|(_, region)| region).collect())
}
