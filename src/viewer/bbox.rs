//! Bounding box arithmetic for layer extents.

use serde::{Deserialize, Serialize};

/// Axis extents whose square is at or below this are treated as degenerate
/// when fitting a zoom level.
pub const DEGENERATE_EXTENT_THRESHOLD: f64 = 0.00001;

/// Zoom level used for an axis with a degenerate extent.
const DEGENERATE_AXIS_ZOOM: f64 = 15.0;

/// A rectangular extent. Axis units follow whatever produced the box;
/// layer records carry lon/lat degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl BoundingBox {
    /// The whole world in lon/lat degrees.
    pub const WORLD: BoundingBox = BoundingBox {
        minx: -180.0,
        miny: -90.0,
        maxx: 180.0,
        maxy: 90.0,
    };

    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Self {
        Self {
            minx,
            miny,
            maxx,
            maxy,
        }
    }

    /// Grow this box until it also covers `other`.
    pub fn expand(&mut self, other: &BoundingBox) {
        self.minx = self.minx.min(other.minx);
        self.miny = self.miny.min(other.miny);
        self.maxx = self.maxx.max(other.maxx);
        self.maxy = self.maxy.max(other.maxy);
    }

    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }

    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }

    /// Midpoint of the box, in the box's own units.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.minx + self.maxx) / 2.0,
            (self.miny + self.maxy) / 2.0,
        )
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.minx, self.miny, self.maxx, self.maxy]
    }
}

/// Zoom level at which the whole box fits the viewer.
///
/// Each axis contributes `log2(360 / extent)`; the result is the ceiling of
/// the smaller of the two. An axis with a degenerate extent contributes a
/// fixed level of 15 instead.
pub fn fit_zoom(bbox: &BoundingBox) -> i64 {
    let width_zoom = axis_zoom(bbox.width());
    let height_zoom = axis_zoom(bbox.height());
    width_zoom.min(height_zoom).ceil() as i64
}

fn axis_zoom(extent: f64) -> f64 {
    if extent * extent > DEGENERATE_EXTENT_THRESHOLD {
        (360.0 / extent.abs()).log2()
    } else {
        DEGENERATE_AXIS_ZOOM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_takes_componentwise_min_max() {
        let mut bbox = BoundingBox::new(-10.0, -5.0, 0.0, 0.0);
        bbox.expand(&BoundingBox::new(0.0, 0.0, 10.0, 5.0));
        assert_eq!(bbox, BoundingBox::new(-10.0, -5.0, 10.0, 5.0));
    }

    #[test]
    fn test_expand_is_order_independent() {
        let a = BoundingBox::new(-20.0, 10.0, -5.0, 30.0);
        let b = BoundingBox::new(-8.0, -40.0, 60.0, 12.0);

        let mut ab = a;
        ab.expand(&b);
        let mut ba = b;
        ba.expand(&a);

        assert_eq!(ab, ba);
        assert_eq!(ab, BoundingBox::new(-20.0, -40.0, 60.0, 30.0));
    }

    #[test]
    fn test_center_is_midpoint() {
        let bbox = BoundingBox::new(-10.0, -5.0, 10.0, 5.0);
        assert_eq!(bbox.center(), (0.0, 0.0));
    }

    #[test]
    fn test_fit_zoom_uses_wider_axis() {
        // Width 20 deg gives log2(18) ~ 4.17, height 10 deg gives
        // log2(36) ~ 5.17; the smaller wins and rounds up to 5.
        let bbox = BoundingBox::new(-10.0, -5.0, 10.0, 5.0);
        assert_eq!(fit_zoom(&bbox), 5);
    }

    #[test]
    fn test_fit_zoom_world_is_zero() {
        // Width covers the full 360 degrees, so the width axis contributes
        // log2(1) = 0 and wins over the height axis.
        assert_eq!(fit_zoom(&BoundingBox::WORLD), 0);
    }

    #[test]
    fn test_fit_zoom_degenerate_extent() {
        let bbox = BoundingBox::new(10.0, 20.0, 10.000001, 20.000001);
        assert_eq!(fit_zoom(&bbox), 15);
    }

    #[test]
    fn test_fit_zoom_point_extent() {
        let bbox = BoundingBox::new(71.3, -33.5, 71.3, -33.5);
        assert_eq!(fit_zoom(&bbox), 15);
    }

    #[test]
    fn test_as_array_ordering() {
        let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(bbox.as_array(), [1.0, 2.0, 3.0, 4.0]);
    }
}
