//! Spherical Mercator math for viewer coordinates.
//!
//! Stored layer extents are lon/lat degrees; the viewer works in the
//! projection the map declares. These helpers cover the one projection the
//! portal actually serves, spherical Mercator (EPSG:900913).

use std::f64::consts::PI;

use crate::viewer::bbox::BoundingBox;

/// Easting of the 180th meridian on the spherical Mercator plane, in meters.
const MERCATOR_BOUND: f64 = 20037508.34;

/// Project a lon/lat point onto the spherical Mercator plane.
///
/// Latitudes at or below the south pole have no finite projection and map
/// to negative infinity.
pub fn forward_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let x = lon * MERCATOR_BOUND / 180.0;
    let n = ((90.0 + lat) * PI / 360.0).tan();
    let y = if n <= 0.0 {
        f64::NEG_INFINITY
    } else {
        n.ln() / PI * MERCATOR_BOUND
    };
    (x, y)
}

/// Project a lon/lat bounding box corner-by-corner.
pub fn llbbox_to_mercator(bbox: &BoundingBox) -> [f64; 4] {
    let (minx, miny) = forward_mercator(bbox.minx, bbox.miny);
    let (maxx, maxy) = forward_mercator(bbox.maxx, bbox.maxy);
    [minx, miny, maxx, maxy]
}

/// Center of `bbox` in the units of `crs`.
///
/// For EPSG:4326 the midpoint is returned as-is; anything else is projected
/// to Mercator, with a non-finite northing clamped to zero.
pub fn map_center(bbox: &BoundingBox, crs: &str) -> (f64, f64) {
    let (lon, lat) = bbox.center();
    if crs == "EPSG:4326" {
        (lon, lat)
    } else {
        let (x, y) = forward_mercator(lon, lat);
        (x, if y == f64::NEG_INFINITY { 0.0 } else { y })
    }
}
