//! Spatial reference system handling and coordinate transformations.

use crate::{Point, Result};

mod proj4rs;

pub use proj4rs::{CoordinateTransformer, SpatialReference};

/// Resolves a CRS identifier (`EPSG:<code>`, `CRS:84`, `WGS84` or a proj string).
pub fn resolve(crs: &str) -> Result<SpatialReference> {
    SpatialReference::from_definition(crs)
}

/// Single shot version of `CoordinateTransformer::transform_point`
pub fn transform_point(point: Point, source_crs: &str, target_crs: &str) -> Result<Point> {
    CoordinateTransformer::new(source_crs, target_crs)?.transform_point(point)
}

/// Checks if two CRS identifiers refer to the same reference system
pub fn same_crs(crs1: &str, crs2: &str) -> bool {
    if crs1.trim().eq_ignore_ascii_case(crs2.trim()) {
        return true;
    }

    match (resolve(crs1), resolve(crs2)) {
        (Ok(srs1), Ok(srs2)) => srs1.is_equivalent(&srs2),
        _ => false,
    }
}
