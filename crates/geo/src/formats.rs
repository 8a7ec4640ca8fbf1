//! Raster encodings: raw band interleaved by line (BIL) and GeoTIFF.

pub mod bil;
pub mod geotiff;

use crate::Sample;

/// Textual nodata representation as used in file headers and GDAL metadata
fn nodata_string<T: Sample>(nodata: T) -> String {
    if nodata.is_nan() { "nan".to_string() } else { nodata.to_string() }
}
