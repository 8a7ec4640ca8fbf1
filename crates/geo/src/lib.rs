#![warn(clippy::unwrap_used)]

//! Georeferenced raster coverages: grid geometry, reference system handling,
//! raster algorithms (crop, scale, reproject) and the BIL and GeoTIFF encodings.

#[macro_use]
mod anycoverage_macros;

pub type Result<T = ()> = std::result::Result<T, Error>;

mod anycoverage;
mod cell;
mod coverage;
pub mod crs;
mod envelope;
mod error;
pub mod formats;
mod geotransform;
mod gridgeometry;
mod interpolation;
mod nodata;
mod point;
pub mod raster;
mod rastersize;
mod sample;
mod sampletype;
pub mod srs;

#[cfg(test)]
mod testutils;

#[doc(inline)]
pub use anycoverage::AnyCoverage;
#[doc(inline)]
pub use cell::{Cell, CellIterator};
#[doc(inline)]
pub use coverage::Coverage;
#[doc(inline)]
pub use crs::Epsg;
#[doc(inline)]
pub use envelope::{DEFAULT_EDGE_POINTS, Envelope};
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use geotransform::GeoTransform;
#[doc(inline)]
pub use gridgeometry::{GridGeometry, PixelAnchor};
#[doc(inline)]
pub use interpolation::Interpolation;
#[doc(inline)]
pub use nodata::Nodata;
pub use point::{Point, euclidean_distance, linear_interpolate};
#[doc(inline)]
pub use rastersize::RasterSize;
#[doc(inline)]
pub use sample::{ByteOrder, Sample};
#[doc(inline)]
pub use sampletype::SampleType;
