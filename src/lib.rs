//! Map responses for single layer raster requests: the requested window of a coverage is resampled
//! onto the request grid and returned as raw band interleaved by line data or as GeoTIFF.

pub use geo;
pub use mapresponse;
