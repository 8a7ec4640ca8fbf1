//! Raster processing on in memory coverages.

pub mod algo;
