//! Algorithms for coverage processing (crop, scale, reproject).

mod crop;
mod reproject;
mod scale;

pub use crop::crop;
pub use reproject::{ReprojectOptions, reproject};
pub use scale::scale;

use crate::{AnyCoverage, Envelope, GridGeometry, Interpolation, RasterSize, Result};

/// `crop` for type erased coverages
pub fn crop_any(coverage: AnyCoverage, envelope: &Envelope) -> Result<AnyCoverage> {
    Ok(apply_to_anycoverage!(coverage, cov, crop(cov, envelope)?))
}

/// `scale` for type erased coverages
pub fn scale_any(coverage: AnyCoverage, size: RasterSize, interpolation: Interpolation) -> Result<AnyCoverage> {
    Ok(apply_to_anycoverage!(coverage, cov, scale(cov, size, interpolation)?))
}

/// `reproject` for type erased coverages
pub fn reproject_any(coverage: AnyCoverage, target: &GridGeometry, interpolation: Interpolation, opts: &ReprojectOptions) -> Result<AnyCoverage> {
    Ok(apply_to_anycoverage!(coverage, cov, reproject(cov, target, interpolation, opts)?))
}
