use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),
    #[error("Projection error: {0}")]
    Projection(String),
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("Requested area does not intersect the coverage: {0}")]
    EmptyIntersection(String),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Raster dimensions do not match ({}x{}) <-> ({}x{})", .size1.0, .size1.1, .size2.0, .size2.1)]
    SizeMismatch { size1: (usize, usize), size2: (usize, usize) },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Proj4rs error: {0}")]
    Proj4rs(#[from] proj4rs::errors::Error),
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::InvalidArgument(err.to_string())
    }
}

impl From<std::num::ParseFloatError> for Error {
    fn from(err: std::num::ParseFloatError) -> Self {
        Error::InvalidArgument(err.to_string())
    }
}
