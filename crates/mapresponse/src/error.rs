use thiserror::Error;

/// Failure categories of a map response, every pipeline stage surfaces one of these to the caller
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),
    #[error("Projection error: {0}")]
    Projection(String),
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("Empty intersection: {0}")]
    EmptyIntersection(String),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Invalid request: {0}")]
    Request(String),
    #[error("Request cancelled: {0}")]
    Cancelled(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<geo::Error> for Error {
    fn from(err: geo::Error) -> Self {
        let msg = err.to_string();
        match err {
            geo::Error::InvalidGrid(_) | geo::Error::SizeMismatch { .. } => Error::InvalidGrid(msg),
            geo::Error::Projection(_) | geo::Error::Proj4rs(_) => Error::Projection(msg),
            geo::Error::SourceUnavailable(_) | geo::Error::IOError(_) | geo::Error::Runtime(_) => {
                Error::SourceUnavailable(msg)
            }
            geo::Error::EmptyIntersection(_) => Error::EmptyIntersection(msg),
            geo::Error::Encoding(_) | geo::Error::Tiff(_) => Error::Encoding(msg),
            geo::Error::InvalidArgument(_) => Error::Request(msg),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
