#![warn(clippy::unwrap_used)]

//! Single layer map responses: a coverage window is read from the layer source, resampled onto the
//! requested grid and encoded as raw BIL or GeoTIFF.

mod config;
mod coveragesource;
pub mod encoder;
mod error;
mod geotiffsource;
mod layercatalog;
mod outputformat;
pub mod pipeline;
pub mod reader;
mod request;

pub type Result<T = ()> = std::result::Result<T, Error>;

#[doc(inline)]
pub use config::ResponseConfig;
#[doc(inline)]
pub use coveragesource::{CoverageSource, MemoryCoverageSource, decimation_factor};
#[doc(inline)]
pub use encoder::{EncodeOptions, encode};
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use geotiffsource::GeoTiffFileSource;
#[doc(inline)]
pub use layercatalog::LayerCatalog;
#[doc(inline)]
pub use outputformat::{Capabilities, FormatRegistry, OutputFormat, register_default_formats};
#[doc(inline)]
pub use pipeline::{CancellationToken, MapResponse, produce_coverage, write_map_response};
#[doc(inline)]
pub use reader::{Window, read_window};
#[doc(inline)]
pub use request::{MapRequest, RequestContext};
