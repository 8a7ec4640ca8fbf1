use geo::{Envelope, Interpolation, formats::geotiff::Compression};

use crate::{Error, OutputFormat, ResponseConfig, Result};

/// A map request as received from the request handling layer
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MapRequest {
    /// min x, min y, max x, max y in the request reference system
    pub bbox: [f64; 4],
    pub crs: String,
    pub width: usize,
    pub height: usize,
    /// MIME id or short name of the output format
    pub format: String,
    #[serde(default)]
    pub interpolation: Interpolation,
    pub layers: Vec<String>,
    /// Overrides the configured fill-on-miss behavior
    #[serde(default)]
    pub fill_on_miss: Option<bool>,
}

/// The validated parameters of a single layer request, immutable for the duration of the response
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub layer: String,
    pub envelope: Envelope,
    pub width: usize,
    pub height: usize,
    pub format: OutputFormat,
    pub interpolation: Interpolation,
    pub compression: Compression,
    pub fill_on_miss: bool,
}

impl RequestContext {
    /// Validates the request, only single layer requests within the configured size limit are accepted
    pub fn new(request: &MapRequest, config: &ResponseConfig) -> Result<Self> {
        let layer = match request.layers.as_slice() {
            [layer] => layer.clone(),
            [] => return Err(Error::Request("No layer requested".into())),
            layers => {
                return Err(Error::Request(format!(
                    "Cannot combine layers into a single response ({} layers requested)",
                    layers.len()
                )));
            }
        };

        if request.width == 0 || request.height == 0 {
            return Err(Error::InvalidGrid(format!(
                "Output dimensions must be positive ({}x{})",
                request.width, request.height
            )));
        }

        let pixel_count = request.width.saturating_mul(request.height);
        if pixel_count > config.max_output_pixels {
            return Err(Error::Request(format!(
                "Requested output of {}x{} exceeds the maximum of {} pixels",
                request.width, request.height, config.max_output_pixels
            )));
        }

        let [min_x, min_y, max_x, max_y] = request.bbox;
        if request.bbox.iter().any(|v| !v.is_finite()) || min_x >= max_x || min_y >= max_y {
            return Err(Error::InvalidGrid(format!("Invalid bounding box: {:?}", request.bbox)));
        }

        Ok(RequestContext {
            layer,
            envelope: Envelope::new(min_x, min_y, max_x, max_y, request.crs.trim()),
            width: request.width,
            height: request.height,
            format: request.format.parse()?,
            interpolation: request.interpolation,
            compression: config.compression,
            fill_on_miss: request.fill_on_miss.unwrap_or(config.fill_on_miss),
        })
    }
}
