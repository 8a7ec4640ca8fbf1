use std::path::Path;

use geo::{ByteOrder, formats::geotiff::Compression};

use crate::{Error, Result};

/// Settings that apply to every response, individual requests can override the fill-on-miss behavior.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResponseConfig {
    /// Value for output cells without source data when the source has no nodata value
    pub fill_value: Option<f64>,
    /// Respond with a nodata filled grid instead of an error when the request does not overlap the source
    pub fill_on_miss: bool,
    pub byte_order: ByteOrder,
    pub compression: Compression,
    /// Number of points sampled along every envelope edge when transforming envelopes
    pub edge_points: usize,
    /// Reprojection error threshold in source pixels (0 = exact transformation of every cell)
    pub error_threshold: f64,
    /// Upper limit of output width x height
    pub max_output_pixels: usize,
    /// Requests that take longer are aborted at the next stage boundary
    pub deadline_ms: Option<u64>,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        ResponseConfig {
            fill_value: None,
            fill_on_miss: false,
            byte_order: ByteOrder::BigEndian,
            compression: Compression::Lzw,
            edge_points: geo::DEFAULT_EDGE_POINTS,
            error_threshold: 0.125,
            max_output_pixels: 16 * 1024 * 1024,
            deadline_ms: None,
        }
    }
}

impl ResponseConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|err| Error::Config(format!("Failed to read {}: {err}", path.display())))?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ResponseConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.edge_points < 2 {
            return Err(Error::Config(format!("edge_points must be at least 2 ({})", self.edge_points)));
        }

        if !self.error_threshold.is_finite() || self.error_threshold < 0.0 {
            return Err(Error::Config(format!(
                "error_threshold must be a positive number ({})",
                self.error_threshold
            )));
        }

        if self.max_output_pixels == 0 {
            return Err(Error::Config("max_output_pixels must be positive".into()));
        }

        if self.fill_value.is_some_and(f64::is_infinite) {
            return Err(Error::Config("fill_value must be finite or nan".into()));
        }

        Ok(())
    }

    pub fn deadline(&self) -> Option<std::time::Duration> {
        self.deadline_ms.map(std::time::Duration::from_millis)
    }
}
