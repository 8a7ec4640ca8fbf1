use std::path::{Path, PathBuf};

use geo::{AnyCoverage, Envelope, SampleType, formats::geotiff};

use crate::{CoverageSource, Error, Result, coveragesource::extract_window};

/// Source backed by a GeoTIFF file.
///
/// The georeferencing is read when the source is opened, only the pixels covering a requested window are decoded.
#[derive(Debug, Clone)]
pub struct GeoTiffFileSource {
    path: PathBuf,
    metadata: geotiff::GeoTiffMetadata,
}

impl GeoTiffFileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = geotiff::read_geotiff_metadata(path).map_err(|err| source_error(path, err))?;
        log::debug!(
            "Opened {} ({} band(s) of {}, {})",
            path.display(),
            metadata.band_count,
            metadata.sample_type,
            metadata.geometry.envelope()
        );

        Ok(GeoTiffFileSource {
            path: path.to_path_buf(),
            metadata,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> &geotiff::GeoTiffMetadata {
        &self.metadata
    }
}

fn source_error(path: &Path, err: geo::Error) -> Error {
    Error::SourceUnavailable(format!("{}: {err}", path.display()))
}

impl CoverageSource for GeoTiffFileSource {
    fn original_envelope(&self) -> Envelope {
        self.metadata.geometry.envelope().clone()
    }

    fn native_crs(&self) -> String {
        self.metadata.geometry.crs().to_string()
    }

    fn sample_type(&self) -> SampleType {
        self.metadata.sample_type
    }

    fn band_count(&self) -> usize {
        self.metadata.band_count
    }

    fn read_window(&self, envelope: &Envelope, width: usize, height: usize) -> Result<Option<AnyCoverage>> {
        let Some((top_left, size)) = self.metadata.geometry.cell_window(envelope)? else {
            return Ok(None);
        };

        let coverage =
            geotiff::read_geotiff_window(&self.path, top_left, size).map_err(|err| source_error(&self.path, err))?;
        extract_window(&coverage, envelope, width, height)
    }
}
