use geo::{AnyCoverage, Envelope, srs};

use crate::{CoverageSource, Error, Result};

/// Result of a windowed read
#[derive(Debug, Clone, PartialEq)]
pub enum Window {
    Data(AnyCoverage),
    /// The requested envelope does not overlap the data of the source
    OutsideExtent,
}

impl Window {
    pub fn is_outside_extent(&self) -> bool {
        matches!(self, Window::OutsideExtent)
    }
}

/// Reads the part of the source that covers `envelope` at a resolution suited for a `width` x `height` output.
///
/// The envelope must be expressed in the native reference system of the source.
/// The source is not accessed when the envelope does not intersect its extent.
pub fn read_window(source: &dyn CoverageSource, envelope: &Envelope, width: usize, height: usize) -> Result<Window> {
    let native_crs = source.native_crs();
    if !srs::same_crs(envelope.crs(), &native_crs) {
        return Err(Error::Projection(format!(
            "Window envelope is expressed in {} instead of the source reference system {native_crs}",
            envelope.crs()
        )));
    }

    let source_extent = source.original_envelope();
    let intersection = Envelope::new(
        envelope.min_x(),
        envelope.min_y(),
        envelope.max_x(),
        envelope.max_y(),
        source_extent.crs(),
    )
    .intersection(&source_extent)?;

    if intersection.is_empty() {
        log::debug!("{envelope} does not intersect the source extent {source_extent}");
        return Ok(Window::OutsideExtent);
    }

    match source.read_window(envelope, width, height) {
        Ok(Some(coverage)) => Ok(Window::Data(coverage)),
        Ok(None) => {
            log::debug!("Source has no data for {envelope}");
            Ok(Window::OutsideExtent)
        }
        Err(Error::SourceUnavailable(msg)) => Err(Error::SourceUnavailable(msg)),
        Err(err) => Err(Error::SourceUnavailable(err.to_string())),
    }
}
