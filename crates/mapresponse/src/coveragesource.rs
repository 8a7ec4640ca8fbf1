use geo::{AnyCoverage, Coverage, Envelope, GridGeometry, RasterSize, Sample, SampleType, dispatch_anycoverage};

use crate::Result;

/// Access to the backing data of a layer, all sources must implement this trait.
pub trait CoverageSource: Send + Sync {
    /// The full extent of the source in its native reference system
    fn original_envelope(&self) -> Envelope;
    /// Identifier of the native reference system
    fn native_crs(&self) -> String;
    fn sample_type(&self) -> SampleType;
    fn band_count(&self) -> usize {
        1
    }
    /// Reads the part of the source that covers `envelope` (in the native reference system).
    /// `width` and `height` are the approximate pixel dimensions the data is needed at, sources can
    /// use them to read at a lower resolution. Returns `None` when no data is available for the envelope.
    fn read_window(&self, envelope: &Envelope, width: usize, height: usize) -> Result<Option<AnyCoverage>>;
}

/// Source backed by a coverage that is kept in memory
#[derive(Debug, Clone)]
pub struct MemoryCoverageSource {
    coverage: AnyCoverage,
}

impl MemoryCoverageSource {
    pub fn new(coverage: impl Into<AnyCoverage>) -> Self {
        MemoryCoverageSource {
            coverage: coverage.into(),
        }
    }

    pub fn coverage(&self) -> &AnyCoverage {
        &self.coverage
    }
}

impl CoverageSource for MemoryCoverageSource {
    fn original_envelope(&self) -> Envelope {
        self.coverage.envelope().clone()
    }

    fn native_crs(&self) -> String {
        self.coverage.crs().to_string()
    }

    fn sample_type(&self) -> SampleType {
        self.coverage.sample_type()
    }

    fn band_count(&self) -> usize {
        self.coverage.band_count()
    }

    fn read_window(&self, envelope: &Envelope, width: usize, height: usize) -> Result<Option<AnyCoverage>> {
        extract_window(&self.coverage, envelope, width, height)
    }
}

/// Copies the pixels of `coverage` that cover `envelope`, decimated by an integer factor when the
/// window contains more pixels than required for a `width` x `height` output.
pub(crate) fn extract_window(
    coverage: &AnyCoverage,
    envelope: &Envelope,
    width: usize,
    height: usize,
) -> Result<Option<AnyCoverage>> {
    Ok(dispatch_anycoverage!(coverage, cov, extract_decimated_window(cov, envelope, width, height)?.map(AnyCoverage::from)))
}

/// The integer read decimation for a window of `window` pixels that will be resampled to `width` x `height`
pub fn decimation_factor(window: RasterSize, width: usize, height: usize) -> usize {
    let factor_x = window.cols / width.max(1);
    let factor_y = window.rows / height.max(1);
    factor_x.min(factor_y).max(1)
}

fn extract_decimated_window<T: Sample>(
    coverage: &Coverage<T>,
    envelope: &Envelope,
    width: usize,
    height: usize,
) -> geo::Result<Option<Coverage<T>>> {
    let geometry = coverage.geometry();
    let Some((top_left, window)) = geometry.cell_window(envelope)? else {
        return Ok(None);
    };

    let factor = decimation_factor(window, width, height);
    let output_size = RasterSize::with_rows_cols(window.rows.div_ceil(factor), window.cols.div_ceil(factor));

    log::debug!(
        "Source window {window} at (row: {}, col: {}), decimation {factor} -> {output_size}",
        top_left.row,
        top_left.col
    );

    // the decimated grid spans the window exactly, partial blocks at the edges widen the cells slightly
    let window_geometry = geometry.window(top_left, window)?;
    let output_geometry = if factor == 1 {
        window_geometry
    } else {
        GridGeometry::build(output_size.cols, output_size.rows, window_geometry.envelope(), geometry.anchor())?
    };

    // every output cell takes the source pixel under its center
    let source_index = |index: usize, output_count: usize, window_count: usize| {
        ((((index as f64 + 0.5) * window_count as f64) / output_count as f64) as usize).min(window_count - 1)
    };

    let (row_start, col_start) = (top_left.row as usize, top_left.col as usize);
    let cols = geometry.cols();
    let bands = coverage
        .bands()
        .iter()
        .map(|band| {
            let mut data = Vec::with_capacity(output_size.cell_count());
            for row in 0..output_size.rows {
                let src_row = row_start + source_index(row, output_size.rows, window.rows);
                for col in 0..output_size.cols {
                    let src_col = col_start + source_index(col, output_size.cols, window.cols);
                    data.push(band[src_row * cols + src_col]);
                }
            }
            data
        })
        .collect();

    Coverage::new(output_geometry, coverage.nodata(), bands).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::PixelAnchor;

    const CRS: &str = "EPSG:31370";

    fn index_source(width: usize, height: usize) -> MemoryCoverageSource {
        let envelope = Envelope::new(0.0, 0.0, 10.0, 10.0, CRS);
        let geometry = GridGeometry::build(width, height, &envelope, PixelAnchor::CellCenter).expect("Invalid grid");
        let data = (0..width * height).map(|i| (i % 250) as u8).collect();
        MemoryCoverageSource::new(Coverage::single_band(geometry, Some(255u8), data).expect("Invalid coverage"))
    }

    #[test]
    fn decimation() {
        assert_eq!(decimation_factor(RasterSize::with_rows_cols(60, 60), 60, 60), 1);
        assert_eq!(decimation_factor(RasterSize::with_rows_cols(100, 100), 60, 60), 1);
        assert_eq!(decimation_factor(RasterSize::with_rows_cols(1000, 800), 100, 100), 8);
        assert_eq!(decimation_factor(RasterSize::with_rows_cols(10, 10), 100, 100), 1);
    }

    #[test]
    fn window_at_full_resolution() -> Result<()> {
        let source = index_source(100, 100);
        let window = source
            .read_window(&Envelope::new(2.0, 2.0, 8.0, 8.0, CRS), 60, 60)?
            .expect("Window should be available");

        assert_eq!(window.size(), RasterSize::with_rows_cols(60, 60));
        assert_relative_eq!(window.envelope(), &Envelope::new(2.0, 2.0, 8.0, 8.0, CRS), epsilon = 1e-9);

        let cov = window.as_coverage::<u8>()?;
        // top left of the window is row 20, col 20 of the source
        assert_eq!(cov.band(0)[0], ((20 * 100 + 20) % 250) as u8);
        Ok(())
    }

    #[test]
    fn window_is_snapped_outwards() -> Result<()> {
        let source = index_source(100, 100);
        let window = source
            .read_window(&Envelope::new(2.05, 2.05, 7.95, 7.95, CRS), 60, 60)?
            .expect("Window should be available");

        assert_eq!(window.size(), RasterSize::with_rows_cols(60, 60));
        assert_relative_eq!(window.envelope(), &Envelope::new(2.0, 2.0, 8.0, 8.0, CRS), epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn decimated_window() -> Result<()> {
        let source = index_source(100, 100);
        let window = source
            .read_window(&Envelope::new(0.0, 0.0, 10.0, 10.0, CRS), 25, 25)?
            .expect("Window should be available");

        assert_eq!(window.size(), RasterSize::with_rows_cols(25, 25));
        assert_relative_eq!(window.envelope(), &Envelope::new(0.0, 0.0, 10.0, 10.0, CRS), epsilon = 1e-9);
        assert_relative_eq!(window.geometry().resolution().0, 0.4, epsilon = 1e-12);

        let cov = window.as_coverage::<u8>()?;
        // center of the first 4x4 block
        assert_eq!(cov.band(0)[0], ((2 * 100 + 2) % 250) as u8);
        assert_eq!(cov.band(0)[1], ((2 * 100 + 6) % 250) as u8);
        assert_eq!(cov.nodata(), Some(255));
        Ok(())
    }

    #[test]
    fn decimated_window_with_partial_blocks() -> Result<()> {
        let source = index_source(10, 10);

        // 10 pixels in blocks of 3 leave a partial block at the right and bottom edge
        let window = source
            .read_window(&Envelope::new(0.0, 0.0, 12.5, 10.0, CRS), 3, 3)?
            .expect("Window should be available");

        assert_eq!(window.size(), RasterSize::with_rows_cols(4, 4));
        assert_relative_eq!(window.envelope(), &Envelope::new(0.0, 0.0, 10.0, 10.0, CRS), epsilon = 1e-9);
        assert_relative_eq!(window.geometry().resolution().0, 2.5, epsilon = 1e-12);

        // every output cell center lies on the source pixel it was taken from
        let cov = window.as_coverage::<u8>()?;
        let geometry = window.geometry();
        for row in 0..4 {
            for col in 0..4 {
                let center = geometry.cell_center(geo::Cell::from_row_col(row, col));
                assert!(source.original_envelope().contains_point(center));
                let src = (9.0 - center.y().floor()) as usize * 10 + center.x().floor() as usize;
                assert_eq!(cov.band(0)[row as usize * 4 + col as usize], src as u8);
            }
        }
        Ok(())
    }

    #[test]
    fn window_outside_extent() -> Result<()> {
        let source = index_source(10, 10);
        assert!(source.read_window(&Envelope::new(20.0, 20.0, 30.0, 30.0, CRS), 10, 10)?.is_none());
        Ok(())
    }

    #[test]
    fn partial_overlap() -> Result<()> {
        let source = index_source(10, 10);
        let window = source
            .read_window(&Envelope::new(-5.0, -5.0, 5.0, 5.0, CRS), 10, 10)?
            .expect("Window should be available");

        assert_eq!(window.size(), RasterSize::with_rows_cols(5, 5));
        assert_relative_eq!(window.envelope(), &Envelope::new(0.0, 0.0, 5.0, 5.0, CRS), epsilon = 1e-9);
        Ok(())
    }
}
