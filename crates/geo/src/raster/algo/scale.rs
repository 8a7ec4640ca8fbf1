use crate::{Cell, Coverage, GridGeometry, Interpolation, RasterSize, Result, Sample};

/// Resamples the coverage to the requested pixel counts over the same envelope and reference system.
///
/// The input is returned as is when it already has the requested size.
pub fn scale<T: Sample>(coverage: Coverage<T>, size: RasterSize, interpolation: Interpolation) -> Result<Coverage<T>> {
    if coverage.size() == size {
        return Ok(coverage);
    }

    let src_geometry = coverage.geometry();
    let dst_geometry = GridGeometry::build(size.cols, size.rows, src_geometry.envelope(), src_geometry.anchor())?;
    let fill = coverage.fill_value();

    log::debug!(
        "Scale {} -> {} ({})",
        coverage.size(),
        size,
        interpolation
    );

    let positions: Vec<_> = (0..size.rows)
        .flat_map(|row| (0..size.cols).map(move |col| Cell::from_row_col(row as i32, col as i32)))
        .map(|cell| src_geometry.world_to_grid(dst_geometry.cell_center(cell)))
        .collect();

    let bands = (0..coverage.band_count())
        .map(|band| {
            positions
                .iter()
                .map(|pos| interpolation.sample(&coverage, band, *pos).unwrap_or(fill))
                .collect()
        })
        .collect();

    Coverage::new(dst_geometry, coverage.nodata(), bands)
}
