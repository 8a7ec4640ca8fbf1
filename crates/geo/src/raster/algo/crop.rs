use crate::{Coverage, Envelope, Error, Result, Sample};

/// Crops the coverage to the pixels that cover the intersection with `envelope`.
///
/// The window is snapped outwards to whole pixels so the result keeps the resolution and alignment of the input.
/// Fails with `Error::EmptyIntersection` when the envelope does not overlap the coverage.
pub fn crop<T: Sample>(coverage: Coverage<T>, envelope: &Envelope) -> Result<Coverage<T>> {
    let geometry = coverage.geometry();
    let size = geometry.size();
    let Some((top_left, window_size)) = geometry.cell_window(envelope)? else {
        return Err(Error::EmptyIntersection(format!(
            "{} does not cover a pixel of {}",
            envelope,
            coverage.envelope()
        )));
    };

    if window_size == size {
        // No cropping needed
        return Ok(coverage);
    }

    let (row_start, col_start) = (top_left.row as usize, top_left.col as usize);
    let (row_end, col_end) = (row_start + window_size.rows, col_start + window_size.cols);
    let window_geometry = geometry.window(top_left, window_size)?;
    let nodata = coverage.nodata();

    let bands = coverage
        .bands()
        .iter()
        .map(|band| {
            let mut cropped = Vec::with_capacity(window_size.cell_count());
            for row in row_start..row_end {
                let offset = row * size.cols;
                cropped.extend_from_slice(&band[offset + col_start..offset + col_end]);
            }
            cropped
        })
        .collect();

    Coverage::new(window_geometry, nodata, bands)
}
