use crate::{
    Cell, Coverage, GridGeometry, Interpolation, Point, Result, Sample,
    point::{euclidean_distance, linear_interpolate},
    srs::CoordinateTransformer,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ReprojectOptions {
    /// Linear interpolation threshold in source pixels, when the error of interpolating the transformed
    /// positions along a row exceeds this threshold exact calculations are used (default = 0.125, 0 = always exact)
    pub error_threshold: f64,
    /// Value for cells that map outside of the source when the source has no nodata value
    pub fill_value: Option<f64>,
}

impl Default for ReprojectOptions {
    fn default() -> Self {
        Self {
            error_threshold: 0.125,
            fill_value: None,
        }
    }
}

/// Maps the coverage onto the `target` grid.
///
/// Every target cell center is transformed to the reference system of the source and sampled with the
/// requested interpolation. Cells that cannot be transformed or that fall outside of the source get the
/// nodata value of the source (or the configured fill value).
pub fn reproject<T: Sample>(
    coverage: Coverage<T>,
    target: &GridGeometry,
    interpolation: Interpolation,
    opts: &ReprojectOptions,
) -> Result<Coverage<T>> {
    let nodata = coverage
        .nodata()
        .or_else(|| opts.fill_value.map(T::from_f64_saturating))
        .or(Some(T::NODATA));

    if coverage.geometry().is_aligned_with(target) {
        log::debug!("Reproject: source grid matches the target grid, samples are kept as is");
        let (_, src_nodata, bands) = coverage.into_parts();
        return Coverage::new(target.clone(), src_nodata.or(nodata), bands);
    }

    let coord_trans = CoordinateTransformer::new(target.crs(), coverage.crs())?;
    let src_geometry = coverage.geometry();
    let cols = target.cols();

    let mut positions = Vec::with_capacity(target.size().cell_count());
    let mut row_positions = vec![None; cols];
    for row in 0..target.rows() {
        let row_points: Vec<Point> = (0..cols)
            .map(|col| target.cell_center(Cell::from_row_col(row as i32, col as i32)))
            .collect();

        if coord_trans.is_identity() {
            positions.extend(row_points.iter().map(|p| Some(src_geometry.world_to_grid(*p))));
            continue;
        }

        let project = |p: Point| coord_trans.transform_point(p).ok().map(|src| src_geometry.world_to_grid(src));
        transform_row(&row_points, &mut row_positions, &project, opts.error_threshold);
        positions.extend_from_slice(&row_positions);
    }

    let fill = nodata.unwrap_or(T::NODATA);
    let bands = (0..coverage.band_count())
        .map(|band| {
            positions
                .iter()
                .map(|pos| pos.and_then(|pos| interpolation.sample(&coverage, band, pos)).unwrap_or(fill))
                .collect()
        })
        .collect();

    Coverage::new(target.clone(), nodata, bands)
}

/// Computes the source pixel positions for a row of target points.
/// Transforms the first, middle and last point and linearly interpolates in between when the middle point
/// is predicted within the error threshold, otherwise the row is subdivided.
fn transform_row(row_points: &[Point], positions: &mut [Option<Point>], project: &impl Fn(Point) -> Option<Point>, error_threshold: f64) {
    let cols = row_points.len();
    if cols == 0 {
        return;
    }

    if error_threshold <= 0.0 || cols <= 2 {
        for (pos, point) in positions.iter_mut().zip(row_points) {
            *pos = project(*point);
        }
        return;
    }

    let start = project(row_points[0]);
    let end = project(row_points[cols - 1]);
    subdivide_segment(row_points, positions, 0, cols - 1, start, end, project, error_threshold);
}

/// Recursively subdivide a segment of a row, the start and end positions are already transformed
#[allow(clippy::too_many_arguments)]
fn subdivide_segment(
    row_points: &[Point],
    positions: &mut [Option<Point>],
    start_col: usize,
    end_col: usize,
    start: Option<Point>,
    end: Option<Point>,
    project: &impl Fn(Point) -> Option<Point>,
    error_threshold: f64,
) {
    positions[start_col] = start;
    positions[end_col] = end;
    if end_col - start_col <= 1 {
        return;
    }

    let middle_col = (start_col + end_col) / 2;
    let middle = project(row_points[middle_col]);

    if let (Some(start_pos), Some(middle_pos), Some(end_pos)) = (start, middle, end) {
        let span = (end_col - start_col) as f64;
        let t = (middle_col - start_col) as f64 / span;
        let error = euclidean_distance(middle_pos, linear_interpolate(start_pos, end_pos, t));

        if error < error_threshold {
            for (col, pos) in positions.iter_mut().enumerate().take(end_col).skip(start_col + 1) {
                *pos = Some(linear_interpolate(start_pos, end_pos, (col - start_col) as f64 / span));
            }
            return;
        }
    }

    subdivide_segment(row_points, positions, start_col, middle_col, start, middle, project, error_threshold);
    subdivide_segment(row_points, positions, middle_col, end_col, middle, end, project, error_threshold);
}
