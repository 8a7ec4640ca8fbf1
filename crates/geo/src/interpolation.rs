//! Sampling kernels used when resampling and reprojecting coverages.

use crate::{Cell, Coverage, Error, Point, Sample};

/// The interpolation kernel, selected per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(rename_all = "lowercase"))]
pub enum Interpolation {
    /// Value of the cell that contains the sample position
    #[default]
    Nearest,
    /// Distance weighted average of the four surrounding cell centers
    Bilinear,
}

/// Registered kernel names, read only
const KERNELS: &[(&str, Interpolation)] = &[
    ("nearest", Interpolation::Nearest),
    ("nearest-neighbor", Interpolation::Nearest),
    ("nearest_neighbor", Interpolation::Nearest),
    ("bilinear", Interpolation::Bilinear),
];

impl Interpolation {
    pub fn name(&self) -> &'static str {
        match self {
            Interpolation::Nearest => "nearest",
            Interpolation::Bilinear => "bilinear",
        }
    }

    /// Samples a band at a fractional pixel position (x = column, y = row, origin at the top left corner of the grid).
    /// Returns `None` when the position lies outside of the grid or no data is available.
    pub fn sample<T: Sample>(&self, coverage: &Coverage<T>, band: usize, pos: Point) -> Option<T> {
        let size = coverage.size();
        let (cols, rows) = (size.cols as f64, size.rows as f64);
        if size.is_empty() || !(pos.x() >= 0.0 && pos.x() <= cols && pos.y() >= 0.0 && pos.y() <= rows) {
            return None;
        }

        match self {
            Interpolation::Nearest => sample_nearest(coverage, band, pos),
            Interpolation::Bilinear => sample_bilinear(coverage, band, pos),
        }
    }
}

impl std::fmt::Display for Interpolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Interpolation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        KERNELS
            .iter()
            .find(|(kernel, _)| *kernel == name)
            .map(|(_, interpolation)| *interpolation)
            .ok_or_else(|| Error::InvalidArgument(format!("Unsupported interpolation: '{s}'")))
    }
}

fn sample_nearest<T: Sample>(coverage: &Coverage<T>, band: usize, pos: Point) -> Option<T> {
    let size = coverage.size();
    // positions on the right or bottom edge belong to the last cell
    let col = (pos.x().floor() as usize).min(size.cols - 1);
    let row = (pos.y().floor() as usize).min(size.rows - 1);

    coverage.cell_value(band, Cell::from_row_col(row as i32, col as i32))
}

fn sample_bilinear<T: Sample>(coverage: &Coverage<T>, band: usize, pos: Point) -> Option<T> {
    let size = coverage.size();

    // Work in cell center coordinates, clamped to the last valid index
    let fx = (pos.x() - 0.5).clamp(0.0, (size.cols - 1) as f64);
    let fy = (pos.y() - 0.5).clamp(0.0, (size.rows - 1) as f64);

    let x0 = fx.floor() as usize;
    let y0 = fy.floor() as usize;
    let x1 = (x0 + 1).min(size.cols - 1);
    let y1 = (y0 + 1).min(size.rows - 1);
    let wx = fx - x0 as f64;
    let wy = fy - y0 as f64;

    let neighbours = [
        (y0, x0, (1.0 - wx) * (1.0 - wy)),
        (y0, x1, wx * (1.0 - wy)),
        (y1, x0, (1.0 - wx) * wy),
        (y1, x1, wx * wy),
    ];

    let mut sum = 0.0;
    let mut weight_sum = 0.0;
    for (row, col, weight) in neighbours {
        if weight <= 0.0 {
            continue;
        }

        // nodata neighbours are skipped and the weights renormalised
        if let Some(val) = coverage.cell_value(band, Cell::from_row_col(row as i32, col as i32)) {
            sum += val.as_f64() * weight;
            weight_sum += weight;
        }
    }

    if weight_sum <= f64::EPSILON {
        return None;
    }

    Some(T::from_f64_saturating(sum / weight_sum))
}
