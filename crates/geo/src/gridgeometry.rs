//! Georeferenced raster grids: the link between pixel positions and world coordinates.

use crate::{Cell, Envelope, Error, GeoTransform, Point, RasterSize, Result};

/// Pixel tolerance used when snapping envelope edges to the grid
const SNAP_TOLERANCE: f64 = 1e-9;

/// The position within a pixel that the grid to world transform refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PixelAnchor {
    /// Pixel (0, 0) maps to the center of the top left cell
    #[default]
    CellCenter,
    /// Pixel (0, 0) maps to the top left corner of the top left cell
    CellCorner,
}

/// A north up raster grid: the raster size, its georeferencing and the reference system.
#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
    size: RasterSize,
    /// Corner anchored transform
    transform: GeoTransform,
    inverse: GeoTransform,
    envelope: Envelope,
    anchor: PixelAnchor,
}

impl GridGeometry {
    /// Derives the grid that covers `envelope` with `width` x `height` pixels.
    pub fn build(width: usize, height: usize, envelope: &Envelope, anchor: PixelAnchor) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidGrid(format!("Grid dimensions must be positive ({width}x{height})")));
        }

        let res_x = (envelope.max_x() - envelope.min_x()) / width as f64;
        let res_y = (envelope.max_y() - envelope.min_y()) / height as f64;
        if !res_x.is_finite() || !res_y.is_finite() || res_x <= 0.0 || res_y <= 0.0 {
            return Err(Error::InvalidGrid(format!(
                "Invalid resolution ({res_x}, {res_y}) for envelope {envelope} and size {width}x{height}"
            )));
        }

        let transform = GeoTransform::new([envelope.min_x(), res_x, 0.0, envelope.max_y(), 0.0, -res_y]);

        Ok(GridGeometry {
            size: RasterSize::with_width_height(width, height),
            inverse: transform.invert()?,
            transform,
            envelope: envelope.clone(),
            anchor,
        })
    }

    /// Grid from an existing corner anchored transform.
    pub fn from_transform(size: RasterSize, transform: GeoTransform, crs: impl Into<String>, anchor: PixelAnchor) -> Result<Self> {
        if size.is_empty() {
            return Err(Error::InvalidGrid(format!("Grid dimensions must be positive {size}")));
        }

        if !transform.is_north_up() || transform.coefficients().iter().any(|c| !c.is_finite()) {
            return Err(Error::InvalidGrid(format!("Only north up grids are supported: {transform:?}")));
        }

        let top_left = transform.top_left();
        let bottom_right = transform.apply(size.cols as f64, size.rows as f64);

        Ok(GridGeometry {
            size,
            inverse: transform.invert()?,
            transform,
            envelope: Envelope::from_points(top_left, bottom_right, crs),
            anchor,
        })
    }

    pub fn size(&self) -> RasterSize {
        self.size
    }

    pub fn rows(&self) -> usize {
        self.size.rows
    }

    pub fn cols(&self) -> usize {
        self.size.cols
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn crs(&self) -> &str {
        self.envelope.crs()
    }

    pub fn anchor(&self) -> PixelAnchor {
        self.anchor
    }

    /// The corner anchored transform, independent of the anchor convention
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// The grid to world transform for the anchor convention of this grid
    pub fn grid_to_world(&self) -> GeoTransform {
        match self.anchor {
            PixelAnchor::CellCorner => self.transform,
            PixelAnchor::CellCenter => self.transform.translated(0.5, 0.5),
        }
    }

    /// Positive cell sizes in world units (x, y)
    pub fn resolution(&self) -> (f64, f64) {
        (self.transform.cell_size_x(), -self.transform.cell_size_y())
    }

    pub fn cell_center(&self, cell: Cell) -> Point {
        self.transform.apply(cell.col as f64 + 0.5, cell.row as f64 + 0.5)
    }

    /// Fractional pixel position (x = column, y = row) of a world coordinate,
    /// the top left corner of the grid is at (0, 0), the center of the first cell at (0.5, 0.5).
    pub fn world_to_grid(&self, point: Point) -> Point {
        self.inverse.apply(point.x(), point.y())
    }

    pub fn point_to_cell(&self, point: Point) -> Cell {
        let pos = self.world_to_grid(point);
        Cell::from_row_col(pos.y().floor() as i32, pos.x().floor() as i32)
    }

    pub fn is_cell_on_grid(&self, cell: Cell) -> bool {
        cell.is_on_raster(self.size)
    }

    /// Geometry of the sub grid starting at the given cell with the given size
    pub fn window(&self, top_left: Cell, size: RasterSize) -> Result<GridGeometry> {
        if !self.is_cell_on_grid(top_left)
            || top_left.row as usize + size.rows > self.size.rows
            || top_left.col as usize + size.cols > self.size.cols
        {
            return Err(Error::InvalidGrid(format!(
                "Window at ({}, {}) with size {size} exceeds the grid {}",
                top_left.row, top_left.col, self.size
            )));
        }

        GridGeometry::from_transform(
            size,
            self.transform.translated(top_left.col as f64, top_left.row as f64),
            self.crs(),
            self.anchor,
        )
    }

    /// The cells that cover the intersection of the grid with `envelope`, snapped outwards to whole cells.
    ///
    /// Returns the top left cell and the size of the window, or `None` when the envelope covers
    /// less than a cell of the grid.
    pub fn cell_window(&self, envelope: &Envelope) -> Result<Option<(Cell, RasterSize)>> {
        let intersection = self.envelope.intersection(envelope)?;
        if intersection.is_empty() {
            return Ok(None);
        }

        let top_left = self.world_to_grid(intersection.top_left());
        let bottom_right = self.world_to_grid(intersection.bottom_right());

        let col_start = ((top_left.x() + SNAP_TOLERANCE).floor().max(0.0) as usize).min(self.size.cols);
        let row_start = ((top_left.y() + SNAP_TOLERANCE).floor().max(0.0) as usize).min(self.size.rows);
        let col_end = ((bottom_right.x() - SNAP_TOLERANCE).ceil().max(0.0) as usize).min(self.size.cols);
        let row_end = ((bottom_right.y() - SNAP_TOLERANCE).ceil().max(0.0) as usize).min(self.size.rows);
        if col_end <= col_start || row_end <= row_start {
            return Ok(None);
        }

        Ok(Some((
            Cell::from_row_col(row_start as i32, col_start as i32),
            RasterSize::with_rows_cols(row_end - row_start, col_end - col_start),
        )))
    }

    /// Checks if two grids cover the same cells, ignoring the anchor convention
    pub fn is_aligned_with(&self, other: &GridGeometry) -> bool {
        self.size == other.size
            && crate::srs::same_crs(self.crs(), other.crs())
            && approx::relative_eq!(self.transform, other.transform, epsilon = 1e-12, max_relative = 1e-12)
    }
}
