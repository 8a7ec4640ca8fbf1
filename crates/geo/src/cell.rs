use crate::RasterSize;

/// Represents a position in the raster using row, col coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const fn from_row_col(row: i32, col: i32) -> Self {
        Cell { row, col }
    }

    pub const fn invalid() -> Self {
        Cell { row: -1, col: -1 }
    }

    pub const fn is_valid(&self) -> bool {
        self.row >= 0 && self.col >= 0
    }

    pub fn is_on_raster(&self, size: RasterSize) -> bool {
        self.is_valid() && (self.row as usize) < size.rows && (self.col as usize) < size.cols
    }

    /// Row major index of the cell, `None` when the cell lies outside of the raster
    pub fn index_in_raster(&self, size: RasterSize) -> Option<usize> {
        if self.is_on_raster(size) {
            Some(self.row as usize * size.cols + self.col as usize)
        } else {
            None
        }
    }
}

/// Iterates over all the cells of a raster in row major order
pub struct CellIterator {
    current: Cell,
    size: RasterSize,
}

impl CellIterator {
    pub fn for_raster_with_size(size: RasterSize) -> Self {
        CellIterator {
            current: Cell::from_row_col(0, 0),
            size,
        }
    }
}

impl Iterator for CellIterator {
    type Item = Cell;

    fn next(&mut self) -> Option<Self::Item> {
        if self.size.is_empty() || self.current.row as usize >= self.size.rows {
            return None;
        }

        let cell = self.current;
        self.current.col += 1;
        if self.current.col as usize >= self.size.cols {
            self.current.col = 0;
            self.current.row += 1;
        }

        Some(cell)
    }
}
