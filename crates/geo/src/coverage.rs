//! In memory raster coverage: a georeferenced grid with one or more bands of samples.

use crate::{Cell, Envelope, Error, GridGeometry, Nodata, RasterSize, Result, Sample, SampleType};

/// A georeferenced raster with band sequential storage (one row major buffer per band).
#[derive(Debug, Clone, PartialEq)]
pub struct Coverage<T: Sample> {
    geometry: GridGeometry,
    nodata: Option<T>,
    bands: Vec<Vec<T>>,
}

impl<T: Sample> Coverage<T> {
    pub fn new(geometry: GridGeometry, nodata: Option<T>, bands: Vec<Vec<T>>) -> Result<Self> {
        if bands.is_empty() {
            return Err(Error::InvalidArgument("A coverage needs at least one band".into()));
        }

        let size = geometry.size();
        if let Some(band) = bands.iter().find(|band| band.len() != size.cell_count()) {
            return Err(Error::SizeMismatch {
                size1: (size.rows, size.cols),
                size2: (band.len() / size.cols.max(1), size.cols),
            });
        }

        Ok(Coverage { geometry, nodata, bands })
    }

    pub fn single_band(geometry: GridGeometry, nodata: Option<T>, data: Vec<T>) -> Result<Self> {
        Self::new(geometry, nodata, vec![data])
    }

    pub fn filled_with(geometry: GridGeometry, nodata: Option<T>, band_count: usize, value: T) -> Self {
        let cell_count = geometry.size().cell_count();
        Coverage {
            geometry,
            nodata,
            bands: vec![vec![value; cell_count]; band_count.max(1)],
        }
    }

    /// Coverage where every sample is set to the nodata value (or the type sentinel when there is none)
    pub fn filled_with_nodata(geometry: GridGeometry, nodata: Option<T>, band_count: usize) -> Self {
        Self::filled_with(geometry, nodata, band_count, nodata.unwrap_or(T::NODATA))
    }

    pub fn sample_type(&self) -> SampleType {
        T::TYPE
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn size(&self) -> RasterSize {
        self.geometry.size()
    }

    pub fn envelope(&self) -> &Envelope {
        self.geometry.envelope()
    }

    pub fn crs(&self) -> &str {
        self.geometry.crs()
    }

    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    /// The value used for cells without data
    pub fn fill_value(&self) -> T {
        self.nodata.unwrap_or(T::NODATA)
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// # Panics
    /// When the band index is out of range
    pub fn band(&self, index: usize) -> &[T] {
        &self.bands[index]
    }

    pub fn bands(&self) -> &[Vec<T>] {
        &self.bands
    }

    pub fn into_parts(self) -> (GridGeometry, Option<T>, Vec<Vec<T>>) {
        (self.geometry, self.nodata, self.bands)
    }

    pub fn is_nodata(&self, value: T) -> bool {
        match self.nodata {
            Some(nodata) => value == nodata || value.is_nan(),
            None => value.is_nan(),
        }
    }

    /// The value of a cell, `None` for cells outside of the grid or cells without data
    pub fn cell_value(&self, band: usize, cell: Cell) -> Option<T> {
        let index = cell.index_in_raster(self.size())?;
        let value = *self.bands.get(band)?.get(index)?;
        if self.is_nodata(value) { None } else { Some(value) }
    }

    /// Converts the samples to another type, values outside of the target range are clamped.
    /// Nodata samples are mapped to the nodata value of the target type.
    ///
    /// Valid samples that end up on the target nodata value (e.g. 255 or more when casting to `u8`)
    /// can no longer be told apart from nodata, the number of such samples is logged at debug level.
    pub fn cast<U: Sample>(self) -> Coverage<U> {
        let target_nodata = self.nodata.map(|_| U::NODATA);
        let fill = target_nodata.unwrap_or(U::NODATA);

        let mut collisions = 0usize;
        let bands = self
            .bands
            .iter()
            .map(|band| {
                band.iter()
                    .map(|&v| {
                        if self.is_nodata(v) {
                            return fill;
                        }

                        let converted = U::from_f64_saturating(v.as_f64());
                        if target_nodata == Some(converted) {
                            collisions += 1;
                        }
                        converted
                    })
                    .collect()
            })
            .collect();

        if collisions > 0 {
            log::debug!(
                "{collisions} valid sample(s) map onto the nodata value {fill:?} when casting {} to {}",
                T::TYPE,
                U::TYPE
            );
        }

        Coverage {
            geometry: self.geometry,
            nodata: target_nodata,
            bands,
        }
    }
}
