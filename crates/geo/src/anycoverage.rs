use std::any::Any;

use crate::{Coverage, Envelope, Error, GridGeometry, RasterSize, Result, Sample, SampleType};

/// Type erased coverage, the variant determines the sample type
#[derive(Debug, Clone, PartialEq)]
pub enum AnyCoverage {
    U8(Coverage<u8>),
    I16(Coverage<i16>),
    U16(Coverage<u16>),
    I32(Coverage<i32>),
    U32(Coverage<u32>),
    F32(Coverage<f32>),
    F64(Coverage<f64>),
}

impl AnyCoverage {
    pub fn sample_type(&self) -> SampleType {
        dispatch_anycoverage!(self, cov, cov.sample_type())
    }

    pub fn geometry(&self) -> &GridGeometry {
        dispatch_anycoverage!(self, cov, cov.geometry())
    }

    pub fn size(&self) -> RasterSize {
        dispatch_anycoverage!(self, cov, cov.size())
    }

    pub fn envelope(&self) -> &Envelope {
        dispatch_anycoverage!(self, cov, cov.envelope())
    }

    pub fn crs(&self) -> &str {
        dispatch_anycoverage!(self, cov, cov.crs())
    }

    pub fn band_count(&self) -> usize {
        dispatch_anycoverage!(self, cov, cov.band_count())
    }

    /// Nodata value converted to f64
    pub fn nodata_f64(&self) -> Option<f64> {
        dispatch_anycoverage!(self, cov, cov.nodata().map(|v| v.as_f64()))
    }

    /// Converts to a coverage with the requested sample type (clamping out of range values)
    pub fn cast_to(self, sample_type: SampleType) -> AnyCoverage {
        if self.sample_type() == sample_type {
            return self;
        }

        dispatch_sampletype!(sample_type, T, dispatch_anycoverage!(self, cov, cov.cast::<T>()))
    }

    pub fn as_coverage<T: Sample>(&self) -> Result<&Coverage<T>> {
        let actual = self.sample_type();
        dispatch_anycoverage!(self, cov, (cov as &dyn Any).downcast_ref::<Coverage<T>>())
            .ok_or_else(|| Error::InvalidArgument(format!("Type mismatch: {} != {}", T::TYPE, actual)))
    }

    pub fn into_coverage<T: Sample>(self) -> Result<Coverage<T>> {
        let actual = self.sample_type();
        let boxed = dispatch_anycoverage!(self, cov, Box::new(cov) as Box<dyn Any>);
        boxed
            .downcast::<Coverage<T>>()
            .map(|cov| *cov)
            .map_err(|_| Error::InvalidArgument(format!("Type mismatch: {} != {}", T::TYPE, actual)))
    }
}

macro_rules! impl_from_coverage {
    ( $t:ty, $variant:ident ) => {
        impl From<Coverage<$t>> for AnyCoverage {
            fn from(cov: Coverage<$t>) -> Self {
                AnyCoverage::$variant(cov)
            }
        }
    };
}

impl_from_coverage!(u8, U8);
impl_from_coverage!(i16, I16);
impl_from_coverage!(u16, U16);
impl_from_coverage!(i32, I32);
impl_from_coverage!(u32, U32);
impl_from_coverage!(f32, F32);
impl_from_coverage!(f64, F64);
