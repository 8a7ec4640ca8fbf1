use crate::{Nodata, SampleType};

/// Byte order used when serializing samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(rename_all = "lowercase"))]
pub enum ByteOrder {
    /// Network byte order, the default for raw BIL output
    #[default]
    BigEndian,
    LittleEndian,
}

// Type requirements for the samples in a coverage
pub trait Sample:
    Copy
    + Nodata
    + num::Num
    + num::NumCast
    + num::Bounded
    + std::cmp::PartialOrd
    + std::fmt::Debug
    + std::string::ToString
    + Send
    + Sync
    + 'static
{
    const TYPE: SampleType;

    fn as_f64(self) -> f64;

    /// Conversion of a computed value, integral types are rounded and clamped to their value range
    fn from_f64_saturating(val: f64) -> Self;

    /// Appends the sample bytes in the requested byte order
    fn write_bytes(self, order: ByteOrder, out: &mut Vec<u8>);
}

macro_rules! impl_sample_integral {
    ( $t:ident, $sample_type:ident ) => {
        impl Sample for $t {
            const TYPE: SampleType = SampleType::$sample_type;

            #[inline]
            fn as_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64_saturating(val: f64) -> Self {
                if val.is_nan() {
                    return Self::NODATA;
                }

                val.round().clamp($t::MIN as f64, $t::MAX as f64) as $t
            }

            #[inline]
            fn write_bytes(self, order: ByteOrder, out: &mut Vec<u8>) {
                match order {
                    ByteOrder::BigEndian => out.extend_from_slice(&self.to_be_bytes()),
                    ByteOrder::LittleEndian => out.extend_from_slice(&self.to_le_bytes()),
                }
            }
        }
    };
}

macro_rules! impl_sample_floating_point {
    ( $t:ident, $sample_type:ident ) => {
        impl Sample for $t {
            const TYPE: SampleType = SampleType::$sample_type;

            #[inline]
            fn as_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64_saturating(val: f64) -> Self {
                val as $t
            }

            #[inline]
            fn write_bytes(self, order: ByteOrder, out: &mut Vec<u8>) {
                match order {
                    ByteOrder::BigEndian => out.extend_from_slice(&self.to_be_bytes()),
                    ByteOrder::LittleEndian => out.extend_from_slice(&self.to_le_bytes()),
                }
            }
        }
    };
}

impl_sample_integral!(u8, Uint8);
impl_sample_integral!(i16, Int16);
impl_sample_integral!(u16, Uint16);
impl_sample_integral!(i32, Int32);
impl_sample_integral!(u32, Uint32);
impl_sample_floating_point!(f32, Float32);
impl_sample_floating_point!(f64, Float64);
