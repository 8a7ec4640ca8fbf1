//! Macros for dispatching on `AnyCoverage` and `SampleType` variants.

/// Dispatch on the `AnyCoverage` variants and apply an expression to the inner coverage.
///
/// The result is not wrapped in `AnyCoverage`, so the expression must evaluate to the same type for every variant.
///
/// ```ignore
/// let bands = dispatch_anycoverage!(coverage, cov, cov.band_count());
/// ```
#[macro_export]
macro_rules! dispatch_anycoverage {
    ($coverage:expr, $var:ident, $expr:expr) => {
        match $coverage {
            $crate::AnyCoverage::U8($var) => $expr,
            $crate::AnyCoverage::I16($var) => $expr,
            $crate::AnyCoverage::U16($var) => $expr,
            $crate::AnyCoverage::I32($var) => $expr,
            $crate::AnyCoverage::U32($var) => $expr,
            $crate::AnyCoverage::F32($var) => $expr,
            $crate::AnyCoverage::F64($var) => $expr,
        }
    };
}

/// Dispatch on the `AnyCoverage` variants and wrap the result back in the same variant.
///
/// ```ignore
/// let cropped = apply_to_anycoverage!(coverage, cov, algo::crop(cov, &envelope)?);
/// ```
#[macro_export]
macro_rules! apply_to_anycoverage {
    ($coverage:expr, $var:ident, $expr:expr) => {
        match $coverage {
            $crate::AnyCoverage::U8($var) => $crate::AnyCoverage::U8($expr),
            $crate::AnyCoverage::I16($var) => $crate::AnyCoverage::I16($expr),
            $crate::AnyCoverage::U16($var) => $crate::AnyCoverage::U16($expr),
            $crate::AnyCoverage::I32($var) => $crate::AnyCoverage::I32($expr),
            $crate::AnyCoverage::U32($var) => $crate::AnyCoverage::U32($expr),
            $crate::AnyCoverage::F32($var) => $crate::AnyCoverage::F32($expr),
            $crate::AnyCoverage::F64($var) => $crate::AnyCoverage::F64($expr),
        }
    };
}

/// Dispatch on a `SampleType` and evaluate the expression with `$t` bound to the corresponding Rust type,
/// the result is wrapped in the matching `AnyCoverage` variant.
///
/// ```ignore
/// let coverage = dispatch_sampletype!(sample_type, T, Coverage::<T>::filled_with_nodata(geometry, None, 1));
/// ```
#[macro_export]
macro_rules! dispatch_sampletype {
    ($sample_type:expr, $t:ident, $expr:expr) => {
        match $sample_type {
            $crate::SampleType::Uint8 => {
                type $t = u8;
                $crate::AnyCoverage::U8($expr)
            }
            $crate::SampleType::Int16 => {
                type $t = i16;
                $crate::AnyCoverage::I16($expr)
            }
            $crate::SampleType::Uint16 => {
                type $t = u16;
                $crate::AnyCoverage::U16($expr)
            }
            $crate::SampleType::Int32 => {
                type $t = i32;
                $crate::AnyCoverage::I32($expr)
            }
            $crate::SampleType::Uint32 => {
                type $t = u32;
                $crate::AnyCoverage::U32($expr)
            }
            $crate::SampleType::Float32 => {
                type $t = f32;
                $crate::AnyCoverage::F32($expr)
            }
            $crate::SampleType::Float64 => {
                type $t = f64;
                $crate::AnyCoverage::F64($expr)
            }
        }
    };
}
