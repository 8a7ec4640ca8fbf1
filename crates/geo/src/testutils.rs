use approx::relative_eq;

use crate::{Coverage, Envelope, GridGeometry, Nodata, PixelAnchor, Sample};

pub const NOD: f64 = 255.0;

pub fn create_vec<T: Sample>(data: &[f64]) -> Vec<T> {
    data.iter()
        .map(|&v| {
            if relative_eq!(v, NOD) {
                T::NODATA
            } else {
                num::NumCast::from(v).expect("f64 could not be converted to the specified type")
            }
        })
        .collect()
}

/// Single band coverage over the given envelope, `NOD` values in the data are turned into nodata
pub fn create_coverage<T: Sample>(envelope: Envelope, width: usize, height: usize, data: &[f64]) -> Coverage<T> {
    let geometry = GridGeometry::build(width, height, &envelope, PixelAnchor::CellCenter).expect("Invalid test grid");
    let nodata = if T::has_nan() { None } else { Some(T::NODATA) };
    Coverage::single_band(geometry, nodata, create_vec(data)).expect("Invalid test coverage")
}

/// Coverage where every cell value is `row * cols + col` (modulo 200 to fit in every sample type)
pub fn create_index_coverage<T: Sample>(envelope: Envelope, width: usize, height: usize) -> Coverage<T> {
    let data: Vec<f64> = (0..width * height).map(|i| (i % 200) as f64).collect();
    create_coverage(envelope, width, height, &data)
}

/// Compares the samples, nodata values are considered equal
pub fn assert_band_eq<T: Sample>(actual: &[T], expected: &[T]) {
    assert_eq!(actual.len(), expected.len(), "Band length mismatch");
    for (index, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(a == e || (a.is_nodata() && e.is_nodata()), "Mismatch at index {index}: {a:?} != {e:?}");
    }
}

pub fn assert_coverage_eq<T: Sample>(actual: &Coverage<T>, expected: &Coverage<T>) {
    assert_eq!(actual.geometry(), expected.geometry());
    assert_eq!(actual.band_count(), expected.band_count());
    match (actual.nodata(), expected.nodata()) {
        (Some(a), Some(e)) => assert!(a == e || (a.is_nodata() && e.is_nodata()), "Nodata mismatch: {a:?} != {e:?}"),
        (a, e) => assert_eq!(a, e),
    }

    for (a, e) in actual.bands().iter().zip(expected.bands()) {
        assert_band_eq(a, e);
    }
}
