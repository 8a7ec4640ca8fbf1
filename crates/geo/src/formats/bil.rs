//! Raw band interleaved by line output.
//!
//! For every row of the grid the samples of the first band are written, followed by the samples of the
//! same row of the next band, and so on. There is no header in the data stream, an ESRI style `.hdr`
//! sidecar describing the layout can be generated with [`bil_header`].

use std::io::Write;

use crate::{ByteOrder, Coverage, GridGeometry, Result, Sample, SampleType};

/// Encodes the coverage in memory
pub fn encode_bil<T: Sample>(coverage: &Coverage<T>, byte_order: ByteOrder) -> Vec<u8> {
    let size = coverage.size();
    let mut buffer = Vec::with_capacity(size.cell_count() * coverage.band_count() * T::TYPE.byte_width());

    for row in 0..size.rows {
        let row_range = row * size.cols..(row + 1) * size.cols;
        for band in coverage.bands() {
            for &sample in &band[row_range.clone()] {
                sample.write_bytes(byte_order, &mut buffer);
            }
        }
    }

    buffer
}

pub fn write_bil<T: Sample, W: Write>(coverage: &Coverage<T>, writer: &mut W, byte_order: ByteOrder) -> Result<()> {
    writer.write_all(&encode_bil(coverage, byte_order))?;
    Ok(())
}

/// ESRI BIL header describing the encoded data
pub fn bil_header<T: Sample>(coverage: &Coverage<T>, byte_order: ByteOrder) -> String {
    bil_header_for(
        coverage.geometry(),
        T::TYPE,
        coverage.band_count(),
        coverage.nodata().map(|nodata| nodata.as_f64()),
        byte_order,
    )
}

/// ESRI BIL header for data that is no longer available as coverage
pub fn bil_header_for(
    geometry: &GridGeometry,
    sample_type: SampleType,
    band_count: usize,
    nodata: Option<f64>,
    byte_order: ByteOrder,
) -> String {
    let size = geometry.size();
    let (res_x, res_y) = geometry.resolution();
    let upper_left_center = geometry.cell_center(crate::Cell::from_row_col(0, 0));

    let pixel_type = if sample_type.is_floating_point() {
        "FLOAT"
    } else if sample_type.is_signed() {
        "SIGNEDINT"
    } else {
        "UNSIGNEDINT"
    };

    let row_bytes = size.cols * sample_type.byte_width();

    let mut hdr = String::new();
    hdr.push_str(&format!("BYTEORDER {}\n", if byte_order == ByteOrder::BigEndian { "M" } else { "I" }));
    hdr.push_str("LAYOUT BIL\n");
    hdr.push_str(&format!("NROWS {}\n", size.rows));
    hdr.push_str(&format!("NCOLS {}\n", size.cols));
    hdr.push_str(&format!("NBANDS {band_count}\n"));
    hdr.push_str(&format!("NBITS {}\n", sample_type.byte_width() * 8));
    hdr.push_str(&format!("BANDROWBYTES {row_bytes}\n"));
    hdr.push_str(&format!("TOTALROWBYTES {}\n", row_bytes * band_count));
    hdr.push_str(&format!("PIXELTYPE {pixel_type}\n"));
    hdr.push_str(&format!("ULXMAP {}\n", upper_left_center.x()));
    hdr.push_str(&format!("ULYMAP {}\n", upper_left_center.y()));
    hdr.push_str(&format!("XDIM {res_x}\n"));
    hdr.push_str(&format!("YDIM {res_y}\n"));
    if let Some(nodata) = nodata {
        hdr.push_str(&format!("NODATA {}\n", super::nodata_string(nodata)));
    }

    hdr
}
