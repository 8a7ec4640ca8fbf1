use std::io::Write;

use geo::{
    AnyCoverage, ByteOrder, dispatch_anycoverage,
    formats::{
        bil,
        geotiff::{self, Compression, GeoTiffWriteOptions},
    },
};

use crate::{Error, OutputFormat, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EncodeOptions {
    pub byte_order: ByteOrder,
    pub compression: Compression,
}

/// Converts the coverage to the sample type of the output format, formats without a fixed sample type keep it as is
pub fn convert_for_format(coverage: AnyCoverage, format: OutputFormat) -> AnyCoverage {
    match format.target_sample_type() {
        Some(sample_type) if sample_type != coverage.sample_type() => {
            log::debug!("Converting {} samples to {sample_type}", coverage.sample_type());
            coverage.cast_to(sample_type)
        }
        _ => coverage,
    }
}

/// Serializes the coverage in memory, the sample type is converted first when the format requires it
pub fn encode_to_vec(coverage: AnyCoverage, format: OutputFormat, opts: &EncodeOptions) -> Result<Vec<u8>> {
    let coverage = convert_for_format(coverage, format);

    match format {
        OutputFormat::RawBil | OutputFormat::RawBilByte8 | OutputFormat::RawBilFloat32 => {
            Ok(dispatch_anycoverage!(&coverage, cov, bil::encode_bil(cov, opts.byte_order)))
        }
        OutputFormat::GeoTiff => Ok(geotiff::encode_geotiff(
            &coverage,
            &GeoTiffWriteOptions {
                compression: opts.compression,
            },
        )?),
    }
}

/// Encodes the coverage and writes it to the output.
///
/// Nothing is written to the output before the complete response is encoded,
/// a failure never leaves a partially written response behind.
/// Returns the number of bytes written.
pub fn encode<W: Write>(coverage: AnyCoverage, out: &mut W, format: OutputFormat, opts: &EncodeOptions) -> Result<usize> {
    let data = encode_to_vec(coverage, format, opts)?;

    out.write_all(&data)
        .and_then(|_| out.flush())
        .map_err(|err| Error::Encoding(format!("Failed to write the {format} response: {err}")))?;

    Ok(data.len())
}
