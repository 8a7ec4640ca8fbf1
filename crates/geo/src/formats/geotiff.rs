//! GeoTIFF encoding and decoding using the pure Rust tiff crate.
//!
//! The written files are striped, north up and georeferenced using the ModelPixelScale and ModelTiepoint tags.
//! The reference system is stored as an inline EPSG code in the GeoKey directory and the nodata value
//! in the GDAL nodata tag so the output can be consumed by GDAL based tooling.
//!
//! Single band output supports every sample type, three and four band output is written as RGB(A)
//! and requires 8 or 16 bit unsigned samples.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Cursor, Read, Seek, Write},
    path::Path,
};

use tiff::{
    decoder::{Decoder, DecodingResult, ifd::Value},
    encoder::{
        TiffEncoder, TiffValue,
        colortype::{self, ColorType},
        compression::{Deflate, Lzw, Uncompressed},
    },
    tags::Tag,
};

use crate::{
    AnyCoverage, Cell, Coverage, Epsg, Error, GeoTransform, GridGeometry, PixelAnchor, RasterSize, Result, Sample, SampleType,
    srs,
};

const TARGET_STRIP_BYTES: usize = 8 * 1024;

const GEOKEY_MODEL_TYPE: u16 = 1024;
const GEOKEY_RASTER_TYPE: u16 = 1025;
const GEOKEY_GEOGRAPHIC_TYPE: u16 = 2048;
const GEOKEY_PROJECTED_TYPE: u16 = 3072;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(rename_all = "lowercase"))]
pub enum Compression {
    None,
    #[default]
    Lzw,
    Deflate,
}

#[derive(Debug, Clone, Default)]
pub struct GeoTiffWriteOptions {
    pub compression: Compression,
}

/// The georeferencing information of a GeoTIFF file
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTiffMetadata {
    pub geometry: GridGeometry,
    pub sample_type: SampleType,
    pub band_count: usize,
    pub nodata: Option<f64>,
    pub epsg: Option<Epsg>,
}

pub fn write_geotiff_file(coverage: &AnyCoverage, path: impl AsRef<Path>, options: &GeoTiffWriteOptions) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_geotiff(coverage, &mut writer, options)?;
    writer.flush()?;
    Ok(())
}

/// Encodes the coverage in memory
pub fn encode_geotiff(coverage: &AnyCoverage, options: &GeoTiffWriteOptions) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_geotiff(coverage, &mut cursor, options)?;
    Ok(cursor.into_inner())
}

pub fn write_geotiff<W: Write + Seek>(coverage: &AnyCoverage, writer: W, options: &GeoTiffWriteOptions) -> Result<()> {
    let band_count = coverage.band_count();
    let compression = options.compression;

    match (coverage, band_count) {
        (AnyCoverage::U8(cov), 1) => write_coverage::<_, colortype::Gray8, _>(writer, cov, compression),
        (AnyCoverage::U8(cov), 3) => write_coverage::<_, colortype::RGB8, _>(writer, cov, compression),
        (AnyCoverage::U8(cov), 4) => write_coverage::<_, colortype::RGBA8, _>(writer, cov, compression),
        (AnyCoverage::U16(cov), 1) => write_coverage::<_, colortype::Gray16, _>(writer, cov, compression),
        (AnyCoverage::U16(cov), 3) => write_coverage::<_, colortype::RGB16, _>(writer, cov, compression),
        (AnyCoverage::U16(cov), 4) => write_coverage::<_, colortype::RGBA16, _>(writer, cov, compression),
        (AnyCoverage::I16(cov), 1) => write_coverage::<_, colortype::GrayI16, _>(writer, cov, compression),
        (AnyCoverage::I32(cov), 1) => write_coverage::<_, colortype::GrayI32, _>(writer, cov, compression),
        (AnyCoverage::U32(cov), 1) => write_coverage::<_, colortype::Gray32, _>(writer, cov, compression),
        (AnyCoverage::F32(cov), 1) => write_coverage::<_, colortype::Gray32Float, _>(writer, cov, compression),
        (AnyCoverage::F64(cov), 1) => write_coverage::<_, colortype::Gray64Float, _>(writer, cov, compression),
        _ => Err(Error::Encoding(format!(
            "GeoTIFF output of {band_count} band(s) of type {} is not supported",
            coverage.sample_type()
        ))),
    }
}

fn write_coverage<W, C, T>(writer: W, coverage: &Coverage<T>, compression: Compression) -> Result<()>
where
    W: Write + Seek,
    C: ColorType<Inner = T>,
    T: Sample,
    [T]: TiffValue,
{
    let mut encoder = TiffEncoder::new(writer)?;
    let size = coverage.size();
    let width = u32::try_from(size.cols).map_err(|_| Error::Encoding(format!("Raster too wide for tiff: {size}")))?;
    let height = u32::try_from(size.rows).map_err(|_| Error::Encoding(format!("Raster too high for tiff: {size}")))?;

    let geo_keys = geo_key_directory(coverage.crs())?;
    let pixel_scale = pixel_scale(coverage.geometry());
    let tie_points = tie_points(coverage.geometry());
    let nodata = coverage.nodata().map(super::nodata_string);
    let data = interleave(coverage.bands());

    let rows_per_strip = rows_per_strip(size.cols * coverage.band_count() * std::mem::size_of::<T>(), height);

    macro_rules! write_image {
        ( $compression:expr ) => {{
            let mut image = encoder.new_image_with_compression::<C, _>(width, height, $compression)?;
            image.encoder().write_tag(Tag::ModelPixelScaleTag, &pixel_scale[..])?;
            image.encoder().write_tag(Tag::ModelTiepointTag, &tie_points[..])?;
            if let Some(keys) = &geo_keys {
                image.encoder().write_tag(Tag::GeoKeyDirectoryTag, &keys[..])?;
            }
            if let Some(nodata) = &nodata {
                image.encoder().write_tag(Tag::GdalNodata, nodata.as_str())?;
            }
            image.rows_per_strip(rows_per_strip)?;
            image.write_data(&data)?;
        }};
    }

    match compression {
        Compression::None => write_image!(Uncompressed),
        Compression::Lzw => write_image!(Lzw),
        Compression::Deflate => write_image!(Deflate::default()),
    }

    log::debug!("Encoded {size} GeoTIFF with {} band(s) ({compression:?})", coverage.band_count());
    Ok(())
}

fn rows_per_strip(bytes_per_row: usize, height: u32) -> u32 {
    let rows = if bytes_per_row > 0 {
        (TARGET_STRIP_BYTES / bytes_per_row).max(1)
    } else {
        1
    };

    u32::try_from(rows).unwrap_or(u32::MAX).min(height)
}

fn pixel_scale(geometry: &GridGeometry) -> [f64; 3] {
    let transform = geometry.transform();
    [transform.cell_size_x().abs(), transform.cell_size_y().abs(), 0.0]
}

fn tie_points(geometry: &GridGeometry) -> [f64; 6] {
    let top_left = geometry.transform().top_left();
    [0.0, 0.0, 0.0, top_left.x(), top_left.y(), 0.0]
}

fn geo_key_directory(crs: &str) -> Result<Option<Vec<u16>>> {
    let spatial_ref = srs::resolve(crs)?;
    let Some(epsg) = spatial_ref.epsg() else {
        log::warn!("No EPSG code available for '{crs}', the GeoTIFF will lack a reference system");
        return Ok(None);
    };

    let (model_type, crs_key) = if spatial_ref.is_geographic() {
        (MODEL_TYPE_GEOGRAPHIC, GEOKEY_GEOGRAPHIC_TYPE)
    } else {
        (MODEL_TYPE_PROJECTED, GEOKEY_PROJECTED_TYPE)
    };

    Ok(Some(vec![
        // version, revision, minor revision, key count
        1,
        1,
        0,
        3,
        GEOKEY_MODEL_TYPE,
        0,
        1,
        model_type,
        GEOKEY_RASTER_TYPE,
        0,
        1,
        RASTER_PIXEL_IS_AREA,
        crs_key,
        0,
        1,
        epsg.code(),
    ]))
}

fn interleave<T: Copy>(bands: &[Vec<T>]) -> Vec<T> {
    if let [band] = bands {
        return band.clone();
    }

    let cell_count = bands.first().map_or(0, Vec::len);
    let mut data = Vec::with_capacity(cell_count * bands.len());
    for index in 0..cell_count {
        data.extend(bands.iter().map(|band| band[index]));
    }

    data
}

fn deinterleave<T: Copy>(data: Vec<T>, band_count: usize) -> Vec<Vec<T>> {
    if band_count == 1 {
        return vec![data];
    }

    (0..band_count)
        .map(|band| data.iter().skip(band).step_by(band_count).copied().collect())
        .collect()
}

pub fn read_geotiff(path: impl AsRef<Path>) -> Result<AnyCoverage> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| Error::SourceUnavailable(format!("{}: {err}", path.display())))?;
    read_geotiff_from(BufReader::new(file))
}

pub fn read_geotiff_metadata(path: impl AsRef<Path>) -> Result<GeoTiffMetadata> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| Error::SourceUnavailable(format!("{}: {err}", path.display())))?;
    let mut decoder = Decoder::new(BufReader::new(file))?.with_limits(tiff::decoder::Limits::unlimited());
    read_metadata(&mut decoder)
}

pub fn read_geotiff_from<R: Read + Seek>(reader: R) -> Result<AnyCoverage> {
    let mut decoder = Decoder::new(reader)?.with_limits(tiff::decoder::Limits::unlimited());
    let meta = read_metadata(&mut decoder)?;
    let window = DecodedWindow::full(&meta);
    decoded_coverage(decoder.read_image()?, meta.geometry, meta.nodata, &window)
}

/// Reads the `size` pixels starting at `top_left` from a GeoTIFF file.
///
/// Striped files only decode the strips that overlap the rows of the window.
pub fn read_geotiff_window(path: impl AsRef<Path>, top_left: Cell, size: RasterSize) -> Result<AnyCoverage> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| Error::SourceUnavailable(format!("{}: {err}", path.display())))?;
    read_geotiff_window_from(BufReader::new(file), top_left, size)
}

pub fn read_geotiff_window_from<R: Read + Seek>(reader: R, top_left: Cell, size: RasterSize) -> Result<AnyCoverage> {
    let mut decoder = Decoder::new(reader)?.with_limits(tiff::decoder::Limits::unlimited());
    let meta = read_metadata(&mut decoder)?;
    let geometry = meta.geometry.window(top_left, size)?;

    let row_start = top_left.row as usize;
    let (decoded, first_decoded_row) = if is_chunky_striped(&mut decoder)? {
        let rows_per_strip = decoder
            .get_tag_u32(Tag::RowsPerStrip)
            .map_or(meta.geometry.rows(), |rows| rows as usize)
            .clamp(1, meta.geometry.rows());
        let first_strip = row_start / rows_per_strip;
        let last_strip = (row_start + size.rows - 1) / rows_per_strip;
        log::debug!("Decoding strips {first_strip}..={last_strip} ({rows_per_strip} rows per strip)");

        let mut decoded = decoder.read_chunk(first_strip as u32)?;
        for strip in first_strip + 1..=last_strip {
            append_strip(&mut decoded, decoder.read_chunk(strip as u32)?)?;
        }
        (decoded, first_strip * rows_per_strip)
    } else {
        (decoder.read_image()?, 0)
    };

    let window = DecodedWindow {
        row_offset: row_start - first_decoded_row,
        rows: size.rows,
        col_start: top_left.col as usize,
        cols: size.cols,
        raster_cols: meta.geometry.cols(),
        band_count: meta.band_count,
    };

    decoded_coverage(decoded, geometry, meta.nodata, &window)
}

fn is_chunky_striped<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<bool> {
    let tiled = decoder.find_tag(Tag::TileWidth)?.is_some();
    let planar = matches!(decoder.find_tag(Tag::PlanarConfiguration)?, Some(Value::Short(2)));
    Ok(!tiled && !planar)
}

fn append_strip(decoded: &mut DecodingResult, strip: DecodingResult) -> Result<()> {
    match (decoded, strip) {
        (DecodingResult::U8(data), DecodingResult::U8(strip)) => data.extend(strip),
        (DecodingResult::U16(data), DecodingResult::U16(strip)) => data.extend(strip),
        (DecodingResult::U32(data), DecodingResult::U32(strip)) => data.extend(strip),
        (DecodingResult::I8(data), DecodingResult::I8(strip)) => data.extend(strip),
        (DecodingResult::I16(data), DecodingResult::I16(strip)) => data.extend(strip),
        (DecodingResult::I32(data), DecodingResult::I32(strip)) => data.extend(strip),
        (DecodingResult::F32(data), DecodingResult::F32(strip)) => data.extend(strip),
        (DecodingResult::F64(data), DecodingResult::F64(strip)) => data.extend(strip),
        _ => return Err(Error::Encoding("Unsupported or inconsistent strip sample types".into())),
    }

    Ok(())
}

/// Location of the requested pixels within the decoded pixel interleaved rows
struct DecodedWindow {
    /// First requested row relative to the first decoded row
    row_offset: usize,
    rows: usize,
    col_start: usize,
    cols: usize,
    raster_cols: usize,
    band_count: usize,
}

impl DecodedWindow {
    fn full(meta: &GeoTiffMetadata) -> Self {
        DecodedWindow {
            row_offset: 0,
            rows: meta.geometry.rows(),
            col_start: 0,
            cols: meta.geometry.cols(),
            raster_cols: meta.geometry.cols(),
            band_count: meta.band_count,
        }
    }

    /// Extracts the window and splits it in bands
    fn extract<T: Copy>(&self, data: Vec<T>) -> Result<Vec<Vec<T>>> {
        let row_len = self.raster_cols * self.band_count;
        if data.len() < (self.row_offset + self.rows) * row_len {
            return Err(Error::Encoding(format!(
                "Decoded {} samples, expected at least {}",
                data.len(),
                (self.row_offset + self.rows) * row_len
            )));
        }

        if self.row_offset == 0 && self.cols == self.raster_cols && data.len() == self.rows * row_len {
            return Ok(deinterleave(data, self.band_count));
        }

        let mut window = Vec::with_capacity(self.rows * self.cols * self.band_count);
        for row in self.row_offset..self.row_offset + self.rows {
            let start = row * row_len + self.col_start * self.band_count;
            window.extend_from_slice(&data[start..start + self.cols * self.band_count]);
        }

        Ok(deinterleave(window, self.band_count))
    }
}

fn decoded_coverage(decoded: DecodingResult, geometry: GridGeometry, nodata: Option<f64>, window: &DecodedWindow) -> Result<AnyCoverage> {
    Ok(match decoded {
        DecodingResult::U8(data) => create_coverage(geometry, nodata, window.extract(data)?)?.into(),
        DecodingResult::U16(data) => create_coverage(geometry, nodata, window.extract(data)?)?.into(),
        DecodingResult::U32(data) => create_coverage(geometry, nodata, window.extract(data)?)?.into(),
        DecodingResult::I8(data) => {
            let data = data.into_iter().map(i16::from).collect();
            create_coverage(geometry, nodata, window.extract(data)?)?.into()
        }
        DecodingResult::I16(data) => create_coverage(geometry, nodata, window.extract(data)?)?.into(),
        DecodingResult::I32(data) => create_coverage(geometry, nodata, window.extract(data)?)?.into(),
        DecodingResult::F32(data) => create_coverage(geometry, nodata, window.extract(data)?)?.into(),
        DecodingResult::F64(data) => create_coverage(geometry, nodata, window.extract(data)?)?.into(),
        DecodingResult::U64(_) | DecodingResult::I64(_) => {
            return Err(Error::Encoding("64 bit integer GeoTIFF samples are not supported".into()));
        }
    })
}

fn create_coverage<T: Sample>(geometry: GridGeometry, nodata: Option<f64>, bands: Vec<Vec<T>>) -> Result<Coverage<T>> {
    let nodata = nodata.and_then(num::cast::<f64, T>);
    Coverage::new(geometry, nodata, bands)
}

fn read_metadata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<GeoTiffMetadata> {
    let (width, height) = decoder.dimensions()?;
    let size = RasterSize::with_width_height(width as usize, height as usize);

    let (sample_type, band_count) = read_sample_layout(decoder)?;
    let transform = read_geo_transform(decoder)?;
    let epsg = read_epsg(decoder)?;
    let nodata = read_nodata_value(decoder);

    let crs = epsg.map(|epsg| epsg.to_string()).unwrap_or_default();
    if crs.is_empty() {
        return Err(Error::Encoding("GeoTIFF does not contain an EPSG reference system".into()));
    }

    Ok(GeoTiffMetadata {
        geometry: GridGeometry::from_transform(size, transform, crs, PixelAnchor::CellCenter)?,
        sample_type,
        band_count,
        nodata,
        epsg,
    })
}

fn read_sample_layout<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<(SampleType, usize)> {
    let (bit_depth, band_count) = match decoder.colortype()? {
        tiff::ColorType::Gray(bits) => (bits, 1),
        tiff::ColorType::RGB(bits) => (bits, 3),
        tiff::ColorType::RGBA(bits) => (bits, 4),
        tiff::ColorType::Multiband { bit_depth, num_samples } => (bit_depth, num_samples as usize),
        color_type => {
            return Err(Error::Encoding(format!("Unsupported tiff color type: {color_type:?}")));
        }
    };

    // single band files store one Short, multi band files one per sample, absent means unsigned integer
    let sample_format = match decoder.find_tag(Tag::SampleFormat)? {
        None => 1,
        Some(Value::Short(format)) => format,
        Some(Value::List(formats)) => match formats.first() {
            Some(Value::Short(format)) => *format,
            _ => return Err(Error::Encoding(format!("Unexpected sample format information: {formats:?}"))),
        },
        Some(value) => {
            return Err(Error::Encoding(format!("Unexpected sample format information: {value:?}")));
        }
    };

    let sample_type = match (sample_format, bit_depth) {
        (1, 8) => SampleType::Uint8,
        (1, 16) => SampleType::Uint16,
        (1, 32) => SampleType::Uint32,
        (2, 8) | (2, 16) => SampleType::Int16,
        (2, 32) => SampleType::Int32,
        (3, 32) => SampleType::Float32,
        (3, 64) => SampleType::Float64,
        (format, bits) => {
            return Err(Error::Encoding(format!("Unsupported sample format {format} with {bits} bits")));
        }
    };

    Ok((sample_type, band_count))
}

fn read_geo_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<GeoTransform> {
    if let Ok(values) = decoder.get_tag_f64_vec(Tag::ModelTransformationTag) {
        if values.len() < 8 {
            return Err(Error::Encoding("ModelTransformation must have 16 values".into()));
        }

        return Ok(GeoTransform::new([values[3], values[0], values[1], values[7], values[4], values[5]]));
    }

    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| Error::Encoding("No georeferencing present in tiff".into()))?;
    if scale.len() < 2 || scale[0] == 0.0 || scale[1] == 0.0 {
        return Err(Error::Encoding("No cell sizes present in geotiff".into()));
    }

    let tie_points = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| Error::Encoding("ModelTiepoint tag not found".into()))?;
    if tie_points.len() < 6 {
        return Err(Error::Encoding("ModelTiepoint must have 6 values".into()));
    }

    let cell_size_x = scale[0];
    let cell_size_y = -scale[1];
    Ok(GeoTransform::new([
        tie_points[3] - tie_points[0] * cell_size_x,
        cell_size_x,
        0.0,
        tie_points[4] - tie_points[1] * cell_size_y,
        0.0,
        cell_size_y,
    ]))
}

fn read_nodata_value<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let nodata = decoder.get_tag_ascii_string(Tag::GdalNodata).ok()?;
    let nodata = nodata.trim_matches(char::from(0)).trim();
    if nodata.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }

    nodata.parse::<f64>().ok()
}

fn read_epsg<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Option<Epsg>> {
    let Ok(key_dir) = decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag) else {
        return Ok(None);
    };

    if key_dir.len() < 4 {
        return Ok(None);
    }

    if key_dir[0] != 1 {
        return Err(Error::Encoding(format!("Unexpected key directory version: {}", key_dir[0])));
    }

    let mut projected = None;
    let mut geographic = None;
    for key in key_dir[4..].chunks_exact(4) {
        let inline = key[1] == 0 && key[2] == 1;
        match key[0] {
            GEOKEY_PROJECTED_TYPE if inline => projected = Some(Epsg::new(key[3])),
            GEOKEY_GEOGRAPHIC_TYPE if inline => geographic = Some(Epsg::new(key[3])),
            GEOKEY_PROJECTED_TYPE | GEOKEY_GEOGRAPHIC_TYPE => {
                return Err(Error::Encoding("Only inline EPSG codes are supported".into()));
            }
            _ => {}
        }
    }

    Ok(projected.or(geographic))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Envelope, Nodata,
        testutils::{assert_band_eq, create_index_coverage},
    };
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    fn lambert_envelope() -> Envelope {
        Envelope::new(22000.0, 153000.0, 22400.0, 153300.0, "EPSG:31370")
    }

    fn assert_same_grid(actual: &GridGeometry, expected: &GridGeometry) {
        assert!(actual.is_aligned_with(expected), "{actual:?} != {expected:?}");
        assert_relative_eq!(actual.envelope(), expected.envelope(), epsilon = 1e-6);
    }

    #[test_log::test]
    fn round_trip_u8_file() -> Result<()> {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("u8.tif");

        let coverage = create_index_coverage::<u8>(lambert_envelope(), 40, 30);
        write_geotiff_file(&coverage.clone().into(), &path, &GeoTiffWriteOptions::default())?;

        let read = read_geotiff(&path)?.into_coverage::<u8>()?;
        assert_same_grid(read.geometry(), coverage.geometry());
        assert_eq!(read.nodata(), Some(u8::NODATA));
        assert_eq!(read.band(0), coverage.band(0));
        Ok(())
    }

    #[test]
    fn compression_does_not_alter_samples() -> Result<()> {
        let coverage: AnyCoverage = create_index_coverage::<i16>(lambert_envelope(), 64, 48).into();

        for compression in [Compression::None, Compression::Lzw, Compression::Deflate] {
            let encoded = encode_geotiff(&coverage, &GeoTiffWriteOptions { compression })?;
            let decoded = read_geotiff_from(Cursor::new(encoded))?;
            assert_eq!(decoded.sample_type(), SampleType::Int16);
            assert_eq!(decoded.as_coverage::<i16>()?.band(0), coverage.as_coverage::<i16>()?.band(0));
        }

        Ok(())
    }

    #[test]
    fn float_nodata_is_preserved() -> Result<()> {
        let geometry = GridGeometry::build(3, 2, &lambert_envelope(), PixelAnchor::CellCenter)?;
        let coverage = Coverage::single_band(geometry, Some(f32::NAN), vec![1.5f32, f32::NAN, -3.0, 4.25, 0.0, 6.0])?;

        let encoded = encode_geotiff(&coverage.clone().into(), &GeoTiffWriteOptions::default())?;
        let decoded = read_geotiff_from(Cursor::new(encoded))?.into_coverage::<f32>()?;

        assert!(decoded.nodata().is_some_and(f32::is_nan));
        assert_band_eq(decoded.band(0), coverage.band(0));
        Ok(())
    }

    #[test]
    fn integer_nodata_is_preserved() -> Result<()> {
        let geometry = GridGeometry::build(2, 2, &lambert_envelope(), PixelAnchor::CellCenter)?;
        let coverage = Coverage::single_band(geometry, Some(-9999i32), vec![1, -9999, 3, 4])?;

        let encoded = encode_geotiff(&coverage.into(), &GeoTiffWriteOptions::default())?;
        let meta_decoded = read_geotiff_from(Cursor::new(encoded))?;
        assert_eq!(meta_decoded.nodata_f64(), Some(-9999.0));
        assert_eq!(meta_decoded.as_coverage::<i32>()?.band(0), &[1, -9999, 3, 4]);
        Ok(())
    }

    #[test]
    fn rgb_bands() -> Result<()> {
        let geometry = GridGeometry::build(2, 2, &lambert_envelope(), PixelAnchor::CellCenter)?;
        let bands = vec![vec![1u8, 2, 3, 4], vec![10, 20, 30, 40], vec![100, 110, 120, 130]];
        let coverage = Coverage::new(geometry, None, bands.clone())?;

        let encoded = encode_geotiff(&coverage.into(), &GeoTiffWriteOptions::default())?;
        let decoded = read_geotiff_from(Cursor::new(encoded))?.into_coverage::<u8>()?;
        assert_eq!(decoded.band_count(), 3);
        assert_eq!(decoded.bands(), &bands[..]);
        Ok(())
    }

    #[test]
    fn unsupported_band_layout() -> Result<()> {
        let geometry = GridGeometry::build(2, 1, &lambert_envelope(), PixelAnchor::CellCenter)?;
        let coverage = Coverage::new(geometry.clone(), None, vec![vec![1.0f32, 2.0], vec![3.0, 4.0]])?;
        assert!(matches!(
            encode_geotiff(&coverage.into(), &GeoTiffWriteOptions::default()),
            Err(Error::Encoding(_))
        ));

        let coverage = Coverage::new(geometry, None, vec![vec![1u8, 2], vec![3, 4]])?;
        assert!(matches!(
            encode_geotiff(&coverage.into(), &GeoTiffWriteOptions::default()),
            Err(Error::Encoding(_))
        ));
        Ok(())
    }

    #[test]
    fn geographic_reference_system() -> Result<()> {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("wgs84.tif");

        let envelope = Envelope::new(2.5, 49.5, 6.5, 51.5, "EPSG:4326");
        let coverage = create_index_coverage::<f64>(envelope.clone(), 8, 4);
        write_geotiff_file(&coverage.into(), &path, &GeoTiffWriteOptions::default())?;

        let meta = read_geotiff_metadata(&path)?;
        assert_eq!(meta.epsg, Some(Epsg::new(4326)));
        assert_eq!(meta.sample_type, SampleType::Float64);
        assert_eq!(meta.band_count, 1);
        assert_eq!(meta.geometry.size(), RasterSize::with_width_height(8, 4));
        assert_relative_eq!(meta.geometry.envelope(), &envelope, epsilon = 1e-9);
        assert_relative_eq!(meta.geometry.resolution().0, 0.5);
        assert_relative_eq!(meta.geometry.resolution().1, 0.5);
        Ok(())
    }

    #[test]
    fn sample_types_are_detected() -> Result<()> {
        let envelope = lambert_envelope();
        let coverages: [AnyCoverage; 7] = [
            create_index_coverage::<u8>(envelope.clone(), 4, 3).into(),
            create_index_coverage::<u16>(envelope.clone(), 4, 3).into(),
            create_index_coverage::<u32>(envelope.clone(), 4, 3).into(),
            create_index_coverage::<i16>(envelope.clone(), 4, 3).into(),
            create_index_coverage::<i32>(envelope.clone(), 4, 3).into(),
            create_index_coverage::<f32>(envelope.clone(), 4, 3).into(),
            create_index_coverage::<f64>(envelope, 4, 3).into(),
        ];

        for coverage in coverages {
            let encoded = encode_geotiff(&coverage, &GeoTiffWriteOptions::default())?;
            let decoded = read_geotiff_from(Cursor::new(encoded))?;
            assert_eq!(decoded.sample_type(), coverage.sample_type());
        }

        Ok(())
    }

    #[test_log::test]
    fn window_from_striped_file() -> Result<()> {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("striped.tif");

        // 400 bytes per row gives strips of 20 rows
        let coverage = create_index_coverage::<f32>(lambert_envelope(), 100, 100);
        write_geotiff_file(&coverage.clone().into(), &path, &GeoTiffWriteOptions::default())?;

        let top_left = Cell::from_row_col(37, 11);
        let size = RasterSize::with_rows_cols(30, 20);
        let window = read_geotiff_window(&path, top_left, size)?.into_coverage::<f32>()?;

        let expected = coverage.geometry().window(top_left, size)?;
        assert_same_grid(window.geometry(), &expected);
        assert_eq!(window.nodata(), coverage.nodata());
        for row in 0..30 {
            for col in 0..20 {
                assert_eq!(
                    window.cell_value(0, Cell::from_row_col(row, col)),
                    coverage.cell_value(0, Cell::from_row_col(row + 37, col + 11))
                );
            }
        }

        Ok(())
    }

    #[test]
    fn window_within_a_single_strip() -> Result<()> {
        let geometry = GridGeometry::build(2, 3, &lambert_envelope(), PixelAnchor::CellCenter)?;
        let bands = vec![vec![1u8, 2, 3, 4, 5, 6], vec![10, 20, 30, 40, 50, 60], vec![100, 110, 120, 130, 140, 150]];
        let coverage = Coverage::new(geometry, None, bands)?;

        let encoded = encode_geotiff(&coverage.into(), &GeoTiffWriteOptions::default())?;
        let window = read_geotiff_window_from(Cursor::new(encoded), Cell::from_row_col(1, 1), RasterSize::with_rows_cols(2, 1))?
            .into_coverage::<u8>()?;

        assert_eq!(window.band_count(), 3);
        assert_eq!(window.bands(), &[vec![4, 6], vec![40, 60], vec![130, 150]]);
        Ok(())
    }

    #[test]
    fn window_outside_of_the_file() -> Result<()> {
        let coverage: AnyCoverage = create_index_coverage::<u8>(lambert_envelope(), 10, 10).into();
        let encoded = encode_geotiff(&coverage, &GeoTiffWriteOptions::default())?;

        assert!(matches!(
            read_geotiff_window_from(Cursor::new(encoded), Cell::from_row_col(5, 5), RasterSize::square(6)),
            Err(Error::InvalidGrid(_))
        ));
        Ok(())
    }

    #[test]
    fn missing_file() {
        assert!(matches!(read_geotiff("/this/path/does/not/exist.tif"), Err(Error::SourceUnavailable(_))));
    }

    #[test]
    fn strip_size() {
        assert_eq!(rows_per_strip(100, 1000), 81);
        assert_eq!(rows_per_strip(100, 10), 10);
        assert_eq!(rows_per_strip(100_000, 10), 1);
    }

    #[test]
    fn band_interleaving() {
        let bands = vec![vec![1, 2, 3], vec![4, 5, 6]];
        let data = interleave(&bands);
        assert_eq!(data, vec![1, 4, 2, 5, 3, 6]);
        assert_eq!(deinterleave(data, 2), bands);
    }
}
