#![warn(clippy::unwrap_used)]
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use env_logger::{Env, TimestampPrecision};
use geo::{Interpolation, formats::bil};
use mapresponse::{CancellationToken, GeoTiffFileSource, LayerCatalog, MapRequest, OutputFormat, ResponseConfig};

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser, Debug)]
#[clap(name = "bilexport", about = "Export a map window of a GeoTIFF as raw BIL or GeoTIFF")]
pub struct Opt {
    #[arg(long = "input", short = 'i')]
    pub input: PathBuf,

    #[arg(long = "output", short = 'o')]
    pub output: PathBuf,

    /// min x, min y, max x, max y in the reference system of the request
    #[arg(long = "bbox", value_delimiter = ',', num_args = 4, allow_negative_numbers = true)]
    pub bbox: Vec<f64>,

    /// Reference system of the bounding box, defaults to the reference system of the input
    #[arg(long = "crs")]
    pub crs: Option<String>,

    #[arg(long = "width", short = 'x')]
    pub width: usize,

    #[arg(long = "height", short = 'y')]
    pub height: usize,

    #[arg(long = "format", short = 'f', default_value = "image/bil")]
    pub format: String,

    #[arg(long = "interpolation", value_name = "nearest|bilinear", default_value = "nearest")]
    pub interpolation: Interpolation,

    /// JSON response configuration
    #[arg(long = "config", short = 'c')]
    pub config: Option<PathBuf>,

    /// Write a nodata filled grid when the bounding box does not overlap the input
    #[arg(long = "fill-on-miss")]
    pub fill_on_miss: bool,

    /// Write an ESRI .hdr sidecar next to raw BIL output
    #[arg(long = "header")]
    pub header: bool,
}

fn main() -> Result<()> {
    let opt = Opt::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let config = match &opt.config {
        Some(path) => ResponseConfig::from_file(path)?,
        None => ResponseConfig::default(),
    };

    let bbox: [f64; 4] = match opt.bbox.as_slice() {
        &[min_x, min_y, max_x, max_y] => [min_x, min_y, max_x, max_y],
        _ => bail!("Expected a bounding box as min_x,min_y,max_x,max_y"),
    };

    let source = GeoTiffFileSource::open(&opt.input)?;
    let crs = opt.crs.clone().unwrap_or_else(|| source.metadata().geometry.crs().to_string());
    let layer = layer_name(&opt.input);
    let catalog = LayerCatalog::new().with_layer(layer.clone(), source);

    let request = MapRequest {
        bbox,
        crs,
        width: opt.width,
        height: opt.height,
        format: opt.format.clone(),
        interpolation: opt.interpolation,
        layers: vec![layer],
        fill_on_miss: opt.fill_on_miss.then_some(true),
    };

    let mut data = Vec::new();
    let response = mapresponse::write_map_response(&request, &catalog, &config, &mut data, &CancellationToken::new())?;
    std::fs::write(&opt.output, &data).with_context(|| format!("Failed to write {}", opt.output.display()))?;
    log::info!("Wrote {} ({} bytes, {})", opt.output.display(), response.bytes_written, response.content_type);

    if opt.header {
        let format: OutputFormat = opt.format.parse()?;
        if !format.is_raw_bil() {
            log::warn!("No header is written for {format} output");
            return Ok(());
        }

        let header = bil::bil_header_for(
            &response.geometry,
            response.sample_type,
            response.band_count,
            response.nodata,
            config.byte_order,
        );

        let header_path = opt.output.with_extension("hdr");
        std::fs::write(&header_path, header).with_context(|| format!("Failed to write {}", header_path.display()))?;
    }

    Ok(())
}

fn layer_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("layer")
        .to_string()
}
