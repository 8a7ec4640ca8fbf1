//! The map response pipeline: read the source window, crop, scale, reproject and encode.
//!
//! Every stage consumes the coverage of the previous stage, intermediate results are dropped as soon
//! as the next stage has produced its output. Cancellation and the deadline are checked between stages.

use std::{
    io::Write,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use geo::{
    AnyCoverage, Coverage, Envelope, GridGeometry, PixelAnchor, RasterSize, SampleType, dispatch_sampletype,
    raster::algo::{self, ReprojectOptions},
    srs::CoordinateTransformer,
};

use crate::{
    CoverageSource, EncodeOptions, Error, LayerCatalog, MapRequest, RequestContext, ResponseConfig, Result, encoder,
    reader::{Window, read_window},
};

/// Cooperative cancellation flag, clones share the same state
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Tracks the cancellation state and the deadline of a single response
struct StageGuard<'a> {
    token: &'a CancellationToken,
    start: Instant,
    deadline: Option<Duration>,
}

impl StageGuard<'_> {
    fn check(&self, stage: &str) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(Error::Cancelled(format!("Cancelled before {stage}")));
        }

        if let Some(deadline) = self.deadline {
            let elapsed = self.start.elapsed();
            if elapsed > deadline {
                return Err(Error::Cancelled(format!(
                    "Deadline of {} ms exceeded before {stage} ({} ms elapsed)",
                    deadline.as_millis(),
                    elapsed.as_millis()
                )));
            }
        }

        Ok(())
    }
}

/// Summary of a written response
#[derive(Debug, Clone, PartialEq)]
pub struct MapResponse {
    pub content_type: &'static str,
    pub geometry: GridGeometry,
    pub sample_type: SampleType,
    pub band_count: usize,
    pub nodata: Option<f64>,
    pub bytes_written: usize,
}

/// Handles a complete map request: validation, layer lookup, coverage production and encoding.
/// The output is only written once the response is completely encoded.
pub fn write_map_response<W: Write>(
    request: &MapRequest,
    catalog: &LayerCatalog,
    config: &ResponseConfig,
    out: &mut W,
    cancel: &CancellationToken,
) -> Result<MapResponse> {
    let start = Instant::now();
    let ctx = RequestContext::new(request, config)?;
    let source = catalog.layer(&ctx.layer)?;

    let coverage = produce_coverage(&ctx, source.as_ref(), config, cancel)?;
    let guard = StageGuard {
        token: cancel,
        start,
        deadline: config.deadline(),
    };
    guard.check("encoding")?;

    let coverage = encoder::convert_for_format(coverage, ctx.format);
    let geometry = coverage.geometry().clone();
    let sample_type = coverage.sample_type();
    let band_count = coverage.band_count();
    let nodata = coverage.nodata_f64();

    let opts = EncodeOptions {
        byte_order: config.byte_order,
        compression: ctx.compression,
    };
    let bytes_written = encoder::encode(coverage, out, ctx.format, &opts)?;

    log::info!(
        "Layer '{}' {} -> {}x{} {} ({} bytes) in {} ms",
        ctx.layer,
        ctx.envelope,
        ctx.width,
        ctx.height,
        ctx.format,
        bytes_written,
        start.elapsed().as_millis()
    );

    Ok(MapResponse {
        content_type: ctx.format.content_type(),
        geometry,
        sample_type,
        band_count,
        nodata,
        bytes_written,
    })
}

/// Produces the output coverage for the request: the destination grid is derived from the
/// request bounding box and output size, the source data is resampled onto it.
pub fn produce_coverage(
    ctx: &RequestContext,
    source: &dyn CoverageSource,
    config: &ResponseConfig,
    cancel: &CancellationToken,
) -> Result<AnyCoverage> {
    let guard = StageGuard {
        token: cancel,
        start: Instant::now(),
        deadline: config.deadline(),
    };

    let target = GridGeometry::build(ctx.width, ctx.height, &ctx.envelope, PixelAnchor::CellCenter)?;
    let native_crs = source.native_crs();

    guard.check("envelope transformation")?;
    let envelope_in_source_crs = envelope_in_crs(&ctx.envelope, &native_crs, config.edge_points)?;
    log::debug!("Request envelope {} in source reference system: {envelope_in_source_crs}", ctx.envelope);

    guard.check("reading")?;
    let window = match read_window(source, &envelope_in_source_crs, ctx.width, ctx.height)? {
        Window::Data(coverage) => coverage,
        Window::OutsideExtent => {
            return on_empty_intersection(
                ctx,
                source,
                target,
                config,
                format!("{} does not overlap the source extent {}", ctx.envelope, source.original_envelope()),
            );
        }
    };

    guard.check("cropping")?;
    let cropped = match algo::crop_any(window, &envelope_in_source_crs) {
        Ok(cropped) => cropped,
        Err(geo::Error::EmptyIntersection(msg)) => return on_empty_intersection(ctx, source, target, config, msg),
        Err(err) => return Err(err.into()),
    };

    guard.check("scaling")?;
    let scaled = algo::scale_any(cropped, RasterSize::with_width_height(ctx.width, ctx.height), ctx.interpolation)?;

    guard.check("reprojection")?;
    let opts = ReprojectOptions {
        error_threshold: config.error_threshold,
        fill_value: config.fill_value,
    };
    let reprojected = algo::reproject_any(scaled, &target, ctx.interpolation, &opts)?;
    log::debug!("Assembled {} coverage for {}", reprojected.sample_type(), reprojected.envelope());

    Ok(reprojected)
}

fn envelope_in_crs(envelope: &Envelope, crs: &str, edge_points: usize) -> Result<Envelope> {
    if geo::srs::same_crs(envelope.crs(), crs) {
        return Ok(Envelope::new(envelope.min_x(), envelope.min_y(), envelope.max_x(), envelope.max_y(), crs));
    }

    let transformer = CoordinateTransformer::new(envelope.crs(), crs)?;
    let transformed = envelope.transformed_with(&transformer, edge_points)?;
    if transformed.is_empty() {
        return Err(Error::Projection(format!("{envelope} has no valid extent in {crs}")));
    }

    Ok(transformed)
}

fn on_empty_intersection(
    ctx: &RequestContext,
    source: &dyn CoverageSource,
    target: GridGeometry,
    config: &ResponseConfig,
    msg: String,
) -> Result<AnyCoverage> {
    if !ctx.fill_on_miss {
        return Err(Error::EmptyIntersection(msg));
    }

    log::warn!("{msg}, responding with a nodata filled grid (fill on miss)");
    let band_count = source.band_count();
    let fill = config.fill_value;
    Ok(dispatch_sampletype!(source.sample_type(), T, filled_coverage::<T>(target, band_count, fill)))
}

fn filled_coverage<T: geo::Sample>(geometry: GridGeometry, band_count: usize, fill_value: Option<f64>) -> Coverage<T> {
    match fill_value {
        Some(fill) => {
            let fill = T::from_f64_saturating(fill);
            Coverage::filled_with(geometry, Some(fill), band_count, fill)
        }
        None => Coverage::filled_with_nodata(geometry, Some(<T as geo::Nodata>::NODATA), band_count),
    }
}
