#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use approx::assert_relative_eq;
    use geo::{
        AnyCoverage, Coverage, Envelope, GridGeometry, Interpolation, Nodata, PixelAnchor, RasterSize, SampleType,
        formats::geotiff,
    };
    use mapresponse::{
        CancellationToken, CoverageSource, Error, GeoTiffFileSource, LayerCatalog, MapRequest, MemoryCoverageSource,
        ResponseConfig, Result,
    };

    const LAMBERT: &str = "EPSG:31370";

    /// Counts the window reads to verify which requests reach the source
    struct CountingSource {
        inner: MemoryCoverageSource,
        reads: Arc<AtomicUsize>,
    }

    impl CoverageSource for CountingSource {
        fn original_envelope(&self) -> Envelope {
            self.inner.original_envelope()
        }

        fn native_crs(&self) -> String {
            self.inner.native_crs()
        }

        fn sample_type(&self) -> SampleType {
            self.inner.sample_type()
        }

        fn read_window(&self, envelope: &Envelope, width: usize, height: usize) -> Result<Option<AnyCoverage>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.read_window(envelope, width, height)
        }
    }

    fn byte_coverage(envelope: Envelope, width: usize, height: usize) -> Coverage<u8> {
        let geometry = GridGeometry::build(width, height, &envelope, PixelAnchor::CellCenter).expect("Invalid grid");
        let data = (0..width * height).map(|i| ((i / width + i % width) % 250) as u8).collect();
        Coverage::single_band(geometry, Some(255), data).expect("Invalid coverage")
    }

    fn float_gradient(envelope: Envelope, width: usize, height: usize) -> Coverage<f32> {
        let geometry = GridGeometry::build(width, height, &envelope, PixelAnchor::CellCenter).expect("Invalid grid");
        let data = (0..width * height).map(|i| (i % width) as f32 * 2.0 + (i / width) as f32).collect();
        Coverage::single_band(geometry, None, data).expect("Invalid coverage")
    }

    fn catalog_with_counter() -> (LayerCatalog, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            inner: MemoryCoverageSource::new(byte_coverage(Envelope::new(0.0, 0.0, 10.0, 10.0, LAMBERT), 100, 100)),
            reads: reads.clone(),
        };

        (LayerCatalog::new().with_layer("dem", source), reads)
    }

    fn request(bbox: [f64; 4], crs: &str, width: usize, height: usize, format: &str) -> MapRequest {
        MapRequest {
            bbox,
            crs: crs.to_string(),
            width,
            height,
            format: format.to_string(),
            interpolation: Interpolation::Nearest,
            layers: vec!["dem".to_string()],
            fill_on_miss: None,
        }
    }

    fn respond(catalog: &LayerCatalog, req: &MapRequest) -> Result<(mapresponse::MapResponse, Vec<u8>)> {
        let mut out = Vec::new();
        let response =
            mapresponse::write_map_response(req, catalog, &ResponseConfig::default(), &mut out, &CancellationToken::new())?;
        Ok((response, out))
    }

    #[test_log::test]
    fn sub_window_at_higher_resolution() -> Result<()> {
        let (catalog, reads) = catalog_with_counter();
        let req = request([2.0, 2.0, 8.0, 8.0], LAMBERT, 60, 60, "image/bil");

        let (response, data) = respond(&catalog, &req)?;
        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert_eq!(response.content_type, "image/bil");
        assert_eq!(response.geometry.size(), RasterSize::with_rows_cols(60, 60));
        assert_relative_eq!(
            response.geometry.envelope(),
            &Envelope::new(2.0, 2.0, 8.0, 8.0, LAMBERT),
            epsilon = 1e-9
        );
        assert_eq!(response.band_count, 1);
        assert_eq!(response.nodata, Some(255.0));
        assert_eq!(response.bytes_written, 60 * 60);
        assert_eq!(data.len(), 60 * 60);

        // top left output pixel maps to source row 20, col 20
        assert_eq!(data[0], 40);
        Ok(())
    }

    #[test]
    fn request_outside_of_the_source() -> Result<()> {
        let (catalog, _) = catalog_with_counter();
        let req = request([20.0, 20.0, 30.0, 30.0], LAMBERT, 60, 60, "image/bil");

        let mut out = Vec::new();
        let result =
            mapresponse::write_map_response(&req, &catalog, &ResponseConfig::default(), &mut out, &CancellationToken::new());
        assert!(matches!(result, Err(Error::EmptyIntersection(_))));
        assert!(out.is_empty());

        let mut req = req;
        req.fill_on_miss = Some(true);
        let (response, data) = respond(&catalog, &req)?;
        assert_eq!(response.geometry.size(), RasterSize::with_rows_cols(60, 60));
        assert!(data.iter().all(|&v| v.is_nodata()));
        Ok(())
    }

    #[test]
    fn decimated_read_stays_within_the_source() -> Result<()> {
        let source = MemoryCoverageSource::new(byte_coverage(Envelope::new(0.0, 0.0, 10.0, 10.0, LAMBERT), 10, 10));
        let catalog = LayerCatalog::new().with_layer("dem", source);

        // the source is read in blocks of 3 pixels, the last column is centered at x = 10.42
        let req = request([0.0, 0.0, 12.5, 10.0], LAMBERT, 3, 3, "image/bil");
        let (_, data) = respond(&catalog, &req)?;
        assert_eq!(data.len(), 9);
        for row in data.chunks_exact(3) {
            assert!(row[..2].iter().all(|v| !v.is_nodata()), "{data:?}");
            assert!(row[2].is_nodata(), "{data:?}");
        }
        Ok(())
    }

    #[test]
    fn multiple_layers_are_rejected_before_reading() {
        let (catalog, reads) = catalog_with_counter();
        let mut req = request([2.0, 2.0, 8.0, 8.0], LAMBERT, 60, 60, "image/bil");
        req.layers = vec!["dem".to_string(), "dem".to_string()];

        let mut out = Vec::new();
        let result =
            mapresponse::write_map_response(&req, &catalog, &ResponseConfig::default(), &mut out, &CancellationToken::new());
        assert!(matches!(result, Err(Error::Request(_))));
        assert_eq!(reads.load(Ordering::SeqCst), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn unknown_layer() {
        let (catalog, reads) = catalog_with_counter();
        let mut req = request([2.0, 2.0, 8.0, 8.0], LAMBERT, 60, 60, "image/bil");
        req.layers = vec!["landuse".to_string()];

        assert!(matches!(respond(&catalog, &req), Err(Error::Request(_))));
        assert_eq!(reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn nearest_only_returns_source_values() -> Result<()> {
        let (catalog, _) = catalog_with_counter();
        let source_values: HashSet<u8> = (0..250u8).collect();

        let req = request([1.3, 0.7, 9.1, 8.9], LAMBERT, 37, 23, "image/bil");
        let (_, data) = respond(&catalog, &req)?;
        assert_eq!(data.len(), 37 * 23);
        assert!(data.iter().all(|v| source_values.contains(v)));
        Ok(())
    }

    #[test]
    fn bilinear_stays_within_source_range() -> Result<()> {
        let source = MemoryCoverageSource::new(float_gradient(Envelope::new(0.0, 0.0, 10.0, 10.0, LAMBERT), 10, 10));
        let catalog = LayerCatalog::new().with_layer("dem", source);

        let mut req = request([2.0, 2.0, 8.0, 8.0], LAMBERT, 13, 13, "application/bandstiffloat32");
        req.interpolation = Interpolation::Bilinear;
        let (_, data) = respond(&catalog, &req)?;

        let values: Vec<f32> = data
            .chunks_exact(4)
            .map(|bytes| f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            .collect();
        assert_eq!(values.len(), 13 * 13);
        // the window covers source rows 2..8 and cols 2..8
        assert!(values.iter().all(|&v| (6.0..=21.0).contains(&v)), "{values:?}");
        Ok(())
    }

    #[test]
    fn reprojected_response() -> Result<()> {
        let source = MemoryCoverageSource::new(byte_coverage(Envelope::new(3.0, 50.0, 6.0, 52.0, "EPSG:4326"), 300, 200));
        let catalog = LayerCatalog::new().with_layer("dem", source);

        // web mercator bounds of (4, 50.5) - (5, 51.5)
        let req = request(
            [445277.96317309426, 6533849.82, 556597.4539663679, 6710219.08],
            "EPSG:3857",
            64,
            64,
            "image/bil",
        );

        let (response, data) = respond(&catalog, &req)?;
        assert_eq!(response.geometry.crs(), "EPSG:3857");
        assert_eq!(data.len(), 64 * 64);
        assert!(data.iter().all(|v| !v.is_nodata()));
        Ok(())
    }

    #[test]
    fn reprojected_response_partially_outside() -> Result<()> {
        let source = MemoryCoverageSource::new(byte_coverage(Envelope::new(4.0, 50.0, 5.0, 51.0, "EPSG:4326"), 100, 100));
        let catalog = LayerCatalog::new().with_layer("dem", source);

        // the left third of the request is outside of the source
        let req = request([3.5, 50.0, 5.0, 51.0], "CRS:84", 30, 30, "image/bil");
        let (_, data) = respond(&catalog, &req)?;
        for row in data.chunks_exact(30) {
            assert!(row[..9].iter().all(|v| v.is_nodata()));
            assert!(row[11..].iter().all(|v| !v.is_nodata()));
        }
        Ok(())
    }

    #[test]
    fn geotiff_response_from_geotiff_layer() -> Result<()> {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("dem.tif");
        let envelope = Envelope::new(0.0, 0.0, 10.0, 10.0, LAMBERT);
        geotiff::write_geotiff_file(
            &float_gradient(envelope, 50, 50).into(),
            &path,
            &geotiff::GeoTiffWriteOptions::default(),
        )?;

        let catalog = LayerCatalog::new().with_layer("dem", GeoTiffFileSource::open(&path)?);
        let req = request([0.0, 0.0, 5.0, 5.0], LAMBERT, 25, 25, "application/bandstif");
        let (response, data) = respond(&catalog, &req)?;
        assert_eq!(response.content_type, "application/bandstif");
        assert_eq!(response.sample_type, SampleType::Float32);

        let decoded = geotiff::read_geotiff_from(std::io::Cursor::new(data))?;
        assert_eq!(decoded.sample_type(), SampleType::Float32);
        assert_eq!(decoded.size(), RasterSize::with_rows_cols(25, 25));
        assert_relative_eq!(decoded.envelope(), &Envelope::new(0.0, 0.0, 5.0, 5.0, LAMBERT), epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn byte8_response_converts_samples() -> Result<()> {
        let source = MemoryCoverageSource::new(float_gradient(Envelope::new(0.0, 0.0, 10.0, 10.0, LAMBERT), 10, 10));
        let catalog = LayerCatalog::new().with_layer("dem", source);

        let req = request([0.0, 9.0, 3.0, 10.0], LAMBERT, 3, 1, "application/bandstifbyte8");
        let (response, data) = respond(&catalog, &req)?;
        assert_eq!(response.sample_type, SampleType::Uint8);
        assert_eq!(data, vec![0, 2, 4]);
        Ok(())
    }

    #[test]
    fn cancelled_before_start() {
        let (catalog, reads) = catalog_with_counter();
        let req = request([2.0, 2.0, 8.0, 8.0], LAMBERT, 60, 60, "image/bil");

        let token = CancellationToken::new();
        token.cancel();

        let mut out = Vec::new();
        let result = mapresponse::write_map_response(&req, &catalog, &ResponseConfig::default(), &mut out, &token);
        assert!(matches!(result, Err(Error::Cancelled(_))));
        assert_eq!(reads.load(Ordering::SeqCst), 0);
        assert!(out.is_empty());
    }
}
