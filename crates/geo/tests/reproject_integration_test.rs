#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geo::{
        AnyCoverage, Coverage, Envelope, GridGeometry, Interpolation, PixelAnchor, RasterSize, Result,
        formats::geotiff::{self, Compression, GeoTiffWriteOptions},
        raster::algo::{self, ReprojectOptions},
    };

    fn index_coverage(envelope: &Envelope, width: usize, height: usize) -> Coverage<u8> {
        let geometry = GridGeometry::build(width, height, envelope, PixelAnchor::CellCenter).expect("Invalid grid");
        let data = (0..width * height).map(|i| (i % 200) as u8).collect();
        Coverage::single_band(geometry, Some(255), data).expect("Invalid coverage")
    }

    fn exact() -> ReprojectOptions {
        ReprojectOptions {
            error_threshold: 0.0,
            ..Default::default()
        }
    }

    #[test_log::test]
    fn web_mercator_round_trip() -> Result<()> {
        let source_env = Envelope::new(3.0, 50.0, 5.0, 52.0, "EPSG:4326");
        let source = index_coverage(&source_env, 40, 40);

        // every source cell is covered by 4x4 target cells, the way back hits the original cells
        let target_env = source_env.transformed("EPSG:3857")?;
        let target = GridGeometry::build(160, 160, &target_env, PixelAnchor::CellCenter)?;
        let mercator = algo::reproject(source.clone(), &target, Interpolation::Nearest, &exact())?;
        assert_eq!(mercator.crs(), "EPSG:3857");
        assert_eq!(mercator.size(), RasterSize::square(160));

        let back = algo::reproject(mercator, source.geometry(), Interpolation::Nearest, &exact())?;
        assert_eq!(back.band(0), source.band(0));
        Ok(())
    }

    #[test]
    fn crop_scale_and_store() -> Result<()> {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("cropped.tif");

        let envelope = Envelope::new(0.0, 0.0, 100.0, 100.0, "EPSG:31370");
        let coverage: AnyCoverage = index_coverage(&envelope, 10, 10).into();
        let cropped = algo::crop_any(coverage, &Envelope::new(20.0, 20.0, 60.0, 60.0, "EPSG:31370"))?;
        assert_eq!(cropped.size(), RasterSize::square(4));

        let scaled = algo::scale_any(cropped, RasterSize::square(8), Interpolation::Nearest)?;
        geotiff::write_geotiff_file(
            &scaled,
            &path,
            &GeoTiffWriteOptions {
                compression: Compression::Deflate,
            },
        )?;

        let stored = geotiff::read_geotiff(&path)?;
        assert_relative_eq!(stored.envelope(), scaled.envelope(), epsilon = 1e-9);
        assert_eq!(stored.nodata_f64(), Some(255.0));

        let samples = stored.as_coverage::<u8>()?.band(0);
        // first row of the crop: source row 4, cols 2..6
        assert_eq!(&samples[..8], &[42, 42, 43, 43, 44, 44, 45, 45]);
        assert_eq!(samples, scaled.as_coverage::<u8>()?.band(0));
        Ok(())
    }
}
