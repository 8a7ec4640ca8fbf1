use proj4rs::Proj;
use proj4rs::proj::ProjType;
use proj4rs::transform::transform;

use crate::Error;
use crate::Point;
use crate::Result;
use crate::crs::Epsg;
use crate::crs::epsg;

#[derive(Debug, Clone)]
pub struct SpatialReference {
    srs: Proj,
    epsg: Option<Epsg>,
    proj_str: String,
}

impl SpatialReference {
    pub fn from_proj(projection: &str) -> Result<Self> {
        if projection.trim().is_empty() {
            return Err(Error::Projection("Empty projection string".into()));
        }

        Ok(Self {
            srs: Proj::from_proj_string(projection).map_err(|e| Error::Projection(format!("Invalid proj string '{projection}': {e}")))?,
            proj_str: projection.to_string(),
            epsg: None,
        })
    }

    pub fn from_epsg(epsg: Epsg) -> Result<Self> {
        let proj_str = crs_definitions::from_code(epsg.code())
            .map(|def| def.proj4.to_string())
            .ok_or_else(|| Error::Projection(format!("Unknown CRS: {epsg}")))?;

        let srs = Proj::from_proj_string(&proj_str).map_err(|e| Error::Projection(format!("Failed to create {epsg}: {e}")))?;

        Ok(Self {
            srs,
            proj_str,
            epsg: Some(epsg),
        })
    }

    /// Accepts `EPSG:<code>`, the OGC `CRS:84` alias, `WGS84` or a proj string
    pub fn from_definition(def: &str) -> Result<Self> {
        let def = def.trim();
        if def.eq_ignore_ascii_case("CRS:84") || def.eq_ignore_ascii_case("WGS84") {
            return Self::from_epsg(epsg::WGS84);
        }

        if def.starts_with('+') {
            return Self::from_proj(def);
        }

        match def.parse::<Epsg>() {
            Ok(epsg) => Self::from_epsg(epsg),
            Err(_) => Err(Error::Projection(format!("Unsupported CRS definition: '{def}'"))),
        }
    }

    pub fn to_proj(&self) -> &str {
        &self.proj_str
    }

    pub fn is_projected(&self) -> bool {
        self.srs.projection_type() != ProjType::Latlong
    }

    pub fn is_geographic(&self) -> bool {
        self.srs.projection_type() == ProjType::Latlong
    }

    pub fn epsg(&self) -> Option<Epsg> {
        self.epsg
    }

    pub fn is_equivalent(&self, other: &SpatialReference) -> bool {
        match (self.epsg, other.epsg) {
            (Some(lhs), Some(rhs)) => lhs == rhs,
            _ => self.proj_str.trim() == other.proj_str.trim(),
        }
    }

    fn proj(&self) -> &Proj {
        &self.srs
    }
}

/// Transforms points between two reference systems.
/// Geographic coordinates are passed and returned in degrees (x = longitude, y = latitude).
pub struct CoordinateTransformer {
    source: SpatialReference,
    target: SpatialReference,
    source_srs: String,
    target_srs: String,
    identity: bool,
}

impl CoordinateTransformer {
    pub fn new(source_srs: &str, target_srs: &str) -> Result<Self> {
        let source = SpatialReference::from_definition(source_srs)?;
        let target = SpatialReference::from_definition(target_srs)?;
        let identity = source.is_equivalent(&target);

        Ok(CoordinateTransformer {
            source,
            target,
            source_srs: source_srs.into(),
            target_srs: target_srs.into(),
            identity,
        })
    }

    pub fn from_epsg(source_epsg: Epsg, target_epsg: Epsg) -> Result<Self> {
        let source = SpatialReference::from_epsg(source_epsg)?;
        let target = SpatialReference::from_epsg(target_epsg)?;

        Ok(CoordinateTransformer {
            source,
            target,
            source_srs: source_epsg.to_string(),
            target_srs: target_epsg.to_string(),
            identity: source_epsg == target_epsg,
        })
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }

    pub fn transform_point(&self, point: Point) -> Result<Point> {
        if self.identity {
            return Ok(point);
        }

        let mut p = if self.source.is_geographic() { point.to_radians() } else { point };
        transform(self.source.proj(), self.target.proj(), &mut p)
            .map_err(|e| Error::Projection(format!("{} -> {} failed for ({}, {}): {e}", self.source_srs, self.target_srs, point.x(), point.y())))?;

        if self.target.is_geographic() {
            // Convert back to degrees if the target is a geographic coordinate system
            p = p.to_degrees();
        }

        if !p.x().is_finite() || !p.y().is_finite() {
            return Err(Error::Projection(format!(
                "{} -> {} produced a non finite coordinate for ({}, {})",
                self.source_srs,
                self.target_srs,
                point.x(),
                point.y()
            )));
        }

        Ok(p)
    }

    pub fn transform_points_in_place(&self, points: &mut [Point]) -> Result<()> {
        if self.identity {
            return Ok(());
        }

        for point in points.iter_mut() {
            *point = self.transform_point(*point)?;
        }
        Ok(())
    }

    /// Transforms the points, points that could not be transformed are reported as `None`
    pub fn try_transform_points(&self, points: &[Point]) -> Vec<Option<Point>> {
        points.iter().map(|p| self.transform_point(*p).ok()).collect()
    }

    pub fn source_srs(&self) -> &str {
        &self.source_srs
    }

    pub fn target_srs(&self) -> &str {
        &self.target_srs
    }
}
