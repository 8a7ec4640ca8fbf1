//! Axis aligned bounding rectangles tagged with their coordinate reference system.

use approx::{AbsDiffEq, RelativeEq};

use crate::{Error, Point, Result, srs};

/// Number of points sampled along each edge when transforming an envelope
pub const DEFAULT_EDGE_POINTS: usize = 21;
const MIN_EDGE_POINTS: usize = 2;

/// Rectangle in world coordinates of the reference system identified by `crs`.
///
/// An envelope where `min > max` (or with a zero extent) is valid and considered empty,
/// it is for example the result of intersecting two disjoint envelopes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Envelope {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
    crs: String,
}

impl Envelope {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64, crs: impl Into<String>) -> Self {
        Envelope {
            min_x,
            min_y,
            max_x,
            max_y,
            crs: crs.into(),
        }
    }

    pub fn from_points(p1: Point, p2: Point, crs: impl Into<String>) -> Self {
        Envelope::new(
            p1.x().min(p2.x()),
            p1.y().min(p2.y()),
            p1.x().max(p2.x()),
            p1.y().max(p2.y()),
            crs,
        )
    }

    pub fn empty(crs: impl Into<String>) -> Self {
        Envelope::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY, crs)
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn crs(&self) -> &str {
        &self.crs
    }

    /// Zero for empty envelopes
    pub fn width(&self) -> f64 {
        if self.max_x > self.min_x { self.max_x - self.min_x } else { 0.0 }
    }

    /// Zero for empty envelopes
    pub fn height(&self) -> f64 {
        if self.max_y > self.min_y { self.max_y - self.min_y } else { 0.0 }
    }

    pub fn is_empty(&self) -> bool {
        // also covers NaN bounds
        !(self.max_x > self.min_x && self.max_y > self.min_y)
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.min_x, self.max_y)
    }

    pub fn top_right(&self) -> Point {
        Point::new(self.max_x, self.max_y)
    }

    pub fn bottom_left(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.max_x, self.min_y)
    }

    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    pub fn contains_point(&self, point: Point) -> bool {
        point.x() >= self.min_x && point.x() <= self.max_x && point.y() >= self.min_y && point.y() <= self.max_y
    }

    /// Checks for an overlap with a non zero area, the reference systems are not compared
    pub fn intersects(&self, other: &Envelope) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Component wise intersection, the result is empty when the envelopes do not overlap.
    /// Both envelopes must be expressed in the same reference system.
    pub fn intersection(&self, other: &Envelope) -> Result<Envelope> {
        if !srs::same_crs(&self.crs, &other.crs) {
            return Err(Error::Projection(format!(
                "Cannot intersect envelopes in different reference systems ({} <-> {})",
                self.crs, other.crs
            )));
        }

        Ok(Envelope::new(
            self.min_x.max(other.min_x),
            self.min_y.max(other.min_y),
            self.max_x.min(other.max_x),
            self.max_y.min(other.max_y),
            self.crs.clone(),
        ))
    }

    /// Transforms the envelope to the target reference system using the default edge sampling
    pub fn transformed(&self, target_crs: &str) -> Result<Envelope> {
        if srs::same_crs(&self.crs, target_crs) {
            return Ok(Envelope { crs: target_crs.to_string(), ..self.clone() });
        }

        let coord_trans = srs::CoordinateTransformer::new(&self.crs, target_crs)?;
        self.transformed_with(&coord_trans, DEFAULT_EDGE_POINTS)
    }

    /// Transforms the envelope by sampling points along the edges and taking the bounding box of the
    /// transformed points. This is more accurate than only transforming the corners when the
    /// transformation bends straight lines.
    pub fn transformed_with(&self, coord_trans: &srs::CoordinateTransformer, edge_points: usize) -> Result<Envelope> {
        if self.is_empty() {
            return Ok(Envelope::empty(coord_trans.target_srs()));
        }

        let points_per_edge = edge_points.max(MIN_EDGE_POINTS);
        let mut all_points = Vec::with_capacity(points_per_edge * 4);

        // Every corner is added once: the top edge includes both, right and bottom include their end corner
        add_edge_points(&mut all_points, self.top_left(), self.top_right(), points_per_edge, true, true);
        add_edge_points(&mut all_points, self.top_right(), self.bottom_right(), points_per_edge, false, true);
        add_edge_points(&mut all_points, self.bottom_right(), self.bottom_left(), points_per_edge, false, true);
        add_edge_points(&mut all_points, self.bottom_left(), self.top_left(), points_per_edge, false, false);

        coord_trans.transform_points_in_place(&mut all_points)?;

        let (min_x, max_x, min_y, max_y) = all_points.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            |(min_x, max_x, min_y, max_y), point| {
                (
                    min_x.min(point.x()),
                    max_x.max(point.x()),
                    min_y.min(point.y()),
                    max_y.max(point.y()),
                )
            },
        );

        Ok(Envelope::new(min_x, min_y, max_x, max_y, coord_trans.target_srs()))
    }
}

fn add_edge_points(points: &mut Vec<Point>, start: Point, end: Point, points_per_edge: usize, include_start: bool, include_end: bool) {
    let range_start = if include_start { 0 } else { 1 };
    let range_end = if include_end { points_per_edge } else { points_per_edge - 1 };

    for i in range_start..range_end {
        let t = i as f64 / (points_per_edge - 1) as f64;
        points.push(crate::point::linear_interpolate(start, end, t));
    }
}

impl std::fmt::Display for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {} : {}, {}] ({})", self.min_x, self.min_y, self.max_x, self.max_y, self.crs)
    }
}

impl AbsDiffEq for Envelope {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.crs == other.crs
            && self.min_x.abs_diff_eq(&other.min_x, epsilon)
            && self.min_y.abs_diff_eq(&other.min_y, epsilon)
            && self.max_x.abs_diff_eq(&other.max_x, epsilon)
            && self.max_y.abs_diff_eq(&other.max_y, epsilon)
    }
}

impl RelativeEq for Envelope {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.crs == other.crs
            && self.min_x.relative_eq(&other.min_x, epsilon, max_relative)
            && self.min_y.relative_eq(&other.min_y, epsilon, max_relative)
            && self.max_x.relative_eq(&other.max_x, epsilon, max_relative)
            && self.max_y.relative_eq(&other.max_y, epsilon, max_relative)
    }
}
