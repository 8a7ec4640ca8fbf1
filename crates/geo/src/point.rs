pub type Point<T = f64> = geo_types::Point<T>;

pub fn euclidean_distance(p1: Point, p2: Point) -> f64 {
    let delta = p1 - p2;
    delta.x().hypot(delta.y())
}

/// Linear interpolation between two points
#[inline]
pub fn linear_interpolate(start: Point, end: Point, t: f64) -> Point {
    Point::new(start.x() + t * (end.x() - start.x()), start.y() + t * (end.y() - start.y()))
}
