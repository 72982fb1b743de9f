//! Geometric primitives in canonical millimetres.
//!
//! - [`Point`]: immutable, finite `(x, y)`
//! - [`Polygon`]: closed ring of at least three points (boundary, keepouts)
//! - [`Polyline`]: open path, no length requirement (trace paths)
//! - [`Circle`]: centre plus positive radius (circular keepouts)
//!
//! Also home to the two predicates the validator relies on:
//! [`Polygon::is_self_intersecting`] and [`Polygon::contains_point`].

use serde::Serialize;

use super::error::GeometryError;

/// Axis-aligned bounding box as `(min_x, min_y, max_x, max_y)`.
pub type BoundingBox = (f64, f64, f64, f64);

/// A 2D point in millimetres.
///
/// Fields are private: a `Point` cannot be changed after construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a point, rejecting NaN and infinite coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonFinite`] if either component is not finite.
    pub fn new(x: f64, y: f64) -> Result<Self, GeometryError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(GeometryError::NonFinite { x, y });
        }
        Ok(Self { x, y })
    }

    /// The origin.
    #[must_use]
    pub const fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// X coordinate in mm.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Y coordinate in mm.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Euclidean distance to `other` in mm.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Rotates counter-clockwise by `angle_deg` around `origin`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the result overflows to infinity.
    pub fn rotate(&self, angle_deg: f64, origin: &Self) -> Result<Self, GeometryError> {
        let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
        let px = self.x - origin.x;
        let py = self.y - origin.y;
        Self::new(
            px.mul_add(cos_a, -(py * sin_a)) + origin.x,
            px.mul_add(sin_a, py * cos_a) + origin.y,
        )
    }
}

/// Signed orientation of the turn `p -> q -> r`.
///
/// Zero means collinear; the sign distinguishes clockwise from
/// counter-clockwise.
fn orient(p: &Point, q: &Point, r: &Point) -> f64 {
    (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y)
}

/// Whether `q` lies inside the bounding box spanned by `p` and `r`.
fn on_segment(p: &Point, q: &Point, r: &Point) -> bool {
    p.x.min(r.x) <= q.x && q.x <= p.x.max(r.x) && p.y.min(r.y) <= q.y && q.y <= p.y.max(r.y)
}

/// Four-orientation segment intersection test, including collinear touching.
#[allow(clippy::float_cmp)] // exact zero marks collinearity
fn segments_intersect(a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> bool {
    let o1 = orient(a1, a2, b1);
    let o2 = orient(a1, a2, b2);
    let o3 = orient(b1, b2, a1);
    let o4 = orient(b1, b2, a2);

    if o1 * o2 < 0.0 && o3 * o4 < 0.0 {
        return true;
    }

    (o1 == 0.0 && on_segment(a1, b1, a2))
        || (o2 == 0.0 && on_segment(a1, b2, a2))
        || (o3 == 0.0 && on_segment(b1, a1, b2))
        || (o4 == 0.0 && on_segment(b1, a2, b2))
}

fn bbox_of<'a>(points: impl IntoIterator<Item = &'a Point>) -> BoundingBox {
    points.into_iter().fold(
        (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        |(min_x, min_y, max_x, max_y), p| {
            (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
        },
    )
}

/// A closed polygon ring.
///
/// Always holds at least four points after construction, the last being a
/// copy of the first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Creates a polygon, closing the ring if it is open.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::TooFewPoints`] for fewer than three points.
    pub fn new(mut points: Vec<Point>) -> Result<Self, GeometryError> {
        if points.len() < 3 {
            return Err(GeometryError::TooFewPoints {
                count: points.len(),
            });
        }
        if points.first() != points.last() {
            points.push(points[0]);
        }
        Ok(Self { points })
    }

    /// The ring vertices, closing point included.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Iterates over edges as `(start, end)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&Point, &Point)> {
        self.points.windows(2).map(|w| (&w[0], &w[1]))
    }

    /// Bounding box of the ring.
    #[must_use]
    pub fn bbox(&self) -> BoundingBox {
        bbox_of(&self.points)
    }

    /// Ray-casting containment test.
    ///
    /// Points exactly on an edge follow whatever the crossing count yields.
    #[must_use]
    pub fn contains_point(&self, point: &Point) -> bool {
        let (x, y) = (point.x, point.y);
        let mut inside = false;
        for (p1, p2) in self.edges() {
            if (p1.y > y) != (p2.y > y) && x < (p2.x - p1.x) * (y - p1.y) / (p2.y - p1.y) + p1.x
            {
                inside = !inside;
            }
        }
        inside
    }

    /// Whether any two edges that share no endpoint intersect.
    ///
    /// Stops at the first intersection found. `O(e²)` in the edge count.
    #[must_use]
    pub fn is_self_intersecting(&self) -> bool {
        let edges: Vec<_> = self.edges().collect();
        for (i, &(a1, a2)) in edges.iter().enumerate() {
            for &(b1, b2) in &edges[i + 1..] {
                if a1 == b1 || a1 == b2 || a2 == b1 || a2 == b2 {
                    continue;
                }
                if segments_intersect(a1, a2, b1, b2) {
                    return true;
                }
            }
        }
        false
    }
}

/// An open path of points.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Polyline {
    /// Path vertices in order. May hold fewer than two points; the validator
    /// reports that case.
    pub points: Vec<Point>,
}

impl Polyline {
    /// Creates a polyline from any number of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Total path length in mm.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }

    /// Bounding box of the path, `None` when empty.
    #[must_use]
    pub fn bbox(&self) -> Option<BoundingBox> {
        (!self.points.is_empty()).then(|| bbox_of(&self.points))
    }
}

/// A circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    center: Point,
    radius: f64,
}

impl Circle {
    /// Creates a circle.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidRadius`] unless `radius` is positive and finite.
    pub fn new(center: Point, radius: f64) -> Result<Self, GeometryError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(GeometryError::InvalidRadius { radius });
        }
        Ok(Self { center, radius })
    }

    /// Centre point.
    #[must_use]
    pub const fn center(&self) -> Point {
        self.center
    }

    /// Radius in mm.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Whether `point` is inside or on the circle.
    #[must_use]
    pub fn contains_point(&self, point: &Point) -> bool {
        self.center.distance_to(point) <= self.radius
    }

    /// Bounding box of the circle.
    #[must_use]
    pub fn bbox(&self) -> BoundingBox {
        (
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }
}
