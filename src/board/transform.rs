//! Placement transforms and the ECAD/SVG axis flip.
//!
//! ECAD coordinates are Y-up; SVG and most raster targets are Y-down. A
//! component maps its local geometry to the board by mirroring X (back side
//! only), then rotating counter-clockwise, then translating.

use super::error::GeometryError;
use super::geometry::Point;
use super::model::{Component, Side, Transform};

/// A 2D affine map `p' = M·p + t`, stored row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    m: [[f64; 2]; 2],
    t: [f64; 2],
}

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine {
    /// The identity map.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            m: [[1.0, 0.0], [0.0, 1.0]],
            t: [0.0, 0.0],
        }
    }

    /// Pure translation.
    #[must_use]
    pub const fn translation(dx: f64, dy: f64) -> Self {
        Self {
            m: [[1.0, 0.0], [0.0, 1.0]],
            t: [dx, dy],
        }
    }

    /// Counter-clockwise rotation about the origin.
    #[must_use]
    pub fn rotation(angle_deg: f64) -> Self {
        let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
        Self {
            m: [[cos_a, -sin_a], [sin_a, cos_a]],
            t: [0.0, 0.0],
        }
    }

    /// Mirror across the Y axis (negates X).
    #[must_use]
    pub const fn mirror_x() -> Self {
        Self {
            m: [[-1.0, 0.0], [0.0, 1.0]],
            t: [0.0, 0.0],
        }
    }

    /// `self ∘ other`: applies `other` first, then `self`.
    #[must_use]
    pub fn then_apply(&self, other: &Self) -> Self {
        let a = &self.m;
        let b = &other.m;
        Self {
            m: [
                [
                    a[0][0].mul_add(b[0][0], a[0][1] * b[1][0]),
                    a[0][0].mul_add(b[0][1], a[0][1] * b[1][1]),
                ],
                [
                    a[1][0].mul_add(b[0][0], a[1][1] * b[1][0]),
                    a[1][0].mul_add(b[0][1], a[1][1] * b[1][1]),
                ],
            ],
            t: [
                a[0][0].mul_add(other.t[0], a[0][1] * other.t[1]) + self.t[0],
                a[1][0].mul_add(other.t[0], a[1][1] * other.t[1]) + self.t[1],
            ],
        }
    }

    /// Local-to-board map for a component placement.
    #[must_use]
    pub fn for_transform(transform: &Transform) -> Self {
        let placed = Self::translation(transform.position.x(), transform.position.y())
            .then_apply(&Self::rotation(transform.rotation));
        match transform.side {
            Side::Front => placed,
            Side::Back => placed.then_apply(&Self::mirror_x()),
        }
    }

    /// Local-to-board map for a placed component.
    #[must_use]
    pub fn for_component(component: &Component) -> Self {
        Self::for_transform(&component.transform)
    }

    /// Maps a point.
    ///
    /// # Errors
    ///
    /// Returns an error if the result is not finite.
    pub fn apply(&self, point: &Point) -> Result<Point, GeometryError> {
        let (x, y) = (point.x(), point.y());
        Point::new(
            self.m[0][0].mul_add(x, self.m[0][1] * y) + self.t[0],
            self.m[1][0].mul_add(x, self.m[1][1] * y) + self.t[1],
        )
    }
}

/// Converts Y-up board coordinates to Y-down SVG coordinates.
///
/// # Errors
///
/// Returns an error if `board_height` is not finite.
pub fn ecad_to_svg(point: &Point, board_height: f64) -> Result<Point, GeometryError> {
    Point::new(point.x(), board_height - point.y())
}

/// Inverse of [`ecad_to_svg`] (the flip is its own inverse).
///
/// # Errors
///
/// Returns an error if `board_height` is not finite.
pub fn svg_to_ecad(point: &Point, board_height: f64) -> Result<Point, GeometryError> {
    ecad_to_svg(point, board_height)
}
