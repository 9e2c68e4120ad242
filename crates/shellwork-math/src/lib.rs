#![warn(missing_docs)]

//! Math types for the shellwork placement engine.
//!
//! Thin wrappers around nalgebra: point and vector aliases, a local
//! coordinate [`Frame`] used to lift wall- and corner-local positions into
//! shell space, and the comparison slack used by interval and angle checks.

use nalgebra::{Unit, Vector3};

/// A point in 3D shell space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in the XY plane of the shell profile.
pub type Point2 = nalgebra::Point2<f64>;

/// Point on a circle of `radius` around `center` at `angle` radians.
pub fn polar(center: &Point2, radius: f64, angle: f64) -> Point2 {
    let (s, c) = angle.sin_cos();
    Point2::new(center.x + radius * c, center.y + radius * s)
}

/// Outward unit direction at `angle` radians in the XY plane.
pub fn radial(angle: f64) -> Dir3 {
    let (s, c) = angle.sin_cos();
    Dir3::new_unchecked(Vec3::new(c, s, 0.0))
}

/// Flatten a point into `[x, y, z]`.
pub fn to_array(p: &Point3) -> [f64; 3] {
    [p.x, p.y, p.z]
}

/// An orthonormal local frame on the shell surface.
///
/// `tangent` runs along the wall in traversal direction, `up` is the
/// extrusion axis and `normal` points out of the shell. Local coordinates
/// are `(u, v, w)` along `(tangent, up, normal)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Origin in shell space.
    pub origin: Point3,
    /// Unit vector along the wall.
    pub tangent: Dir3,
    /// Unit vector along the extrusion axis.
    pub up: Dir3,
    /// Outward surface normal.
    pub normal: Dir3,
}

impl Frame {
    /// Build a frame on a vertical wall; `up` is always +Z.
    ///
    /// `tangent` and `normal` are normalized and must be horizontal and
    /// perpendicular to each other.
    pub fn vertical(origin: Point3, tangent: Vec3, normal: Vec3) -> Self {
        Self {
            origin,
            tangent: Dir3::new_normalize(tangent),
            up: Dir3::new_unchecked(Vec3::z()),
            normal: Dir3::new_normalize(normal),
        }
    }

    /// Map local `(u, v, w)` to a point in shell space.
    pub fn point(&self, u: f64, v: f64, w: f64) -> Point3 {
        self.origin + self.tangent.as_ref() * u + self.up.as_ref() * v + self.normal.as_ref() * w
    }

    /// The same frame translated along its own axes.
    pub fn offset(&self, u: f64, v: f64, w: f64) -> Self {
        Self {
            origin: self.point(u, v, w),
            ..self.clone()
        }
    }
}

/// Slack for comparisons of accumulated lengths and angles.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Absolute slack, in mm or radians.
    pub linear: f64,
}

impl Tolerance {
    /// `1e-9`.
    pub const DEFAULT: Self = Self { linear: 1e-9 };

    /// `|d|` below the slack.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// `a <= b` up to the slack.
    pub fn le(&self, a: f64, b: f64) -> bool {
        a <= b + self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
