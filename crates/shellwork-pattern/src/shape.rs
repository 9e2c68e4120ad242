//! Element outlines.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use serde::{Deserialize, Serialize};
use shellwork_math::Point2;

use crate::error::{PlacementError, Result};

/// Segments used when a disc outline is flattened.
pub const DISC_SEGMENTS: usize = 32;

/// Element outline, resolved once when the configuration is parsed.
///
/// `size` passed to [`ShapeKind::outline`] is the circumscribed diameter for
/// round and radial shapes and the side length for squares.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeKind {
    /// Regular polygon with `sides` vertices.
    Polygon {
        /// Vertex count, at least 3.
        sides: u32,
    },
    /// Star with `points` tips.
    Star {
        /// Tip count, at least 3.
        points: u32,
        /// Inner radius as a fraction of the outer radius.
        inner_ratio: f64,
    },
    /// Circle.
    Disc,
    /// Axis-aligned square.
    Square,
    /// Square standing on a vertex.
    Diamond,
    /// Regular hexagon with a vertex on the wall axis.
    #[default]
    Hexagon,
}

impl ShapeKind {
    /// Check the payload.
    pub fn validate(&self) -> Result<()> {
        match *self {
            ShapeKind::Polygon { sides } if sides < 3 => Err(PlacementError::InvalidSettings(
                format!("polygon needs at least 3 sides, got {sides}"),
            )),
            ShapeKind::Star { points, .. } if points < 3 => Err(PlacementError::InvalidSettings(
                format!("star needs at least 3 points, got {points}"),
            )),
            ShapeKind::Star { inner_ratio, .. } if !(inner_ratio > 0.0 && inner_ratio < 1.0) => {
                Err(PlacementError::InvalidSettings(
                    "star inner_ratio must be in (0, 1)".into(),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Closed outline (counter-clockwise, last vertex not repeated) centred on
    /// the origin.
    pub fn outline(&self, size: f64) -> Vec<Point2> {
        let r = size / 2.0;
        match *self {
            ShapeKind::Polygon { sides } => regular(sides as usize, r, FRAC_PI_2),
            ShapeKind::Hexagon => regular(6, r, 0.0),
            ShapeKind::Disc => regular(DISC_SEGMENTS, r, 0.0),
            ShapeKind::Diamond => regular(4, r, 0.0),
            ShapeKind::Square => regular(4, r * std::f64::consts::SQRT_2, FRAC_PI_4),
            ShapeKind::Star {
                points,
                inner_ratio,
            } => {
                let n = points as usize * 2;
                (0..n)
                    .map(|i| {
                        let radius = if i % 2 == 0 { r } else { r * inner_ratio };
                        let a = FRAC_PI_2 + TAU * i as f64 / n as f64;
                        Point2::new(radius * a.cos(), radius * a.sin())
                    })
                    .collect()
            }
        }
    }
}

fn regular(n: usize, radius: f64, phase: f64) -> Vec<Point2> {
    (0..n)
        .map(|i| {
            let a = phase + TAU * i as f64 / n as f64;
            Point2::new(radius * a.cos(), radius * a.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn extent(points: &[Point2]) -> (f64, f64) {
        let w = points.iter().map(|p| p.x).fold(f64::MIN, f64::max)
            - points.iter().map(|p| p.x).fold(f64::MAX, f64::min);
        let h = points.iter().map(|p| p.y).fold(f64::MIN, f64::max)
            - points.iter().map(|p| p.y).fold(f64::MAX, f64::min);
        (w, h)
    }

    fn signed_area(points: &[Point2]) -> f64 {
        let n = points.len();
        (0..n)
            .map(|i| {
                let (a, b) = (points[i], points[(i + 1) % n]);
                a.x * b.y - b.x * a.y
            })
            .sum::<f64>()
            / 2.0
    }

    #[test]
    fn test_square_side() {
        let (w, h) = extent(&ShapeKind::Square.outline(6.0));
        assert_abs_diff_eq!(w, 6.0, epsilon = 1e-9);
        assert_abs_diff_eq!(h, 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_diamond_fits_size() {
        let (w, h) = extent(&ShapeKind::Diamond.outline(6.0));
        assert_abs_diff_eq!(w, 6.0, epsilon = 1e-9);
        assert_abs_diff_eq!(h, 6.0, epsilon = 1e-9);
        assert_abs_diff_eq!(signed_area(&ShapeKind::Diamond.outline(6.0)), 18.0, epsilon = 1e-9);
    }

    #[test]
    fn test_outlines_are_ccw() {
        let shapes = [
            ShapeKind::Polygon { sides: 5 },
            ShapeKind::Star {
                points: 5,
                inner_ratio: 0.4,
            },
            ShapeKind::Disc,
            ShapeKind::Square,
            ShapeKind::Diamond,
            ShapeKind::Hexagon,
        ];
        for shape in shapes {
            assert!(signed_area(&shape.outline(4.0)) > 0.0, "{shape:?}");
        }
    }

    #[test]
    fn test_star_vertex_count() {
        let star = ShapeKind::Star {
            points: 6,
            inner_ratio: 0.5,
        };
        assert_eq!(star.outline(10.0).len(), 12);
        assert_eq!(ShapeKind::Disc.outline(10.0).len(), DISC_SEGMENTS);
    }

    #[test]
    fn test_validate_payload() {
        assert!(ShapeKind::Polygon { sides: 2 }.validate().is_err());
        assert!(ShapeKind::Star {
            points: 5,
            inner_ratio: 1.2
        }
        .validate()
        .is_err());
        assert!(ShapeKind::Polygon { sides: 8 }.validate().is_ok());
    }
}
