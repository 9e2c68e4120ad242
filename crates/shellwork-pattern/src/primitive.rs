//! Negative-volume primitives handed to the boolean stage.

use serde::{Deserialize, Serialize};
use shellwork_math::{Frame, Point3, Vec3};

use crate::corner::CornerArc;
use crate::profile::ProfileSample;
use crate::shape::ShapeKind;
use crate::wall::{Corner, Side};

/// Where a primitive came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Source {
    /// A free segment of a straight wall.
    Wall {
        /// Wall.
        side: Side,
        /// Free segment index.
        segment: usize,
        /// Row index; the channel label for spiral grooves, zero for
        /// profiles.
        row: usize,
    },
    /// A rounded corner.
    Corner {
        /// Corner.
        corner: Corner,
    },
    /// A connector track.
    Track {
        /// Wall.
        side: Side,
        /// Zone index.
        zone: usize,
    },
}

/// Cut geometry, local to the primitive frame unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cut {
    /// Prism of an element outline, extruded inward by the primitive depth.
    Element {
        /// Outline.
        shape: ShapeKind,
        /// Outline size after modulation and corner scaling.
        size: f64,
    },
    /// Dovetail groove running up from the origin.
    Dovetail {
        /// Width at the surface.
        narrow_width: f64,
        /// Width at the floor.
        wide_width: f64,
        /// Run along Z.
        length: f64,
    },
    /// Straight groove between two shell-space points.
    SlantedGroove {
        /// Start centreline point.
        start: [f64; 3],
        /// End centreline point.
        end: [f64; 3],
        /// Groove width.
        width: f64,
    },
    /// Flat arc groove around a corner centre.
    ArcGroove {
        /// Arc centre in XY.
        center: [f64; 2],
        /// Arc radius.
        radius: f64,
        /// Start angle (degrees).
        start_angle: f64,
        /// Sweep (degrees).
        sweep: f64,
        /// Centreline height.
        z: f64,
        /// Groove width.
        width: f64,
    },
    /// Depth profile swept along Z over a wall; sample positions are wall
    /// coordinates.
    ProfileExtrusion {
        /// Depth samples.
        samples: Vec<ProfileSample>,
        /// Bottom of the sweep.
        z_min: f64,
        /// Top of the sweep.
        z_max: f64,
    },
    /// Depth profile revolved around a corner centre; sample positions are
    /// `t` in `[0, 1]` along the arc.
    ProfileRevolution {
        /// Arc centre in XY.
        center: [f64; 2],
        /// Arc radius.
        radius: f64,
        /// Start angle (degrees).
        start_angle: f64,
        /// Sweep (degrees).
        sweep: f64,
        /// Depth samples.
        samples: Vec<ProfileSample>,
        /// Bottom of the sweep.
        z_min: f64,
        /// Top of the sweep.
        z_max: f64,
    },
}

impl Cut {
    /// Short name for logs and summaries.
    pub fn name(&self) -> &'static str {
        match self {
            Cut::Element { .. } => "element",
            Cut::Dovetail { .. } => "dovetail",
            Cut::SlantedGroove { .. } => "slanted_groove",
            Cut::ArcGroove { .. } => "arc_groove",
            Cut::ProfileExtrusion { .. } => "profile_extrusion",
            Cut::ProfileRevolution { .. } => "profile_revolution",
        }
    }

    /// Arc groove over `[angle_start, angle_start + sweep]` radians of `arc`.
    pub fn arc_groove(arc: &CornerArc, angle_start: f64, sweep: f64, z: f64, width: f64) -> Self {
        Cut::ArcGroove {
            center: [arc.center_x, arc.center_y],
            radius: arc.radius,
            start_angle: angle_start.to_degrees(),
            sweep: sweep.to_degrees(),
            z,
            width,
        }
    }
}

/// One negative volume placed on the shell surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    /// Origin.
    pub source: Source,
    /// Anchor point on the outer surface.
    pub origin: [f64; 3],
    /// Outward surface normal; the cut goes in along its negation.
    pub normal: [f64; 3],
    /// Surface tangent along the traversal.
    pub tangent: [f64; 3],
    /// In-plane rotation about the normal (degrees).
    pub spin: f64,
    /// Cut depth.
    pub depth: f64,
    /// Geometry.
    pub cut: Cut,
}

impl Primitive {
    /// Place a cut at the origin of `frame`.
    pub fn at(frame: &Frame, source: Source, spin: f64, depth: f64, cut: Cut) -> Self {
        Self {
            source,
            origin: shellwork_math::to_array(&frame.origin),
            normal: (*frame.normal).into(),
            tangent: (*frame.tangent).into(),
            spin,
            depth,
            cut,
        }
    }

    /// Surface frame of the primitive.
    pub fn frame(&self) -> Frame {
        Frame::vertical(
            Point3::from(self.origin),
            Vec3::from(self.tangent),
            Vec3::from(self.normal),
        )
    }

    /// Shell-space outline of an element cut on the outer surface. `None` for
    /// every other cut.
    pub fn footprint(&self) -> Option<Vec<[f64; 3]>> {
        let Cut::Element { shape, size } = &self.cut else {
            return None;
        };
        let frame = self.frame();
        let (s, c) = self.spin.to_radians().sin_cos();
        let outline = shape
            .outline(*size)
            .into_iter()
            .map(|p| {
                let (u, v) = (p.x * c - p.y * s, p.x * s + p.y * c);
                shellwork_math::to_array(&frame.point(u, v, 0.0))
            })
            .collect();
        Some(outline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn element(spin: f64) -> Primitive {
        let frame = Frame::vertical(Point3::new(0.0, -62.5, 40.0), Vec3::x(), -Vec3::y());
        Primitive::at(
            &frame,
            Source::Wall {
                side: Side::Bottom,
                segment: 0,
                row: 3,
            },
            spin,
            1.2,
            Cut::Element {
                shape: ShapeKind::Square,
                size: 4.0,
            },
        )
    }

    #[test]
    fn test_footprint_on_surface() {
        let footprint = element(0.0).footprint().unwrap();
        assert_eq!(footprint.len(), 4);
        for p in &footprint {
            assert_abs_diff_eq!(p[1], -62.5, epsilon = 1e-12);
            assert!((p[0].abs() - 2.0).abs() < 1e-9);
            assert!((p[2] - 40.0).abs() - 2.0 < 1e-9);
        }
    }

    #[test]
    fn test_spin_rotates_footprint() {
        let footprint = element(45.0).footprint().unwrap();
        let max_x = footprint.iter().map(|p| p[0]).fold(f64::MIN, f64::max);
        assert_abs_diff_eq!(max_x, 2.0 * std::f64::consts::SQRT_2, epsilon = 1e-9);
    }

    #[test]
    fn test_non_element_has_no_footprint() {
        let mut p = element(0.0);
        p.cut = Cut::Dovetail {
            narrow_width: 10.0,
            wide_width: 11.0,
            length: 150.0,
        };
        assert!(p.footprint().is_none());
        assert_eq!(p.cut.name(), "dovetail");
    }

    #[test]
    fn test_json_tags() {
        let json = serde_json::to_value(element(0.0)).unwrap();
        assert_eq!(json["source"]["type"], "wall");
        assert_eq!(json["source"]["side"], "bottom");
        assert_eq!(json["cut"]["kind"], "element");
        assert_eq!(json["cut"]["shape"]["kind"], "square");
        let back: Primitive = serde_json::from_value(json).unwrap();
        assert_eq!(back, element(0.0));
    }
}
