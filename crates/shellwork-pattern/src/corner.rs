//! Corner continuity mapper.
//!
//! Each rounded corner refits the pattern with its own whole number of
//! periods over the quarter arc. The corner pitch usually differs slightly
//! from the wall pitch; integer periods filling the arc take priority.

use std::f64::consts::FRAC_PI_2;

use shellwork_math::{polar, radial, Frame, Point2, Point3, Tolerance, Vec3};

use crate::config::ShellSettings;
use crate::distribute::PatternSpec;
use crate::profile::{sample_arc, ProfileKind, ProfileSample};
use crate::wall::Corner;

/// A quarter-circle corner of the shell outline.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerArc {
    /// Which corner.
    pub corner: Corner,
    /// Arc centre X.
    pub center_x: f64,
    /// Arc centre Y.
    pub center_y: f64,
    /// Outer radius.
    pub radius: f64,
    /// Angle where the arc leaves the preceding wall (radians).
    pub start_angle: f64,
    /// Always a quarter turn (radians).
    pub sweep: f64,
}

impl CornerArc {
    /// Derive the arc of `corner` from the shell dimensions.
    pub fn new(corner: Corner, shell: &ShellSettings) -> Self {
        let (sx, sy) = corner.quadrant();
        let r = shell.corner_radius;
        Self {
            corner,
            center_x: sx * (shell.width / 2.0 - r),
            center_y: sy * (shell.height / 2.0 - r),
            radius: r,
            start_angle: corner.start_angle_deg().to_radians(),
            sweep: FRAC_PI_2,
        }
    }

    /// All four arcs in traversal order.
    pub fn all(shell: &ShellSettings) -> [CornerArc; 4] {
        Corner::ALL.map(|corner| CornerArc::new(corner, shell))
    }

    /// Arc centre.
    pub fn center(&self) -> Point2 {
        Point2::new(self.center_x, self.center_y)
    }

    /// `sweep * radius`.
    pub fn arc_length(&self) -> f64 {
        self.sweep * self.radius
    }

    /// Angle where the arc meets the following wall.
    pub fn end_angle(&self) -> f64 {
        self.start_angle + self.sweep
    }

    /// Point on the outer surface at `angle`.
    pub fn point_at(&self, angle: f64) -> Point2 {
        polar(&self.center(), self.radius, angle)
    }

    /// Surface frame at `angle` and height `z`; the tangent follows the
    /// counter-clockwise traversal.
    pub fn frame_at(&self, angle: f64, z: f64) -> Frame {
        let p = self.point_at(angle);
        let (s, c) = angle.sin_cos();
        Frame::vertical(
            Point3::new(p.x, p.y, z),
            Vec3::new(-s, c, 0.0),
            *radial(angle).as_ref(),
        )
    }
}

/// Whole-period fit of a pattern onto an arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerFit {
    /// Periods on the arc; zero means a flat corner.
    pub periods: usize,
    /// Angular pitch (radians).
    pub pitch_angle: f64,
    /// Angular margin before the first period (radians), `>= 0`.
    pub center_offset: f64,
}

impl CornerFit {
    /// Arc length of one corner period at `radius`.
    pub fn pitch_length(&self, radius: f64) -> f64 {
        self.pitch_angle * radius
    }
}

/// `n = round(arc_length / pitch)` periods spread evenly over the arc.
pub fn fit_periods(arc: &CornerArc, pitch: f64) -> CornerFit {
    let n = if pitch > 0.0 {
        (arc.arc_length() / pitch).round() as usize
    } else {
        0
    };
    if n == 0 {
        return CornerFit {
            periods: 0,
            pitch_angle: 0.0,
            center_offset: 0.0,
        };
    }
    let pitch_angle = arc.sweep / n as f64;
    CornerFit {
        periods: n,
        pitch_angle,
        center_offset: ((arc.sweep - n as f64 * pitch_angle) / 2.0).max(0.0),
    }
}

/// One discrete element on a corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerPlacement {
    /// Polar angle of the element centre (radians).
    pub angle: f64,
    /// Size factor, below 1 when the corner pitch is tighter than the wall's.
    pub scale: f64,
}

/// Element angles for one row around a corner.
///
/// `adjoining_phase` is the row shift (fraction of a pitch) carried over from
/// the walls so brick rows keep alternating around the bend. Elements shifted
/// past the arc end are dropped.
pub fn map_corner(
    arc: &CornerArc,
    spec: &PatternSpec,
    adjoining_phase: f64,
) -> Vec<CornerPlacement> {
    let fit = fit_periods(arc, spec.pitch);
    if fit.periods == 0 {
        return Vec::new();
    }
    let scale = (fit.pitch_length(arc.radius) / spec.pitch).min(1.0);
    let half_angle = spec.element_size * scale / 2.0 / arc.radius;
    let phase = adjoining_phase.rem_euclid(1.0);
    let first = arc.start_angle + fit.center_offset;
    let tol = Tolerance::DEFAULT;

    (0..fit.periods)
        .map(|j| first + (j as f64 + 0.5 + phase) * fit.pitch_angle)
        .filter(|a| tol.le(*a + half_angle, arc.end_angle()))
        .map(|angle| CornerPlacement { angle, scale })
        .collect()
}

/// A continuous profile wrapped around a corner.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerProfile {
    /// Period fit used.
    pub fit: CornerFit,
    /// Samples with `position` as `t` in `[0, 1]` along the arc.
    pub samples: Vec<ProfileSample>,
}

/// Fit a profile around a corner. `None` for a flat corner.
pub fn map_corner_profile(
    arc: &CornerArc,
    kind: ProfileKind,
    samples_per_period: u32,
) -> Option<CornerProfile> {
    let fit = fit_periods(arc, kind.period());
    if fit.periods == 0 {
        return None;
    }
    Some(CornerProfile {
        fit,
        samples: sample_arc(kind, fit.periods, samples_per_period),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribute::FillMode;
    use crate::shape::ShapeKind;
    use approx::assert_abs_diff_eq;

    fn spec(pitch: f64, size: f64) -> PatternSpec {
        PatternSpec {
            pitch,
            element_size: size,
            depth: 1.0,
            shape: ShapeKind::Disc,
            phase_offset: 0.0,
            fill: FillMode::Discrete,
            min_elements: 0,
        }
    }

    #[test]
    fn test_arcs_join_walls() {
        let shell = ShellSettings::default();
        let br = CornerArc::new(Corner::BottomRight, &shell);
        let start = br.point_at(br.start_angle);
        let end = br.point_at(br.end_angle());
        // Leaves the bottom wall, meets the right wall.
        assert_abs_diff_eq!(start.y, -shell.height / 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(start.x, shell.width / 2.0 - shell.corner_radius, epsilon = 1e-9);
        assert_abs_diff_eq!(end.x, shell.width / 2.0, epsilon = 1e-9);

        let bl = CornerArc::new(Corner::BottomLeft, &shell);
        assert_abs_diff_eq!(bl.point_at(bl.end_angle()).y, -shell.height / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fit_fills_arc() {
        let shell = ShellSettings::default();
        let arc = CornerArc::new(Corner::TopRight, &shell);
        // arc length 31.4159 at pitch 4 -> 8 periods
        let fit = fit_periods(&arc, 4.0);
        assert_eq!(fit.periods, 8);
        assert_abs_diff_eq!(fit.pitch_angle * 8.0, FRAC_PI_2, epsilon = 1e-12);
        assert!(fit.center_offset >= 0.0);
        assert!(fit.pitch_length(arc.radius) < 4.0);
    }

    #[test]
    fn test_small_radius_is_flat() {
        let shell = ShellSettings {
            corner_radius: 1.0,
            ..Default::default()
        };
        let arc = CornerArc::new(Corner::TopLeft, &shell);
        assert_eq!(fit_periods(&arc, 8.0).periods, 0);
        assert!(map_corner(&arc, &spec(8.0, 6.0), 0.0).is_empty());
        let wave = ProfileKind::Wave {
            period: 8.0,
            amplitude: 1.0,
        };
        assert!(map_corner_profile(&arc, wave, 24).is_none());
    }

    #[test]
    fn test_elements_inside_arc() {
        let shell = ShellSettings::default();
        for arc in CornerArc::all(&shell) {
            for phase in [0.0, 0.25, 0.5] {
                let placements = map_corner(&arc, &spec(4.0, 3.0), phase);
                assert!(!placements.is_empty());
                for p in placements {
                    assert!(p.angle > arc.start_angle && p.angle < arc.end_angle());
                    assert!(p.scale <= 1.0);
                }
            }
        }
    }

    #[test]
    fn test_half_phase_drops_last() {
        let shell = ShellSettings::default();
        let arc = CornerArc::new(Corner::BottomRight, &shell);
        assert_eq!(map_corner(&arc, &spec(4.0, 3.0), 0.0).len(), 8);
        assert_eq!(map_corner(&arc, &spec(4.0, 3.0), 0.5).len(), 7);
    }

    #[test]
    fn test_frame_faces_outward() {
        let shell = ShellSettings::default();
        let arc = CornerArc::new(Corner::TopLeft, &shell);
        let mid = arc.start_angle + arc.sweep / 2.0;
        let frame = arc.frame_at(mid, 10.0);
        let out = frame.point(0.0, 0.0, 1.0);
        assert!(out.coords.xy().norm() > frame.origin.coords.xy().norm());
        assert_abs_diff_eq!(frame.origin.z, 10.0);
    }

    #[test]
    fn test_profile_on_corner() {
        let shell = ShellSettings::default();
        let arc = CornerArc::new(Corner::BottomLeft, &shell);
        let facet = ProfileKind::Facet {
            period: 10.0,
            depth: 1.0,
        };
        let profile = map_corner_profile(&arc, facet, 20).unwrap();
        assert_eq!(profile.fit.periods, 3);
        assert_eq!(profile.samples.len(), 61);
    }
}
