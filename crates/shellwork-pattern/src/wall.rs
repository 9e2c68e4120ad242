//! Straight walls, corners and the perimeter traversal order.

use std::fmt;

use serde::{Deserialize, Serialize};
use shellwork_math::{Dir3, Frame, Point3, Vec3};

use crate::config::ShellSettings;

/// One of the four straight walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// `y = -height/2`, runs +X.
    Bottom,
    /// `x = +width/2`, runs +Y.
    Right,
    /// `y = +height/2`, runs -X.
    Top,
    /// `x = -width/2`, runs -Y.
    Left,
}

impl Side {
    /// All walls in traversal order.
    pub const ALL: [Side; 4] = [Side::Bottom, Side::Right, Side::Top, Side::Left];

    /// Index into per-wall arrays such as `count_per_wall`.
    pub fn index(self) -> usize {
        match self {
            Side::Bottom => 0,
            Side::Right => 1,
            Side::Top => 2,
            Side::Left => 3,
        }
    }

    /// The corner at the end of this wall.
    pub fn next_corner(self) -> Corner {
        match self {
            Side::Bottom => Corner::BottomRight,
            Side::Right => Corner::TopRight,
            Side::Top => Corner::TopLeft,
            Side::Left => Corner::BottomLeft,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::Bottom => "bottom",
            Side::Right => "right",
            Side::Top => "top",
            Side::Left => "left",
        };
        f.pad(name)
    }
}

/// One of the four rounded corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    /// Between bottom and right.
    BottomRight,
    /// Between right and top.
    TopRight,
    /// Between top and left.
    TopLeft,
    /// Between left and bottom.
    BottomLeft,
}

impl Corner {
    /// All corners in traversal order.
    pub const ALL: [Corner; 4] = [
        Corner::BottomRight,
        Corner::TopRight,
        Corner::TopLeft,
        Corner::BottomLeft,
    ];

    /// Index into per-corner arrays.
    pub fn index(self) -> usize {
        match self {
            Corner::BottomRight => 0,
            Corner::TopRight => 1,
            Corner::TopLeft => 2,
            Corner::BottomLeft => 3,
        }
    }

    /// Quadrant signs `(sx, sy)` of the arc centre.
    pub fn quadrant(self) -> (f64, f64) {
        match self {
            Corner::BottomRight => (1.0, -1.0),
            Corner::TopRight => (1.0, 1.0),
            Corner::TopLeft => (-1.0, 1.0),
            Corner::BottomLeft => (-1.0, -1.0),
        }
    }

    /// Angle (degrees) where the arc leaves the preceding wall.
    pub fn start_angle_deg(self) -> f64 {
        match self {
            Corner::BottomRight => -90.0,
            Corner::TopRight => 0.0,
            Corner::TopLeft => 90.0,
            Corner::BottomLeft => 180.0,
        }
    }
}

/// One leg of the counter-clockwise perimeter walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    /// A straight wall.
    Wall(Side),
    /// A quarter-circle corner.
    Corner(Corner),
}

/// Fixed traversal: bottom, bottom-right, right, top-right, top, top-left,
/// left, bottom-left.
pub const TRAVERSAL: [Leg; 8] = [
    Leg::Wall(Side::Bottom),
    Leg::Corner(Corner::BottomRight),
    Leg::Wall(Side::Right),
    Leg::Corner(Corner::TopRight),
    Leg::Wall(Side::Top),
    Leg::Corner(Corner::TopLeft),
    Leg::Wall(Side::Left),
    Leg::Corner(Corner::BottomLeft),
];

/// A straight wall as a 1-D interval `[-length/2, length/2]` along its
/// traversal direction.
#[derive(Debug, Clone, PartialEq)]
pub struct WallSpan {
    /// Which wall.
    pub side: Side,
    /// Full outer length, corners included.
    pub length: f64,
    /// `+1` when the wall runs along +X/+Y, `-1` otherwise.
    pub axis_sign: f64,
    /// Outward normal; cuts go in along its negation.
    pub cut_normal: Dir3,
    /// Distance of the outer surface from the shell axis.
    pub offset: f64,
}

impl WallSpan {
    /// Derive a wall from the shell dimensions.
    pub fn new(side: Side, shell: &ShellSettings) -> Self {
        let (length, axis_sign, normal, offset) = match side {
            Side::Bottom => (shell.width, 1.0, -Vec3::y(), shell.height / 2.0),
            Side::Right => (shell.height, 1.0, Vec3::x(), shell.width / 2.0),
            Side::Top => (shell.width, -1.0, Vec3::y(), shell.height / 2.0),
            Side::Left => (shell.height, -1.0, -Vec3::x(), shell.width / 2.0),
        };
        Self {
            side,
            length,
            axis_sign,
            cut_normal: Dir3::new_unchecked(normal),
            offset,
        }
    }

    /// All four walls in traversal order.
    pub fn all(shell: &ShellSettings) -> [WallSpan; 4] {
        Side::ALL.map(|side| WallSpan::new(side, shell))
    }

    /// Unit direction of increasing wall coordinate.
    pub fn tangent(&self) -> Vec3 {
        let axis = match self.side {
            Side::Bottom | Side::Top => Vec3::x(),
            Side::Right | Side::Left => Vec3::y(),
        };
        axis * self.axis_sign
    }

    /// The span left after reserving `corner_radius` at each end.
    pub fn usable_span(&self, corner_radius: f64) -> (f64, f64) {
        let half = self.length / 2.0;
        (-half + corner_radius, half - corner_radius)
    }

    /// Frame with origin at the wall midpoint on the outer surface, `z = 0`.
    pub fn frame(&self) -> Frame {
        let n = self.cut_normal.as_ref();
        Frame::vertical(Point3::from(n * self.offset), self.tangent(), *n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_wall_lengths() {
        let shell = ShellSettings::default();
        let walls = WallSpan::all(&shell);
        assert_eq!(walls[0].length, 250.0);
        assert_eq!(walls[1].length, 125.0);
        assert_eq!(walls[2].length, 250.0);
        assert_eq!(walls[3].length, 125.0);
    }

    #[test]
    fn test_wall_ends_meet_next_corner() {
        let shell = ShellSettings::default();
        // The +L/2 end of each wall sits in the quadrant of its next corner.
        for wall in WallSpan::all(&shell) {
            let end = wall.frame().point(wall.length / 2.0, 0.0, 0.0);
            let (sx, sy) = wall.side.next_corner().quadrant();
            assert_abs_diff_eq!(end.x.abs(), shell.width / 2.0, epsilon = 1e-9);
            assert_abs_diff_eq!(end.y.abs(), shell.height / 2.0, epsilon = 1e-9);
            assert_eq!(end.x.signum(), sx);
            assert_eq!(end.y.signum(), sy);
        }
    }

    #[test]
    fn test_frame_normal_points_outward() {
        let shell = ShellSettings::default();
        for wall in WallSpan::all(&shell) {
            let frame = wall.frame();
            let outside = frame.point(0.0, 0.0, 1.0);
            let inside = frame.point(0.0, 0.0, -1.0);
            assert!(outside.coords.norm() > inside.coords.norm());
            assert_abs_diff_eq!(frame.tangent.dot(frame.normal.as_ref()), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_usable_span() {
        let shell = ShellSettings::default();
        let wall = WallSpan::new(Side::Right, &shell);
        assert_eq!(wall.usable_span(20.0), (-42.5, 42.5));
    }

    #[test]
    fn test_traversal_alternates() {
        for (i, leg) in TRAVERSAL.iter().enumerate() {
            match leg {
                Leg::Wall(side) => {
                    assert_eq!(i % 2, 0);
                    assert_eq!(TRAVERSAL[i + 1], Leg::Corner(side.next_corner()));
                }
                Leg::Corner(_) => assert_eq!(i % 2, 1),
            }
        }
        assert_eq!(Side::Left.to_string(), "left");
    }
}
