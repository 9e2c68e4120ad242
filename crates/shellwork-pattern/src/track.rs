//! Track zone registry: reserved intervals for connector grooves.

use serde::{Deserialize, Serialize};

/// A reserved interval centred on a connector groove.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackZone {
    /// Centre along the wall.
    pub center: f64,
    /// `track_width / 2 + style_margin`.
    pub half_width: f64,
}

impl TrackZone {
    /// Lower bound of the reserved interval.
    pub fn start(&self) -> f64 {
        self.center - self.half_width
    }

    /// Upper bound of the reserved interval.
    pub fn end(&self) -> f64 {
        self.center + self.half_width
    }
}

/// Evenly spaced zones for `count` tracks on a wall of `wall_length`.
///
/// Zone `i` is centred at `-L/2 + (L/n)(i + 0.5)`. Overlap is not checked
/// here; see [`crate::segment::check_zones`].
pub fn compute_zones(
    count: u32,
    wall_length: f64,
    track_width: f64,
    style_margin: f64,
) -> Vec<TrackZone> {
    if count == 0 {
        return Vec::new();
    }
    let spacing = wall_length / count as f64;
    let half_width = track_width / 2.0 + style_margin;
    (0..count)
        .map(|i| TrackZone {
            center: -wall_length / 2.0 + spacing * (i as f64 + 0.5),
            half_width,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_no_tracks() {
        assert!(compute_zones(0, 125.0, 10.0, 2.0).is_empty());
    }

    #[test]
    fn test_single_track_centered() {
        let zones = compute_zones(1, 125.0, 10.0, 2.0);
        assert_eq!(zones.len(), 1);
        assert_abs_diff_eq!(zones[0].center, 0.0);
        assert_abs_diff_eq!(zones[0].half_width, 7.0);
        assert_abs_diff_eq!(zones[0].start(), -7.0);
        assert_abs_diff_eq!(zones[0].end(), 7.0);
    }

    #[test]
    fn test_two_tracks_quarter_points() {
        let zones = compute_zones(2, 250.0, 10.0, 2.0);
        assert_abs_diff_eq!(zones[0].center, -62.5);
        assert_abs_diff_eq!(zones[1].center, 62.5);
    }

    #[test]
    fn test_zones_sorted() {
        let zones = compute_zones(7, 300.0, 4.0, 1.0);
        assert!(zones.windows(2).all(|w| w[0].center < w[1].center));
    }
}
