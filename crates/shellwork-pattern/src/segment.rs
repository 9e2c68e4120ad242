//! Free segment resolver.
//!
//! Subtracts the corner reserves and every track zone from a wall and
//! returns what is left as ordered, disjoint intervals.

use serde::{Deserialize, Serialize};

use crate::track::TrackZone;

/// Gaps no longer than this are dropped instead of kept as slivers (mm).
pub const MIN_GAP: f64 = 0.5;

/// A free interval on a wall, `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FreeSegment {
    /// Lower bound.
    pub start: f64,
    /// Upper bound.
    pub end: f64,
}

impl FreeSegment {
    /// Create a segment.
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// `end - start`.
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Midpoint.
    pub fn mid(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    /// Closed-interval membership.
    pub fn contains(&self, x: f64) -> bool {
        x >= self.start && x <= self.end
    }
}

/// First overlapping pair found by [`check_zones`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneOverlap {
    /// Index of the lower zone.
    pub first: usize,
    /// Index of the upper zone.
    pub second: usize,
    /// Length of the shared interval.
    pub length: f64,
}

/// Report the first pair of consecutive zones that overlap.
///
/// Overlap means the track count is too high for the wall length and track
/// width; it is a configuration error, never merged silently.
pub fn check_zones(zones: &[TrackZone]) -> Result<(), ZoneOverlap> {
    for (i, pair) in zones.windows(2).enumerate() {
        let overlap = pair[0].end() - pair[1].start();
        if overlap > 0.0 {
            return Err(ZoneOverlap {
                first: i,
                second: i + 1,
                length: overlap,
            });
        }
    }
    Ok(())
}

/// Free segments of a wall of `wall_length` with `corner_radius` reserved
/// at each end and `zones` removed.
///
/// Zones extending past the usable span are clipped; a zone covering a
/// boundary simply yields no leading or trailing segment. An empty result is
/// valid and means the wall carries no pattern.
pub fn compute_free_segments(
    zones: &[TrackZone],
    wall_length: f64,
    corner_radius: f64,
) -> Vec<FreeSegment> {
    let lo = -wall_length / 2.0 + corner_radius;
    let hi = wall_length / 2.0 - corner_radius;

    let mut sorted = zones.to_vec();
    sorted.sort_by(|a, b| a.center.total_cmp(&b.center));

    let mut segments = Vec::with_capacity(sorted.len() + 1);
    let mut cursor = lo;
    for zone in &sorted {
        push_gap(&mut segments, cursor, zone.start().min(hi));
        cursor = cursor.max(zone.end());
    }
    push_gap(&mut segments, cursor, hi);

    segments
}

fn push_gap(segments: &mut Vec<FreeSegment>, start: f64, end: f64) {
    if end - start > MIN_GAP {
        segments.push(FreeSegment::new(start, end));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::compute_zones;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_no_zones_full_span() {
        let segments = compute_free_segments(&[], 125.0, 20.0);
        assert_eq!(segments, vec![FreeSegment::new(-42.5, 42.5)]);
    }

    #[test]
    fn test_single_track_splits_wall() {
        let zones = compute_zones(1, 125.0, 10.0, 2.0);
        let segments = compute_free_segments(&zones, 125.0, 20.0);
        assert_eq!(segments.len(), 2);
        assert_abs_diff_eq!(segments[0].start, -42.5);
        assert_abs_diff_eq!(segments[0].end, -7.0);
        assert_abs_diff_eq!(segments[1].start, 7.0);
        assert_abs_diff_eq!(segments[1].end, 42.5);
    }

    #[test]
    fn test_two_tracks_three_segments() {
        let zones = compute_zones(2, 250.0, 10.0, 2.0);
        let segments = compute_free_segments(&zones, 250.0, 20.0);
        let widths: Vec<f64> = segments.iter().map(FreeSegment::length).collect();
        assert_eq!(widths.len(), 3);
        // Outer segments [-105, -69.5] and [69.5, 105], middle [-55.5, 55.5].
        assert_abs_diff_eq!(widths[0], 35.5, epsilon = 1e-9);
        assert_abs_diff_eq!(widths[1], 111.0, epsilon = 1e-9);
        assert_abs_diff_eq!(widths[2], 35.5, epsilon = 1e-9);
        assert_abs_diff_eq!(widths[0], widths[2], epsilon = 1e-12);
    }

    #[test]
    fn test_zone_covering_boundary() {
        // Zone reaches past the usable start: no leading segment.
        let zones = [TrackZone {
            center: -40.0,
            half_width: 7.0,
        }];
        let segments = compute_free_segments(&zones, 125.0, 20.0);
        assert_eq!(segments, vec![FreeSegment::new(-33.0, 42.5)]);
    }

    #[test]
    fn test_sliver_dropped() {
        // Gap between zone end and usable end is 0.4 mm.
        let zones = [TrackZone {
            center: 35.1,
            half_width: 7.0,
        }];
        let segments = compute_free_segments(&zones, 125.0, 20.0);
        assert_eq!(segments.len(), 1);
        assert_abs_diff_eq!(segments[0].end, 28.1, epsilon = 1e-9);
    }

    #[test]
    fn test_zones_consume_everything() {
        let zones = [TrackZone {
            center: 0.0,
            half_width: 50.0,
        }];
        assert!(compute_free_segments(&zones, 125.0, 20.0).is_empty());
    }

    #[test]
    fn test_unsorted_zones_are_sorted() {
        let mut zones = compute_zones(3, 300.0, 10.0, 2.0);
        zones.reverse();
        let segments = compute_free_segments(&zones, 300.0, 20.0);
        assert_eq!(segments.len(), 4);
        assert!(segments.windows(2).all(|w| w[0].end < w[1].start));
    }

    #[test]
    fn test_check_zones_overlap() {
        let zones = compute_zones(10, 125.0, 10.0, 2.0);
        let overlap = check_zones(&zones).unwrap_err();
        assert_eq!((overlap.first, overlap.second), (0, 1));
        assert_abs_diff_eq!(overlap.length, 1.5, epsilon = 1e-9);
        assert!(check_zones(&compute_zones(2, 250.0, 10.0, 2.0)).is_ok());
    }
}
