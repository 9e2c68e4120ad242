//! Dovetail groove and bowtie connector profiles.
//!
//! Two shells are joined by a bowtie key sliding into matching dovetail
//! grooves. The groove is cut here; the key is only checked for fit.

use serde::{Deserialize, Serialize};
use shellwork_math::{Point2, Tolerance};

use crate::config::TrackSettings;
use crate::error::{PlacementError, Result};

/// Dovetail groove cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DovetailGroove {
    /// Width at the wall surface.
    pub narrow_width: f64,
    /// Width at the groove floor.
    pub wide_width: f64,
    /// Depth into the wall.
    pub depth: f64,
}

impl DovetailGroove {
    /// Groove for the configured tracks.
    pub fn from_tracks(tracks: &TrackSettings) -> Self {
        let flare = tracks.track_depth * tracks.dovetail_angle.to_radians().tan();
        Self {
            narrow_width: tracks.track_width,
            wide_width: tracks.track_width + 2.0 * flare,
            depth: tracks.track_depth,
        }
    }

    /// Half the floor width.
    pub fn wide_half_width(&self) -> f64 {
        self.wide_width / 2.0
    }

    /// Counter-clockwise trapezoid in `(across, out)`; the surface is at
    /// `out = 0` and the floor at `out = -depth`.
    pub fn cross_section(&self) -> Vec<Point2> {
        let (n, w) = (self.narrow_width / 2.0, self.wide_half_width());
        vec![
            Point2::new(-w, -self.depth),
            Point2::new(w, -self.depth),
            Point2::new(n, 0.0),
            Point2::new(-n, 0.0),
        ]
    }
}

/// Bowtie key joining two grooves face to face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BowtieConnector {
    /// Half-width at the waist.
    pub narrow_half_width: f64,
    /// Half-width at either end.
    pub wide_half_width: f64,
    /// Waist to end distance.
    pub half_thickness: f64,
    /// Clearance per side.
    pub clearance: f64,
}

impl BowtieConnector {
    /// Key for the configured tracks.
    pub fn from_tracks(tracks: &TrackSettings) -> Self {
        let narrow = (tracks.track_width - 2.0 * tracks.clearance) / 2.0;
        Self {
            narrow_half_width: narrow,
            wide_half_width: narrow + tracks.track_depth * tracks.dovetail_angle.to_radians().tan(),
            half_thickness: tracks.track_depth - tracks.clearance,
            clearance: tracks.clearance,
        }
    }

    /// Counter-clockwise hourglass, waist on `out = 0`.
    pub fn cross_section(&self) -> Vec<Point2> {
        let (n, w, h) = (
            self.narrow_half_width,
            self.wide_half_width,
            self.half_thickness,
        );
        vec![
            Point2::new(-w, -h),
            Point2::new(w, -h),
            Point2::new(n, 0.0),
            Point2::new(w, h),
            Point2::new(-w, h),
            Point2::new(-n, 0.0),
        ]
    }

    /// The key plus clearance stays inside the groove at the waist, the
    /// floor and in depth.
    pub fn fits(&self, groove: &DovetailGroove) -> bool {
        let tol = Tolerance::DEFAULT;
        self.narrow_half_width > 0.0
            && self.half_thickness > 0.0
            && tol.le(self.narrow_half_width + self.clearance, groove.narrow_width / 2.0)
            && tol.le(self.wide_half_width + self.clearance, groove.wide_half_width())
            && tol.le(self.half_thickness + self.clearance, groove.depth)
    }
}

/// Reject track settings whose connector would not seat.
pub fn check_fit(tracks: &TrackSettings) -> Result<()> {
    let groove = DovetailGroove::from_tracks(tracks);
    let key = BowtieConnector::from_tracks(tracks);
    if key.fits(&groove) {
        Ok(())
    } else {
        Err(PlacementError::ConnectorMisfit {
            connector: key.wide_half_width,
            groove: groove.wide_half_width(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn tracks(clearance: f64) -> TrackSettings {
        TrackSettings {
            track_width: 10.0,
            track_depth: 2.0,
            dovetail_angle: 25.0,
            clearance,
            ..Default::default()
        }
    }

    #[test]
    fn test_groove_dimensions() {
        let groove = DovetailGroove::from_tracks(&tracks(0.15));
        let flare = 2.0 * 25f64.to_radians().tan();
        assert_abs_diff_eq!(groove.narrow_width, 10.0);
        assert_abs_diff_eq!(groove.wide_width, 10.0 + 2.0 * flare, epsilon = 1e-12);
        assert_abs_diff_eq!(groove.wide_half_width(), 5.0 + flare, epsilon = 1e-12);
    }

    #[test]
    fn test_bowtie_dimensions() {
        let key = BowtieConnector::from_tracks(&tracks(0.15));
        assert_abs_diff_eq!(key.narrow_half_width, 4.85, epsilon = 1e-12);
        assert_abs_diff_eq!(key.half_thickness, 1.85, epsilon = 1e-12);
        assert!(key.wide_half_width > key.narrow_half_width);
    }

    #[test]
    fn test_fit_across_clearances() {
        for i in 0..=10 {
            let c = 0.1 + 0.01 * i as f64;
            let t = tracks(c);
            let key = BowtieConnector::from_tracks(&t);
            let groove = DovetailGroove::from_tracks(&t);
            assert!(key.fits(&groove), "clearance {c}");
            assert!(key.wide_half_width + c <= groove.wide_half_width() + 1e-9);
            check_fit(&t).unwrap();
        }
    }

    #[test]
    fn test_oversized_key_rejected() {
        let t = tracks(0.15);
        let groove = DovetailGroove::from_tracks(&t);
        let key = BowtieConnector {
            wide_half_width: groove.wide_half_width() + 0.5,
            ..BowtieConnector::from_tracks(&t)
        };
        assert!(!key.fits(&groove));
    }

    #[test]
    fn test_cross_sections_ccw() {
        let area = |pts: &[Point2]| {
            let n = pts.len();
            (0..n)
                .map(|i| pts[i].x * pts[(i + 1) % n].y - pts[(i + 1) % n].x * pts[i].y)
                .sum::<f64>()
                / 2.0
        };
        let t = tracks(0.15);
        assert!(area(&DovetailGroove::from_tracks(&t).cross_section()) > 0.0);
        assert!(area(&BowtieConnector::from_tracks(&t).cross_section()) > 0.0);
    }
}
