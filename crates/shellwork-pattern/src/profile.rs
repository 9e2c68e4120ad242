//! Continuous depth profiles (wave, terrace, facet, flute).
//!
//! A profile is a periodic function `depth(position mod period)` that is zero
//! at both ends of each period. On a wall, whole periods are centred in the
//! free segment and the residual at either end stays flat, so adjoining
//! surfaces meet at zero depth.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::{PlacementError, Result};
use crate::segment::FreeSegment;

/// Samples per period below which faceting becomes visible.
pub const MIN_SAMPLES_PER_PERIOD: u32 = 20;

/// Periodic depth function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileKind {
    /// Raised-cosine wave.
    Wave {
        /// Wavelength.
        period: f64,
        /// Peak depth.
        amplitude: f64,
    },
    /// Symmetric staircase rising to `step_max_depth` mid-period.
    Terrace {
        /// Period length.
        period: f64,
        /// Number of levels.
        step_count: u32,
        /// Depth of the deepest level.
        step_max_depth: f64,
    },
    /// Triangular V facets.
    Facet {
        /// Period length.
        period: f64,
        /// Peak depth.
        depth: f64,
    },
    /// Semicircular flutes.
    Flute {
        /// Period length.
        period: f64,
        /// Peak depth.
        depth: f64,
    },
}

impl ProfileKind {
    /// Period length.
    pub fn period(&self) -> f64 {
        match *self {
            ProfileKind::Wave { period, .. }
            | ProfileKind::Terrace { period, .. }
            | ProfileKind::Facet { period, .. }
            | ProfileKind::Flute { period, .. } => period,
        }
    }

    /// Largest depth the profile reaches.
    pub fn max_depth(&self) -> f64 {
        match *self {
            ProfileKind::Wave { amplitude, .. } => amplitude,
            ProfileKind::Terrace { step_max_depth, .. } => step_max_depth,
            ProfileKind::Facet { depth, .. } | ProfileKind::Flute { depth, .. } => depth,
        }
    }

    /// Check the payload.
    pub fn validate(&self) -> Result<()> {
        if !self.period().is_finite() || !self.max_depth().is_finite() {
            return Err(PlacementError::InvalidSettings(
                "profile period and depth must be finite".into(),
            ));
        }
        if self.period() <= 0.0 {
            return Err(PlacementError::NonPositivePitch(self.period()));
        }
        if self.max_depth() <= 0.0 {
            return Err(PlacementError::InvalidSettings(
                "profile depth must be positive".into(),
            ));
        }
        if let ProfileKind::Terrace { step_count: 0, .. } = self {
            return Err(PlacementError::InvalidSettings(
                "terrace step_count must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Depth at normalized phase `t` in `[0, 1]`; zero at both ends.
    pub fn depth_at_phase(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        // 0 at the ends, 1 mid-period
        let tri = 1.0 - (2.0 * t - 1.0).abs();
        match *self {
            ProfileKind::Wave { amplitude, .. } => amplitude * 0.5 * (1.0 - (TAU * t).cos()),
            ProfileKind::Terrace {
                step_count,
                step_max_depth,
                ..
            } => {
                let levels = step_count as f64;
                let level = (tri * (levels + 1.0)).floor().min(levels);
                step_max_depth * level / levels
            }
            ProfileKind::Facet { depth, .. } => depth * tri,
            ProfileKind::Flute { depth, .. } => {
                let x = 2.0 * t - 1.0;
                depth * (1.0 - x * x).max(0.0).sqrt()
            }
        }
    }

    /// Unwindowed periodic depth at `position`.
    pub fn depth(&self, position: f64) -> f64 {
        self.depth_at_phase((position / self.period()).rem_euclid(1.0))
    }
}

/// A window of whole periods centred in a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedProfile {
    /// Start of the first period.
    pub start: f64,
    /// Number of whole periods.
    pub periods: usize,
    /// Profile function.
    pub kind: ProfileKind,
}

impl FittedProfile {
    /// Fit `floor(len / period)` periods into `segment`.
    pub fn fit_segment(segment: &FreeSegment, kind: ProfileKind) -> Self {
        let period = kind.period();
        let periods = (segment.length() / period).floor() as usize;
        let residual = (segment.length() - periods as f64 * period) / 2.0;
        Self {
            start: segment.start + residual,
            periods,
            kind,
        }
    }

    /// End of the last period.
    pub fn end(&self) -> f64 {
        self.start + self.periods as f64 * self.kind.period()
    }

    /// No whole period fits.
    pub fn is_flat(&self) -> bool {
        self.periods == 0
    }

    /// Depth at `position`; zero outside the window.
    pub fn depth_at(&self, position: f64) -> f64 {
        if self.is_flat() || position <= self.start || position >= self.end() {
            return 0.0;
        }
        self.kind.depth(position - self.start)
    }
}

/// One sample of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileSample {
    /// Position along the wall, or `t` in `[0, 1]` along an arc.
    pub position: f64,
    /// Cut depth.
    pub depth: f64,
}

/// `periods` whole periods sampled at `samples_per_period`, positions in
/// `[0, periods]` period units.
fn sample_periods(kind: &ProfileKind, periods: usize, samples_per_period: u32) -> Vec<(f64, f64)> {
    let spp = samples_per_period.max(1) as usize;
    let total = periods * spp;
    (0..=total)
        .map(|k| {
            let phase = (k % spp) as f64 / spp as f64;
            // period boundaries land on phase 0
            (k as f64 / spp as f64, kind.depth_at_phase(phase))
        })
        .collect()
}

/// Sample the fitted profile of a wall segment. Empty when flat.
pub fn sample_segment(
    segment: &FreeSegment,
    kind: ProfileKind,
    samples_per_period: u32,
) -> Vec<ProfileSample> {
    let fitted = FittedProfile::fit_segment(segment, kind);
    if fitted.is_flat() {
        return Vec::new();
    }
    let period = kind.period();
    sample_periods(&kind, fitted.periods, samples_per_period)
        .into_iter()
        .map(|(u, depth)| ProfileSample {
            position: fitted.start + u * period,
            depth,
        })
        .collect()
}

/// Sample `periods` periods over an arc, `position` being `t` in `[0, 1]`.
pub fn sample_arc(
    kind: ProfileKind,
    periods: usize,
    samples_per_period: u32,
) -> Vec<ProfileSample> {
    if periods == 0 {
        return Vec::new();
    }
    sample_periods(&kind, periods, samples_per_period)
        .into_iter()
        .map(|(u, depth)| ProfileSample {
            position: u / periods as f64,
            depth,
        })
        .collect()
}
