//! Pattern distributor for discrete elements.

use serde::{Deserialize, Serialize};
use shellwork_math::Tolerance;

use crate::config::{Fill, Layout, Modulation, PerforationSettings, ReliefSettings};
use crate::segment::FreeSegment;
use crate::shape::ShapeKind;

/// Count rule for a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FillMode {
    /// `floor(len / pitch)` instances.
    #[default]
    Discrete,
    /// `floor(len / pitch) + 1` instances, where they fit.
    AreaFill,
}

/// Discrete pattern parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSpec {
    /// Centre-to-centre spacing.
    pub pitch: f64,
    /// Element extent, `<= pitch`.
    pub element_size: f64,
    /// Cut depth.
    pub depth: f64,
    /// Outline.
    pub shape: ShapeKind,
    /// Shift of every row as a fraction of the pitch.
    pub phase_offset: f64,
    /// Count rule.
    pub fill: FillMode,
    /// Lower bound on the count of a segment at least one pitch long.
    pub min_elements: u32,
}

impl PatternSpec {
    /// Spec for a relief pattern.
    pub fn relief(settings: &ReliefSettings) -> Self {
        Self {
            pitch: settings.pitch,
            element_size: settings.element_size,
            depth: settings.depth,
            shape: settings.shape,
            phase_offset: settings.phase_offset,
            fill: match settings.fill {
                Fill::AreaFill => FillMode::AreaFill,
                Fill::Centered | Fill::LeftAligned => FillMode::Discrete,
            },
            min_elements: settings.min_elements,
        }
    }

    /// Spec for a perforation pattern cutting `depth` deep.
    pub fn perforation(settings: &PerforationSettings, depth: f64) -> Self {
        Self {
            pitch: settings.pitch,
            element_size: settings.hole_size,
            depth,
            shape: settings.hole_shape,
            phase_offset: 0.0,
            fill: FillMode::Discrete,
            min_elements: 0,
        }
    }

    /// Spec used to lay out rows along Z.
    pub fn rows(row_pitch: f64, element_size: f64) -> Self {
        Self {
            pitch: row_pitch,
            element_size: element_size.min(row_pitch),
            depth: 0.0,
            shape: ShapeKind::Disc,
            phase_offset: 0.0,
            fill: FillMode::Discrete,
            min_elements: 0,
        }
    }
}

/// Where the first instance goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Centering {
    /// Equal residual at both ends.
    Centered,
    /// First element flush with the segment start.
    LeftAligned,
    /// Centred; odd rows shift by half a pitch.
    CheckerboardRow(usize),
}

impl Centering {
    /// Centering of `row` under a layout and fill.
    pub fn for_row(layout: Layout, fill: Fill, row: usize) -> Self {
        match (layout, fill) {
            (Layout::Brick, _) => Centering::CheckerboardRow(row),
            (Layout::Grid, Fill::LeftAligned) => Centering::LeftAligned,
            (Layout::Grid, _) => Centering::Centered,
        }
    }

    /// Row shift in pitches contributed by the parity.
    pub fn parity_shift(self) -> f64 {
        match self {
            Centering::CheckerboardRow(row) if row % 2 == 1 => 0.5,
            _ => 0.0,
        }
    }
}

/// Number of instances for a segment of `length`.
///
/// Segments shorter than one pitch get none. Otherwise the count is
/// `max(min_elements, floor(len / pitch) [+1])`, reduced until the
/// elements fit: `(count - 1) * pitch + element_size <= len`.
pub fn instance_count(length: f64, spec: &PatternSpec) -> usize {
    let tol = Tolerance::DEFAULT;
    if spec.pitch <= 0.0 || length < spec.pitch {
        return 0;
    }
    let mut count = (length / spec.pitch).floor() as usize;
    if spec.fill == FillMode::AreaFill {
        count += 1;
    }
    count = count.max(spec.min_elements as usize);
    while count > 0 && !tol.le((count - 1) as f64 * spec.pitch + spec.element_size, length) {
        count -= 1;
    }
    count
}

/// Centring residual left at each end by [`instance_count`] instances.
pub fn centering_residual(length: f64, spec: &PatternSpec) -> f64 {
    match instance_count(length, spec) {
        0 => length / 2.0,
        n => (length - (n - 1) as f64 * spec.pitch) / 2.0,
    }
}

/// Instance centres for one row of a free segment, in ascending order.
///
/// Every centre lies in `[segment.start, segment.end]` and every element
/// fits inside the segment. Shifted rows (phase offset, odd checkerboard
/// rows) drop the instances that would stick out.
pub fn distribute(segment: &FreeSegment, spec: &PatternSpec, centering: Centering) -> Vec<f64> {
    let tol = Tolerance::DEFAULT;
    let length = segment.length();
    let count = instance_count(length, spec);
    if count == 0 {
        return Vec::new();
    }

    let base = match centering {
        Centering::LeftAligned => segment.start + spec.element_size / 2.0,
        Centering::Centered | Centering::CheckerboardRow(_) => {
            segment.start + centering_residual(length, spec)
        }
    };

    let shift = (spec.phase_offset + centering.parity_shift()).rem_euclid(1.0);
    if shift == 0.0 {
        return (0..count).map(|i| base + i as f64 * spec.pitch).collect();
    }

    let half = spec.element_size / 2.0;
    let first = base + (shift - 1.0) * spec.pitch;
    (0..=count)
        .map(|i| first + i as f64 * spec.pitch)
        .filter(|c| tol.le(segment.start, c - half) && tol.le(c + half, segment.end))
        .collect()
}

/// Size factor for every centre.
pub fn modulated_sizes(centers: &[f64], spec: &PatternSpec, modulation: &Modulation) -> Vec<f64> {
    centers
        .iter()
        .map(|&c| spec.element_size * modulation.scale_at(c))
        .collect()
}

/// Row heights inside the band `[z_lo, z_hi]`.
pub fn distribute_rows(z_lo: f64, z_hi: f64, row_pitch: f64, element_size: f64) -> Vec<f64> {
    let band = FreeSegment::new(z_lo, z_hi);
    distribute(&band, &PatternSpec::rows(row_pitch, element_size), Centering::Centered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn spec(pitch: f64, size: f64) -> PatternSpec {
        PatternSpec {
            pitch,
            element_size: size,
            depth: 1.0,
            shape: ShapeKind::Square,
            phase_offset: 0.0,
            fill: FillMode::Discrete,
            min_elements: 0,
        }
    }

    #[test]
    fn test_pitch_four_in_34_5() {
        let segment = FreeSegment::new(-42.5, -8.0);
        let spec = spec(4.0, 3.0);
        assert_eq!(instance_count(34.5, &spec), 8);
        let centers = distribute(&segment, &spec, Centering::Centered);
        assert_eq!(centers.len(), 8);
        assert_abs_diff_eq!(centers[7] - centers[0], 28.0, epsilon = 1e-9);
        assert_abs_diff_eq!(centers[0] - segment.start, 3.25, epsilon = 1e-9);
        assert_abs_diff_eq!(segment.end - centers[7], 3.25, epsilon = 1e-9);
    }

    #[test]
    fn test_short_segment_empty() {
        let segment = FreeSegment::new(0.0, 3.9);
        assert!(distribute(&segment, &spec(4.0, 2.0), Centering::Centered).is_empty());
        let forced = PatternSpec {
            min_elements: 3,
            ..spec(4.0, 2.0)
        };
        assert!(distribute(&segment, &forced, Centering::Centered).is_empty());
    }

    #[test]
    fn test_min_elements_capped_by_fit() {
        let forced = PatternSpec {
            min_elements: 5,
            ..spec(4.0, 2.0)
        };
        // 10 mm holds 3 elements of 2 mm at pitch 4 (span 8 + 2).
        assert_eq!(instance_count(10.0, &forced), 3);
    }

    #[test]
    fn test_area_fill_adds_one_when_it_fits() {
        let area = PatternSpec {
            fill: FillMode::AreaFill,
            ..spec(4.0, 2.0)
        };
        assert_eq!(instance_count(14.0, &area), 4);
        // 12 mm: floor 3 + 1 = 4 would span 12 + 2; capped to 3.
        assert_eq!(instance_count(12.0, &area), 3);
    }

    #[test]
    fn test_left_aligned() {
        let segment = FreeSegment::new(10.0, 30.0);
        let centers = distribute(&segment, &spec(5.0, 4.0), Centering::LeftAligned);
        assert_eq!(centers, vec![12.0, 17.0, 22.0, 27.0]);
    }

    #[test]
    fn test_checkerboard_odd_row_shifted_inside() {
        let segment = FreeSegment::new(0.0, 34.5);
        let spec = spec(4.0, 3.0);
        let even = distribute(&segment, &spec, Centering::CheckerboardRow(0));
        let odd = distribute(&segment, &spec, Centering::CheckerboardRow(1));
        assert_eq!(even.len(), 8);
        assert!(!odd.is_empty());
        for c in &odd {
            assert!(c - 1.5 >= -1e-9 && c + 1.5 <= 34.5 + 1e-9);
        }
        // Every odd centre sits halfway between even neighbours.
        for c in &odd {
            let nearest = even
                .iter()
                .map(|e| (e - c).abs())
                .fold(f64::MAX, f64::min);
            assert_abs_diff_eq!(nearest, 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_phase_offset_wraps() {
        let segment = FreeSegment::new(0.0, 40.0);
        let shifted = PatternSpec {
            phase_offset: 0.25,
            ..spec(4.0, 2.0)
        };
        let centers = distribute(&segment, &shifted, Centering::Centered);
        assert!(centers.windows(2).all(|w| (w[1] - w[0] - 4.0).abs() < 1e-9));
        assert!(centers.iter().all(|&c| segment.contains(c)));
    }

    #[test]
    fn test_modulated_sizes_never_grow() {
        let spec = spec(4.0, 3.0);
        let centers: Vec<f64> = (0..20).map(|i| i as f64 * 4.0).collect();
        let sizes = modulated_sizes(
            &centers,
            &spec,
            &Modulation::Sine {
                period: 30.0,
                amplitude: 0.5,
            },
        );
        assert!(sizes.iter().all(|&s| s <= 3.0 + 1e-12 && s >= 1.5 - 1e-12));
    }

    #[test]
    fn test_rows_centered_in_band() {
        let rows = distribute_rows(6.0, 144.0, 7.0, 6.0);
        assert_eq!(rows.len(), 19);
        assert_abs_diff_eq!(rows[0] - 6.0, 144.0 - rows[18], epsilon = 1e-9);
    }
}
