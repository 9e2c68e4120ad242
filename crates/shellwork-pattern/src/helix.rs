//! Helix continuity tracker for spiral grooves.
//!
//! A spiral is a family of parallel channels, `channel_pitch` apart in Z,
//! climbing at a fixed angle along the counter-clockwise traversal. The Z
//! climbed so far is threaded through every leg as a [`HelixState`]; walls
//! carry straight slanted grooves, corners are approximated by
//! `corner_steps` flat arc steps.
//!
//! Channels leave the band at one edge and new ones enter at the other.
//! Labels are derived from the climbed Z alone, so a channel keeps its label
//! across every wall and corner it crosses.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};
use shellwork_math::Tolerance;

use crate::config::SpiralSettings;
use crate::corner::CornerArc;
use crate::segment::FreeSegment;
use crate::wall::{Leg, TRAVERSAL};

/// Resolved spiral parameters for one build.
#[derive(Debug, Clone, PartialEq)]
pub struct SpiralSpec {
    /// Parallel channels across the band.
    pub channel_count: u32,
    /// Groove width.
    pub channel_width: f64,
    /// Groove depth.
    pub channel_depth: f64,
    /// Climb angle (radians).
    pub angle: f64,
    /// `+1` climbs along the traversal, `-1` descends.
    pub sign: f64,
    /// Sub-steps per corner.
    pub corner_steps: u32,
    /// Bottom of the patterned band.
    pub z_lo: f64,
    /// Top of the patterned band.
    pub z_hi: f64,
}

impl SpiralSpec {
    /// Resolve settings against the band `[z_lo, z_hi]`.
    pub fn new(settings: &SpiralSettings, z_lo: f64, z_hi: f64) -> Self {
        Self {
            channel_count: settings.channel_count,
            channel_width: settings.channel_width,
            channel_depth: settings.channel_depth,
            angle: settings.spiral_angle.to_radians(),
            sign: settings.handedness.sign(),
            corner_steps: settings.corner_steps,
            z_lo,
            z_hi,
        }
    }

    /// Resolve settings for a closed loop of length `perimeter`.
    ///
    /// The climb angle is adjusted to the nearest one that rises a whole
    /// number of channel pitches per lap, at least one, so the grooves leaving
    /// the last corner line up with the grooves entering the first wall.
    pub fn closed(settings: &SpiralSettings, z_lo: f64, z_hi: f64, perimeter: f64) -> Self {
        let mut spec = Self::new(settings, z_lo, z_hi);
        spec.angle = spec.closing_angle(perimeter);
        spec
    }

    /// Angle nearest to `angle` whose climb over `perimeter` is a whole
    /// number of channel pitches.
    pub fn closing_angle(&self, perimeter: f64) -> f64 {
        let pitch = self.channel_pitch();
        if perimeter <= 0.0 || pitch <= 0.0 {
            return self.angle;
        }
        let pitches = (perimeter * self.angle.tan() / pitch).round().max(1.0);
        (pitches * pitch / perimeter).atan()
    }

    /// Z distance between neighbouring channels.
    pub fn channel_pitch(&self) -> f64 {
        (self.z_hi - self.z_lo) / self.channel_count as f64
    }

    /// Signed Z change over `run` mm of path.
    pub fn rise(&self, run: f64) -> f64 {
        self.sign * run * self.angle.tan()
    }

    /// Centreline limits keeping the whole groove inside the band.
    pub fn clip_band(&self) -> (f64, f64) {
        let half = self.channel_width / 2.0;
        (self.z_lo + half, self.z_hi - half)
    }
}

/// Helix progress at one point of the traversal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HelixState {
    /// Unsigned Z climbed over one full corner, `(pi/2 r) tan(angle)`.
    pub z_advance_per_corner: f64,
    /// Sub-steps per corner.
    pub step_count: u32,
    /// Signed Z climbed since the start of the traversal.
    pub z_offset: f64,
}

impl HelixState {
    /// State at the start of the bottom wall's usable span.
    pub fn initial(spec: &SpiralSpec, corner_radius: f64) -> Self {
        Self {
            z_advance_per_corner: FRAC_PI_2 * corner_radius * spec.angle.tan(),
            step_count: spec.corner_steps,
            z_offset: 0.0,
        }
    }

    /// Unsigned Z rise of one corner sub-step.
    pub fn step_rise(&self) -> f64 {
        self.z_advance_per_corner / self.step_count.max(1) as f64
    }

    /// `floor(z_offset / channel_pitch) mod channel_count`.
    pub fn entering_channel(&self, spec: &SpiralSpec) -> u32 {
        let climbed = (self.z_offset / spec.channel_pitch()).floor() as i64;
        climbed.rem_euclid(spec.channel_count as i64) as u32
    }
}

/// One flat arc step of one channel across a corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelixStep {
    /// Channel label.
    pub channel: u32,
    /// Index of the sub-step within the corner.
    pub step: u32,
    /// Step start angle (radians).
    pub angle_start: f64,
    /// Step sweep (radians).
    pub sweep: f64,
    /// Centreline height.
    pub z: f64,
}

/// One straight slanted groove of one channel on a wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallGroove {
    /// Index of the free segment carrying the groove.
    pub segment: usize,
    /// Channel label.
    pub channel: u32,
    /// Start wall coordinate.
    pub s0: f64,
    /// Start height.
    pub z0: f64,
    /// End wall coordinate.
    pub s1: f64,
    /// End height.
    pub z1: f64,
}

/// Part of one channel line over a piece of path, `t` in `[0, 1]`.
struct ChannelPiece {
    channel: u32,
    z0: f64,
    t0: f64,
    t1: f64,
}

/// Channel lines visible over a piece of path that starts at `state` and
/// climbs `rise`.
fn channel_pieces(spec: &SpiralSpec, state: &HelixState, rise: f64) -> Vec<ChannelPiece> {
    let pitch = spec.channel_pitch();
    let phase = state.z_offset.rem_euclid(pitch);
    let entering = state.entering_channel(spec) as i64;
    let count = spec.channel_count as i64;
    let (lo, hi) = spec.clip_band();
    let span = spec.z_hi - spec.z_lo;

    // line k starts at z_lo + phase + k * pitch
    let k_min = ((-phase - rise.max(0.0)) / pitch).floor() as i64;
    let k_max = ((span - phase - rise.min(0.0)) / pitch).ceil() as i64;

    (k_min..=k_max)
        .filter_map(|k| {
            let z0 = spec.z_lo + phase + k as f64 * pitch;
            let (t0, t1) = clip_line(z0, rise, lo, hi)?;
            Some(ChannelPiece {
                channel: (k - entering).rem_euclid(count) as u32,
                z0,
                t0,
                t1,
            })
        })
        .collect()
}

/// Parameter range where `z0 + rise * t` stays inside `[lo, hi]`.
fn clip_line(z0: f64, rise: f64, lo: f64, hi: f64) -> Option<(f64, f64)> {
    let tol = Tolerance::DEFAULT;
    if tol.is_zero(rise) {
        return (z0 >= lo && z0 <= hi).then_some((0.0, 1.0));
    }
    let ta = (lo - z0) / rise;
    let tb = (hi - z0) / rise;
    let t0 = ta.min(tb).max(0.0);
    let t1 = ta.max(tb).min(1.0);
    (!tol.le(t1, t0)).then_some((t0, t1))
}

/// Advance the helix across a corner.
///
/// Returns the flat arc steps of every visible channel and the state at the
/// corner end. Each of the `step_count` steps sweeps `90 / step_count`
/// degrees at the height reached mid-step.
pub fn advance(
    state: &HelixState,
    arc: &CornerArc,
    spec: &SpiralSpec,
) -> (Vec<HelixStep>, HelixState) {
    let n = state.step_count.max(1);
    let sweep = arc.sweep / n as f64;
    let dz = spec.sign * state.step_rise();

    let mut steps = Vec::new();
    for i in 0..n {
        let mid = HelixState {
            z_offset: state.z_offset + dz * (i as f64 + 0.5),
            ..*state
        };
        let angle_start = arc.start_angle + i as f64 * sweep;
        steps.extend(
            channel_pieces(spec, &mid, 0.0)
                .into_iter()
                .map(|piece| HelixStep {
                    channel: piece.channel,
                    step: i,
                    angle_start,
                    sweep,
                    z: piece.z0,
                }),
        );
    }

    let next = HelixState {
        z_offset: state.z_offset + spec.sign * state.z_advance_per_corner,
        ..*state
    };
    (steps, next)
}

/// State after a straight run of `run` mm.
pub fn advance_wall(state: &HelixState, run: f64, spec: &SpiralSpec) -> HelixState {
    HelixState {
        z_offset: state.z_offset + spec.rise(run),
        ..*state
    }
}

/// Slanted grooves over the free segments of a wall.
///
/// `state` is the helix state at `usable_start`. Track zones interrupt the
/// grooves, not the climb.
pub fn wall_grooves(
    state: &HelixState,
    segments: &[FreeSegment],
    usable_start: f64,
    spec: &SpiralSpec,
) -> Vec<WallGroove> {
    let mut grooves = Vec::new();
    for (index, segment) in segments.iter().enumerate() {
        let at_start = advance_wall(state, segment.start - usable_start, spec);
        let length = segment.length();
        let rise = spec.rise(length);
        grooves.extend(
            channel_pieces(spec, &at_start, rise)
                .into_iter()
                .map(|piece| WallGroove {
                    segment: index,
                    channel: piece.channel,
                    s0: segment.start + piece.t0 * length,
                    z0: piece.z0 + piece.t0 * rise,
                    s1: segment.start + piece.t1 * length,
                    z1: piece.z0 + piece.t1 * rise,
                }),
        );
    }
    grooves
}

/// Fold the helix through the traversal and return the state at the entry of
/// every leg, in [`TRAVERSAL`] order.
pub fn fold_traversal(
    initial: HelixState,
    arcs: &[CornerArc; 4],
    wall_runs: [f64; 4],
    spec: &SpiralSpec,
) -> [HelixState; 8] {
    let mut states = [initial; 8];
    let mut state = initial;
    for (entry, leg) in states.iter_mut().zip(TRAVERSAL) {
        *entry = state;
        state = match leg {
            Leg::Wall(side) => advance_wall(&state, wall_runs[side.index()], spec),
            Leg::Corner(corner) => advance(&state, &arcs[corner.index()], spec).1,
        };
    }
    states
}
