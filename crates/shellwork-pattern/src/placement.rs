//! Placement of every primitive around the perimeter.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use shellwork_math::{Point2, Tolerance};
use tracing::{debug, info, instrument, warn};

use crate::config::{BuildConfig, Fill, Layout, Modulation, PatternStyle, ShellSettings};
use crate::connector::DovetailGroove;
use crate::corner::{map_corner, map_corner_profile, CornerArc};
use crate::distribute::{distribute, distribute_rows, modulated_sizes, Centering, PatternSpec};
use crate::error::Result;
use crate::helix::{advance, fold_traversal, wall_grooves, HelixState, SpiralSpec};
use crate::primitive::{Cut, Primitive, Source};
use crate::profile::{sample_segment, ProfileKind, MIN_SAMPLES_PER_PERIOD};
use crate::segment::{compute_free_segments, FreeSegment};
use crate::track::{compute_zones, TrackZone};
use crate::wall::{Leg, WallSpan, TRAVERSAL};

/// Through-cuts start this far outside the wall and end this far inside it.
pub const THROUGH_OVERLAP: f64 = 0.05;

/// Valid but likely unwanted geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QualityWarning {
    /// Corner sub-steps rise more than half a channel width.
    CoarseStairStep {
        /// Z rise per sub-step.
        step_rise: f64,
        /// Groove width.
        channel_width: f64,
    },
    /// Profile sampled below [`MIN_SAMPLES_PER_PERIOD`].
    CoarseSampling {
        /// Configured samples per period.
        samples_per_period: u32,
    },
    /// A decorative cut reaches through the wall.
    PiercesWall {
        /// Cut depth.
        depth: f64,
        /// Wall thickness.
        wall_thickness: f64,
    },
}

impl fmt::Display for QualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityWarning::CoarseStairStep {
                step_rise,
                channel_width,
            } => write!(
                f,
                "corner steps rise {step_rise:.3} mm, more than half the {channel_width} mm channel; raise corner_steps"
            ),
            QualityWarning::CoarseSampling { samples_per_period } => write!(
                f,
                "{samples_per_period} samples per period is below {MIN_SAMPLES_PER_PERIOD}; the profile will facet"
            ),
            QualityWarning::PiercesWall {
                depth,
                wall_thickness,
            } => write!(
                f,
                "cut depth {depth} mm reaches through the {wall_thickness} mm wall"
            ),
        }
    }
}

/// Warnings for a validated configuration.
pub fn quality_warnings(config: &BuildConfig) -> Vec<QualityWarning> {
    let thickness = config.shell.wall_thickness;
    let pierces = |depth: f64| {
        (depth >= thickness).then_some(QualityWarning::PiercesWall {
            depth,
            wall_thickness: thickness,
        })
    };

    let mut warnings = Vec::new();
    match &config.pattern.style {
        PatternStyle::Relief(r) => warnings.extend(pierces(r.depth)),
        PatternStyle::Perforation(_) => {}
        PatternStyle::Profile(p) => {
            if p.samples_per_period < MIN_SAMPLES_PER_PERIOD {
                warnings.push(QualityWarning::CoarseSampling {
                    samples_per_period: p.samples_per_period,
                });
            }
            warnings.extend(pierces(p.profile.max_depth()));
        }
        PatternStyle::Spiral(s) => {
            let (z_lo, z_hi) = config.z_band();
            let spec = SpiralSpec::closed(s, z_lo, z_hi, config.shell.perimeter());
            let step_rise = HelixState::initial(&spec, config.shell.corner_radius).step_rise();
            if step_rise > s.channel_width / 2.0 {
                warnings.push(QualityWarning::CoarseStairStep {
                    step_rise,
                    channel_width: s.channel_width,
                });
            }
            warnings.extend(pierces(s.channel_depth));
        }
    }
    warnings
}

/// Primitive counts by origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlacementStats {
    /// All primitives.
    pub total: usize,
    /// Primitives on straight walls.
    pub wall: usize,
    /// Primitives on corners.
    pub corner: usize,
    /// Dovetail grooves.
    pub track: usize,
}

/// Result of a placement run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Shell the primitives are cut from.
    pub shell: ShellSettings,
    /// Negative volumes in traversal order.
    pub primitives: Vec<Primitive>,
    /// Quality warnings raised for this configuration.
    pub warnings: Vec<QualityWarning>,
}

impl Placement {
    /// Independent batches of at most `size` primitives for parallel
    /// subtraction.
    pub fn batches(&self, size: usize) -> std::slice::Chunks<'_, Primitive> {
        self.primitives.chunks(size.max(1))
    }

    /// Primitive counts by origin.
    pub fn stats(&self) -> PlacementStats {
        let mut stats = PlacementStats {
            total: self.primitives.len(),
            ..Default::default()
        };
        for p in &self.primitives {
            match p.source {
                Source::Wall { .. } => stats.wall += 1,
                Source::Corner { .. } => stats.corner += 1,
                Source::Track { .. } => stats.track += 1,
            }
        }
        stats
    }

    /// Counter-clockwise outer outline with `segments_per_corner` chords on
    /// each corner.
    pub fn outline(&self, segments_per_corner: usize) -> Vec<Point2> {
        let n = segments_per_corner.max(1);
        let tol = Tolerance::DEFAULT;
        let mut points: Vec<Point2> = Vec::with_capacity(4 * (n + 1));
        for arc in CornerArc::all(&self.shell) {
            for i in 0..=n {
                let p = arc.point_at(arc.start_angle + arc.sweep * i as f64 / n as f64);
                if points.last().map_or(true, |q| !tol.is_zero((q - p).norm())) {
                    points.push(p);
                }
            }
        }
        if points.len() > 1 && tol.is_zero((points[0] - points[points.len() - 1]).norm()) {
            points.pop();
        }
        points
    }
}

/// Zones and free segments of one wall.
struct WallPlan {
    wall: WallSpan,
    zones: Vec<TrackZone>,
    segments: Vec<FreeSegment>,
}

impl WallPlan {
    fn new(wall: WallSpan, config: &BuildConfig) -> Self {
        let zones = compute_zones(
            config.tracks.count_per_wall[wall.side.index()],
            wall.length,
            config.tracks.track_width,
            config.pattern.style_margin,
        );
        let segments = compute_free_segments(&zones, wall.length, config.shell.corner_radius);
        debug!(
            "{} wall: {} track zones, {} free segments",
            wall.side,
            zones.len(),
            segments.len()
        );
        Self {
            wall,
            zones,
            segments,
        }
    }
}

/// Discrete element pattern resolved from a relief or perforation style.
struct Discrete {
    spec: PatternSpec,
    layout: Layout,
    fill: Fill,
    modulation: Modulation,
    rotation: f64,
    /// Outward shift of the cut origin.
    lift: f64,
    row_pitch: f64,
}

impl Discrete {
    fn from_style(style: &PatternStyle, shell: &ShellSettings) -> Option<Self> {
        match style {
            PatternStyle::Relief(r) => Some(Self {
                spec: PatternSpec::relief(r),
                layout: r.layout,
                fill: r.fill,
                modulation: r.modulation,
                rotation: r.rotation,
                lift: 0.0,
                row_pitch: r.row_pitch,
            }),
            PatternStyle::Perforation(h) => Some(Self {
                spec: PatternSpec::perforation(h, shell.wall_thickness + 2.0 * THROUGH_OVERLAP),
                layout: h.layout,
                fill: Fill::Centered,
                modulation: Modulation::None,
                rotation: h.rotation,
                lift: THROUGH_OVERLAP,
                row_pitch: h.row_pitch,
            }),
            PatternStyle::Profile(_) | PatternStyle::Spiral(_) => None,
        }
    }

    fn rows(&self, config: &BuildConfig) -> Vec<f64> {
        let (z_lo, z_hi) = config.z_band();
        distribute_rows(z_lo, z_hi, self.row_pitch, self.spec.element_size)
    }

    fn on_wall(&self, plan: &WallPlan, config: &BuildConfig) -> Vec<Primitive> {
        let frame = plan.wall.frame();
        let mut out = Vec::new();
        for (row, z) in self.rows(config).into_iter().enumerate() {
            let centering = Centering::for_row(self.layout, self.fill, row);
            for (segment, free) in plan.segments.iter().enumerate() {
                let centers = distribute(free, &self.spec, centering);
                let sizes = modulated_sizes(&centers, &self.spec, &self.modulation);
                for (c, size) in centers.into_iter().zip(sizes) {
                    out.push(Primitive::at(
                        &frame.offset(c, z, self.lift),
                        Source::Wall {
                            side: plan.wall.side,
                            segment,
                            row,
                        },
                        self.rotation,
                        self.spec.depth,
                        Cut::Element {
                            shape: self.spec.shape,
                            size,
                        },
                    ));
                }
            }
        }
        out
    }

    fn on_corner(&self, arc: &CornerArc, config: &BuildConfig) -> Vec<Primitive> {
        let mut out = Vec::new();
        for (row, z) in self.rows(config).into_iter().enumerate() {
            let centering = Centering::for_row(self.layout, self.fill, row);
            let phase = self.spec.phase_offset + centering.parity_shift();
            for placement in map_corner(arc, &self.spec, phase) {
                out.push(Primitive::at(
                    &arc.frame_at(placement.angle, z).offset(0.0, 0.0, self.lift),
                    Source::Corner { corner: arc.corner },
                    self.rotation,
                    self.spec.depth,
                    Cut::Element {
                        shape: self.spec.shape,
                        size: self.spec.element_size * placement.scale,
                    },
                ));
            }
        }
        out
    }
}

fn track_primitives(plan: &WallPlan, config: &BuildConfig) -> Vec<Primitive> {
    let groove = DovetailGroove::from_tracks(&config.tracks);
    let length = config.tracks.track_length_fraction * config.shell.depth;
    let frame = plan.wall.frame();
    plan.zones
        .iter()
        .enumerate()
        .map(|(zone, z)| {
            Primitive::at(
                &frame.offset(z.center, 0.0, 0.0),
                Source::Track {
                    side: plan.wall.side,
                    zone,
                },
                0.0,
                groove.depth,
                Cut::Dovetail {
                    narrow_width: groove.narrow_width,
                    wide_width: groove.wide_width,
                    length,
                },
            )
        })
        .collect()
}

fn profile_on_wall(
    plan: &WallPlan,
    kind: ProfileKind,
    spp: u32,
    config: &BuildConfig,
) -> Vec<Primitive> {
    let (z_lo, z_hi) = config.z_band();
    let frame = plan.wall.frame().offset(0.0, z_lo, 0.0);
    plan.segments
        .iter()
        .enumerate()
        .filter_map(|(segment, free)| {
            let samples = sample_segment(free, kind, spp);
            if samples.is_empty() {
                return None;
            }
            Some(Primitive::at(
                &frame,
                Source::Wall {
                    side: plan.wall.side,
                    segment,
                    row: 0,
                },
                0.0,
                kind.max_depth(),
                Cut::ProfileExtrusion {
                    samples,
                    z_min: z_lo,
                    z_max: z_hi,
                },
            ))
        })
        .collect()
}

fn profile_on_corner(
    arc: &CornerArc,
    kind: ProfileKind,
    spp: u32,
    config: &BuildConfig,
) -> Vec<Primitive> {
    let (z_lo, z_hi) = config.z_band();
    let Some(profile) = map_corner_profile(arc, kind, spp) else {
        return Vec::new();
    };
    vec![Primitive::at(
        &arc.frame_at(arc.start_angle + arc.sweep / 2.0, z_lo),
        Source::Corner { corner: arc.corner },
        0.0,
        kind.max_depth(),
        Cut::ProfileRevolution {
            center: [arc.center_x, arc.center_y],
            radius: arc.radius,
            start_angle: arc.start_angle.to_degrees(),
            sweep: arc.sweep.to_degrees(),
            samples: profile.samples,
            z_min: z_lo,
            z_max: z_hi,
        },
    )]
}

fn spiral_on_wall(
    plan: &WallPlan,
    spec: &SpiralSpec,
    state: &HelixState,
    config: &BuildConfig,
) -> Vec<Primitive> {
    let frame = plan.wall.frame();
    let (usable_start, _) = plan.wall.usable_span(config.shell.corner_radius);
    wall_grooves(state, &plan.segments, usable_start, spec)
        .into_iter()
        .map(|g| {
            Primitive::at(
                &frame.offset(g.s0, g.z0, 0.0),
                Source::Wall {
                    side: plan.wall.side,
                    segment: g.segment,
                    row: g.channel as usize,
                },
                0.0,
                spec.channel_depth,
                Cut::SlantedGroove {
                    start: shellwork_math::to_array(&frame.point(g.s0, g.z0, 0.0)),
                    end: shellwork_math::to_array(&frame.point(g.s1, g.z1, 0.0)),
                    width: spec.channel_width,
                },
            )
        })
        .collect()
}

fn spiral_on_corner(arc: &CornerArc, spec: &SpiralSpec, state: &HelixState) -> Vec<Primitive> {
    let (steps, _) = advance(state, arc, spec);
    steps
        .into_iter()
        .map(|step| {
            Primitive::at(
                &arc.frame_at(step.angle_start + step.sweep / 2.0, step.z),
                Source::Corner { corner: arc.corner },
                0.0,
                spec.channel_depth,
                Cut::arc_groove(arc, step.angle_start, step.sweep, step.z, spec.channel_width),
            )
        })
        .collect()
}

/// Spiral spec plus the helix state at the entry of every leg.
struct HelixPlan {
    spec: SpiralSpec,
    states: [HelixState; 8],
}

impl HelixPlan {
    fn new(config: &BuildConfig, plans: &[WallPlan], arcs: &[CornerArc; 4]) -> Option<Self> {
        let PatternStyle::Spiral(settings) = &config.pattern.style else {
            return None;
        };
        let (z_lo, z_hi) = config.z_band();
        let spec = SpiralSpec::closed(settings, z_lo, z_hi, config.shell.perimeter());
        let r = config.shell.corner_radius;
        let mut runs = [0.0; 4];
        for plan in plans {
            runs[plan.wall.side.index()] = plan.wall.length - 2.0 * r;
        }
        let states = fold_traversal(HelixState::initial(&spec, r), arcs, runs, &spec);
        debug!(
            "Spiral climbs at {:.3} deg ({:.3} deg requested)",
            spec.angle.to_degrees(),
            settings.spiral_angle
        );
        Some(Self { spec, states })
    }
}

/// Place every primitive for a build.
///
/// This is the main entry point. It:
/// 1. Validates the configuration (nothing is emitted for an invalid one)
/// 2. Resolves track zones and free segments per wall
/// 3. Threads the helix state through the traversal for spiral patterns
/// 4. Generates every leg in parallel and concatenates in traversal order
#[instrument(skip(config), fields(style = config.pattern.style.name()))]
pub fn place(config: &BuildConfig) -> Result<Placement> {
    config.validate()?;

    let warnings = quality_warnings(config);
    for warning in &warnings {
        warn!("{}", warning);
    }

    let plans: Vec<WallPlan> = WallSpan::all(&config.shell)
        .into_par_iter()
        .map(|wall| WallPlan::new(wall, config))
        .collect();
    let arcs = CornerArc::all(&config.shell);
    let helix = HelixPlan::new(config, &plans, &arcs);
    let discrete = Discrete::from_style(&config.pattern.style, &config.shell);

    let legs: Vec<Vec<Primitive>> = TRAVERSAL
        .par_iter()
        .enumerate()
        .map(|(i, leg)| match *leg {
            Leg::Wall(side) => {
                let plan = &plans[side.index()];
                let mut out = track_primitives(plan, config);
                match &config.pattern.style {
                    PatternStyle::Relief(_) | PatternStyle::Perforation(_) => {
                        if let Some(d) = &discrete {
                            out.extend(d.on_wall(plan, config));
                        }
                    }
                    PatternStyle::Profile(p) => {
                        out.extend(profile_on_wall(plan, p.profile, p.samples_per_period, config))
                    }
                    PatternStyle::Spiral(_) => {
                        if let Some(h) = &helix {
                            out.extend(spiral_on_wall(plan, &h.spec, &h.states[i], config));
                        }
                    }
                }
                out
            }
            Leg::Corner(corner) => {
                let arc = &arcs[corner.index()];
                if arc.radius <= 0.0 {
                    return Vec::new();
                }
                match &config.pattern.style {
                    PatternStyle::Relief(_) | PatternStyle::Perforation(_) => discrete
                        .as_ref()
                        .map(|d| d.on_corner(arc, config))
                        .unwrap_or_default(),
                    PatternStyle::Profile(p) => {
                        profile_on_corner(arc, p.profile, p.samples_per_period, config)
                    }
                    PatternStyle::Spiral(_) => helix
                        .as_ref()
                        .map(|h| spiral_on_corner(arc, &h.spec, &h.states[i]))
                        .unwrap_or_default(),
                }
            }
        })
        .collect();

    let primitives: Vec<Primitive> = legs.into_iter().flatten().collect();
    info!(
        "Placed {} primitives ({} warnings)",
        primitives.len(),
        warnings.len()
    );

    Ok(Placement {
        shell: config.shell.clone(),
        primitives,
        warnings,
    })
}
