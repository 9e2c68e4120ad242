//! Build configuration.
//!
//! One [`BuildConfig`] is parsed per build and passed by reference into every
//! component. All lengths are millimetres, all angles degrees.

use serde::{Deserialize, Serialize};

use crate::connector::check_fit;
use crate::error::{PlacementError, Result};
use crate::profile::ProfileKind;
use crate::segment::check_zones;
use crate::shape::ShapeKind;
use crate::track::compute_zones;
use crate::wall::WallSpan;

/// Default dovetail flank angle (degrees).
pub const DEFAULT_DOVETAIL_ANGLE: f64 = 25.0;

/// Rounded-rectangle shell dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSettings {
    /// Outer size along X.
    pub width: f64,
    /// Outer size along Y.
    pub height: f64,
    /// Extrusion length along Z.
    pub depth: f64,
    /// Wall thickness.
    pub wall_thickness: f64,
    /// Outer corner radius.
    pub corner_radius: f64,
}

impl ShellSettings {
    /// Length of the outer outline: four straight runs and four quarter arcs.
    pub fn perimeter(&self) -> f64 {
        let r = self.corner_radius;
        2.0 * (self.width + self.height) - 8.0 * r + std::f64::consts::TAU * r
    }
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            width: 250.0,
            height: 125.0,
            depth: 150.0,
            wall_thickness: 3.0,
            corner_radius: 20.0,
        }
    }
}

/// Connector track parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackSettings {
    /// Groove width at the wall surface.
    pub track_width: f64,
    /// Groove depth into the wall.
    pub track_depth: f64,
    /// Fraction of the shell depth the groove runs, from the bottom edge.
    pub track_length_fraction: f64,
    /// Dovetail flank angle (degrees).
    pub dovetail_angle: f64,
    /// Connector clearance per side.
    pub clearance: f64,
    /// Track count per wall in traversal order: bottom, right, top, left.
    pub count_per_wall: [u32; 4],
}

impl Default for TrackSettings {
    fn default() -> Self {
        Self {
            track_width: 10.0,
            track_depth: 2.0,
            track_length_fraction: 1.0,
            dovetail_angle: DEFAULT_DOVETAIL_ANGLE,
            clearance: 0.15,
            count_per_wall: [2, 1, 2, 1],
        }
    }
}

/// Row arrangement of discrete elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Every row starts at the same phase.
    Grid,
    /// Odd rows shift by half a pitch (brick, hex and perforation patterns).
    #[default]
    Brick,
}

/// How elements are packed into a free segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fill {
    /// `floor(len / pitch)` elements, centred.
    #[default]
    Centered,
    /// Same count, first element flush with the segment start.
    LeftAligned,
    /// One extra element, packed towards the segment ends.
    AreaFill,
}

/// Size modulation applied along the wall.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Modulation {
    /// Constant element size.
    #[default]
    None,
    /// Sinusoidal size wave.
    Sine {
        /// Wavelength along the wall.
        period: f64,
        /// Fractional size reduction at the trough, in `[0, 1]`.
        amplitude: f64,
    },
    /// Triangular size wave.
    Triangle {
        /// Wavelength along the wall.
        period: f64,
        /// Fractional size reduction at the trough, in `[0, 1]`.
        amplitude: f64,
    },
}

impl Modulation {
    /// Size factor in `[1 - amplitude, 1]` at `position`.
    pub fn scale_at(&self, position: f64) -> f64 {
        // wave is 1 at position 0 and -1 half a period later
        let (amplitude, wave) = match *self {
            Modulation::None => return 1.0,
            Modulation::Sine { period, amplitude } => {
                (amplitude, (std::f64::consts::TAU * position / period).cos())
            }
            Modulation::Triangle { period, amplitude } => {
                let t = (position / period).rem_euclid(1.0);
                (amplitude, 4.0 * (t - 0.5).abs() - 1.0)
            }
        };
        1.0 - amplitude * (1.0 - wave) / 2.0
    }

    fn validate(&self) -> Result<()> {
        match *self {
            Modulation::None => Ok(()),
            Modulation::Sine { period, amplitude } | Modulation::Triangle { period, amplitude } => {
                require_finite(&[
                    ("modulation period", period),
                    ("modulation amplitude", amplitude),
                ])?;
                if period <= 0.0 {
                    return Err(PlacementError::InvalidSettings(
                        "modulation period must be positive".into(),
                    ));
                }
                if !(0.0..=1.0).contains(&amplitude) {
                    return Err(PlacementError::InvalidSettings(
                        "modulation amplitude must be between 0 and 1".into(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Raised or recessed discrete elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliefSettings {
    /// Element outline.
    pub shape: ShapeKind,
    /// Centre-to-centre spacing along the wall.
    pub pitch: f64,
    /// Element extent; at most `pitch`.
    pub element_size: f64,
    /// Cut depth into the wall.
    pub depth: f64,
    /// Spacing between rows along Z.
    pub row_pitch: f64,
    /// Row arrangement.
    pub layout: Layout,
    /// Packing mode.
    pub fill: Fill,
    /// Lower bound on the element count of a segment at least one pitch long.
    pub min_elements: u32,
    /// Phase shift of every row, as a fraction of the pitch.
    pub phase_offset: f64,
    /// In-plane rotation of each element (degrees).
    pub rotation: f64,
    /// Size modulation.
    pub modulation: Modulation,
}

impl Default for ReliefSettings {
    fn default() -> Self {
        Self {
            shape: ShapeKind::Hexagon,
            pitch: 8.0,
            element_size: 6.0,
            depth: 1.2,
            row_pitch: 7.0,
            layout: Layout::Brick,
            fill: Fill::Centered,
            min_elements: 0,
            phase_offset: 0.0,
            rotation: 0.0,
            modulation: Modulation::None,
        }
    }
}

/// Through-holes cut across the whole wall thickness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerforationSettings {
    /// Hole outline.
    pub hole_shape: ShapeKind,
    /// Centre-to-centre spacing along the wall.
    pub pitch: f64,
    /// Hole extent; at most `pitch`.
    pub hole_size: f64,
    /// Spacing between rows along Z.
    pub row_pitch: f64,
    /// Row arrangement.
    pub layout: Layout,
    /// In-plane rotation of each hole (degrees).
    pub rotation: f64,
}

impl Default for PerforationSettings {
    fn default() -> Self {
        Self {
            hole_shape: ShapeKind::Disc,
            pitch: 10.0,
            hole_size: 6.0,
            row_pitch: 8.66,
            layout: Layout::Brick,
            rotation: 0.0,
        }
    }
}

/// Continuous depth profiles (wave, terrace, facet, flute).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    /// Profile function.
    pub profile: ProfileKind,
    /// Samples per period; below 20 the surface visibly facets.
    pub samples_per_period: u32,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            profile: ProfileKind::Wave {
                period: 12.0,
                amplitude: 1.5,
            },
            samples_per_period: 24,
        }
    }
}

/// Direction the spiral climbs along the counter-clockwise traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    /// Z rises along the traversal.
    #[default]
    Right,
    /// Z falls along the traversal.
    Left,
}

impl Handedness {
    /// `+1.0` or `-1.0`.
    pub fn sign(self) -> f64 {
        match self {
            Handedness::Right => 1.0,
            Handedness::Left => -1.0,
        }
    }
}

/// Helical grooves wrapping the whole perimeter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiralSettings {
    /// Number of parallel channels.
    pub channel_count: u32,
    /// Groove width.
    pub channel_width: f64,
    /// Groove depth.
    pub channel_depth: f64,
    /// Climb angle above the horizontal (degrees).
    pub spiral_angle: f64,
    /// Discrete sub-steps per corner.
    pub corner_steps: u32,
    /// Climb direction.
    pub handedness: Handedness,
}

impl Default for SpiralSettings {
    fn default() -> Self {
        Self {
            channel_count: 6,
            channel_width: 3.0,
            channel_depth: 1.2,
            spiral_angle: 20.0,
            corner_steps: 12,
            handedness: Handedness::Right,
        }
    }
}

/// Pattern variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternStyle {
    /// Discrete recessed elements.
    Relief(ReliefSettings),
    /// Discrete through-holes.
    Perforation(PerforationSettings),
    /// Continuous depth profile.
    Profile(ProfileSettings),
    /// Helical grooves.
    Spiral(SpiralSettings),
}

impl PatternStyle {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            PatternStyle::Relief(_) => "relief",
            PatternStyle::Perforation(_) => "perforation",
            PatternStyle::Profile(_) => "profile",
            PatternStyle::Spiral(_) => "spiral",
        }
    }
}

impl Default for PatternStyle {
    fn default() -> Self {
        PatternStyle::Relief(ReliefSettings::default())
    }
}

/// Pattern parameters shared by every variant plus the variant itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSettings {
    /// Clearance kept between a track groove and adjacent pattern.
    pub style_margin: f64,
    /// Plain band kept at the top and bottom edge of every wall.
    pub z_margin: f64,
    /// Variant.
    pub style: PatternStyle,
}

impl Default for PatternSettings {
    fn default() -> Self {
        Self {
            style_margin: 2.0,
            z_margin: 6.0,
            style: PatternStyle::default(),
        }
    }
}

/// Complete configuration for one build.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Shell dimensions.
    pub shell: ShellSettings,
    /// Connector tracks.
    pub tracks: TrackSettings,
    /// Decorative pattern.
    pub pattern: PatternSettings,
}

impl BuildConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Render as a TOML document.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PlacementError::Parse(e.to_string()))
    }

    /// Lower and upper Z of the patterned band.
    pub fn z_band(&self) -> (f64, f64) {
        (
            self.pattern.z_margin,
            self.shell.depth - self.pattern.z_margin,
        )
    }

    /// Validate every parameter. Nothing is generated for an invalid config.
    pub fn validate(&self) -> Result<()> {
        self.validate_shell()?;
        self.validate_tracks()?;
        self.validate_pattern()?;

        for wall in WallSpan::all(&self.shell) {
            let zones = compute_zones(
                self.tracks.count_per_wall[wall.side.index()],
                wall.length,
                self.tracks.track_width,
                self.pattern.style_margin,
            );
            if let Err(overlap) = check_zones(&zones) {
                return Err(PlacementError::OverlappingZones {
                    wall: wall.side.to_string(),
                    first: overlap.first,
                    second: overlap.second,
                    overlap: overlap.length,
                });
            }
        }

        Ok(())
    }

    fn validate_shell(&self) -> Result<()> {
        let s = &self.shell;
        require_finite(&[
            ("width", s.width),
            ("height", s.height),
            ("depth", s.depth),
            ("wall_thickness", s.wall_thickness),
            ("corner_radius", s.corner_radius),
        ])?;
        if s.width <= 0.0 || s.height <= 0.0 || s.depth <= 0.0 {
            return Err(PlacementError::InvalidSettings(
                "shell width, height and depth must be positive".into(),
            ));
        }
        let limit = s.width.min(s.height) / 2.0;
        if s.wall_thickness <= 0.0 || s.wall_thickness >= limit {
            return Err(PlacementError::InvalidSettings(
                "wall_thickness must be positive and below half the smaller side".into(),
            ));
        }
        if s.corner_radius < 0.0 {
            return Err(PlacementError::InvalidSettings(
                "corner_radius must not be negative".into(),
            ));
        }
        if s.corner_radius >= limit {
            return Err(PlacementError::CornerRadiusTooLarge {
                radius: s.corner_radius,
                limit,
            });
        }
        Ok(())
    }

    fn validate_tracks(&self) -> Result<()> {
        let t = &self.tracks;
        require_finite(&[
            ("track_width", t.track_width),
            ("track_depth", t.track_depth),
            ("track_length_fraction", t.track_length_fraction),
            ("dovetail_angle", t.dovetail_angle),
            ("clearance", t.clearance),
        ])?;
        if t.track_width <= 0.0 {
            return Err(PlacementError::InvalidSettings(
                "track_width must be positive".into(),
            ));
        }
        if t.track_depth <= 0.0 || t.track_depth >= self.shell.wall_thickness {
            return Err(PlacementError::InvalidSettings(
                "track_depth must be positive and below wall_thickness".into(),
            ));
        }
        if t.track_length_fraction <= 0.0 || t.track_length_fraction > 1.0 {
            return Err(PlacementError::InvalidSettings(
                "track_length_fraction must be in (0, 1]".into(),
            ));
        }
        if !(0.0..60.0).contains(&t.dovetail_angle) {
            return Err(PlacementError::InvalidSettings(
                "dovetail_angle must be in [0, 60) degrees".into(),
            ));
        }
        if t.clearance < 0.0 || t.clearance >= t.track_depth || 2.0 * t.clearance >= t.track_width
        {
            return Err(PlacementError::InvalidSettings(
                "clearance must be non-negative and smaller than the track".into(),
            ));
        }
        check_fit(t)
    }

    fn validate_pattern(&self) -> Result<()> {
        let p = &self.pattern;
        require_finite(&[("style_margin", p.style_margin), ("z_margin", p.z_margin)])?;
        if p.style_margin < 0.0 || p.z_margin < 0.0 {
            return Err(PlacementError::InvalidSettings(
                "style_margin and z_margin must not be negative".into(),
            ));
        }
        let (z_lo, z_hi) = self.z_band();
        if z_hi <= z_lo {
            return Err(PlacementError::InvalidSettings(
                "z_margin leaves no patterned band".into(),
            ));
        }

        match &p.style {
            PatternStyle::Relief(r) => {
                require_finite(&[
                    ("depth", r.depth),
                    ("phase_offset", r.phase_offset),
                    ("rotation", r.rotation),
                ])?;
                validate_discrete(r.pitch, r.element_size, r.row_pitch)?;
                r.shape.validate()?;
                r.modulation.validate()?;
                if r.depth <= 0.0 {
                    return Err(PlacementError::InvalidSettings(
                        "relief depth must be positive".into(),
                    ));
                }
                if !(0.0..1.0).contains(&r.phase_offset) {
                    return Err(PlacementError::InvalidSettings(
                        "phase_offset must be in [0, 1)".into(),
                    ));
                }
                if r.fill == Fill::LeftAligned && r.layout == Layout::Brick {
                    return Err(PlacementError::InvalidSettings(
                        "left_aligned fill requires the grid layout".into(),
                    ));
                }
            }
            PatternStyle::Perforation(h) => {
                require_finite(&[("rotation", h.rotation)])?;
                validate_discrete(h.pitch, h.hole_size, h.row_pitch)?;
                h.hole_shape.validate()?;
            }
            PatternStyle::Profile(pr) => {
                pr.profile.validate()?;
                if pr.samples_per_period == 0 {
                    return Err(PlacementError::InvalidSettings(
                        "samples_per_period must be at least 1".into(),
                    ));
                }
            }
            PatternStyle::Spiral(sp) => {
                require_finite(&[
                    ("channel_width", sp.channel_width),
                    ("channel_depth", sp.channel_depth),
                    ("spiral_angle", sp.spiral_angle),
                ])?;
                if sp.channel_count == 0 || sp.channel_width <= 0.0 || sp.channel_depth <= 0.0 {
                    return Err(PlacementError::InvalidSettings(
                        "spiral channels need a positive count, width and depth".into(),
                    ));
                }
                if sp.spiral_angle <= 0.0 || sp.spiral_angle >= 90.0 {
                    return Err(PlacementError::InvalidSettings(
                        "spiral_angle must be in (0, 90) degrees".into(),
                    ));
                }
                if sp.corner_steps == 0 {
                    return Err(PlacementError::InvalidSettings(
                        "corner_steps must be at least 1".into(),
                    ));
                }
                let channel_pitch = (z_hi - z_lo) / sp.channel_count as f64;
                if sp.channel_width >= channel_pitch {
                    return Err(PlacementError::InvalidSettings(format!(
                        "channel_width {} leaves no land between channels (pitch {:.3})",
                        sp.channel_width, channel_pitch
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Fails on the first NaN or infinite value.
fn require_finite(fields: &[(&str, f64)]) -> Result<()> {
    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some((name, value)) => Err(PlacementError::InvalidSettings(format!(
            "{name} must be a finite number, got {value}"
        ))),
        None => Ok(()),
    }
}

fn validate_discrete(pitch: f64, element_size: f64, row_pitch: f64) -> Result<()> {
    require_finite(&[
        ("pitch", pitch),
        ("element size", element_size),
        ("row_pitch", row_pitch),
    ])?;
    if pitch <= 0.0 {
        return Err(PlacementError::NonPositivePitch(pitch));
    }
    if row_pitch <= 0.0 {
        return Err(PlacementError::NonPositivePitch(row_pitch));
    }
    if element_size <= 0.0 || element_size > pitch {
        return Err(PlacementError::InvalidSettings(format!(
            "element size {element_size} must be positive and at most the pitch {pitch}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        BuildConfig::default().validate().unwrap();
    }

    #[test]
    fn test_non_finite_values_rejected() {
        for text in [
            "[pattern.style]\nkind = \"relief\"\npitch = nan",
            "[shell]\ncorner_radius = nan",
            "[shell]\nwidth = inf",
            "[tracks]\nclearance = nan",
            "[pattern]\nz_margin = -inf",
            "[pattern.style]\nkind = \"spiral\"\nspiral_angle = nan",
            "[pattern.style]\nkind = \"perforation\"\nhole_size = inf",
            "[pattern.style]\nkind = \"profile\"\nprofile = { kind = \"wave\", period = 12.0, amplitude = nan }",
            "[pattern.style]\nkind = \"relief\"\nmodulation = { kind = \"sine\", period = inf, amplitude = 0.5 }",
        ] {
            let config = BuildConfig::from_toml_str(text).unwrap();
            assert!(
                matches!(config.validate(), Err(PlacementError::InvalidSettings(_))),
                "{text}"
            );
        }
    }

    #[test]
    fn test_default_dovetail_angle() {
        assert_eq!(TrackSettings::default().dovetail_angle, 25.0);
    }

    #[test]
    fn test_zero_pitch_rejected() {
        let mut config = BuildConfig::default();
        config.pattern.style = PatternStyle::Relief(ReliefSettings {
            pitch: 0.0,
            ..Default::default()
        });
        assert_eq!(config.validate(), Err(PlacementError::NonPositivePitch(0.0)));
    }

    #[test]
    fn test_corner_radius_too_large() {
        let mut config = BuildConfig::default();
        config.shell.corner_radius = 62.5;
        assert!(matches!(
            config.validate(),
            Err(PlacementError::CornerRadiusTooLarge { .. })
        ));
    }

    #[test]
    fn test_overlapping_tracks_rejected() {
        let mut config = BuildConfig::default();
        // 125 mm wall, 10 tracks every 12.5 mm, each reserving 14 mm.
        config.tracks.count_per_wall = [0, 10, 0, 0];
        match config.validate() {
            Err(PlacementError::OverlappingZones { wall, first, second, .. }) => {
                assert_eq!(wall, "right");
                assert_eq!((first, second), (0, 1));
            }
            other => panic!("expected overlap error, got {other:?}"),
        }
    }

    #[test]
    fn test_element_larger_than_pitch_rejected() {
        let mut config = BuildConfig::default();
        config.pattern.style = PatternStyle::Perforation(PerforationSettings {
            hole_size: 12.0,
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_spiral_angle_range() {
        let mut config = BuildConfig::default();
        config.pattern.style = PatternStyle::Spiral(SpiralSettings {
            spiral_angle: 90.0,
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_partial_document() {
        let config = BuildConfig::from_toml_str(
            r#"
            [shell]
            width = 200.0

            [tracks]
            count_per_wall = [1, 0, 1, 0]

            [pattern.style]
            kind = "relief"
            pitch = 4.0
            element_size = 3.0
            shape = { kind = "star", points = 5, inner_ratio = 0.5 }
            modulation = { kind = "sine", period = 40.0, amplitude = 0.3 }
            "#,
        )
        .unwrap();

        assert_eq!(config.shell.width, 200.0);
        assert_eq!(config.shell.height, 125.0);
        assert_eq!(config.tracks.count_per_wall, [1, 0, 1, 0]);
        match &config.pattern.style {
            PatternStyle::Relief(r) => {
                assert_eq!(r.pitch, 4.0);
                assert_eq!(r.shape, ShapeKind::Star { points: 5, inner_ratio: 0.5 });
                assert_eq!(r.layout, Layout::Brick);
            }
            other => panic!("unexpected style {other:?}"),
        }
        config.validate().unwrap();
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let config = BuildConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(BuildConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_toml_parse_error() {
        let err = BuildConfig::from_toml_str("[shell]\nwidth = \"wide\"").unwrap_err();
        assert!(matches!(err, PlacementError::Parse(_)));
    }

    #[test]
    fn test_modulation_scale_bounds() {
        let m = Modulation::Triangle {
            period: 10.0,
            amplitude: 0.4,
        };
        assert!((m.scale_at(0.0) - 1.0).abs() < 1e-12);
        assert!((m.scale_at(5.0) - 0.6).abs() < 1e-12);
        assert!((m.scale_at(2.5) - 0.8).abs() < 1e-12);
        let s = Modulation::Sine {
            period: 10.0,
            amplitude: 0.4,
        };
        assert!((s.scale_at(0.0) - 1.0).abs() < 1e-12);
        assert!((s.scale_at(5.0) - 0.6).abs() < 1e-12);
        assert_eq!(Modulation::None.scale_at(3.0), 1.0);
    }
}
