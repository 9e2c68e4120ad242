#![warn(missing_docs)]

//! Perimeter texture placement for rounded-rectangle shelving shells.
//!
//! Given a shell (width, height, depth, wall thickness, corner radius), the
//! connector tracks and a decorative pattern, this crate decides where every
//! negative-volume primitive goes: dovetail grooves for the connectors and
//! pattern elements, profiles or spiral grooves in the space between them.
//! Geometry kernels only have to subtract the result.
//!
//! # Example
//!
//! ```ignore
//! use shellwork_pattern::{place, BuildConfig};
//!
//! let config = BuildConfig::from_toml_str(&std::fs::read_to_string("shell.toml")?)?;
//! let placement = place(&config)?;
//!
//! println!("Primitives: {}", placement.primitives.len());
//! for batch in placement.batches(256) {
//!     // subtract batch
//! }
//! ```

pub mod config;
pub mod connector;
pub mod corner;
pub mod distribute;
pub mod error;
pub mod helix;
pub mod placement;
pub mod primitive;
pub mod profile;
pub mod segment;
pub mod shape;
pub mod track;
pub mod wall;

pub use config::{
    BuildConfig, Fill, Handedness, Layout, Modulation, PatternSettings, PatternStyle,
    PerforationSettings, ProfileSettings, ReliefSettings, ShellSettings, SpiralSettings,
    TrackSettings, DEFAULT_DOVETAIL_ANGLE,
};
pub use connector::{check_fit, BowtieConnector, DovetailGroove};
pub use corner::{fit_periods, map_corner, map_corner_profile, CornerArc, CornerFit, CornerPlacement};
pub use distribute::{distribute, distribute_rows, instance_count, Centering, FillMode, PatternSpec};
pub use error::{PlacementError, Result};
pub use helix::{advance, advance_wall, fold_traversal, wall_grooves, HelixState, HelixStep, SpiralSpec};
pub use placement::{place, quality_warnings, Placement, PlacementStats, QualityWarning};
pub use primitive::{Cut, Primitive, Source};
pub use profile::{FittedProfile, ProfileKind, ProfileSample};
pub use segment::{check_zones, compute_free_segments, FreeSegment, MIN_GAP};
pub use shape::ShapeKind;
pub use track::{compute_zones, TrackZone};
pub use wall::{Corner, Leg, Side, WallSpan, TRAVERSAL};
