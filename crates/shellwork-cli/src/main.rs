//! shellwork CLI - perimeter texture placement
//!
//! Reads a TOML build configuration and writes the placed primitives as JSON
//! or a short text report.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use shellwork_pattern::{place, BuildConfig, Placement, Side};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shellwork")]
#[command(about = "Place decorative cuts and connector tracks around a shelving shell", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all logging
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Place every primitive for a configuration
    Place {
        /// Build configuration (.toml)
        config: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Include shell-space outlines of element cuts
        #[arg(long)]
        footprints: bool,
        /// Primitives per subtraction batch reported in text output
        #[arg(long, default_value_t = 256)]
        batch_size: usize,
    },
    /// Validate a configuration and report quality warnings
    Check {
        /// Build configuration (.toml)
        config: PathBuf,
    },
    /// Print the default configuration
    Defaults {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Text,
}

/// JSON document written by `place`.
#[derive(Serialize)]
struct PlaceOutput<'a> {
    #[serde(flatten)]
    placement: &'a Placement,
    #[serde(skip_serializing_if = "Option::is_none")]
    footprints: Option<Vec<Option<Vec<[f64; 3]>>>>,
}

/// Level used when `RUST_LOG` is unset.
fn verbosity_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Send diagnostics to stderr so stdout carries only the placement output.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }
    let filter = EnvFilter::builder()
        .with_default_directive(verbosity_level(verbose).into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Place {
            config,
            output,
            format,
            footprints,
            batch_size,
        } => {
            let config_data = load_config(&config)?;
            let placement = place(&config_data)
                .with_context(|| format!("placement failed for {}", config.display()))?;
            let text = match format {
                Format::Json => render_json(&placement, footprints)?,
                Format::Text => render_text(&placement, batch_size),
            };
            write_output(output.as_deref(), &text)?;
        }
        Commands::Check { config } => {
            let config_data = load_config(&config)?;
            config_data
                .validate()
                .with_context(|| format!("{} is not a valid configuration", config.display()))?;
            let warnings = shellwork_pattern::quality_warnings(&config_data);
            println!("{}: ok ({})", config.display(), config_data.pattern.style.name());
            for warning in &warnings {
                println!("  warning: {warning}");
            }
        }
        Commands::Defaults { output } => {
            let text = BuildConfig::default().to_toml_string()?;
            write_output(output.as_deref(), &text)?;
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<BuildConfig> {
    let text =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let config = BuildConfig::from_toml_str(&text)
        .with_context(|| format!("cannot parse {}", path.display()))?;
    debug!("Loaded configuration from {:?}", path);
    Ok(config)
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("cannot write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn render_json(placement: &Placement, footprints: bool) -> Result<String> {
    let output = PlaceOutput {
        placement,
        footprints: footprints.then(|| placement.primitives.iter().map(|p| p.footprint()).collect()),
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

fn render_text(placement: &Placement, batch_size: usize) -> String {
    let stats = placement.stats();
    let shell = &placement.shell;
    let mut lines = vec![
        format!(
            "shell {} x {} x {} mm, wall {} mm, corner radius {} mm",
            shell.width, shell.height, shell.depth, shell.wall_thickness, shell.corner_radius
        ),
        format!(
            "primitives: {} (walls {}, corners {}, tracks {})",
            stats.total, stats.wall, stats.corner, stats.track
        ),
    ];
    for side in Side::ALL {
        let count = placement
            .primitives
            .iter()
            .filter(|p| matches!(p.source, shellwork_pattern::Source::Wall { side: s, .. } if s == side))
            .count();
        lines.push(format!("  {side:<6} {count}"));
    }
    lines.push(format!(
        "batches: {} of up to {}",
        placement.batches(batch_size).len(),
        batch_size.max(1)
    ));
    for warning in &placement.warnings {
        lines.push(format!("warning: {warning}"));
    }
    lines.join("\n")
}
