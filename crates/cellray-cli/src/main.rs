//! cellray CLI - sample a point-cloud field on grids and along rays.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cellray_cloud::PointCloud;
use cellray_math::Point3;
use cellray_sample::{BruteProjection, Projection, SampleBuffer, Slice};
use cellray_trace::Ray;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod input;

use config::{ProjectionConfig, RunConfig};
use input::{parse_point, read_points};

#[derive(Parser)]
#[command(name = "cellray")]
#[command(about = "Sample a point-cloud field through its nearest-neighbour cells", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct Inputs {
    /// Point file with one `x y z value` generator per line
    #[arg(short, long)]
    points: PathBuf,
    /// TOML run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample a planar slice by nearest-cell lookup
    Slice {
        #[command(flatten)]
        inputs: Inputs,
        /// Output file, one value per line
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Integrate the field along every ray of a projection
    Project {
        #[command(flatten)]
        inputs: Inputs,
        /// Output file, one value per line
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Approximate a projection by summing lattice lookups
    Brute {
        #[command(flatten)]
        inputs: Inputs,
        /// Output file, one value per line
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Trace one ray and print its segments as JSON
    Ray {
        #[command(flatten)]
        inputs: Inputs,
        /// Ray start as x,y,z
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        from: Point3,
        /// Ray end as x,y,z
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        to: Point3,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cellray_cli=info,cellray_cloud=info,cellray_sample=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Slice { inputs, out } => {
            let (config, cloud) = prepare(&inputs)?;
            let settings = config
                .slice
                .context("config has no [slice] section")?;
            let mut slice = Slice::new(settings.npix, settings.extent, settings.depth)?
                .with_schedule(config.schedule);
            slice.make(&cloud)?;
            save(slice.output(), &out)?;
        }
        Commands::Project { inputs, out } => {
            let (config, cloud) = prepare(&inputs)?;
            let projection = match config
                .projection
                .context("config has no [projection] section")?
            {
                ProjectionConfig::AxisAligned { npix, extent } => {
                    Projection::axis_aligned(npix, extent)?
                }
                ProjectionConfig::Grid(spec) => Projection::from_grid(&spec)?,
            };
            let mut projection = projection
                .with_settings(config.trace)
                .with_schedule(config.schedule);
            projection.make(&cloud)?;
            save(projection.output(), &out)?;
        }
        Commands::Brute { inputs, out } => {
            let (config, cloud) = prepare(&inputs)?;
            let settings = config
                .brute
                .context("config has no [brute] section")?;
            let mut brute =
                BruteProjection::new(settings.npix, settings.extent)?.with_schedule(config.schedule);
            brute.make(&cloud)?;
            save(brute.output(), &out)?;
        }
        Commands::Ray { inputs, from, to } => {
            let (config, cloud) = prepare(&inputs)?;
            let integral = Ray::new(from, to)?.integrate_with(&cloud, &config.trace)?;
            println!("{}", serde_json::to_string_pretty(&integral)?);
        }
    }

    Ok(())
}

/// Load the run configuration and build the cloud it describes.
fn prepare(inputs: &Inputs) -> Result<(RunConfig, PointCloud)> {
    let config = RunConfig::load_or_default(inputs.config.as_deref())?;
    let generators = read_points(&inputs.points)?;
    info!(
        path = %inputs.points.display(),
        count = generators.positions.len(),
        "Read generators"
    );

    let mut cloud = match config.domain {
        Some(domain) => PointCloud::load(&generators.positions, &generators.values, domain)?,
        None => PointCloud::load_unbounded(&generators.positions, &generators.values)?,
    };
    cloud.build()?;
    Ok((config, cloud))
}

fn save(buffer: &SampleBuffer, out: &Path) -> Result<()> {
    buffer
        .write_text(out)
        .with_context(|| format!("failed to save samples to {}", out.display()))
}
