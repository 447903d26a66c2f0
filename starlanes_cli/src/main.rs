// CLI entry point for the Starlanes universe generator.
//
// Loads a `UniverseConfig` (or the default preset), generates the universe
// synchronously, then writes the artifact set with the async output
// writer. Generation runs on a blocking thread so the tokio workers stay
// free for the write phase.
//
// Usage:
//   starlanes [OPTIONS]
//     --config <FILE>            JSON UniverseConfig (default: built-in preset)
//     --out <DIR>                Output directory (default: ./universe)
//     --seed <SEED>              Override the config's seed
//     --print-default-config     Print the default config as JSON and exit
//
// Logging goes through `tracing`; set `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use clap::Parser;
use starlanes_gen::{UniverseConfig, generate_universe};
use starlanes_output::write_universe;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Procedural starfield and trade-route generator", long_about = None)]
struct Cli {
    /// JSON configuration file. Omitted sections use their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output directory. Deleted and recreated on every run.
    #[arg(long, default_value = "universe")]
    out: PathBuf,
    /// Override the configured seed.
    #[arg(long)]
    seed: Option<String>,
    /// Print the default configuration as pretty JSON and exit.
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    if cli.print_default_config {
        println!("{}", serde_json::to_string_pretty(&UniverseConfig::default())?);
        return Ok(());
    }

    let config = resolve_config(cli.config.as_deref(), cli.seed)?;
    info!(seed = %config.seed, out = %cli.out.display(), "starting generation");

    let universe = tokio::task::spawn_blocking(move || generate_universe(&config))
        .await
        .context("generation task failed")?
        .context("generation failed")?;

    let stats = &universe.stats;
    info!(
        systems = stats.total_systems,
        oikumene = stats.oikumene_systems,
        beyond = stats.beyond_systems,
        routes = stats.total_routes,
        bridges = stats.bridge_routes,
        average_cost = stats.average_route_cost,
        unbridged = stats.unbridged_components,
        "generation complete"
    );

    let report = write_universe(&cli.out, &universe)
        .await
        .with_context(|| format!("failed to write output to {}", cli.out.display()))?;
    info!(
        files = report.files_written,
        peak_in_flight = report.peak_in_flight,
        "done"
    );
    Ok(())
}

/// Load the config file (or the default preset), apply the seed override,
/// and validate.
fn resolve_config(path: Option<&Path>, seed: Option<String>) -> Result<UniverseConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            UniverseConfig::from_json(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => UniverseConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}
