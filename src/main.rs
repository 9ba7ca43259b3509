//! random-raster CLI entry point

use anyhow::{Context, Result};
use random_raster::config::cli::{Cli, Command};
use random_raster::output::text;
use random_raster::RandomRaster;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(&cli);
    cli.validate()?;

    match cli.command {
        Command::Info { source } => {
            let raster = open(&source)?;
            text::print_info(&raster);
        }
        Command::Tile {
            source,
            row,
            col,
            limit,
        } => {
            let raster = open(&source)?;
            let mut tile = vec![0u8; raster.tile_bytes()];
            raster
                .read_tile(row, col, &mut tile)
                .with_context(|| format!("Failed to read tile ({}, {})", row, col))?;
            text::print_tile(&raster, row, col, &tile, limit);
        }
        Command::Scan { source } => {
            let raster = open(&source)?;
            let (tile_rows, tile_cols) = raster.tile_grid();
            info!(tiles = tile_rows * tile_cols, "scanning raster");
            let observed = raster
                .observed_statistics()
                .context("Failed to scan raster")?;
            text::print_scan(&raster, &observed);
        }
        Command::Distributions => text::print_distributions(),
        Command::Types => text::print_types(),
    }
    Ok(())
}

/// Install the tracing subscriber
///
/// `--log-level` wins over `RUST_LOG`; with neither set only warnings show.
fn init_logging(cli: &Cli) {
    let filter = match cli.log_level {
        Some(level) => EnvFilter::new(level.as_filter()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open(source: &str) -> Result<RandomRaster> {
    let raster = RandomRaster::open(source)
        .with_context(|| format!("Failed to open random raster from '{}'", abbreviate(source)))?;
    info!(
        rows = raster.rows(),
        cols = raster.cols(),
        element_type = %raster.element_type(),
        distribution = %raster.grid().distribution,
        "opened random raster"
    );
    Ok(raster)
}

/// Keep inline JSON sources readable in error messages
fn abbreviate(source: &str) -> String {
    const MAX: usize = 60;
    let flat = source.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}...", &flat[..end]),
        None => flat,
    }
}
