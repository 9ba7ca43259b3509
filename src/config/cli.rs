//! CLI argument parsing using clap

use clap::{Parser, Subcommand, ValueEnum};

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// random-raster - deterministic, tile-on-demand random rasters
#[derive(Parser, Debug)]
#[command(name = "random-raster")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log level (overrides RUST_LOG)
    #[arg(long, value_enum, global = true, env = "RANDOM_RASTER_LOG")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show shape, tiling, element type and theoretical statistics
    Info {
        /// Inline JSON description or path to a .json file
        #[arg(value_name = "SOURCE")]
        source: String,
    },

    /// Print the values of one tile
    Tile {
        /// Inline JSON description or path to a .json file
        #[arg(value_name = "SOURCE")]
        source: String,

        /// Tile row index
        #[arg(long)]
        row: usize,

        /// Tile column index
        #[arg(long)]
        col: usize,

        /// Print at most this many rows and columns of the tile
        #[arg(long, default_value = "8")]
        limit: usize,
    },

    /// Generate every tile and compare observed with theoretical statistics
    Scan {
        /// Inline JSON description or path to a .json file
        #[arg(value_name = "SOURCE")]
        source: String,
    },

    /// List supported distributions and their parameters
    Distributions,

    /// List supported element types
    Types,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate argument combinations clap cannot express
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Command::Tile { limit, .. } = self.command {
            if limit == 0 {
                anyhow::bail!("--limit must be at least 1");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_tile_arguments() {
        let cli = Cli::try_parse_from([
            "random-raster",
            "tile",
            "grid.json",
            "--row",
            "2",
            "--col",
            "3",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        assert_eq!(
            cli.command,
            Command::Tile {
                source: "grid.json".to_string(),
                row: 2,
                col: 3,
                limit: 8,
            }
        );
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let cli = Cli::try_parse_from([
            "random-raster", "tile", "grid.json", "--row", "0", "--col", "0", "--limit", "0",
        ])
        .unwrap();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_tile_requires_coordinates() {
        assert!(Cli::try_parse_from(["random-raster", "tile", "grid.json"]).is_err());
    }

    #[test]
    fn test_catalog_commands() {
        let cli = Cli::try_parse_from(["random-raster", "distributions"]).unwrap();
        assert_eq!(cli.command, Command::Distributions);
        assert_eq!(LogLevel::Trace.as_filter(), "trace");
    }
}
