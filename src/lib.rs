//! random-raster - Deterministic, tile-on-demand random rasters
//!
//! A random raster is a virtual grid described by a small JSON document. No
//! pixels are stored: any tile is produced on request from the description's
//! base seed and the tile's position, so re-reading a tile, in any order and
//! from any thread, yields the same bytes.
//!
//! # Architecture
//!
//! - **Element types** ([`element`]): the storage type catalog and narrowing
//! - **Distributions** ([`distribution`]): 20 families resolved from JSON parameters
//! - **Dispatch** ([`dispatch`]): one generator factory per (type, distribution) pair
//! - **Block generation** ([`generator`]): per-tile seeding and buffer fill
//! - **Datasets** ([`dataset`]): the host-facing identify/open/read surface

pub mod config;
pub mod dataset;
pub mod dispatch;
pub mod distribution;
pub mod element;
pub mod error;
pub mod generator;
pub mod output;
pub mod stats;
pub mod util;

// Re-export commonly used types
pub use config::{GridDescription, RasterConfig, DRIVER_TAG};
pub use dataset::{RandomRaster, RasterBand};
pub use distribution::{DistributionKind, Statistics};
pub use element::ElementType;
pub use error::{ParameterError, RasterError, Result};
pub use generator::BlockGenerator;
