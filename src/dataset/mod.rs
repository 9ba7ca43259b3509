//! Random raster datasets
//!
//! This module is the host-facing surface of the crate. A [`RandomRaster`]
//! pairs a validated [`GridDescription`] with the block generator selected for
//! it, and answers the questions a tile-on-demand raster reader asks: is this
//! source mine, what shape is the grid, what is in tile `(row, col)`, and what
//! are the band statistics.
//!
//! # Lifecycle
//!
//! 1. Probe a source with [`RandomRaster::identify`] (cheap, never fails)
//! 2. Open it with [`RandomRaster::open`] or [`RandomRaster::try_open`]
//! 3. Read tiles with [`RandomRaster::read_tile`], from any number of threads
//!
//! # Example
//!
//! ```
//! use random_raster::RandomRaster;
//!
//! let source = r#"{"type": "RANDOM_RASTER", "rows": 100, "cols": 100,
//!     "data_type": "Byte", "block_rows": 32, "block_cols": 32,
//!     "distribution": "uniform_integer",
//!     "distribution_parameters": {"a": 1, "b": 6}}"#;
//!
//! assert!(RandomRaster::identify(source));
//! let raster = RandomRaster::open(source).unwrap();
//! assert_eq!(raster.tile_grid(), (4, 4));
//!
//! let mut tile = vec![0u8; raster.tile_bytes()];
//! raster.read_tile(3, 3, &mut tile).unwrap();
//! assert!(tile.iter().all(|v| (1..=6).contains(v)));
//! ```

use crate::config::source;
use crate::config::{GridDescription, RasterConfig};
use crate::dispatch;
use crate::distribution::Statistics;
use crate::element::ElementType;
use crate::error::{RasterError, Result};
use crate::generator::BlockGenerator;
use crate::stats::ObservedStatistics;
use rayon::prelude::*;
use tracing::debug;

/// One opened random raster
///
/// Holds only immutable state, so a shared reference can be handed to every
/// reader thread.
pub struct RandomRaster {
    grid: GridDescription,
    config: RasterConfig,
    generator: Box<dyn BlockGenerator>,
}

impl RandomRaster {
    /// Check whether a source describes a random raster
    ///
    /// True for a readable source carrying the driver tag, even when the rest
    /// of the description is invalid; [`RandomRaster::open`] then reports the
    /// definite failure. False for untagged JSON, non-JSON text, non-`.json`
    /// paths, oversized sources, and unreadable files.
    pub fn identify(source: &str) -> bool {
        match source::load(source) {
            Ok(_) => true,
            Err(RasterError::Io { .. }) => false,
            Err(e) => !e.is_quiet(),
        }
    }

    /// Open a source (inline JSON or a `.json` path)
    ///
    /// # Errors
    ///
    /// Every failure is returned, quiet or not. Use [`RandomRaster::try_open`]
    /// to turn "not mine" into `Ok(None)`.
    pub fn open(source: &str) -> Result<Self> {
        Self::from_config(source::load(source)?)
    }

    /// Open a source, treating "not a random raster" as absence
    ///
    /// # Errors
    ///
    /// Loud failures only: validation, parameter, unsupported combination and
    /// I/O errors.
    pub fn try_open(source: &str) -> Result<Option<Self>> {
        match Self::open(source) {
            Ok(raster) => Ok(Some(raster)),
            Err(e) if e.is_quiet() => {
                debug!(error = %e, "source not recognized");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Validate a description and build its generator
    pub fn from_config(config: RasterConfig) -> Result<Self> {
        let grid = config.validate()?;
        let generator = dispatch::build_generator(
            grid.element_type,
            grid.distribution,
            &grid.parameters,
            grid.seed_scheme(),
        )?;
        Ok(Self {
            grid,
            config,
            generator,
        })
    }

    pub fn rows(&self) -> usize {
        self.grid.rows
    }

    pub fn cols(&self) -> usize {
        self.grid.cols
    }

    pub fn element_type(&self) -> ElementType {
        self.grid.element_type
    }

    /// Tile size as `(block_rows, block_cols)`
    pub fn block_size(&self) -> (usize, usize) {
        (self.grid.block_rows, self.grid.block_cols)
    }

    /// Tile grid shape as `(tile_rows, tile_cols)`
    pub fn tile_grid(&self) -> (usize, usize) {
        self.grid.tile_grid()
    }

    /// Bytes a tile buffer must hold
    pub fn tile_bytes(&self) -> usize {
        self.grid.tile_bytes()
    }

    pub fn geo_transform(&self) -> [f64; 6] {
        self.grid.geo_transform
    }

    /// Spatial reference as WKT, `None` when unset
    pub fn projection(&self) -> Option<&str> {
        self.grid.projection.as_deref()
    }

    /// Description the raster was opened from
    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    pub fn grid(&self) -> &GridDescription {
        &self.grid
    }

    /// Rows and columns of tile `(tile_row, tile_col)` that lie inside the grid
    ///
    /// Edge tiles are generated at full size; only this leading part of each
    /// of their rows maps to raster cells.
    pub fn tile_extent(&self, tile_row: usize, tile_col: usize) -> (usize, usize) {
        let (block_rows, block_cols) = self.block_size();
        let rows = self.rows().saturating_sub(tile_row * block_rows).min(block_rows);
        let cols = self.cols().saturating_sub(tile_col * block_cols).min(block_cols);
        (rows, cols)
    }

    /// Fill `buf` with tile `(tile_row, tile_col)`
    ///
    /// Writes `block_rows * block_cols` native-endian elements in row-major
    /// order. Edge tiles are full size; cells past the grid are padding.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::TileOutOfRange`] for an index outside the tile
    /// grid and [`RasterError::BufferTooSmall`] when `buf` is shorter than
    /// [`RandomRaster::tile_bytes`].
    pub fn read_tile(&self, tile_row: usize, tile_col: usize, buf: &mut [u8]) -> Result<()> {
        let (tile_rows, tile_cols) = self.tile_grid();
        if tile_row >= tile_rows || tile_col >= tile_cols {
            return Err(RasterError::TileOutOfRange {
                row: tile_row,
                col: tile_col,
                tile_rows,
                tile_cols,
            });
        }
        self.generator
            .fill(tile_row, tile_col, buf, self.grid.tile_elements())
    }

    /// Theoretical statistics of the band
    pub fn statistics(&self) -> Statistics {
        self.generator.statistics()
    }

    /// The raster's single band
    pub fn band(&self) -> RasterBand<'_> {
        RasterBand { raster: self }
    }

    /// Generate every tile and measure the in-grid cells
    ///
    /// Tiles are generated in parallel on the rayon pool, each worker reusing
    /// one tile buffer. Padding cells of edge tiles are not counted.
    pub fn observed_statistics(&self) -> Result<ObservedStatistics> {
        let (tile_rows, tile_cols) = self.tile_grid();
        let tile_bytes = self.tile_bytes();
        (0..tile_rows * tile_cols)
            .into_par_iter()
            .map_init(
                || vec![0u8; tile_bytes],
                |buf, index| self.tile_statistics(index / tile_cols, index % tile_cols, buf),
            )
            .try_reduce(ObservedStatistics::new, |mut acc, part| {
                acc.merge(&part);
                Ok(acc)
            })
    }

    fn tile_statistics(
        &self,
        tile_row: usize,
        tile_col: usize,
        buf: &mut [u8],
    ) -> Result<ObservedStatistics> {
        self.read_tile(tile_row, tile_col, buf)?;

        let element_type = self.element_type();
        let size = element_type.size_in_bytes();
        let row_bytes = self.grid.block_cols * size;
        let (rows, cols) = self.tile_extent(tile_row, tile_col);

        let mut stats = ObservedStatistics::new();
        for row in buf.chunks_exact(row_bytes).take(rows) {
            row[..cols * size]
                .chunks_exact(size)
                .filter_map(|cell| element_type.decode_f64(cell))
                .for_each(|value| stats.record(value));
        }
        Ok(stats)
    }
}

impl std::fmt::Debug for RandomRaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomRaster")
            .field("grid", &self.grid)
            .field("sampling_type", &self.generator.sampling_type())
            .finish()
    }
}

/// Band view over a [`RandomRaster`]
///
/// Addresses tiles GDAL-style, by `(x_off, y_off)` block offsets.
#[derive(Debug, Clone, Copy)]
pub struct RasterBand<'a> {
    raster: &'a RandomRaster,
}

impl<'a> RasterBand<'a> {
    pub fn element_type(&self) -> ElementType {
        self.raster.element_type()
    }

    /// Natural block size as `(x_size, y_size)`
    pub fn block_size(&self) -> (usize, usize) {
        let (block_rows, block_cols) = self.raster.block_size();
        (block_cols, block_rows)
    }

    /// Read the block at column offset `x_off` and row offset `y_off`
    pub fn read_block(&self, x_off: usize, y_off: usize, buf: &mut [u8]) -> Result<()> {
        self.raster.read_tile(y_off, x_off, buf)
    }

    pub fn minimum(&self) -> f64 {
        self.raster.statistics().min
    }

    pub fn maximum(&self) -> f64 {
        self.raster.statistics().max
    }

    pub fn statistics(&self) -> Statistics {
        self.raster.statistics()
    }
}
