//! Block generation
//!
//! This module turns a distribution instance into tiles of raw raster bytes.
//! A [`BlockGenerator`] fills one tile at a time from a pseudo-random stream
//! that depends only on the base seed, the tile grid shape, and the tile's own
//! coordinates.
//!
//! # Seeding
//!
//! ```text
//! block_seed = base_seed + tile_row * tiles_per_row + tile_col   (wrapping u64)
//! ```
//!
//! Every call to [`BlockGenerator::fill`] seeds a fresh xoshiro256++ generator
//! from `block_seed` alone. Output is therefore independent of access order and
//! of which other tiles were ever generated, and re-reading a tile reproduces it
//! byte for byte.
//!
//! # Thread Safety
//!
//! A generator holds only immutable configuration. `fill` takes `&self` and
//! keeps its bit generator on the stack, so concurrent fills need no locking.

use crate::distribution::{Sampler, Statistics};
use crate::element::{Element, ElementType};
use crate::error::{RasterError, Result};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::marker::PhantomData;
use tracing::trace;

/// Derives per-tile seeds from the base seed and the tile grid shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedScheme {
    base_seed: u64,
    tiles_per_row: u64,
}

impl SeedScheme {
    /// # Arguments
    ///
    /// * `base_seed` - Configuration-level seed
    /// * `tiles_per_row` - Number of tile columns, `ceil(cols / tile_cols)`
    pub fn new(base_seed: u64, tiles_per_row: u64) -> Self {
        Self {
            base_seed,
            tiles_per_row,
        }
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    pub fn tiles_per_row(&self) -> u64 {
        self.tiles_per_row
    }

    /// Seed of the tile at `(tile_row, tile_col)`
    ///
    /// Overflow wraps. It changes which stream a tile receives, never whether
    /// the stream is reproducible.
    #[inline]
    pub fn block_seed(&self, tile_row: usize, tile_col: usize) -> u64 {
        self.base_seed
            .wrapping_add((tile_row as u64).wrapping_mul(self.tiles_per_row))
            .wrapping_add(tile_col as u64)
    }
}

/// Tile filling capability over one (storage type, distribution) pair
///
/// Implementations are selected once, when a raster is opened, and never
/// branch on the distribution inside the fill loop.
///
/// # Thread Safety
///
/// Generators must be `Send + Sync`; hosts read tiles from many threads at
/// once against a single shared generator.
pub trait BlockGenerator: Send + Sync {
    /// Type written to the destination buffer
    fn element_type(&self) -> ElementType;

    /// Type the distribution produces values in before narrowing
    fn sampling_type(&self) -> ElementType;

    /// Seeding rule used for every tile
    fn seeds(&self) -> SeedScheme;

    /// Fill one tile
    ///
    /// Writes `element_count` native-endian values of [`Self::element_type`]
    /// contiguously to the start of `buf`, in row-major tile order. Bytes past
    /// the written region are left untouched.
    ///
    /// # Arguments
    ///
    /// * `tile_row` - Tile row index in the tile grid
    /// * `tile_col` - Tile column index in the tile grid
    /// * `buf` - Destination, at least `element_count * size_in_bytes` long
    /// * `element_count` - Number of values to draw
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::BufferTooSmall`] if `buf` cannot hold the tile.
    /// Nothing is written in that case.
    fn fill(&self, tile_row: usize, tile_col: usize, buf: &mut [u8], element_count: usize)
        -> Result<()>;

    /// Theoretical statistics, clamped to what the storage type can hold
    fn statistics(&self) -> Statistics;

    fn min(&self) -> f64 {
        self.statistics().min
    }

    fn max(&self) -> f64 {
        self.statistics().max
    }

    fn mean(&self) -> f64 {
        self.statistics().mean
    }

    fn std_dev(&self) -> f64 {
        self.statistics().std_dev
    }
}

/// Block generator drawing from a [`Sampler`] and narrowing to `T`
pub struct RandomBlockGenerator<T, S> {
    sampler: S,
    seeds: SeedScheme,
    statistics: Statistics,
    _storage: PhantomData<fn() -> T>,
}

impl<T, S> RandomBlockGenerator<T, S>
where
    T: Element,
    S: Sampler,
{
    pub fn new(sampler: S, seeds: SeedScheme) -> Self {
        let mut statistics = sampler.statistics();
        if T::TYPE.is_integer() {
            let (lo, hi) = T::TYPE.limits();
            statistics = statistics.clamp_support(lo, hi);
        }
        Self {
            sampler,
            seeds,
            statistics,
            _storage: PhantomData,
        }
    }
}

impl<T, S> BlockGenerator for RandomBlockGenerator<T, S>
where
    T: Element,
    S: Sampler,
{
    fn element_type(&self) -> ElementType {
        T::TYPE
    }

    fn sampling_type(&self) -> ElementType {
        <S::Value as Element>::TYPE
    }

    fn seeds(&self) -> SeedScheme {
        self.seeds
    }

    fn fill(
        &self,
        tile_row: usize,
        tile_col: usize,
        buf: &mut [u8],
        element_count: usize,
    ) -> Result<()> {
        let size = T::TYPE.size_in_bytes();
        let needed = element_count.saturating_mul(size);
        if buf.len() < needed {
            return Err(RasterError::BufferTooSmall {
                needed,
                actual: buf.len(),
            });
        }

        let seed = self.seeds.block_seed(tile_row, tile_col);
        trace!(tile_row, tile_col, seed, element_count, "filling tile");

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        for out in buf[..needed].chunks_exact_mut(size) {
            T::saturating_from(self.sampler.sample(&mut rng)).write_ne(out);
        }
        Ok(())
    }

    fn statistics(&self) -> Statistics {
        self.statistics
    }
}
