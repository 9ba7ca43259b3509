//! Human-readable text output

use crate::distribution::{DistributionKind, Statistics};
use crate::element::ElementType;
use crate::stats::ObservedStatistics;
use crate::RandomRaster;

/// Print shape, tiling, type, and theoretical statistics of a raster
pub fn print_info(raster: &RandomRaster) {
    let grid = raster.grid();
    let (tile_rows, tile_cols) = raster.tile_grid();

    println!("Raster:");
    println!("  Size: {} rows x {} cols", raster.rows(), raster.cols());
    println!("  Data type: {}", raster.element_type());
    println!("  Tiles: {} x {} of {} x {}", tile_rows, tile_cols, grid.block_rows, grid.block_cols);
    println!("  Tile size: {} bytes", raster.tile_bytes());
    println!("  Seed: {}", grid.seed);
    println!("  Geotransform: {:?}", raster.geo_transform());
    if let Some(wkt) = raster.projection() {
        println!("  Projection: {}", wkt);
    }

    println!("Distribution:");
    println!("  Name: {}", grid.distribution);
    for (key, value) in &grid.parameters {
        println!("    {}: {}", key, value);
    }
    print_statistics("Theoretical statistics", &raster.statistics());
}

/// Print the in-grid part of one tile, truncated to `limit` rows and columns
pub fn print_tile(
    raster: &RandomRaster,
    tile_row: usize,
    tile_col: usize,
    tile: &[u8],
    limit: usize,
) {
    let element_type = raster.element_type();
    let size = element_type.size_in_bytes();
    let (_, block_cols) = raster.block_size();
    let (rows, cols) = raster.tile_extent(tile_row, tile_col);

    println!(
        "Tile ({}, {}): {} x {} cells in grid",
        tile_row, tile_col, rows, cols
    );
    for row in tile.chunks_exact(block_cols * size).take(rows.min(limit)) {
        let line: Vec<String> = row[..cols.min(limit) * size]
            .chunks_exact(size)
            .filter_map(|cell| element_type.decode_f64(cell))
            .map(|value| format_value(element_type, value))
            .collect();
        let more = if cols > limit { " ..." } else { "" };
        println!("  {}{}", line.join(" "), more);
    }
    if rows > limit {
        println!("  ...");
    }
}

/// Print observed statistics next to the theoretical ones
pub fn print_scan(raster: &RandomRaster, observed: &ObservedStatistics) {
    let theory = raster.statistics();
    println!("Scanned {} cells", observed.count());
    println!("  {:<8} {:>16} {:>16}", "", "theoretical", "observed");
    let rows = [
        ("min", theory.min, observed.min()),
        ("max", theory.max, observed.max()),
        ("mean", theory.mean, observed.mean()),
        ("std_dev", theory.std_dev, observed.std_dev()),
    ];
    for (label, expected, actual) in rows {
        let actual = actual.map_or_else(|| "-".to_string(), |v| format!("{:.6}", v));
        println!("  {:<8} {:>16.6} {:>16}", label, expected, actual);
    }
}

/// Print every distribution with its family and parameter contract
pub fn print_distributions() {
    for kind in DistributionKind::ALL {
        let family = kind
            .family()
            .map_or_else(|| "-".to_string(), |f| format!("{:?}", f).to_lowercase());
        println!("{} ({})", kind, family);
        for spec in kind.parameters() {
            let default = spec.default.unwrap_or("required");
            println!("  {:<10} default {:<10} {}", spec.name, default, spec.constraint);
        }
    }
}

/// Print every element type with its size and limits
pub fn print_types() {
    println!("{:<8} {:>5} {:>14} {:>14}  sampled as", "type", "bytes", "min", "max");
    for element_type in ElementType::ALL {
        let (lo, hi) = element_type.limits();
        println!(
            "{:<8} {:>5} {:>14.6e} {:>14.6e}  {}",
            element_type.name(),
            element_type.size_in_bytes(),
            lo,
            hi,
            element_type.sampling_type()
        );
    }
}

fn print_statistics(title: &str, stats: &Statistics) {
    println!("{}:", title);
    println!("  Min: {}", stats.min);
    println!("  Max: {}", stats.max);
    println!("  Mean: {}", stats.mean);
    println!("  Std dev: {}", stats.std_dev);
}

/// Integers print without a fraction, floats with six decimals
pub fn format_value(element_type: ElementType, value: f64) -> String {
    if element_type.is_integer() {
        format!("{:.0}", value)
    } else {
        format!("{:.6}", value)
    }
}
