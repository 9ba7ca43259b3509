//! Configuration module
//!
//! A random raster is described by a small JSON document:
//!
//! ```json
//! {
//!   "type": "RANDOM_RASTER",
//!   "rows": 1000, "cols": 800,
//!   "data_type": "Byte",
//!   "seed": 42,
//!   "block_rows": 256, "block_cols": 256,
//!   "distribution": "uniform_integer",
//!   "distribution_parameters": { "a": 1, "b": 6 }
//! }
//! ```
//!
//! [`RasterConfig`] is the raw, serde-derived form. It keeps optional keys as
//! `Option` so that serializing it reproduces exactly what was set.
//! [`RasterConfig::validate`] checks it and produces the typed
//! [`GridDescription`] the rest of the crate works from.

pub mod cli;
pub mod params;
pub mod source;
pub mod validator;

use crate::distribution::DistributionKind;
use crate::element::ElementType;
use crate::error::{RasterError, Result};
use crate::generator::SeedScheme;
use params::Params;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Value of the `type` key that marks a random raster description
pub const DRIVER_TAG: &str = "RANDOM_RASTER";

/// Tile edge length used when `block_rows` or `block_cols` is absent
pub const DEFAULT_BLOCK_SIZE: usize = 256;

/// Base seed used when `seed` is absent
pub const DEFAULT_SEED: u64 = 0;

/// Unit pixels, north up, origin at (0, 0)
pub const DEFAULT_GEO_TRANSFORM: [f64; 6] = [0.0, 1.0, 0.0, 0.0, 0.0, -1.0];

/// Raw random raster description, as read from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterConfig {
    /// Driver tag, must equal [`DRIVER_TAG`]
    #[serde(rename = "type")]
    pub driver: String,

    pub rows: i64,
    pub cols: i64,

    /// Element type name (e.g. "Byte", "Float32")
    pub data_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_rows: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_cols: Option<i64>,

    /// Distribution name (e.g. "normal")
    pub distribution: String,

    #[serde(default, skip_serializing_if = "Params::is_empty")]
    pub distribution_parameters: Params,

    /// Affine pixel-to-world transform, GDAL order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_transform: Option<[f64; 6]>,

    /// Spatial reference as WKT
    #[serde(
        default,
        alias = "projection_wkt",
        skip_serializing_if = "Option::is_none"
    )]
    pub projection: Option<String>,
}

impl RasterConfig {
    /// Start a description with every optional key unset
    pub fn new(
        rows: i64,
        cols: i64,
        element_type: ElementType,
        distribution: DistributionKind,
    ) -> Self {
        Self {
            driver: DRIVER_TAG.to_string(),
            rows,
            cols,
            data_type: element_type.name().to_string(),
            seed: None,
            block_rows: None,
            block_cols: None,
            distribution: distribution.name().to_string(),
            distribution_parameters: Params::new(),
            geo_transform: None,
            projection: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_block_size(mut self, block_rows: i64, block_cols: i64) -> Self {
        self.block_rows = Some(block_rows);
        self.block_cols = Some(block_cols);
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.distribution_parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_geo_transform(mut self, geo_transform: [f64; 6]) -> Self {
        self.geo_transform = Some(geo_transform);
        self
    }

    pub fn with_projection(mut self, wkt: impl Into<String>) -> Self {
        self.projection = Some(wkt.into());
        self
    }

    /// Parse a JSON description
    ///
    /// # Errors
    ///
    /// Quiet errors: [`RasterError::Parse`] when the text is not JSON, and
    /// [`RasterError::TypeTagMismatch`] when it is JSON without the driver tag.
    /// A tagged document whose keys have the wrong shape fails loudly with
    /// [`RasterError::Validation`].
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(RasterError::Parse)?;
        Self::from_value(value)
    }

    /// Interpret an already parsed JSON tree
    pub fn from_value(value: Value) -> Result<Self> {
        let tag = value.get("type");
        if tag.and_then(Value::as_str) != Some(DRIVER_TAG) {
            let found = tag.map(|t| match t.as_str() {
                Some(s) => s.to_string(),
                None => t.to_string(),
            });
            debug!(?found, "not a {} description", DRIVER_TAG);
            return Err(RasterError::TypeTagMismatch {
                expected: DRIVER_TAG,
                found,
            });
        }
        serde_json::from_value(value).map_err(|e| RasterError::validation(e.to_string()))
    }

    /// Serialize back to JSON, omitting unset optional keys
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(RasterError::Serialize)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(RasterError::Serialize)
    }

    /// Check the description and resolve defaults
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::Validation`] for non-positive or oversized
    /// dimensions, an unknown element type or distribution, non-positive tile
    /// dimensions, or a degenerate geotransform.
    pub fn validate(&self) -> Result<GridDescription> {
        validator::validate(self)
    }
}

/// Validated, immutable description of one grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridDescription {
    pub rows: usize,
    pub cols: usize,
    pub element_type: ElementType,
    pub distribution: DistributionKind,
    pub parameters: Params,
    pub seed: u64,
    pub block_rows: usize,
    pub block_cols: usize,
    pub geo_transform: [f64; 6],
    pub projection: Option<String>,
}

impl GridDescription {
    /// Number of tile columns, `ceil(cols / block_cols)`
    pub fn tiles_per_row(&self) -> usize {
        1 + (self.cols - 1) / self.block_cols
    }

    /// Number of tile rows, `ceil(rows / block_rows)`
    pub fn tiles_per_column(&self) -> usize {
        1 + (self.rows - 1) / self.block_rows
    }

    /// Tile grid shape as `(tile_rows, tile_cols)`
    pub fn tile_grid(&self) -> (usize, usize) {
        (self.tiles_per_column(), self.tiles_per_row())
    }

    /// Elements in one full tile, edge tiles included
    pub fn tile_elements(&self) -> usize {
        self.block_rows * self.block_cols
    }

    /// Bytes in one full tile
    pub fn tile_bytes(&self) -> usize {
        self.tile_elements() * self.element_type.size_in_bytes()
    }

    pub fn seed_scheme(&self) -> SeedScheme {
        SeedScheme::new(self.seed, self.tiles_per_row() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE: &str = r#"{
        "type": "RANDOM_RASTER",
        "rows": 1000,
        "cols": 800,
        "data_type": "Byte",
        "seed": 42,
        "block_cols": 64,
        "distribution": "uniform_integer",
        "distribution_parameters": {"a": 1, "b": 6}
    }"#;

    #[test]
    fn test_parse_sample() {
        let config = RasterConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.rows, 1000);
        assert_eq!(config.cols, 800);
        assert_eq!(config.data_type, "Byte");
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.block_rows, None);
        assert_eq!(config.block_cols, Some(64));
        assert_eq!(config.distribution_parameters["b"], json!(6));
    }

    #[test]
    fn test_round_trip_keeps_unset_keys_unset() {
        let config = RasterConfig::parse(SAMPLE).unwrap();
        let text = config.to_json().unwrap();
        assert!(!text.contains("block_rows"));
        assert!(!text.contains("geo_transform"));
        assert!(text.contains("\"type\":\"RANDOM_RASTER\""));

        let reparsed = RasterConfig::parse(&text).unwrap();
        assert_eq!(reparsed, config);
        assert_eq!(reparsed.validate().unwrap(), config.validate().unwrap());
    }

    #[test]
    fn test_round_trip_of_builder() {
        let config = RasterConfig::new(10, 20, ElementType::Float32, DistributionKind::Normal)
            .with_seed(7)
            .with_block_size(4, 8)
            .with_parameter("mean", 3.5)
            .with_geo_transform([100.0, 0.5, 0.0, 200.0, 0.0, -0.5])
            .with_projection("LOCAL_CS[\"grid\"]");
        let reparsed = RasterConfig::parse(&config.to_json_pretty().unwrap()).unwrap();
        assert_eq!(reparsed, config);
    }

    #[test]
    fn test_malformed_text_is_quiet() {
        let err = RasterConfig::parse("{ not json").unwrap_err();
        assert!(matches!(err, RasterError::Parse(_)));
        assert!(err.is_quiet());
    }

    #[test]
    fn test_foreign_tag_is_quiet() {
        let err = RasterConfig::parse(r#"{"type": "NOT_RANDOM_RASTER", "rows": 1}"#).unwrap_err();
        match &err {
            RasterError::TypeTagMismatch { found, .. } => {
                assert_eq!(found.as_deref(), Some("NOT_RANDOM_RASTER"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_quiet());

        assert!(RasterConfig::parse(r#"{"rows": 1}"#).unwrap_err().is_quiet());
        assert!(RasterConfig::parse("[1, 2, 3]").unwrap_err().is_quiet());
        assert!(RasterConfig::parse(r#"{"type": 5}"#).unwrap_err().is_quiet());
    }

    #[test]
    fn test_tagged_but_malformed_is_loud() {
        let err = RasterConfig::parse(r#"{"type": "RANDOM_RASTER", "rows": "many"}"#).unwrap_err();
        assert!(matches!(err, RasterError::Validation(_)));
        assert!(!err.is_quiet());

        let err = RasterConfig::parse(
            r#"{"type": "RANDOM_RASTER", "rows": 1, "cols": 1, "data_type": "Byte",
                "distribution": "poisson", "seed": -3}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RasterError::Validation(_)));
    }

    #[test]
    fn test_projection_wkt_alias() {
        let config = RasterConfig::parse(
            r#"{"type": "RANDOM_RASTER", "rows": 1, "cols": 1, "data_type": "Byte",
                "distribution": "poisson", "projection_wkt": "GEOGCS[]"}"#,
        )
        .unwrap();
        assert_eq!(config.projection.as_deref(), Some("GEOGCS[]"));
    }

    #[test]
    fn test_tile_grid_geometry() {
        let grid = RasterConfig::parse(SAMPLE).unwrap().validate().unwrap();
        assert_eq!((grid.block_rows, grid.block_cols), (256, 64));
        // 1000 / 256 -> 4 tile rows, 800 / 64 -> 13 tile columns
        assert_eq!(grid.tile_grid(), (4, 13));
        assert_eq!(grid.tile_elements(), 256 * 64);
        assert_eq!(grid.tile_bytes(), 256 * 64);
        assert_eq!(grid.seed_scheme().tiles_per_row(), 13);
        assert_eq!(grid.seed_scheme().base_seed(), 42);
    }
}
