//! Configuration validation

use super::*;

/// Largest accepted raster or tile dimension
pub const MAX_DIMENSION: i64 = i32::MAX as i64;

/// Validate a raw description and resolve its defaults
pub fn validate(config: &RasterConfig) -> Result<GridDescription> {
    if config.driver != DRIVER_TAG {
        return Err(RasterError::TypeTagMismatch {
            expected: DRIVER_TAG,
            found: Some(config.driver.clone()),
        });
    }

    let rows = validate_dimension("rows", config.rows)?;
    let cols = validate_dimension("cols", config.cols)?;
    let element_type = validate_element_type(&config.data_type)?;
    let distribution = validate_distribution(&config.distribution)?;
    let (block_rows, block_cols) = validate_block_size(config)?;
    let geo_transform = validate_geo_transform(config.geo_transform)?;

    Ok(GridDescription {
        rows,
        cols,
        element_type,
        distribution,
        parameters: config.distribution_parameters.clone(),
        seed: config.seed.unwrap_or(DEFAULT_SEED),
        block_rows,
        block_cols,
        geo_transform,
        projection: config.projection.clone(),
    })
}

/// Validate a raster or tile dimension
fn validate_dimension(key: &str, value: i64) -> Result<usize> {
    if value <= 0 {
        return Err(RasterError::validation(format!(
            "{} must be positive, got {}",
            key, value
        )));
    }
    if value > MAX_DIMENSION {
        return Err(RasterError::validation(format!(
            "{} must not exceed {}, got {}",
            key, MAX_DIMENSION, value
        )));
    }
    Ok(value as usize)
}

fn validate_element_type(name: &str) -> Result<ElementType> {
    match ElementType::from_name(name) {
        ElementType::Unknown => Err(RasterError::validation(format!(
            "Unknown data type '{}', expected one of: {}",
            name,
            ElementType::ALL.map(ElementType::name).join(", ")
        ))),
        element_type => Ok(element_type),
    }
}

fn validate_distribution(name: &str) -> Result<DistributionKind> {
    match DistributionKind::from_name(name) {
        DistributionKind::Unspecified => Err(RasterError::validation(format!(
            "Unknown distribution '{}'",
            name
        ))),
        kind => Ok(kind),
    }
}

/// Validate tile dimensions, defaulting unset ones
fn validate_block_size(config: &RasterConfig) -> Result<(usize, usize)> {
    let default = DEFAULT_BLOCK_SIZE as i64;
    let block_rows = validate_dimension("block_rows", config.block_rows.unwrap_or(default))?;
    let block_cols = validate_dimension("block_cols", config.block_cols.unwrap_or(default))?;

    let elements = block_rows as u64 * block_cols as u64;
    if elements > MAX_DIMENSION as u64 {
        return Err(RasterError::validation(format!(
            "tile of {}x{} holds {} elements, more than the limit of {}",
            block_rows, block_cols, elements, MAX_DIMENSION
        )));
    }
    Ok((block_rows, block_cols))
}

/// Validate the geotransform, defaulting when unset
fn validate_geo_transform(geo_transform: Option<[f64; 6]>) -> Result<[f64; 6]> {
    let Some(gt) = geo_transform else {
        return Ok(DEFAULT_GEO_TRANSFORM);
    };
    if let Some(i) = gt.iter().position(|v| !v.is_finite()) {
        return Err(RasterError::validation(format!(
            "geo_transform[{}] must be finite, got {}",
            i, gt[i]
        )));
    }
    if gt[1] == 0.0 || gt[5] == 0.0 {
        return Err(RasterError::validation(format!(
            "geo_transform pixel sizes must be non-zero, got {} and {}",
            gt[1], gt[5]
        )));
    }
    Ok(gt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> RasterConfig {
        RasterConfig::new(100, 50, ElementType::Int16, DistributionKind::UniformInteger)
    }

    fn validation_message(config: &RasterConfig) -> String {
        match validate(config) {
            Err(RasterError::Validation(msg)) => msg,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_resolved() {
        let grid = validate(&base()).unwrap();
        assert_eq!(grid.rows, 100);
        assert_eq!(grid.cols, 50);
        assert_eq!(grid.element_type, ElementType::Int16);
        assert_eq!(grid.distribution, DistributionKind::UniformInteger);
        assert_eq!(grid.seed, DEFAULT_SEED);
        assert_eq!((grid.block_rows, grid.block_cols), (256, 256));
        assert_eq!(grid.geo_transform, DEFAULT_GEO_TRANSFORM);
        assert_eq!(grid.projection, None);
        assert_eq!(grid.tile_grid(), (1, 1));
    }

    #[test]
    fn test_rows_must_be_positive() {
        let mut config = base();
        config.rows = 0;
        assert!(validation_message(&config).contains("rows must be positive"));
        config.rows = -5;
        assert!(validation_message(&config).contains("rows"));
        let mut config = base();
        config.cols = 0;
        assert!(validation_message(&config).contains("cols"));
    }

    #[test]
    fn test_dimensions_have_an_upper_limit() {
        let mut config = base();
        config.cols = MAX_DIMENSION + 1;
        assert!(validation_message(&config).contains("must not exceed"));
        config.cols = MAX_DIMENSION;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        let mut config = base();
        config.distribution = "bogus".to_string();
        assert!(validation_message(&config).contains("Unknown distribution 'bogus'"));

        let mut config = base();
        config.data_type = "Complex64".to_string();
        let msg = validation_message(&config);
        assert!(msg.contains("Complex64"));
        assert!(msg.contains("Float64"));
    }

    #[test]
    fn test_type_names_are_case_insensitive() {
        let mut config = base();
        config.data_type = "uint16".to_string();
        assert_eq!(validate(&config).unwrap().element_type, ElementType::UInt16);
    }

    #[test]
    fn test_block_size() {
        let config = base().with_block_size(0, 16);
        assert!(validation_message(&config).contains("block_rows"));

        let config = base().with_block_size(65_536, 65_536);
        assert!(validation_message(&config).contains("elements"));

        let grid = validate(&base().with_block_size(16, 8)).unwrap();
        // 100 / 16 -> 7 tile rows, 50 / 8 -> 7 tile columns
        assert_eq!(grid.tile_grid(), (7, 7));
    }

    #[test]
    fn test_geo_transform() {
        let gt = [10.5, 0.1, 0.0, 20.5, 0.0, -0.1];
        assert_eq!(validate(&base().with_geo_transform(gt)).unwrap().geo_transform, gt);

        let config = base().with_geo_transform([0.0; 6]);
        assert!(validation_message(&config).contains("non-zero"));
    }

    #[test]
    fn test_foreign_driver_tag_is_quiet() {
        let mut config = base();
        config.driver = "VRT".to_string();
        assert!(validate(&config).unwrap_err().is_quiet());
    }
}
