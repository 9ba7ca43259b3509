//! Error types
//!
//! Every failure the engine can report is a [`RasterError`]. Some of them are
//! "quiet": they mean the input is simply not a random raster description and a
//! host should try another interpretation. The rest abort construction of the
//! raster with a descriptive message.

use crate::distribution::DistributionKind;
use crate::element::ElementType;
use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, RasterError>;

/// Failure while resolving one named distribution parameter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("Missing required parameter: '{key}'")]
    Missing { key: String },

    #[error("Parameter '{key}' must be {expected}, got {found}")]
    WrongType {
        key: String,
        expected: String,
        found: String,
    },

    #[error("Parameter '{key}' with value {value} violates constraint {constraint}")]
    OutOfRange {
        key: String,
        value: String,
        constraint: String,
    },

    #[error("Invalid range: '{lower_key}' ({lower}) must not be greater than '{upper_key}' ({upper})")]
    Misordered {
        lower_key: String,
        lower: String,
        upper_key: String,
        upper: String,
    },

    #[error("Parameter '{key}' is invalid: {reason}")]
    Invalid { key: String, reason: String },
}

impl ParameterError {
    /// Name of the parameter that failed
    pub fn key(&self) -> &str {
        match self {
            Self::Missing { key }
            | Self::WrongType { key, .. }
            | Self::OutOfRange { key, .. }
            | Self::Invalid { key, .. } => key,
            Self::Misordered { lower_key, .. } => lower_key,
        }
    }

    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Top-level error for parsing, validating, dispatching and reading rasters
#[derive(Debug, Error)]
pub enum RasterError {
    /// Text is not JSON at all
    #[error("Malformed configuration JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// Valid JSON but not a random raster description
    #[error("Configuration type {found:?} is not {expected:?}")]
    TypeTagMismatch {
        expected: &'static str,
        found: Option<String>,
    },

    /// Source rejected before any parse attempt
    #[error("Configuration source is {size} bytes, exceeding the limit of {limit} bytes")]
    SourceTooLarge { size: u64, limit: u64 },

    /// Neither inline JSON nor a `.json` file
    #[error("Source '{0}' is not a random raster description")]
    NotRecognized(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error("Distribution '{distribution}' is not supported for data type {element_type}")]
    UnsupportedCombination {
        element_type: ElementType,
        distribution: DistributionKind,
    },

    #[error("Tile ({row}, {col}) is outside the {tile_rows}x{tile_cols} tile grid")]
    TileOutOfRange {
        row: usize,
        col: usize,
        tile_rows: usize,
        tile_cols: usize,
    },

    #[error("Destination buffer holds {actual} bytes but {needed} are required")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("Failed to read configuration source {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl RasterError {
    /// True when the error only means "not mine"
    ///
    /// Hosts probing a source use this to decide between trying another
    /// handler and reporting a definite failure.
    pub fn is_quiet(&self) -> bool {
        matches!(
            self,
            Self::Parse(_)
                | Self::TypeTagMismatch { .. }
                | Self::SourceTooLarge { .. }
                | Self::NotRecognized(_)
        )
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_classification() {
        let err = RasterError::TypeTagMismatch {
            expected: "RANDOM_RASTER",
            found: Some("VRT".to_string()),
        };
        assert!(err.is_quiet());
        assert!(RasterError::SourceTooLarge { size: 11, limit: 10 }.is_quiet());
        assert!(!RasterError::validation("rows must be positive").is_quiet());

        let err: RasterError = ParameterError::Missing { key: "alpha".into() }.into();
        assert!(!err.is_quiet());
    }

    #[test]
    fn test_parameter_error_messages_name_the_rule() {
        let err = ParameterError::Misordered {
            lower_key: "a".into(),
            lower: "100".into(),
            upper_key: "b".into(),
            upper: "-100".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Invalid range"));
        assert!(msg.contains("'a' (100) must not be greater than 'b' (-100)"));

        let err = ParameterError::OutOfRange {
            key: "p".into(),
            value: "1.5".into(),
            constraint: "in [0, 1]".into(),
        };
        assert_eq!(err.key(), "p");
        assert!(err.to_string().contains("in [0, 1]"));
    }

    #[test]
    fn test_unsupported_combination_names_both() {
        let err = RasterError::UnsupportedCombination {
            element_type: ElementType::Float32,
            distribution: DistributionKind::Poisson,
        };
        let msg = err.to_string();
        assert!(msg.contains("poisson"));
        assert!(msg.contains("Float32"));
    }
}
