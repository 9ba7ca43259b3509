//! Configuration sources
//!
//! A source string is either the JSON description itself or a path to a
//! `.json` file holding it. Sources are size-checked before any parse attempt.

use super::RasterConfig;
use crate::error::{RasterError, Result};
use std::borrow::Cow;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Largest accepted configuration source, in bytes
pub const MAX_SOURCE_SIZE: u64 = 10 * 1024 * 1024;

/// Where a description comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source<'a> {
    /// JSON text given directly
    Inline(&'a str),
    /// Path to a `.json` file
    File(&'a Path),
}

impl<'a> Source<'a> {
    /// Classify a source string
    ///
    /// Text starting with `{` (after leading whitespace) is inline JSON.
    /// Anything else must be a path with a `.json` extension.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::NotRecognized`] (quiet) for anything else.
    pub fn classify(source: &'a str) -> Result<Self> {
        if source.trim_start().starts_with('{') {
            return Ok(Source::Inline(source));
        }
        let path = Path::new(source);
        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(Source::File(path))
        } else {
            Err(RasterError::NotRecognized(source.to_string()))
        }
    }

    /// Read the source text, enforcing [`MAX_SOURCE_SIZE`]
    ///
    /// File sizes are checked from metadata before reading, and the read itself
    /// is bounded in case the file grows in between.
    pub fn read(&self) -> Result<Cow<'a, str>> {
        match *self {
            Source::Inline(text) => {
                check_size(text.len() as u64)?;
                Ok(Cow::Borrowed(text))
            }
            Source::File(path) => {
                let io_err = |source| RasterError::Io {
                    path: path.to_path_buf(),
                    source,
                };
                let metadata = fs::metadata(path).map_err(io_err)?;
                check_size(metadata.len())?;

                let mut text = String::new();
                fs::File::open(path)
                    .map_err(io_err)?
                    .take(MAX_SOURCE_SIZE + 1)
                    .read_to_string(&mut text)
                    .map_err(io_err)?;
                check_size(text.len() as u64)?;
                Ok(Cow::Owned(text))
            }
        }
    }
}

fn check_size(size: u64) -> Result<()> {
    if size > MAX_SOURCE_SIZE {
        debug!(size, limit = MAX_SOURCE_SIZE, "configuration source too large");
        return Err(RasterError::SourceTooLarge {
            size,
            limit: MAX_SOURCE_SIZE,
        });
    }
    Ok(())
}

/// Classify, read, and parse a source
pub fn load(source: &str) -> Result<RasterConfig> {
    let text = Source::classify(source)?.read()?;
    RasterConfig::parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{"type": "RANDOM_RASTER", "rows": 10, "cols": 10,
        "data_type": "Float64", "distribution": "normal"}"#;

    fn json_file(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_classify() {
        assert_eq!(Source::classify("  \n{\"a\": 1}").unwrap(), Source::Inline("  \n{\"a\": 1}"));
        assert_eq!(
            Source::classify("/data/raster.json").unwrap(),
            Source::File(Path::new("/data/raster.json"))
        );
        assert!(matches!(Source::classify("raster.JSON"), Ok(Source::File(_))));

        let err = Source::classify("/data/raster.tif").unwrap_err();
        assert!(matches!(err, RasterError::NotRecognized(_)));
        assert!(err.is_quiet());
        assert!(Source::classify("").unwrap_err().is_quiet());
    }

    #[test]
    fn test_load_inline() {
        let config = load(SAMPLE).unwrap();
        assert_eq!(config.data_type, "Float64");
    }

    #[test]
    fn test_load_file() {
        let file = json_file(SAMPLE.as_bytes());
        let config = load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.distribution, "normal");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = load(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, RasterError::Io { .. }));
        assert!(!err.is_quiet());
    }

    #[test]
    fn test_oversized_inline_source_is_rejected_before_parsing() {
        // Not valid JSON either: a parse attempt would report Parse instead
        let mut text = String::from("{");
        text.push_str(&" ".repeat(MAX_SOURCE_SIZE as usize));
        let err = load(&text).unwrap_err();
        assert!(matches!(err, RasterError::SourceTooLarge { .. }));
        assert!(err.is_quiet());
    }

    #[test]
    fn test_oversized_file_is_rejected_before_reading() {
        let mut contents = b"{".to_vec();
        contents.resize(MAX_SOURCE_SIZE as usize + 1, b' ');
        let file = json_file(&contents);
        let err = load(file.path().to_str().unwrap()).unwrap_err();
        match err {
            RasterError::SourceTooLarge { size, limit } => {
                assert_eq!(size, MAX_SOURCE_SIZE + 1);
                assert_eq!(limit, MAX_SOURCE_SIZE);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_source_at_the_limit_is_accepted() {
        let mut text = SAMPLE.to_string();
        let padding = MAX_SOURCE_SIZE as usize - text.len();
        text.push_str(&" ".repeat(padding));
        assert_eq!(text.len() as u64, MAX_SOURCE_SIZE);
        assert!(load(&text).is_ok());
    }
}
