//! Error types for checklist parsing, loading and bundle extraction
//!
//! Only two things are fatal for a single XCCDF document: XML that is not
//! well-formed, and no `Benchmark` element. CKL parsing never fails.
//! Everything else degrades to documented defaults inside the parsers.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for parse operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors raised while turning XML text into a [`Stig`](crate::Stig)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// XCCDF text without any `Benchmark` element (namespaced or not)
    #[error("No Benchmark element found in XCCDF")]
    NoBenchmark,

    /// Input is not well-formed XML
    #[error("Malformed XML at byte {position}: {message}")]
    Xml { position: u64, message: String },
}

impl ParseError {
    /// Create a malformed XML error
    pub fn xml(position: u64, message: impl Into<String>) -> Self {
        Self::Xml {
            position,
            message: message.into(),
        }
    }
}

/// Errors raised while loading a checklist from disk or from a JSON payload
#[derive(Error, Debug)]
pub enum LoadError {
    /// File could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File was read but could not be parsed
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// Pre-parsed checklist JSON did not match the model
    #[error("Invalid checklist JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading a CCI to control table
#[derive(Error, Debug)]
pub enum CciMapError {
    /// Table file could not be read
    #[error("Failed to read CCI map {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Table JSON is not an object of `{control, title}` entries
    #[error("Invalid CCI map JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while extracting XCCDF content from DISA ZIP bundles
#[cfg(feature = "library")]
#[derive(Error, Debug)]
pub enum LibraryError {
    /// Archive could not be opened or an entry could not be located
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Entry could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive (and its nested archives) has no `*_xccdf.xml` entry
    #[error("No *_xccdf.xml found in ZIP archive")]
    NoXccdf,

    /// XCCDF entry was found but did not parse
    #[error("XCCDF parse failed: {0}")]
    Parse(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_benchmark_message() {
        assert_eq!(
            ParseError::NoBenchmark.to_string(),
            "No Benchmark element found in XCCDF"
        );
    }

    #[test]
    fn test_xml_error_carries_position() {
        let err = ParseError::xml(42, "unexpected end of file");
        assert_eq!(
            err.to_string(),
            "Malformed XML at byte 42: unexpected end of file"
        );
    }

    #[test]
    fn test_load_error_source_chain() {
        let err = LoadError::Parse {
            path: PathBuf::from("a.xml"),
            source: ParseError::NoBenchmark,
        };
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("No Benchmark element found in XCCDF"));
    }
}
