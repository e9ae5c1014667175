//! Error types for TDMS file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading or writing TDMS files.
#[derive(Debug, Error)]
pub enum TdmsError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Segment does not start with a known lead-in tag.
    #[error("invalid lead-in tag at offset {offset}")]
    InvalidTag { offset: usize },

    /// Data ended before a structure was complete.
    #[error("unexpected end of data at offset {offset} (needed {needed} bytes)")]
    Truncated { offset: usize, needed: usize },

    /// Invalid TDMS structure.
    #[error("invalid TDMS file: {message}")]
    InvalidFormat { message: String },

    /// Feature or data type this reader does not handle.
    #[error("unsupported TDMS feature: {feature}")]
    Unsupported { feature: String },

    /// Object path could not be parsed.
    #[error("invalid object path: {path}")]
    InvalidPath { path: String },

    /// Raw data index marked as "same as before" with no earlier index.
    #[error("object {path} reuses a raw data index that was never defined")]
    MissingPreviousIndex { path: String },

    /// A channel changed data type between segments.
    #[error("channel {path} changed type from {previous} to {current}")]
    TypeChanged {
        path: String,
        previous: &'static str,
        current: &'static str,
    },

    /// Unsigned value does not fit the signed sample type.
    #[error("value {value} in {path} exceeds the integer range")]
    IntegerOverflow { path: String, value: u64 },

    /// Timestamp falls outside the representable date range.
    #[error("timestamp out of range: {seconds}s since 1904-01-01")]
    TimestampOutOfRange { seconds: i64 },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for TDMS operations.
pub type Result<T> = std::result::Result<T, TdmsError>;

impl TdmsError {
    /// Create an InvalidFormat error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create an Unsupported error.
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::Unsupported {
            feature: feature.into(),
        }
    }

    /// Create an InvalidPath error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TdmsError::invalid_format("test message");
        assert_eq!(format!("{err}"), "invalid TDMS file: test message");

        let err = TdmsError::Truncated {
            offset: 28,
            needed: 4,
        };
        assert_eq!(
            format!("{err}"),
            "unexpected end of data at offset 28 (needed 4 bytes)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let tdms_err: TdmsError = io_err.into();
        assert!(matches!(tdms_err, TdmsError::Io(_)));
    }
}
