//! Error types for preview acquisition and decoding.
//!
//! Every error here is `Clone`: a single fetch outcome is fanned out to all
//! callers that coalesced onto it, so errors carry rendered messages rather
//! than owning non-cloneable sources like `std::io::Error`.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure obtaining the raw bytes of a font resource.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The path does not exist
    #[error("Font file not found: {path}")]
    NotFound { path: PathBuf },

    /// The file extension is not a previewable font type
    #[error("Unsupported font file type: '{extension}'")]
    UnsupportedType { extension: String },

    /// The canonical path is outside every allowed font directory
    #[error("Font path is not in an allowed directory: {path}")]
    OutsideAllowedDirectory { path: PathBuf },

    /// The file exceeds the configured size limit
    #[error("Font file too large: {size} bytes (limit {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    /// I/O or permission failure
    #[error("Failed to read font file {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// The fetch task ended without producing an outcome
    #[error("Fetch for '{key}' was aborted before completing")]
    Aborted { key: String },
}

impl FetchError {
    /// Build an [`FetchError::Io`] from an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Failure turning a payload into a renderable face.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload is not a valid font resource
    #[error("Invalid font data for '{identifier}': {reason}")]
    InvalidFont { identifier: String, reason: String },

    /// The render surface refused the face
    #[error("Render surface error: {0}")]
    Surface(String),
}

/// Any failure on the preview path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PreviewError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The load did not finish within the configured timeout
    #[error("Preview load timed out after {after:?}")]
    Timeout { after: Duration },
}

impl PreviewError {
    /// Returns true for errors raised while obtaining the resource.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }

    /// Returns true for errors raised while decoding the resource.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_converts_into_preview_error() {
        let err: PreviewError = FetchError::UnsupportedType {
            extension: "woff".to_string(),
        }
        .into();

        assert!(err.is_fetch());
        assert!(!err.is_decode());
        assert_eq!(err.to_string(), "Unsupported font file type: 'woff'");
    }

    #[test]
    fn test_io_error_keeps_message() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = FetchError::io("/fonts/a.ttf", &io);

        assert!(err.to_string().contains("access denied"));
        assert!(err.to_string().contains("/fonts/a.ttf"));
    }

    #[test]
    fn test_errors_are_cloneable_and_comparable() {
        let err = PreviewError::Decode(DecodeError::Surface("gone".to_string()));
        assert_eq!(err.clone(), err);
        assert!(err.is_decode());
    }
}
