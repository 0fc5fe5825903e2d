//! Error types for extension fetching and extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `CrxError`.
pub type Result<T> = std::result::Result<T, CrxError>;

/// Broad classification of a failure, used by callers that only need to
/// know which stage of the pipeline rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input, bad manifest, oversized local file.
    Validation,
    /// Transport failure, timeout, non-CRX response body.
    Download,
    /// Path escape or a resource ceiling violation.
    Security,
    /// Decompression or filesystem failure during extraction.
    Extraction,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Download => write!(f, "download"),
            Self::Security => write!(f, "security"),
            Self::Extraction => write!(f, "extraction"),
        }
    }
}

/// Errors that can occur while fetching or extracting an extension package.
#[derive(Error, Debug)]
pub enum CrxError {
    /// Container bytes do not form a valid package.
    #[error("malformed input: {reason}")]
    MalformedInput {
        /// What was wrong with the bytes.
        reason: String,
    },

    /// Container declares a version this crate does not understand.
    #[error("unsupported container version: {version}")]
    UnsupportedVersion {
        /// The version field as read from the container.
        version: u32,
    },

    /// Local input file is missing or unreadable.
    #[error("input file not found: {path}")]
    NotFound {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// Local input file exceeds the configured maximum size.
    #[error("input file too large: {size} bytes (limit {max})")]
    TooLarge {
        /// Actual file size in bytes.
        size: u64,
        /// Configured ceiling in bytes.
        max: u64,
    },

    /// Extracted manifest is missing or has a malformed required field.
    #[error("invalid manifest: field `{field}` is missing or malformed")]
    InvalidManifest {
        /// Name of the offending field.
        field: String,
    },

    /// Download did not complete within the configured timeout.
    #[error("download timed out after {millis} ms")]
    DownloadTimeout {
        /// Configured timeout in milliseconds.
        millis: u64,
    },

    /// Download failed for a reason other than a timeout.
    #[error("download failed: {reason}")]
    DownloadFailed {
        /// Transport or protocol level description.
        reason: String,
    },

    /// A path would resolve outside every allowed root directory.
    #[error("path outside allowed roots: {path}")]
    PathOutsideAllowedRoots {
        /// The offending path, as resolved.
        path: PathBuf,
    },

    /// Payload looks like a decompression bomb.
    #[error(
        "suspicious compression ratio: compressed={compressed} bytes, \
         uncompressed={uncompressed} bytes (ratio {ratio:.2})"
    )]
    SuspiciousCompressionRatio {
        /// On-disk size of the staged archive.
        compressed: u64,
        /// Declared uncompressed size from the archive index.
        uncompressed: u64,
        /// `uncompressed / compressed`.
        ratio: f64,
    },

    /// Payload contains more entries than the configured ceiling.
    #[error("too many files in archive: {count} (limit {max})")]
    TooManyFiles {
        /// Entry count from the archive index.
        count: usize,
        /// Configured ceiling.
        max: usize,
    },

    /// Payload would expand past the configured total-size ceiling.
    #[error("extracted size too large: {size} bytes (limit {max})")]
    ExtractedSizeTooLarge {
        /// Declared uncompressed size in bytes.
        size: u64,
        /// Configured ceiling in bytes.
        max: u64,
    },

    /// The archive index could not be read without extraction.
    #[error("archive inspection failed: {reason}")]
    InspectionFailed {
        /// Why the index was unreadable.
        reason: String,
    },

    /// Decompression itself failed after the payload passed screening.
    #[error("extraction failed: {reason}")]
    ExtractionFailed {
        /// What went wrong while unpacking.
        reason: String,
        /// Where the unextracted payload was preserved, when it was.
        fallback: Option<PathBuf>,
    },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrxError {
    /// Returns a stable machine-readable code for this error.
    ///
    /// Codes never change between releases; match on them rather than on
    /// display strings.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MalformedInput { .. } => "malformed_input",
            Self::UnsupportedVersion { .. } => "unsupported_version",
            Self::NotFound { .. } => "not_found",
            Self::TooLarge { .. } => "file_too_large",
            Self::InvalidManifest { .. } => "invalid_manifest",
            Self::DownloadTimeout { .. } => "download_timeout",
            Self::DownloadFailed { .. } => "download_failed",
            Self::PathOutsideAllowedRoots { .. } => "path_outside_allowed_roots",
            Self::SuspiciousCompressionRatio { .. } => "suspicious_compression_ratio",
            Self::TooManyFiles { .. } => "too_many_files",
            Self::ExtractedSizeTooLarge { .. } => "extracted_size_too_large",
            Self::InspectionFailed { .. } => "inspection_failed",
            Self::ExtractionFailed { .. } => "extraction_failed",
            Self::Io(_) => "io_error",
        }
    }

    /// Returns the pipeline stage classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedInput { .. }
            | Self::UnsupportedVersion { .. }
            | Self::NotFound { .. }
            | Self::TooLarge { .. }
            | Self::InvalidManifest { .. } => ErrorKind::Validation,
            Self::DownloadTimeout { .. } | Self::DownloadFailed { .. } => ErrorKind::Download,
            Self::PathOutsideAllowedRoots { .. }
            | Self::SuspiciousCompressionRatio { .. }
            | Self::TooManyFiles { .. }
            | Self::ExtractedSizeTooLarge { .. } => ErrorKind::Security,
            Self::InspectionFailed { .. } | Self::ExtractionFailed { .. } | Self::Io(_) => {
                ErrorKind::Extraction
            }
        }
    }

    /// Returns `true` if this error represents a security violation.
    ///
    /// Security violations never leave the rejected payload on disk.
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self.kind(), ErrorKind::Security)
    }

    /// Returns the recovery-artifact path, when extraction failure
    /// preserved one.
    #[must_use]
    pub fn recovery_artifact(&self) -> Option<&std::path::Path> {
        match self {
            Self::ExtractionFailed {
                fallback: Some(path),
                ..
            } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CrxError::UnsupportedVersion { version: 7 };
        assert_eq!(err.to_string(), "unsupported container version: 7");
    }

    #[test]
    fn test_stable_codes() {
        let err = CrxError::TooManyFiles {
            count: 10_001,
            max: 10_000,
        };
        assert_eq!(err.code(), "too_many_files");

        let err = CrxError::DownloadTimeout { millis: 30_000 };
        assert_eq!(err.code(), "download_timeout");
    }

    #[test]
    fn test_kind_classification() {
        let err = CrxError::MalformedInput {
            reason: "bad magic".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = CrxError::SuspiciousCompressionRatio {
            compressed: 1000,
            uncompressed: 1_000_000_000,
            ratio: 1_000_000.0,
        };
        assert_eq!(err.kind(), ErrorKind::Security);
        assert!(err.is_security_violation());

        let err = CrxError::ExtractionFailed {
            reason: "unpack failed".into(),
            fallback: None,
        };
        assert_eq!(err.kind(), ErrorKind::Extraction);
        assert!(!err.is_security_violation());
    }

    #[test]
    fn test_ratio_display() {
        let err = CrxError::SuspiciousCompressionRatio {
            compressed: 1000,
            uncompressed: 1_000_000,
            ratio: 1000.0,
        };
        let display = err.to_string();
        assert!(display.contains("suspicious compression ratio"));
        assert!(display.contains("1000.00"));
    }

    #[test]
    fn test_recovery_artifact() {
        let err = CrxError::ExtractionFailed {
            reason: "unpack failed".into(),
            fallback: Some(PathBuf::from("/tmp/out/unextracted-payload.zip")),
        };
        assert_eq!(
            err.recovery_artifact(),
            Some(std::path::Path::new("/tmp/out/unextracted-payload.zip"))
        );

        let err = CrxError::InspectionFailed {
            reason: "not a zip".into(),
        };
        assert_eq!(err.recovery_artifact(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CrxError = io_err.into();
        assert!(matches!(err, CrxError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Extraction);
    }
}
