//! Error conversion utilities for CLI.
//!
//! Converts crxtract-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::Result;
use anyhow::anyhow;
use crxtract_core::CrxError;

/// Converts `CrxError` to a user-friendly anyhow error with context
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn convert_crx_error(err: CrxError, input: &str) -> anyhow::Error {
    match err {
        CrxError::PathOutsideAllowedRoots { path } => {
            anyhow!(
                "Security violation: '{input}' would write outside the allowed roots ('{}')\n\
                 HINT: This package may be malicious. Use --allow-root only for directories you trust.",
                path.display()
            )
        }
        CrxError::SuspiciousCompressionRatio {
            compressed,
            uncompressed,
            ratio,
        } => {
            anyhow!(
                "Security violation: payload of '{input}' looks like a decompression bomb\n\
                 Compression ratio: {}:1 ({}KB -> {}MB)\n\
                 HINT: Use --max-compression-ratio to allow higher ratios if legitimate.",
                ratio as u64,
                compressed / 1024,
                uncompressed / 1024 / 1024
            )
        }
        CrxError::TooManyFiles { count, max } => {
            anyhow!(
                "Extraction limit exceeded for '{input}': {count} files (limit {max})\n\
                 HINT: Use --max-files to increase the limit."
            )
        }
        CrxError::ExtractedSizeTooLarge { size, max } => {
            anyhow!(
                "Extraction limit exceeded for '{input}': {size} bytes uncompressed (limit {max})\n\
                 HINT: Use --max-extracted-size to increase the limit."
            )
        }
        CrxError::TooLarge { size, max } => {
            anyhow!(
                "Input file too large: '{input}' is {size} bytes (limit {max})\n\
                 HINT: Use --max-file-size to increase the limit."
            )
        }
        CrxError::DownloadTimeout { millis } => {
            anyhow!(
                "Download of '{input}' timed out after {millis} ms\n\
                 HINT: Use --timeout to allow more time on slow connections."
            )
        }
        CrxError::DownloadFailed { reason } => {
            anyhow!("Download of '{input}' failed: {reason}")
        }
        CrxError::ExtractionFailed {
            reason,
            fallback: Some(path),
        } => {
            anyhow!(
                "Extraction of '{input}' failed: {reason}\n\
                 The unextracted payload was preserved at '{}' for manual inspection.",
                path.display()
            )
        }
        CrxError::MalformedInput { reason } => {
            anyhow!(
                "Invalid container '{input}': {reason}\n\
                 HINT: The file may be corrupted, or not a packaged extension at all."
            )
        }
        CrxError::UnsupportedVersion { version } => {
            anyhow!(
                "Unsupported container version {version} in '{input}'\n\
                 HINT: Only container versions 2 and 3 are supported."
            )
        }
        CrxError::Io(io_err) => {
            anyhow!("I/O error while processing '{input}': {io_err}")
        }
        _ => anyhow::Error::from(err).context(format!("Error processing '{input}'")),
    }
}

/// Adds context to a core result about the input being processed
pub fn add_input_context<T>(result: Result<T, CrxError>, input: &str) -> anyhow::Result<T> {
    result.map_err(|e| convert_crx_error(e, input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_convert_path_escape_error() {
        let err = CrxError::PathOutsideAllowedRoots {
            path: PathBuf::from("/etc/passwd"),
        };
        let converted = convert_crx_error(err, "malicious.crx");
        let msg = format!("{converted:?}");
        assert!(msg.contains("outside the allowed roots"));
        assert!(msg.contains("malicious.crx"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_bomb_error() {
        let err = CrxError::SuspiciousCompressionRatio {
            compressed: 1024,
            uncompressed: 1024 * 1024 * 150,
            ratio: 150.0 * 1024.0,
        };
        let converted = convert_crx_error(err, "bomb.crx");
        let msg = format!("{converted:?}");
        assert!(msg.contains("decompression bomb"));
        assert!(msg.contains("--max-compression-ratio"));
    }

    #[test]
    fn test_convert_extraction_failure_mentions_fallback() {
        let err = CrxError::ExtractionFailed {
            reason: "crc mismatch".to_string(),
            fallback: Some(PathBuf::from("extensions/foo/unextracted-payload.zip")),
        };
        let converted = convert_crx_error(err, "foo.crx");
        let msg = format!("{converted:?}");
        assert!(msg.contains("unextracted-payload.zip"));
        assert!(msg.contains("crc mismatch"));
    }
}
