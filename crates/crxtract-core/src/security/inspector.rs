//! Pre-extraction archive screening.
//!
//! The payload's entry count and uncompressed size come from the ZIP
//! central directory; nothing is decompressed and no entry contents touch
//! the disk until every ceiling has passed.

use std::fs::File;
use std::path::Path;

use crate::CrxError;
use crate::ExtractorConfig;
use crate::Result;

/// Summary of an archive obtained without decompressing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityProfile {
    /// Number of entries in the archive index.
    pub file_count: usize,
    /// Total declared uncompressed size of all entries, in bytes.
    pub uncompressed_size: u64,
    /// On-disk size of the staged archive file, in bytes.
    pub compressed_size: u64,
}

impl SecurityProfile {
    /// The `uncompressed / compressed` ratio.
    ///
    /// A zero compressed size yields infinity, which every finite ceiling
    /// rejects.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.compressed_size == 0 {
            f64::INFINITY
        } else {
            self.uncompressed_size as f64 / self.compressed_size as f64
        }
    }
}

/// Reads an archive's security profile from its index.
///
/// # Errors
///
/// Returns `CrxError::InspectionFailed` when the file cannot be opened or
/// its index cannot be parsed.
pub fn inspect(archive_path: &Path) -> Result<SecurityProfile> {
    let compressed_size = std::fs::metadata(archive_path)
        .map_err(|e| CrxError::InspectionFailed {
            reason: format!("cannot stat staged archive: {e}"),
        })?
        .len();

    let file = File::open(archive_path).map_err(|e| CrxError::InspectionFailed {
        reason: format!("cannot open staged archive: {e}"),
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| CrxError::InspectionFailed {
        reason: format!("cannot read archive index: {e}"),
    })?;

    let mut uncompressed_size: u64 = 0;
    for i in 0..archive.len() {
        let entry = archive
            .by_index_raw(i)
            .map_err(|e| CrxError::InspectionFailed {
                reason: format!("cannot read archive index entry {i}: {e}"),
            })?;
        uncompressed_size = uncompressed_size.saturating_add(entry.size());
    }

    Ok(SecurityProfile {
        file_count: archive.len(),
        uncompressed_size,
        compressed_size,
    })
}

/// Enforces the configured ceilings against a profile.
///
/// Checked in order, first violation wins: compression ratio (the
/// strongest bomb signal), then entry count, then total uncompressed
/// size. All three must pass before any entry is materialized to disk.
///
/// # Errors
///
/// - `CrxError::SuspiciousCompressionRatio` — ratio above the ceiling, or
///   a zero compressed size with a nonzero uncompressed size.
/// - `CrxError::TooManyFiles` — entry count above the ceiling.
/// - `CrxError::ExtractedSizeTooLarge` — uncompressed size above the
///   ceiling.
pub fn enforce(profile: &SecurityProfile, config: &ExtractorConfig) -> Result<()> {
    let ratio = profile.ratio();
    if ratio > config.max_extraction_ratio {
        return Err(CrxError::SuspiciousCompressionRatio {
            compressed: profile.compressed_size,
            uncompressed: profile.uncompressed_size,
            ratio,
        });
    }

    if profile.file_count > config.max_extracted_files {
        return Err(CrxError::TooManyFiles {
            count: profile.file_count,
            max: config.max_extracted_files,
        });
    }

    if profile.uncompressed_size > config.max_extracted_size {
        return Err(CrxError::ExtractedSizeTooLarge {
            size: profile.uncompressed_size,
            max: config.max_extracted_size,
        });
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn profile(file_count: usize, uncompressed: u64, compressed: u64) -> SecurityProfile {
        SecurityProfile {
            file_count,
            uncompressed_size: uncompressed,
            compressed_size: compressed,
        }
    }

    #[test]
    fn test_enforce_passes_normal_archive() {
        let config = ExtractorConfig::default();
        assert!(enforce(&profile(50, 1_000_000, 200_000), &config).is_ok());
    }

    #[test]
    fn test_enforce_ratio_violation() {
        let config = ExtractorConfig::default();
        let result = enforce(&profile(1, 1_000_000_000, 1000), &config);
        assert!(matches!(
            result,
            Err(CrxError::SuspiciousCompressionRatio { ratio, .. }) if ratio > 100.0
        ));
    }

    #[test]
    fn test_enforce_ratio_at_limit_passes() {
        let config = ExtractorConfig::default();
        assert!(enforce(&profile(1, 100_000, 1000), &config).is_ok());
    }

    #[test]
    fn test_enforce_zero_compressed_is_suspicious() {
        let config = ExtractorConfig::default();
        let result = enforce(&profile(1, 1000, 0), &config);
        assert!(matches!(
            result,
            Err(CrxError::SuspiciousCompressionRatio { .. })
        ));
    }

    #[test]
    fn test_enforce_file_count_boundary() {
        let config = ExtractorConfig::default();
        assert!(enforce(&profile(10_000, 1000, 1000), &config).is_ok());
        let result = enforce(&profile(10_001, 1000, 1000), &config);
        assert!(matches!(
            result,
            Err(CrxError::TooManyFiles {
                count: 10_001,
                max: 10_000
            })
        ));
    }

    #[test]
    fn test_enforce_size_violation() {
        let config = ExtractorConfig {
            max_extracted_size: 1024,
            // Keep the ratio gate out of the way so the size gate decides.
            max_extraction_ratio: 1_000_000.0,
            ..Default::default()
        };
        let result = enforce(&profile(1, 2048, 1000), &config);
        assert!(matches!(
            result,
            Err(CrxError::ExtractedSizeTooLarge {
                size: 2048,
                max: 1024
            })
        ));
    }

    #[test]
    fn test_enforce_ratio_checked_first() {
        // Profile violates all three ceilings; ratio must win.
        let config = ExtractorConfig {
            max_extracted_files: 1,
            max_extracted_size: 1,
            ..Default::default()
        };
        let result = enforce(&profile(100, 10_000_000, 10), &config);
        assert!(matches!(
            result,
            Err(CrxError::SuspiciousCompressionRatio { .. })
        ));
    }

    #[test]
    fn test_inspect_reads_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.zip");

        let file = File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        writer.start_file("manifest.json", options).unwrap();
        writer.write_all(b"{\"name\":\"Test\"}").unwrap();
        writer.start_file("background.js", options).unwrap();
        writer.write_all(b"console.log('hi');").unwrap();
        writer.finish().unwrap();

        let profile = inspect(&path).unwrap();
        assert_eq!(profile.file_count, 2);
        assert_eq!(
            profile.uncompressed_size,
            (b"{\"name\":\"Test\"}".len() + b"console.log('hi');".len()) as u64
        );
        assert_eq!(profile.compressed_size, std::fs::metadata(&path).unwrap().len());
    }

    #[test]
    fn test_inspect_rejects_non_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.zip");
        std::fs::write(&path, b"this is not a zip file").unwrap();

        let result = inspect(&path);
        assert!(matches!(result, Err(CrxError::InspectionFailed { .. })));
    }

    #[test]
    fn test_inspect_missing_file() {
        let result = inspect(Path::new("/nonexistent/payload.zip"));
        assert!(matches!(result, Err(CrxError::InspectionFailed { .. })));
    }
}
