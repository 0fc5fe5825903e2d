//! Extraction pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for one extraction run.
///
/// Constructed once per run and never mutated; every component borrows it.
/// All ceilings are independently overridable.
///
/// # Examples
///
/// ```
/// use crxtract_core::ExtractorConfig;
///
/// // Secure defaults
/// let config = ExtractorConfig::default();
///
/// // Customize for specific needs
/// let custom = ExtractorConfig {
///     max_extracted_files: 50_000,
///     max_extraction_ratio: 500.0,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Maximum size of a local container file in bytes.
    pub max_file_size: u64,

    /// Timeout covering the whole download, headers through body.
    pub download_timeout: Duration,

    /// Maximum allowed `uncompressed / compressed` ratio for the payload.
    pub max_extraction_ratio: f64,

    /// Maximum number of entries the payload may contain.
    pub max_extracted_files: usize,

    /// Maximum total uncompressed payload size in bytes.
    pub max_extracted_size: u64,

    /// Roots every output path must resolve under.
    pub allowed_output_paths: Vec<PathBuf>,

    /// Directory extensions are unpacked into, one subdirectory per
    /// extension. Relative paths resolve against the captured working
    /// directory.
    pub extensions_dir: PathBuf,
}

impl Default for ExtractorConfig {
    /// Creates a configuration with secure default settings.
    ///
    /// Default values:
    /// - `max_file_size`: 500 MiB
    /// - `download_timeout`: 30 s
    /// - `max_extraction_ratio`: 100.0
    /// - `max_extracted_files`: 10,000
    /// - `max_extracted_size`: 1 GiB
    /// - `allowed_output_paths`: `["."]`
    /// - `extensions_dir`: `extensions`
    fn default() -> Self {
        Self {
            max_file_size: 500 * 1024 * 1024,
            download_timeout: Duration::from_millis(30_000),
            max_extraction_ratio: 100.0,
            max_extracted_files: 10_000,
            max_extracted_size: 1024 * 1024 * 1024,
            allowed_output_paths: vec![PathBuf::from(".")],
            extensions_dir: PathBuf::from("extensions"),
        }
    }
}
