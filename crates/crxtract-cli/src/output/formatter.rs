//! Output formatter trait for CLI results.

use anyhow::Result;
use crxtract_core::ExtractionOutcome;
use serde::Serialize;

/// Report produced by the `inspect` command: header fields plus the
/// payload's pre-extraction security profile.
#[derive(Debug, Serialize)]
pub struct InspectionReport {
    /// Container format version.
    pub version: String,
    /// Byte offset of the embedded payload.
    pub payload_offset: u32,
    /// Entry count from the archive index.
    pub file_count: usize,
    /// Total declared uncompressed size in bytes.
    pub uncompressed_size: u64,
    /// On-disk payload size in bytes.
    pub compressed_size: u64,
    /// Compression ratio.
    pub ratio: f64,
    /// Machine-readable code of the first violated ceiling, if any.
    pub violation: Option<String>,
}

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the result of a fetch-and-extract run
    fn format_fetch_result(&self, outcome: &ExtractionOutcome) -> Result<()>;

    /// Format an inspection report
    fn format_inspection(&self, report: &InspectionReport) -> Result<()>;

    /// Format error message
    #[allow(dead_code)]
    fn format_error(&self, error: &anyhow::Error);

    /// Format success message
    #[allow(dead_code)]
    fn format_success(&self, message: &str);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    #[allow(dead_code)]
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    #[allow(dead_code)]
    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> JsonOutput<()> {
        JsonOutput {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
