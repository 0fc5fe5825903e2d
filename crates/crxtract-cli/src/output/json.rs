//! JSON output formatter for machine-readable results.

use super::formatter::InspectionReport;
use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use crxtract_core::ExtractionOutcome;
use crxtract_core::ManifestSummary;
use serde::Serialize;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_fetch_result(&self, outcome: &ExtractionOutcome) -> Result<()> {
        #[derive(Serialize)]
        struct FetchOutput<'a> {
            extension_name: &'a str,
            output_dir: String,
            files_extracted: usize,
            directories_created: usize,
            bytes_written: u64,
            duration_ms: u128,
            #[serde(skip_serializing_if = "Option::is_none")]
            manifest: Option<&'a ManifestSummary>,
            warnings: &'a [String],
        }

        let data = FetchOutput {
            extension_name: &outcome.extension_name,
            output_dir: outcome.output_dir.display().to_string(),
            files_extracted: outcome.files_extracted,
            directories_created: outcome.directories_created,
            bytes_written: outcome.bytes_written,
            duration_ms: outcome.duration.as_millis(),
            manifest: outcome.manifest.as_ref(),
            warnings: &outcome.warnings,
        };

        let output = JsonOutput::success("fetch", data);
        Self::output(&output)
    }

    fn format_inspection(&self, report: &InspectionReport) -> Result<()> {
        let output = JsonOutput::success("inspect", report);
        Self::output(&output)
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error("unknown", format!("{error:?}"));
        let _ = Self::output(&output);
    }

    fn format_success(&self, message: &str) {
        #[derive(Serialize)]
        struct SuccessData {
            message: String,
        }

        let output = JsonOutput::success(
            "unknown",
            SuccessData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}
