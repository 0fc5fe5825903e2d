//! Inspect command implementation.
//!
//! Parses a container header and reports the payload's security profile
//! without extracting anything.

use crate::cli::InspectArgs;
use crate::error::add_input_context;
use crate::output::InspectionReport;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use crxtract_core::ExtractorConfig;
use crxtract_core::header;
use crxtract_core::security;
use std::io::Write;

pub fn execute(args: &InspectArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let input = args.container.display().to_string();
    let data = std::fs::read(&args.container)
        .with_context(|| format!("failed to read '{input}'"))?;

    let parsed = add_input_context(header::parse(&data), &input)?;
    let payload = &data[parsed.payload_offset as usize..];

    // The inspector works on a staged file; stage the payload into a
    // temp file that disappears when inspection is done.
    let mut staged = tempfile::NamedTempFile::new().context("failed to stage payload")?;
    staged.write_all(payload).context("failed to stage payload")?;
    staged.flush().context("failed to stage payload")?;

    let profile = add_input_context(security::inspect(staged.path()), &input)?;
    let violation = security::enforce(&profile, &ExtractorConfig::default())
        .err()
        .map(|err| err.code().to_string());

    let report = InspectionReport {
        version: parsed.version.to_string(),
        payload_offset: parsed.payload_offset,
        file_count: profile.file_count,
        uncompressed_size: profile.uncompressed_size,
        compressed_size: profile.compressed_size,
        ratio: profile.ratio(),
        violation,
    };

    formatter.format_inspection(&report)
}
