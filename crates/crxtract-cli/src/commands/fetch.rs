//! Fetch command implementation.

use crate::cli::FetchArgs;
use crate::error::add_input_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use crxtract_core::Extractor;
use crxtract_core::ExtractorConfig;
use std::path::PathBuf;
use std::time::Duration;

pub async fn execute(args: &FetchArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let extensions_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("extensions"));

    // The working directory and any explicitly chosen output directory
    // are trusted roots; everything else stays off limits.
    let mut allowed_output_paths = vec![PathBuf::from(".")];
    allowed_output_paths.extend(args.allow_roots.iter().cloned());
    allowed_output_paths.push(extensions_dir.clone());

    let config = ExtractorConfig {
        max_file_size: args.max_file_size.unwrap_or(500 * 1024 * 1024),
        download_timeout: Duration::from_millis(args.timeout),
        max_extraction_ratio: f64::from(args.max_compression_ratio),
        max_extracted_files: args.max_files,
        max_extracted_size: args.max_extracted_size.unwrap_or(1024 * 1024 * 1024),
        allowed_output_paths,
        extensions_dir,
    };

    let extractor = add_input_context(Extractor::new(config), &args.input)?;
    let outcome = add_input_context(
        extractor.run_named(&args.input, args.name.as_deref()).await,
        &args.input,
    )?;

    for warning in &outcome.warnings {
        formatter.format_warning(warning);
    }
    formatter.format_fetch_result(&outcome)?;

    Ok(())
}
