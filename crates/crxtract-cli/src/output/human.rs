//! Human-readable output formatter with colors and styling.

use super::formatter::InspectionReport;
use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use crxtract_core::ExtractionOutcome;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_fetch_result(&self, outcome: &ExtractionOutcome) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            let _ = self.term.write_line(&format!(
                "{} Extraction complete",
                style("✓").green().bold()
            ));
        } else {
            let _ = self.term.write_line("Extraction complete");
        }

        if let Some(manifest) = &outcome.manifest {
            let _ = self.term.write_line(&format!(
                "  Extension: {} {} (manifest v{})",
                manifest.name, manifest.version, manifest.manifest_version
            ));
        }
        let _ = self.term.write_line(&format!(
            "  Output: {}",
            outcome.output_dir.display()
        ));
        let _ = self
            .term
            .write_line(&format!("  Files extracted: {}", outcome.files_extracted));
        let _ = self.term.write_line(&format!(
            "  Total size: {}",
            Self::format_size(outcome.bytes_written)
        ));

        if self.verbose {
            let _ = self.term.write_line(&format!(
                "  Directories: {}",
                outcome.directories_created
            ));
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", outcome.duration));
            if let Some(manifest) = &outcome.manifest
                && !manifest.permissions.is_empty()
            {
                let _ = self.term.write_line(&format!(
                    "  Permissions: {}",
                    manifest.permissions.join(", ")
                ));
            }
        }

        Ok(())
    }

    fn format_inspection(&self, report: &InspectionReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let _ = self
            .term
            .write_line(&format!("Container version: {}", report.version));
        let _ = self
            .term
            .write_line(&format!("Payload offset: {}", report.payload_offset));
        let _ = self
            .term
            .write_line(&format!("Files: {}", report.file_count));
        let _ = self.term.write_line(&format!(
            "Uncompressed: {}",
            Self::format_size(report.uncompressed_size)
        ));
        let _ = self.term.write_line(&format!(
            "Compressed: {}",
            Self::format_size(report.compressed_size)
        ));
        let _ = self
            .term
            .write_line(&format!("Ratio: {:.2}", report.ratio));

        match &report.violation {
            None => {
                if self.use_colors {
                    let _ = self.term.write_line(&format!(
                        "{} Security screening passed",
                        style("✓").green().bold()
                    ));
                } else {
                    let _ = self.term.write_line("Security screening passed");
                }
            }
            Some(code) => {
                if self.use_colors {
                    let _ = self.term.write_line(&format!(
                        "{} Security screening failed: {code}",
                        style("✗").red().bold()
                    ));
                } else {
                    let _ = self
                        .term
                        .write_line(&format!("Security screening failed: {code}"));
                }
            }
        }

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = self.term.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_success(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(message);
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }
}
