//! The extraction pipeline coordinator.
//!
//! One coordinator runs one extraction, strictly sequentially:
//! acquire → parse header → stage payload → security screening → unpack →
//! publish → manifest read. Each stage's output is the next stage's
//! mandatory input, and every gate must pass before the next stage runs.

use std::fs::File;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use crate::CrxError;
use crate::ExtractorConfig;
use crate::Result;
use crate::acquire;
use crate::acquire::InputSource;
use crate::header;
use crate::manifest;
use crate::outcome::ExtractionOutcome;
use crate::security::PathGuard;
use crate::security::inspector;
use crate::security::sanitize_name;

/// Filename the payload is staged under inside the temp directory.
const STAGED_ARCHIVE_NAME: &str = "payload.zip";

/// Filename the unextracted payload is preserved under when unpacking
/// fails after the payload passed security screening.
pub const FALLBACK_ARCHIVE_NAME: &str = "unextracted-payload.zip";

/// Counters accumulated while unpacking.
#[derive(Debug, Default, Clone, Copy)]
struct UnpackStats {
    files: usize,
    directories: usize,
    bytes: u64,
}

/// Coordinates one extension extraction from input string to published
/// output directory.
///
/// Construct a fresh coordinator per extraction; nothing is shared across
/// attempts. The working directory is snapshotted at construction and
/// all path trust decisions derive from that snapshot.
///
/// # Examples
///
/// ```no_run
/// use crxtract_core::{Extractor, ExtractorConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = Extractor::new(ExtractorConfig::default())?;
/// let outcome = extractor.run("cfhdojbkjhnklbpkdaibdccddilifddb").await?;
/// println!("extracted to {}", outcome.output_dir.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Extractor {
    config: ExtractorConfig,
    guard: PathGuard,
}

impl Extractor {
    /// Creates a coordinator, snapshotting the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the working directory cannot be determined.
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        let working_dir = std::env::current_dir()?;
        Ok(Self::with_working_dir(config, working_dir))
    }

    /// Creates a coordinator with an explicit working-directory snapshot.
    #[must_use]
    pub fn with_working_dir(config: ExtractorConfig, working_dir: PathBuf) -> Self {
        let guard = PathGuard::new(&config.allowed_output_paths, working_dir);
        Self { config, guard }
    }

    /// The configuration this coordinator runs with.
    #[must_use]
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Runs the full pipeline, deriving the output name from the input.
    pub async fn run(&self, input: &str) -> Result<ExtractionOutcome> {
        self.run_named(input, None).await
    }

    /// Runs the full pipeline with an optional output-name override.
    ///
    /// # Errors
    ///
    /// Returns the first stage failure; see `CrxError` for the taxonomy.
    /// The staging directory is removed on every exit path. Security
    /// failures leave nothing behind; an unpack failure preserves the
    /// payload at [`FALLBACK_ARCHIVE_NAME`] inside the output directory.
    #[allow(clippy::too_many_lines)]
    pub async fn run_named(
        &self,
        input: &str,
        name_override: Option<&str>,
    ) -> Result<ExtractionOutcome> {
        let started = Instant::now();

        let source = InputSource::classify(input);
        let (derived_name, raw) = match &source {
            InputSource::Remote { id } => {
                let bytes = acquire::fetch_remote(id, &self.config).await?;
                (id.clone(), bytes)
            }
            InputSource::Local { path } => {
                let bytes = acquire::read_local(path, &self.config).await?;
                let stem = path
                    .file_stem()
                    .and_then(std::ffi::OsStr::to_str)
                    .unwrap_or_default();
                (stem.to_string(), bytes)
            }
        };
        let name = sanitize_name(name_override.unwrap_or(&derived_name));

        let parsed = header::parse(&raw)?;
        tracing::debug!(
            version = %parsed.version,
            offset = parsed.payload_offset,
            "container header parsed"
        );
        let payload = &raw[parsed.payload_offset as usize..];

        // Stage the payload into a uniquely named temp directory under the
        // extensions dir. The TempDir guard removes it on every exit path.
        let extensions_dir = self.guard.resolve(&self.config.extensions_dir, None)?;
        std::fs::create_dir_all(&extensions_dir)?;
        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&extensions_dir)?;
        // The unique suffix was composed after the check above; validate
        // the actual directory too.
        self.guard.resolve(staging.path(), None)?;

        let staged_archive = staging.path().join(STAGED_ARCHIVE_NAME);
        std::fs::write(&staged_archive, payload)?;
        tracing::debug!(path = %staged_archive.display(), "payload staged");

        // Screening gate. A rejected payload is not preserved anywhere:
        // the staging directory goes away with the guard.
        let profile = inspector::inspect(&staged_archive)?;
        inspector::enforce(&profile, &self.config)?;
        tracing::debug!(
            files = profile.file_count,
            uncompressed = profile.uncompressed_size,
            compressed = profile.compressed_size,
            "security screening passed"
        );

        let output_dir = self.guard.resolve(Path::new(&name), Some(&extensions_dir))?;

        let unpacked = staging.path().join("unpacked");
        let stats = match self.unpack(&staged_archive, &unpacked) {
            Ok(stats) => stats,
            // A hostile entry is still a threat: fail without a trace.
            Err(err) if err.is_security_violation() => return Err(err),
            Err(err) => {
                // The payload passed screening; keep it for manual
                // inspection or retry.
                let reason = match err {
                    CrxError::ExtractionFailed { reason, .. } => reason,
                    other => other.to_string(),
                };
                let fallback = self.preserve_payload(payload, &output_dir)?;
                tracing::warn!(path = %fallback.display(), "unextracted payload preserved");
                return Err(CrxError::ExtractionFailed {
                    reason,
                    fallback: Some(fallback),
                });
            }
        };

        self.publish(&unpacked, &output_dir)?;

        // Keep the original container next to the output directory.
        let container_copy = self
            .guard
            .resolve(Path::new(&format!("{name}.crx")), Some(&extensions_dir))?;
        std::fs::write(&container_copy, &raw)?;

        let mut warnings = Vec::new();
        let manifest = match manifest::read_from_dir(&output_dir) {
            Ok(summary) => Some(summary),
            Err(err) => {
                tracing::warn!(%err, "manifest could not be read");
                warnings.push(format!("manifest could not be read: {err}"));
                None
            }
        };

        Ok(ExtractionOutcome {
            extension_name: name,
            output_dir,
            files_extracted: stats.files,
            directories_created: stats.directories,
            bytes_written: stats.bytes,
            duration: started.elapsed(),
            manifest,
            warnings,
        })
    }

    /// Unpacks the staged archive into `dest`, re-validating every entry
    /// path immediately before touching the filesystem.
    ///
    /// Entries are contained twice over: `dest` must sit under an allowed
    /// root, and each entry must resolve under `dest` itself, so a
    /// traversal entry cannot even reach a sibling inside the root.
    fn unpack(&self, archive_path: &Path, dest: &Path) -> Result<UnpackStats> {
        let dest = self.guard.resolve(dest, None)?;
        std::fs::create_dir_all(&dest)?;
        let entry_guard = PathGuard::new(
            std::slice::from_ref(&dest),
            self.guard.working_dir().to_path_buf(),
        );

        let file = File::open(archive_path)?;
        let mut archive =
            zip::ZipArchive::new(file).map_err(|e| CrxError::ExtractionFailed {
                reason: format!("cannot open staged archive: {e}"),
                fallback: None,
            })?;

        let mut stats = UnpackStats::default();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(|e| CrxError::ExtractionFailed {
                reason: format!("cannot read archive entry {i}: {e}"),
                fallback: None,
            })?;

            let raw_name = entry.name().to_string();
            if raw_name.is_empty() {
                continue;
            }
            let target = entry_guard.resolve(Path::new(&raw_name), Some(&dest))?;

            if entry.is_dir() {
                std::fs::create_dir_all(&target)?;
                stats.directories += 1;
                continue;
            }

            if let Some(parent) = target.parent() {
                entry_guard.resolve(parent, None)?;
                std::fs::create_dir_all(parent)?;
            }

            let mut out = File::create(&target)?;
            // CRC mismatches and truncated streams surface here as I/O
            // errors from the decoding reader.
            stats.bytes += std::io::copy(&mut entry, &mut out)?;
            stats.files += 1;
        }

        Ok(stats)
    }

    /// Persists the raw payload inside the intended output directory after
    /// an unpack failure.
    fn preserve_payload(&self, payload: &[u8], output_dir: &Path) -> Result<PathBuf> {
        let output_dir = self.guard.resolve(output_dir, None)?;
        std::fs::create_dir_all(&output_dir)?;
        let fallback = output_dir.join(FALLBACK_ARCHIVE_NAME);
        std::fs::write(&fallback, payload)?;
        Ok(fallback)
    }

    /// Replaces the output directory with the unpacked tree.
    ///
    /// Any prior contents at the output path are destructively cleared:
    /// each extraction represents the current state of one named
    /// extension.
    fn publish(&self, unpacked: &Path, output_dir: &Path) -> Result<()> {
        let output_dir = self.guard.resolve(output_dir, None)?;
        if output_dir.exists() {
            std::fs::remove_dir_all(&output_dir)?;
        }
        std::fs::rename(unpacked, &output_dir)?;
        tracing::debug!(path = %output_dir.display(), "output published");
        Ok(())
    }
}
