//! Security-validated fetching and extraction of packaged browser
//! extensions.
//!
//! `crxtract-core` downloads (or reads) a packaged extension container,
//! validates its binary header, screens the embedded archive against
//! decompression-bomb ceilings, and unpacks it into a contained output
//! directory with protection against path traversal.
//!
//! # Examples
//!
//! ```no_run
//! use crxtract_core::Extractor;
//! use crxtract_core::ExtractorConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = Extractor::new(ExtractorConfig::default())?;
//! let outcome = extractor.run("cfhdojbkjhnklbpkdaibdccddilifddb").await?;
//! if let Some(manifest) = &outcome.manifest {
//!     println!("{} {}", manifest.name, manifest.version);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod acquire;
pub mod bytes;
pub mod config;
pub mod error;
pub mod extraction;
pub mod header;
pub mod manifest;
pub mod outcome;
pub mod security;

// Re-export main API types
pub use acquire::InputSource;
pub use config::ExtractorConfig;
pub use error::CrxError;
pub use error::ErrorKind;
pub use error::Result;
pub use extraction::Extractor;
pub use extraction::FALLBACK_ARCHIVE_NAME;
pub use header::CrxHeader;
pub use header::CrxVersion;
pub use manifest::ManifestSummary;
pub use outcome::ExtractionOutcome;
pub use security::PathGuard;
pub use security::SecurityProfile;
