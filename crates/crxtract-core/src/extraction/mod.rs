//! Extraction orchestration: staging, screening, unpacking, publishing.

mod coordinator;

pub use coordinator::Extractor;
pub use coordinator::FALLBACK_ARCHIVE_NAME;
