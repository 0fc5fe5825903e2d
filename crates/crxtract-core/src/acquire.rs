//! Container acquisition from the web store or the local filesystem.

use std::path::Path;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::CrxError;
use crate::ExtractorConfig;
use crate::Result;
use crate::header::CRX_MAGIC;

/// Web store endpoint serving packaged extensions.
const UPDATE_ENDPOINT: &str = "https://clients2.google.com/service/update2/crx";

/// Browser product version reported to the endpoint; the service rejects
/// requests claiming versions too old to know the CRX3 format.
const PROD_VERSION: &str = "121.0.6167.184";

/// Container formats we accept from the endpoint.
const ACCEPT_FORMAT: &str = "crx2,crx3";

/// Browser-like user agent; the endpoint serves interstitial HTML to
/// clients it does not recognize.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Web store identifiers are exactly 32 lowercase letters.
#[allow(clippy::expect_used)]
static EXTENSION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z]{32}").expect("identifier pattern is valid"));

/// Where the container bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Download from the web store by extension identifier.
    Remote {
        /// The 32-character extension identifier.
        id: String,
    },
    /// Read a container file from disk.
    Local {
        /// Path to the container file.
        path: PathBuf,
    },
}

impl InputSource {
    /// Classifies an input string.
    ///
    /// A 32-character lowercase-alphabetic token anywhere in the input
    /// (bare identifier or a full store URL) selects remote acquisition;
    /// anything else is treated as a local filesystem path.
    #[must_use]
    pub fn classify(input: &str) -> Self {
        EXTENSION_ID.find(input).map_or_else(
            || Self::Local {
                path: PathBuf::from(input),
            },
            |m| Self::Remote {
                id: m.as_str().to_string(),
            },
        )
    }
}

/// Builds the deterministic download URL for an extension identifier.
#[must_use]
pub fn download_url(id: &str) -> String {
    format!(
        "{UPDATE_ENDPOINT}?response=redirect&prodversion={PROD_VERSION}\
         &acceptformat={ACCEPT_FORMAT}&x=id%3D{id}%26installsource%3Dondemand%26uc"
    )
}

/// Downloads a container from the web store.
///
/// A single GET, redirects followed, bounded by the configured timeout
/// covering both response headers and the full body.
///
/// # Errors
///
/// - `CrxError::DownloadTimeout` when the timeout elapses first.
/// - `CrxError::DownloadFailed` on transport errors, non-2xx status, or
///   an HTML response body (an interstitial page, not a container).
/// - `CrxError::MalformedInput` when the body does not start with the
///   container magic.
pub async fn fetch_remote(id: &str, config: &ExtractorConfig) -> Result<Vec<u8>> {
    let timeout_millis = u64::try_from(config.download_timeout.as_millis()).unwrap_or(u64::MAX);
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .timeout(config.download_timeout)
        .build()
        .map_err(|e| CrxError::DownloadFailed {
            reason: format!("failed to build HTTP client: {e}"),
        })?;

    let url = download_url(id);
    tracing::debug!(%url, "downloading container");

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| classify_transport_error(&e, timeout_millis))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrxError::DownloadFailed {
            reason: format!("server returned {status}"),
        });
    }

    // An HTML content type means an interstitial or error page, never the
    // binary artifact.
    let is_html = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("text/html"));
    if is_html {
        return Err(CrxError::DownloadFailed {
            reason: "server returned an HTML page instead of a container".to_string(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| classify_transport_error(&e, timeout_millis))?;

    if !body.starts_with(&CRX_MAGIC) {
        return Err(CrxError::MalformedInput {
            reason: "downloaded bytes do not start with the container magic".to_string(),
        });
    }

    Ok(body.to_vec())
}

fn classify_transport_error(err: &reqwest::Error, timeout_millis: u64) -> CrxError {
    if err.is_timeout() {
        CrxError::DownloadTimeout {
            millis: timeout_millis,
        }
    } else {
        CrxError::DownloadFailed {
            reason: err.to_string(),
        }
    }
}

/// Reads a container from the local filesystem.
///
/// Existence check, stat, and content read run concurrently and are
/// joined before the size gate decides whether the buffer enters the
/// pipeline.
///
/// # Errors
///
/// - `CrxError::NotFound` when any of the three operations fails or the
///   file does not exist.
/// - `CrxError::TooLarge` when the stat size exceeds
///   `config.max_file_size`.
pub async fn read_local(path: &Path, config: &ExtractorConfig) -> Result<Vec<u8>> {
    tracing::debug!(path = %path.display(), "reading local container");

    let (exists, metadata, bytes) = tokio::try_join!(
        tokio::fs::try_exists(path),
        tokio::fs::metadata(path),
        tokio::fs::read(path),
    )
    .map_err(|_| CrxError::NotFound {
        path: path.to_path_buf(),
    })?;

    if !exists {
        return Err(CrxError::NotFound {
            path: path.to_path_buf(),
        });
    }

    if metadata.len() > config.max_file_size {
        return Err(CrxError::TooLarge {
            size: metadata.len(),
            max: config.max_file_size,
        });
    }

    Ok(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bare_identifier() {
        let source = InputSource::classify("cfhdojbkjhnklbpkdaibdccddilifddb");
        assert_eq!(
            source,
            InputSource::Remote {
                id: "cfhdojbkjhnklbpkdaibdccddilifddb".to_string()
            }
        );
    }

    #[test]
    fn test_classify_store_url() {
        let url = "https://chromewebstore.google.com/detail/adblock-plus/cfhdojbkjhnklbpkdaibdccddilifddb";
        let source = InputSource::classify(url);
        assert_eq!(
            source,
            InputSource::Remote {
                id: "cfhdojbkjhnklbpkdaibdccddilifddb".to_string()
            }
        );
    }

    #[test]
    fn test_classify_local_path() {
        let source = InputSource::classify("downloads/extension.crx");
        assert_eq!(
            source,
            InputSource::Local {
                path: PathBuf::from("downloads/extension.crx")
            }
        );
    }

    #[test]
    fn test_classify_too_short_token() {
        // 31 lowercase letters is a path, not an identifier.
        let input = "abcdefghijklmnopqrstuvwxyzabcde";
        assert_eq!(input.len(), 31);
        let source = InputSource::classify(input);
        assert!(matches!(source, InputSource::Local { .. }));
    }

    #[test]
    fn test_classify_uppercase_is_local() {
        let input = "ABCDEFGHIJKLMNOPQRSTUVWXYZABCDEF";
        assert_eq!(input.len(), 32);
        let source = InputSource::classify(input);
        assert!(matches!(source, InputSource::Local { .. }));
    }

    #[test]
    fn test_download_url_shape() {
        let url = download_url("cfhdojbkjhnklbpkdaibdccddilifddb");
        assert!(url.starts_with(UPDATE_ENDPOINT));
        assert!(url.contains("response=redirect"));
        assert!(url.contains("acceptformat=crx2,crx3"));
        assert!(url.contains("id%3Dcfhdojbkjhnklbpkdaibdccddilifddb"));
        assert!(url.contains("installsource%3Dondemand"));
    }

    #[tokio::test]
    async fn test_read_local_missing_file() {
        let config = ExtractorConfig::default();
        let result = read_local(Path::new("/nonexistent/container.crx"), &config).await;
        assert!(matches!(result, Err(CrxError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_read_local_size_gate() {
        let config = ExtractorConfig {
            max_file_size: 4,
            ..Default::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.crx");
        std::fs::write(&path, b"more than four bytes").unwrap();

        let result = read_local(&path, &config).await;
        assert!(matches!(
            result,
            Err(CrxError::TooLarge { size: 20, max: 4 })
        ));
    }

    #[tokio::test]
    async fn test_read_local_ok() {
        let config = ExtractorConfig::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.crx");
        std::fs::write(&path, b"Cr24rest").unwrap();

        let bytes = read_local(&path, &config).await.unwrap();
        assert_eq!(bytes, b"Cr24rest");
    }
}
