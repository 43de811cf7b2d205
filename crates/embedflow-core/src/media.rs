//! Attachment bytes for the clipboard.
//!
//! Remote images may sit behind CORS walls, so loading runs a direct
//! attempt first and falls back to a proxy passthrough route on retries.
//! The whole operation is bounded by a hard deadline and a retry budget —
//! it fails loudly, it never hangs.

use std::time::Duration;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use web_time::Instant;

use crate::error::{FlowError, Result};
use crate::platform::BlobFetcher;

/// Limits for one blob load.
#[derive(Clone, Debug, PartialEq)]
pub struct BlobLoadPolicy {
    /// Hard deadline for the whole operation, retries included.
    pub timeout: Duration,
    /// Total attempts, the direct route included.
    pub max_attempts: u32,
    /// Proxy passthrough prefix; the source URL is appended encoded.
    pub proxy_prefix: String,
}

impl Default for BlobLoadPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            max_attempts: 3,
            proxy_prefix: "https://api.allorigins.win/raw?url=".to_string(),
        }
    }
}

/// Proxy route for a source URL, with the URL encoded as a component.
pub fn proxy_url(prefix: &str, src: &str) -> String {
    format!("{prefix}{}", utf8_percent_encode(src, NON_ALPHANUMERIC))
}

/// Load an image's bytes, retrying through the proxy route on failure.
///
/// Every attempt receives the time remaining until the deadline as its
/// budget. Exceeding the deadline or the attempt budget yields
/// [`FlowError::Timeout`]; no partial state survives.
pub fn load_image_blob<F>(fetcher: &mut F, src: &str, policy: &BlobLoadPolicy) -> Result<Vec<u8>>
where
    F: BlobFetcher + ?Sized,
{
    let started = Instant::now();
    let mut attempts = 0u32;
    let mut route = src.to_string();

    loop {
        let elapsed = started.elapsed();
        if elapsed >= policy.timeout {
            return Err(FlowError::Timeout(policy.timeout));
        }
        let budget = policy.timeout - elapsed;

        attempts += 1;
        match fetcher.fetch(&route, budget) {
            Ok(bytes) => {
                tracing::debug!(
                    target: "embedflow::media",
                    src,
                    attempts,
                    len = bytes.len(),
                    "blob loaded"
                );
                return Ok(bytes);
            }
            Err(err) => {
                tracing::debug!(target: "embedflow::media", src, attempts, %err, "fetch failed");
                if attempts >= policy.max_attempts {
                    return Err(FlowError::Timeout(policy.timeout));
                }
                route = proxy_url(&policy.proxy_prefix, src);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlatformError;

    /// Fetcher scripted with per-attempt outcomes; records requested URLs.
    struct ScriptedFetcher {
        outcomes: Vec<std::result::Result<Vec<u8>, PlatformError>>,
        pub requests: Vec<String>,
    }

    impl ScriptedFetcher {
        fn new(outcomes: Vec<std::result::Result<Vec<u8>, PlatformError>>) -> Self {
            Self {
                outcomes,
                requests: Vec::new(),
            }
        }
    }

    impl BlobFetcher for ScriptedFetcher {
        fn fetch(&mut self, url: &str, _budget: Duration) -> std::result::Result<Vec<u8>, PlatformError> {
            self.requests.push(url.to_string());
            if self.outcomes.is_empty() {
                Err(PlatformError::from("exhausted"))
            } else {
                self.outcomes.remove(0)
            }
        }
    }

    #[test]
    fn test_direct_route_success() {
        let mut fetcher = ScriptedFetcher::new(vec![Ok(vec![1, 2, 3])]);
        let bytes =
            load_image_blob(&mut fetcher, "https://host/a.png", &BlobLoadPolicy::default())
                .unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
        assert_eq!(fetcher.requests, vec!["https://host/a.png".to_string()]);
    }

    #[test]
    fn test_retry_switches_to_proxy_route() {
        let mut fetcher = ScriptedFetcher::new(vec![
            Err(PlatformError::from("cors")),
            Ok(vec![9]),
        ]);
        let policy = BlobLoadPolicy::default();
        let bytes = load_image_blob(&mut fetcher, "https://host/a b.png", &policy).unwrap();
        assert_eq!(bytes, vec![9]);
        assert_eq!(fetcher.requests.len(), 2);
        assert_eq!(
            fetcher.requests[1],
            "https://api.allorigins.win/raw?url=https%3A%2F%2Fhost%2Fa%20b%2Epng"
        );
    }

    #[test]
    fn test_attempt_budget_exhausted() {
        let mut fetcher = ScriptedFetcher::new(vec![
            Err(PlatformError::from("one")),
            Err(PlatformError::from("two")),
            Err(PlatformError::from("three")),
        ]);
        let err = load_image_blob(&mut fetcher, "https://host/a.png", &BlobLoadPolicy::default())
            .unwrap_err();
        assert!(matches!(err, FlowError::Timeout(_)));
        assert_eq!(fetcher.requests.len(), 3);
    }

    #[test]
    fn test_deadline_already_spent() {
        let mut fetcher = ScriptedFetcher::new(vec![Ok(vec![1])]);
        let policy = BlobLoadPolicy {
            timeout: Duration::ZERO,
            ..BlobLoadPolicy::default()
        };
        let err = load_image_blob(&mut fetcher, "https://host/a.png", &policy).unwrap_err();
        assert!(matches!(err, FlowError::Timeout(_)));
        assert!(fetcher.requests.is_empty());
    }
}
