//! Face++ service configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::error::FppError;

/// What to do when classifying a single photo fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the whole filtering pass with the first error.
    #[default]
    AbortBatch,
    /// Log the error, drop the photo from the output and keep going.
    SkipPhoto,
}

impl FromStr for FailurePolicy {
    type Err = FppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" | "abort_batch" => Ok(FailurePolicy::AbortBatch),
            "skip" | "skip_photo" => Ok(FailurePolicy::SkipPhoto),
            other => Err(FppError::config(format!("Unknown failure policy: {}", other))),
        }
    }
}

/// Configuration for the Face++ emotion service.
#[derive(Clone)]
pub struct FacePlusPlusConfig {
    /// API key
    pub api_key: String,
    /// API secret
    pub api_secret: String,
    /// Detect endpoint, e.g. `https://api-us.faceplusplus.com/facepp/v3/detect`
    pub api_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Photos resolved in parallel within one pass (1 = sequential)
    pub max_concurrency: usize,
    /// Per-photo failure handling
    pub failure_policy: FailurePolicy,
}

// Keep credentials out of logs.
impl fmt::Debug for FacePlusPlusConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacePlusPlusConfig")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("max_concurrency", &self.max_concurrency)
            .field("failure_policy", &self.failure_policy)
            .finish()
    }
}

impl FacePlusPlusConfig {
    /// Build a config from the three required values.
    ///
    /// Returns `None` if any value is missing or empty; the service is then
    /// considered unavailable.
    pub fn from_values(
        api_key: Option<String>,
        api_secret: Option<String>,
        api_url: Option<String>,
    ) -> Option<Self> {
        let api_key = api_key.filter(|s| !s.is_empty())?;
        let api_secret = api_secret.filter(|s| !s.is_empty())?;
        let api_url = api_url.filter(|s| !s.is_empty())?;

        Some(Self {
            api_key,
            api_secret,
            api_url,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_concurrency: 1,
            failure_policy: FailurePolicy::default(),
        })
    }

    /// Create config from environment variables.
    ///
    /// Requires `FACEPP_API_KEY`, `FACEPP_API_SECRET` and `FACEPP_API_URL`.
    pub fn from_env() -> Option<Self> {
        let config = Self::from_values(
            std::env::var("FACEPP_API_KEY").ok(),
            std::env::var("FACEPP_API_SECRET").ok(),
            std::env::var("FACEPP_API_URL").ok(),
        );

        let Some(mut config) = config else {
            debug!("Face++ credentials not configured, emotion filtering unavailable");
            return None;
        };

        config.timeout = Duration::from_secs(
            std::env::var("FACEPP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        );
        config.connect_timeout = Duration::from_secs(
            std::env::var("FACEPP_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        );
        config.max_concurrency = std::env::var("FACEPP_MAX_CONCURRENCY")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(1);
        config.failure_policy = std::env::var("FACEPP_FAILURE_POLICY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        Some(config)
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }
}
