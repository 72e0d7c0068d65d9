use std::env;
use std::time::Duration;

use katha_core::assets::AssetBase;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the backend lives and how long to wait for it.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    assets: AssetBase,
}

impl ApiConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::AssetBase` when `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ConfigError> {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let assets = AssetBase::from_api_base(&base_url)?;
        Ok(Self {
            base_url,
            timeout,
            assets,
        })
    }

    /// Read `KATHA_API_BASE_URL` and `KATHA_HTTP_TIMEOUT_SECS`, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("KATHA_API_BASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.into());
        let timeout_secs = match env::var("KATHA_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidVar {
                    var: "KATHA_HTTP_TIMEOUT_SECS",
                    raw,
                })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Self::new(base_url, Duration::from_secs(timeout_secs))
    }

    #[must_use]
    pub fn assets(&self) -> &AssetBase {
        &self.assets
    }

    /// Absolute URL of an API path such as `/stories/3`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_API_BASE_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
        .expect("default API base should be a valid URL")
    }
}

/// Knobs for the chapter reader.
#[derive(Clone, Copy, Debug)]
pub struct ReaderConfig {
    /// Minimum spacing between evaluated scroll observations.
    pub sample_interval: Duration,
    /// Maximum number of chapters remembered locally.
    pub progress_capacity: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_millis(100),
            progress_capacity: crate::progress_store::DEFAULT_CAPACITY,
        }
    }
}
