//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Request handling never reads process-wide environment variables,
//! which keeps behaviour consistent in multi-threaded runtimes and test harnesses.

use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_GATEWAY_URL, DEFAULT_MAX_RETRIES, DEFAULT_MODEL,
    DEFAULT_PROFILES_FILE, DEFAULT_TIMEOUT_SECS, MAX_RETRIES_LIMIT,
};
use crate::{AssessmentError, AssessmentResult};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings for the hosted chat-completion gateway.
#[derive(Clone)]
pub struct GatewayConfig {
    url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    max_retries: u32,
}

impl GatewayConfig {
    /// Create a new `GatewayConfig`.
    ///
    /// # Errors
    /// Returns `AssessmentError::Config` if the URL is not http(s), the API key or model is
    /// blank, the timeout is zero, or `max_retries` exceeds the supported limit.
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
        max_retries: u32,
    ) -> AssessmentResult<Self> {
        let url = url.into().trim().to_string();
        let api_key = api_key.into().trim().to_string();
        let model = model.into().trim().to_string();

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AssessmentError::Config(
                "gateway url must start with http:// or https://".into(),
            ));
        }
        if api_key.is_empty() {
            return Err(AssessmentError::Config(
                "gateway api key cannot be empty".into(),
            ));
        }
        if model.is_empty() {
            return Err(AssessmentError::Config("model cannot be empty".into()));
        }
        if timeout.is_zero() {
            return Err(AssessmentError::Config(
                "gateway timeout must be greater than zero".into(),
            ));
        }
        if max_retries > MAX_RETRIES_LIMIT {
            return Err(AssessmentError::Config(format!(
                "max retries cannot exceed {MAX_RETRIES_LIMIT}"
            )));
        }

        Ok(Self {
            url,
            api_key,
            model,
            timeout,
            max_retries,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    profiles_file: PathBuf,
    gateway: GatewayConfig,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        data_dir: PathBuf,
        profiles_file: PathBuf,
        gateway: GatewayConfig,
    ) -> AssessmentResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(AssessmentError::Config("data_dir cannot be empty".into()));
        }

        Ok(Self {
            data_dir,
            profiles_file,
            gateway,
        })
    }

    /// Builds the configuration from a variable lookup, normally `std::env::var_os`.
    ///
    /// Recognised variables: `CARDIO_DATA_DIR`, `CARDIO_PROFILES_FILE`, `AI_GATEWAY_URL`,
    /// `AI_GATEWAY_API_KEY` (required), `AI_MODEL`, `AI_TIMEOUT_SECS`, `AI_MAX_RETRIES`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> AssessmentResult<Self> {
        let text = |name: &str| {
            lookup(name)
                .map(|v| v.to_string_lossy().trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = text("AI_GATEWAY_API_KEY").ok_or_else(|| {
            AssessmentError::Config("AI_GATEWAY_API_KEY not set in environment".into())
        })?;

        let timeout_secs = number_from_env_value(
            "AI_TIMEOUT_SECS",
            text("AI_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?;
        let max_retries = number_from_env_value(
            "AI_MAX_RETRIES",
            text("AI_MAX_RETRIES"),
            DEFAULT_MAX_RETRIES,
        )?;

        let gateway = GatewayConfig::new(
            text("AI_GATEWAY_URL").unwrap_or_else(|| DEFAULT_GATEWAY_URL.into()),
            api_key,
            text("AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            Duration::from_secs(timeout_secs),
            max_retries,
        )?;

        Self::new(
            PathBuf::from(text("CARDIO_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.into())),
            PathBuf::from(
                text("CARDIO_PROFILES_FILE").unwrap_or_else(|| DEFAULT_PROFILES_FILE.into()),
            ),
            gateway,
        )
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn profiles_file(&self) -> &Path {
        &self.profiles_file
    }

    pub fn gateway(&self) -> &GatewayConfig {
        &self.gateway
    }
}

/// Parse a numeric setting from an optional string value.
///
/// If `value` is `None`, returns `default`.
fn number_from_env_value<T: std::str::FromStr>(
    name: &str,
    value: Option<String>,
    default: T,
) -> AssessmentResult<T> {
    match value {
        None => Ok(default),
        Some(v) => v
            .parse::<T>()
            .map_err(|_| AssessmentError::Config(format!("{name} must be a number, got {v:?}"))),
    }
}
