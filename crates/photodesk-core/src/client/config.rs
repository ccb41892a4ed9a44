//! Backend location, read from the environment with logged fallbacks.

use std::env;
use std::time::Duration;

use tracing::{info, warn};

/// Environment variable holding the backend origin.
pub const BASE_URL_VAR: &str = "PHOTODESK_API_BASE_URL";
/// Backend origin used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
/// Path prefix of every API route.
pub const API_PREFIX: &str = "/api/v1";
/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_VAR: &str = "PHOTODESK_API_TIMEOUT_SECS";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    /// Applied to every request.
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_env() -> Self {
        let default_secs = DEFAULT_TIMEOUT.as_secs().to_string();
        let secs = try_load(TIMEOUT_VAR, &default_secs);
        let timeout = match secs.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!("{TIMEOUT_VAR} is not a positive integer ({secs}), using default: {default_secs}");
                DEFAULT_TIMEOUT
            }
        };
        Self::new(try_load(BASE_URL_VAR, DEFAULT_BASE_URL)).with_timeout(timeout)
    }

    /// Absolute URL of an API route such as `/images/7/file`.
    pub fn endpoint(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}{API_PREFIX}/{path}", self.base_url)
    }
}

fn try_load(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        Ok(_) => {
            warn!("{key} is empty, using default: {default}");
            default.to_string()
        }
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let config = ApiConfig::new("https://photos.example.com/");
        assert_eq!(
            config.endpoint("/images/3/file"),
            "https://photos.example.com/api/v1/images/3/file"
        );
        assert_eq!(
            config.endpoint("users/login"),
            "https://photos.example.com/api/v1/users/login"
        );
    }

    #[test]
    fn test_default_base_url() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_with_timeout() {
        let config = ApiConfig::default().with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout.as_secs(), 5);
    }

    #[test]
    fn test_try_load_missing_uses_default() {
        assert_eq!(
            try_load("PHOTODESK_TEST_SURELY_UNSET_VARIABLE", "fallback"),
            "fallback"
        );
    }
}
