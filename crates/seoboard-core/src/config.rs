use std::time::Duration;

use crate::error::CoreError;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Base URL of the snapshot API, without a trailing slash.
    pub upstream_url: String,
    pub fetch_timeout_secs: u64,
    pub refresh_debounce_ms: u64,
    pub default_depth: usize,
    /// Raw comma-separated brand terms; parsed by [`crate::filter::BrandFilter`].
    pub brand_terms: String,
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            upstream_url: "http://localhost:8080/api".to_string(),
            fetch_timeout_secs: 10,
            refresh_debounce_ms: 500,
            default_depth: 1,
            brand_terms: String::new(),
            cors_origins: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, CoreError> {
        let defaults = Self::default();
        Ok(Self {
            port: std::env::var("SEOBOARD_PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .map_err(|e| CoreError::Config(format!("invalid port: {e}")))?,
            upstream_url: std::env::var("SEOBOARD_UPSTREAM_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.upstream_url),
            fetch_timeout_secs: std::env::var("SEOBOARD_FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(|v: u64| v.clamp(1, 120))
                .unwrap_or(defaults.fetch_timeout_secs),
            refresh_debounce_ms: std::env::var("SEOBOARD_REFRESH_DEBOUNCE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.refresh_debounce_ms),
            default_depth: {
                let depth: usize = std::env::var("SEOBOARD_DEFAULT_DEPTH")
                    .unwrap_or_else(|_| defaults.default_depth.to_string())
                    .parse()
                    .map_err(|e| CoreError::Config(format!("invalid default depth: {e}")))?;
                if !(1..=crate::directory::MAX_DEPTH).contains(&depth) {
                    return Err(CoreError::Config(format!(
                        "SEOBOARD_DEFAULT_DEPTH must be between 1 and {}",
                        crate::directory::MAX_DEPTH
                    )));
                }
                depth
            },
            brand_terms: std::env::var("SEOBOARD_BRAND_TERMS").unwrap_or_default(),
            cors_origins: std::env::var("SEOBOARD_CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn refresh_debounce(&self) -> Duration {
        Duration::from_millis(self.refresh_debounce_ms)
    }
}
