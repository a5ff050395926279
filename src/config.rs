// SPDX-License-Identifier: PMPL-1.0-or-later
//! Configuration management for canvasbot
//!
//! # Security considerations
//!
//! - The advice API key is read from the config file, `CANVASBOT__ADVISOR__API_KEY`
//!   or `TOGETHER_API_KEY`. It is passed only to `bearer_auth()` and never logged.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Placeholder shipped in example configs; treated as no key
const PLACEHOLDER_API_KEY: &str = "your-together-api-key-here";

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Remediation advice endpoint
    #[serde(default)]
    pub advisor: AdvisorConfig,

    /// Rule thresholds
    #[serde(default)]
    pub rules: RulesConfig,

    /// Scan scheduling
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdvisorConfig {
    /// Bearer token; advice is disabled without one
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// Minimum spacing between outbound calls (milliseconds)
    #[serde(default = "default_min_call_interval_ms")]
    pub min_call_interval_ms: u64,

    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Backoff before the first retry; doubles on each further retry
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            min_call_interval_ms: default_min_call_interval_ms(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            timeout_secs: default_timeout(),
        }
    }
}

impl AdvisorConfig {
    /// The configured key, unless missing, blank or the shipped placeholder
    pub fn effective_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != PLACEHOLDER_API_KEY)
    }

    pub fn min_call_interval(&self) -> Duration {
        Duration::from_millis(self.min_call_interval_ms)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_endpoint() -> String {
    "https://api.together.xyz/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free".to_string()
}

fn default_max_tokens() -> u32 {
    800
}

fn default_temperature() -> f64 {
    0.3
}

fn default_top_p() -> f64 {
    0.8
}

fn default_min_call_interval_ms() -> u64 {
    30_000 // free tier: 2 calls per minute
}

fn default_max_retries() -> usize {
    2
}

fn default_initial_backoff_ms() -> u64 {
    2_000
}

fn default_timeout() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct RulesConfig {
    /// Overrides the 4.5:1 AA minimum for normal-size text
    #[serde(default)]
    pub contrast_threshold: Option<f64>,

    #[serde(default = "default_min_font_size")]
    pub min_font_size: f64,

    #[serde(default = "default_min_line_height")]
    pub min_line_height: f64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            contrast_threshold: None,
            min_font_size: default_min_font_size(),
            min_line_height: default_min_line_height(),
        }
    }
}

fn default_min_font_size() -> f64 {
    12.0
}

fn default_min_line_height() -> f64 {
    1.2
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScanConfig {
    /// Interval between continuous-validation scans (milliseconds)
    #[serde(default = "default_check_frequency_ms")]
    pub check_frequency_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            check_frequency_ms: default_check_frequency_ms(),
        }
    }
}

impl ScanConfig {
    pub fn check_frequency(&self) -> Duration {
        Duration::from_millis(self.check_frequency_ms)
    }
}

fn default_check_frequency_ms() -> u64 {
    5_000
}

impl Config {
    /// Load configuration from file, layered with `CANVASBOT__*` environment
    /// variables. A missing file yields defaults plus environment.
    pub fn load(path: &str) -> Result<Self> {
        let path = Path::new(path);

        let mut builder = config::Config::builder();
        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else {
            tracing::warn!("Config file {} not found, using defaults", path.display());
        }
        builder = builder.add_source(config::Environment::with_prefix("CANVASBOT").separator("__"));

        let mut parsed: Config = builder.build()?.try_deserialize()?;

        if parsed.advisor.effective_api_key().is_none() {
            if let Ok(key) = std::env::var("TOGETHER_API_KEY") {
                parsed.advisor.api_key = Some(key);
            }
        }

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.advisor.api_key.is_none());
        assert_eq!(config.advisor.max_tokens, 800);
        assert_eq!(config.advisor.min_call_interval(), Duration::from_secs(30));
        assert_eq!(config.advisor.max_retries, 2);
        assert_eq!(config.rules.min_font_size, 12.0);
        assert_eq!(config.rules.min_line_height, 1.2);
        assert!(config.rules.contrast_threshold.is_none());
        assert_eq!(config.scan.check_frequency(), Duration::from_secs(5));
    }

    #[test]
    fn test_placeholder_key_is_ignored() {
        let mut advisor = AdvisorConfig::default();
        assert_eq!(advisor.effective_api_key(), None);

        advisor.api_key = Some(PLACEHOLDER_API_KEY.to_string());
        assert_eq!(advisor.effective_api_key(), None);

        advisor.api_key = Some("   ".to_string());
        assert_eq!(advisor.effective_api_key(), None);

        advisor.api_key = Some("tok-123".to_string());
        assert_eq!(advisor.effective_api_key(), Some("tok-123"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[advisor]
model = "test-model"
min_call_interval_ms = 0

[rules]
contrast_threshold = 7.0
min_font_size = 14
"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.advisor.model, "test-model");
        assert_eq!(config.advisor.min_call_interval_ms, 0);
        assert_eq!(config.advisor.max_tokens, 800);
        assert_eq!(config.rules.contrast_threshold, Some(7.0));
        assert_eq!(config.rules.min_font_size, 14.0);
        assert_eq!(config.scan.check_frequency_ms, 5_000);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/canvasbot.toml").unwrap();
        assert_eq!(config.advisor.endpoint, default_endpoint());
    }
}
