use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::fund::Horizon;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const MAX_TOP_WEEK_LIMIT: u32 = 50;
const MAX_RANKING_LIMIT: u32 = 500;

/// Client configuration: where the fund service lives and what to ask it for.
///
/// Every field has a default, so a partial JSON document (or none at all)
/// yields a usable configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base endpoint of the fund service, without trailing `/api`.
    pub base_url: String,

    /// Number of funds requested for the top-of-week list (1–50).
    pub top_week_limit: u32,

    /// Number of funds requested for the fundamental ranking (1–500).
    pub ranking_limit: u32,

    /// Risk profile the fundamental ranking is scored against.
    pub ranking_target_sri: u8,
    pub ranking_horizon: Horizon,

    /// Per-request timeout. `None` waits indefinitely. Ignored on wasm32.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            top_week_limit: 20,
            ranking_limit: 100,
            ranking_target_sri: 4,
            ranking_horizon: Horizon::Medium,
            request_timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientSettings {
    /// Defaults overlaid with `MIN_TRADE_*` environment variables.
    /// Unparseable values are rejected rather than silently ignored.
    pub fn from_env() -> Result<Self, CoreError> {
        let mut settings = Self::default();

        if let Some(url) = env_var("MIN_TRADE_API_URL") {
            settings.base_url = url;
        }
        if let Some(raw) = env_var("MIN_TRADE_TIMEOUT_SECS") {
            let secs: u64 = parse_env("MIN_TRADE_TIMEOUT_SECS", &raw)?;
            settings.request_timeout_secs = if secs == 0 { None } else { Some(secs) };
        }
        if let Some(raw) = env_var("MIN_TRADE_TOP_WEEK_LIMIT") {
            settings.top_week_limit = parse_env("MIN_TRADE_TOP_WEEK_LIMIT", &raw)?;
        }
        if let Some(raw) = env_var("MIN_TRADE_RANKING_LIMIT") {
            settings.ranking_limit = parse_env("MIN_TRADE_RANKING_LIMIT", &raw)?;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Check that the configuration can actually be used against the service.
    pub fn validate(&self) -> Result<(), CoreError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(CoreError::Config("base_url must not be empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CoreError::Config(format!(
                "base_url '{url}' must start with http:// or https://"
            )));
        }
        if !(1..=MAX_TOP_WEEK_LIMIT).contains(&self.top_week_limit) {
            return Err(CoreError::Config(format!(
                "top_week_limit {} is out of range (1-{MAX_TOP_WEEK_LIMIT})",
                self.top_week_limit
            )));
        }
        if !(1..=MAX_RANKING_LIMIT).contains(&self.ranking_limit) {
            return Err(CoreError::Config(format!(
                "ranking_limit {} is out of range (1-{MAX_RANKING_LIMIT})",
                self.ranking_limit
            )));
        }
        if !(1..=7).contains(&self.ranking_target_sri) {
            return Err(CoreError::Config(format!(
                "ranking_target_sri {} is out of range (1-7)",
                self.ranking_target_sri
            )));
        }
        Ok(())
    }

    /// Join `path` onto the base URL, normalising slashes.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, CoreError> {
    raw.parse()
        .map_err(|_| CoreError::Config(format!("{name}='{raw}' is not a valid number")))
}
