use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the recommendation backend
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Upper bound for a single recommendation request, in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Quiet period before live input is acted on, in milliseconds
    #[serde(default = "default_debounce_delay_ms")]
    pub debounce_delay_ms: u64,

    /// Number of recommendations requested when the caller does not say
    #[serde(default = "default_top_n")]
    pub default_top_n: u32,

    /// Shortest trimmed input that live search will send
    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_debounce_delay_ms() -> u64 {
    500
}

fn default_top_n() -> u32 {
    10
}

fn default_min_query_length() -> usize {
    2
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_ms: default_request_timeout_ms(),
            debounce_delay_ms: default_debounce_delay_ms(),
            default_top_n: default_top_n(),
            min_query_length: default_min_query_length(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        Ok(config.normalized())
    }

    /// Same as [`Config::from_env`] but reads from an explicit iterator of pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        Ok(config.normalized())
    }

    fn normalized(mut self) -> Self {
        self.api_url = self.api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_delay_ms)
    }
}
