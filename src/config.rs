use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // LI-COR Cloud API
    pub licor_base_url: String,
    pub licor_api_token: String,
    pub licor_logger_sn: String,
    pub licor_request_timeout_seconds: u64,

    // Polling
    pub poll_interval_seconds: u64,
    pub poll_retry_max: u32,
    pub poll_retry_delay_seconds: u64,

    // Time windows
    pub default_range_hours: u32,
    pub max_range_hours: u32,

    // API settings
    pub api_host: String,
    pub api_port: u16,

    // Rate limiting
    pub disable_rate_limiting: bool,
    pub rate_limit_read_per_second: u64,
    pub rate_limit_read_burst: u32,
    pub rate_limit_control_per_second: u64,
    pub rate_limit_control_burst: u32,
    pub export_concurrent_limit: usize,

    // Application metadata
    pub deployment: Deployment,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if required environment variables are not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unparsable optional values fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if a required key is absent or blank, and
    /// `ConfigError::Invalid` if the time-window settings are inconsistent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = Self {
            // LI-COR Cloud API
            licor_base_url: or_default("LICOR_BASE_URL", "https://api.licor.cloud/v1/data")
                .trim_end_matches('/')
                .to_string(),
            licor_api_token: required("LICOR_API_TOKEN")?,
            licor_logger_sn: required("LICOR_LOGGER_SN")?,
            licor_request_timeout_seconds: parse_or(&lookup, "LICOR_REQUEST_TIMEOUT_SECONDS", 60),

            // Polling
            poll_interval_seconds: parse_or(&lookup, "POLL_INTERVAL_SECONDS", 300), // 5 minutes
            poll_retry_max: parse_or(&lookup, "POLL_RETRY_MAX", 3),
            poll_retry_delay_seconds: parse_or(&lookup, "POLL_RETRY_DELAY_SECONDS", 30),

            // Time windows
            default_range_hours: parse_or(&lookup, "DEFAULT_RANGE_HOURS", 24),
            max_range_hours: parse_or(&lookup, "MAX_RANGE_HOURS", 744), // 31 days

            // API settings
            api_host: or_default("API_HOST", "0.0.0.0"),
            api_port: parse_or(&lookup, "API_PORT", 3000),

            // Rate limiting
            disable_rate_limiting: parse_or(&lookup, "DISABLE_RATE_LIMITING", false),
            rate_limit_read_per_second: parse_or(&lookup, "RATE_LIMIT_READ_PER_SECOND", 10),
            rate_limit_read_burst: parse_or(&lookup, "RATE_LIMIT_READ_BURST", 60),
            rate_limit_control_per_second: parse_or(&lookup, "RATE_LIMIT_CONTROL_PER_SECOND", 1),
            rate_limit_control_burst: parse_or(&lookup, "RATE_LIMIT_CONTROL_BURST", 10),
            export_concurrent_limit: parse_or(&lookup, "EXPORT_CONCURRENT_LIMIT", 5),

            // Application metadata
            deployment: Deployment::parse(&or_default("DEPLOYMENT", "local")),
        };

        if config.poll_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "POLL_INTERVAL_SECONDS must be greater than zero",
            ));
        }
        if config.default_range_hours == 0 || config.default_range_hours > config.max_range_hours {
            return Err(ConfigError::Invalid(
                "DEFAULT_RANGE_HOURS must be between 1 and MAX_RANGE_HOURS",
            ));
        }

        Ok(config)
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}
