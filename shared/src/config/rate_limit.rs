//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

/// Source used to derive the logical client identity for rate limiting.
///
/// This is a deployment-level policy choice: it is selected once at config
/// load and applied to every request, not picked per request type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientIdSource {
    /// Remote network address of the connection
    IpAddress,
    /// API key from the `Authorization: ApiKey` header or `api_key` query parameter
    ApiKey,
    /// Authenticated principal's username, falling back to the remote address
    UserId,
}

/// Token-bucket rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// How client identities are derived
    #[serde(default = "default_client_id_source")]
    pub client_id_source: ClientIdSource,

    /// Bucket capacity (maximum tokens per client)
    pub token_limit: u32,

    /// Tokens added per replenishment period
    pub tokens_per_period: u32,

    /// Replenishment period in seconds
    pub replenishment_period_seconds: u64,

    /// Maximum rejected acquisitions allowed to wait for replenishment
    /// per client before being rejected outright
    pub queue_limit: u32,

    /// Retry-After value (seconds) when no backpressure estimate is available
    pub default_retry_after_seconds: u64,

    /// Client identities exempt from bucket accounting
    #[serde(default)]
    pub whitelisted_clients: Vec<String>,

    /// Request path prefixes exempt from rate limiting
    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: Vec<String>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            client_id_source: default_client_id_source(),
            token_limit: 100,
            tokens_per_period: 20,
            replenishment_period_seconds: 60,
            queue_limit: 2,
            default_retry_after_seconds: 30,
            whitelisted_clients: Vec::new(),
            excluded_paths: default_excluded_paths(),
        }
    }
}

impl RateLimitConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            enabled: env_parse("RATE_LIMIT_ENABLED", defaults.enabled),
            client_id_source: match std::env::var("RATE_LIMIT_CLIENT_ID_SOURCE").as_deref() {
                Ok("api-key") => ClientIdSource::ApiKey,
                Ok("user-id") => ClientIdSource::UserId,
                _ => ClientIdSource::IpAddress,
            },
            token_limit: env_parse("RATE_LIMIT_TOKEN_LIMIT", defaults.token_limit),
            tokens_per_period: env_parse("RATE_LIMIT_TOKENS_PER_PERIOD", defaults.tokens_per_period),
            replenishment_period_seconds: env_parse(
                "RATE_LIMIT_PERIOD_SECONDS",
                defaults.replenishment_period_seconds,
            ),
            queue_limit: env_parse("RATE_LIMIT_QUEUE_LIMIT", defaults.queue_limit),
            default_retry_after_seconds: env_parse(
                "RATE_LIMIT_DEFAULT_RETRY_AFTER",
                defaults.default_retry_after_seconds,
            ),
            whitelisted_clients: env_list("RATE_LIMIT_WHITELIST"),
            excluded_paths: match env_list("RATE_LIMIT_EXCLUDED_PATHS") {
                v if v.is_empty() => defaults.excluded_paths,
                v => v,
            },
        }
    }

    /// Create a development configuration (more lenient limits)
    pub fn development() -> Self {
        Self {
            token_limit: 1000,
            tokens_per_period: 200,
            ..Default::default()
        }
    }

    /// Whether the given request path is exempt from rate limiting
    pub fn is_path_excluded(&self, path: &str) -> bool {
        self.excluded_paths.iter().any(|p| path.starts_with(p.as_str()))
    }

    /// Whether the given client identity is whitelisted
    pub fn is_client_whitelisted(&self, client_id: &str) -> bool {
        self.whitelisted_clients.iter().any(|c| c == client_id)
    }
}

fn default_enabled() -> bool {
    true
}

fn default_client_id_source() -> ClientIdSource {
    ClientIdSource::IpAddress
}

fn default_excluded_paths() -> Vec<String> {
    vec!["/health".to_string(), "/metrics".to_string()]
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
