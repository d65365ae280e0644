use std::{env, time::Duration};

/// Configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// DynamoDB table holding every entity (default: "slackmap")
    pub table_name: String,
    /// Endpoint override for local DynamoDB (default: none)
    pub dynamodb_endpoint: Option<String>,
    /// Cache TTL in seconds (default: 300)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cache entries (default: 10,000)
    pub cache_max_entries: usize,
    /// First delay between batch-write retry rounds, in ms (default: 50)
    pub batch_retry_base_delay_ms: u64,
    /// Upper bound on the batch-write retry delay, in ms (default: 2,000)
    pub batch_retry_max_delay_ms: u64,
    /// Page size used when a caller does not pass a limit (default: 50)
    pub query_page_limit: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SLACKMAP_TABLE_NAME` - Table name (default: "slackmap")
    /// - `DYNAMODB_ENDPOINT` - Endpoint override (default: none)
    /// - `CACHE_TTL_SECONDS` - Cache TTL in seconds (default: 300)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `BATCH_RETRY_BASE_DELAY_MS` - First batch retry delay (default: 50)
    /// - `BATCH_RETRY_MAX_DELAY_MS` - Maximum batch retry delay (default: 2,000)
    /// - `QUERY_PAGE_LIMIT` - Default page size (default: 50)
    pub fn from_env() -> Self {
        Self {
            table_name: env::var("SLACKMAP_TABLE_NAME").unwrap_or_else(|_| "slackmap".to_string()),
            dynamodb_endpoint: env::var("DYNAMODB_ENDPOINT").ok().filter(|v| !v.is_empty()),
            cache_ttl_seconds: parse_var("CACHE_TTL_SECONDS").unwrap_or(300),
            cache_max_entries: parse_var("CACHE_MAX_ENTRIES").unwrap_or(10_000),
            batch_retry_base_delay_ms: parse_var("BATCH_RETRY_BASE_DELAY_MS").unwrap_or(50),
            batch_retry_max_delay_ms: parse_var("BATCH_RETRY_MAX_DELAY_MS").unwrap_or(2_000),
            query_page_limit: parse_var("QUERY_PAGE_LIMIT").unwrap_or(50),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn batch_retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.batch_retry_base_delay_ms)
    }

    pub fn batch_retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.batch_retry_max_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
