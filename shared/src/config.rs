use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Settings for the dashboard client: where the API lives and how long
/// fetched pages stay fresh.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub users_stale_time: Duration,
    pub query_cache_capacity: Option<u64>,
    pub query_gc_time: Duration,
}

impl ClientConfig {
    pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
    pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_USERS_STALE_SECS: u64 = 600; // 10 minutes
    pub const DEFAULT_QUERY_GC_SECS: u64 = 300;

    pub fn from_env() -> Self {
        Self {
            api_base_url: std::env::var("DASHGO_API_URL")
                .unwrap_or_else(|_| Self::DEFAULT_API_URL.to_string()),
            request_timeout: Duration::from_secs(env_or(
                "DASHGO_HTTP_TIMEOUT_SECS",
                Self::DEFAULT_HTTP_TIMEOUT_SECS,
            )),
            users_stale_time: Duration::from_secs(env_or(
                "DASHGO_USERS_STALE_SECS",
                Self::DEFAULT_USERS_STALE_SECS,
            )),
            query_cache_capacity: env_opt("DASHGO_QUERY_CACHE_CAPACITY"),
            query_gc_time: Duration::from_secs(env_or(
                "DASHGO_QUERY_GC_SECS",
                Self::DEFAULT_QUERY_GC_SECS,
            )),
        }
    }

    /// Defaults pointed at another base URL, handy for tests and tooling.
    pub fn with_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: Self::DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(Self::DEFAULT_HTTP_TIMEOUT_SECS),
            users_stale_time: Duration::from_secs(Self::DEFAULT_USERS_STALE_SECS),
            query_cache_capacity: None,
            query_gc_time: Duration::from_secs(Self::DEFAULT_QUERY_GC_SECS),
        }
    }
}

/// Settings for the development API server.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub seed_users: usize,
    pub page_size: usize,
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 3000;
    const DEFAULT_SEED_USERS: usize = 200;
    const DEFAULT_PAGE_SIZE: usize = 10;

    pub fn from_env() -> Self {
        Self {
            host: std::env::var("DASHGO_HOST").unwrap_or_else(|_| Self::DEFAULT_HOST.to_string()),
            port: env_or("DASHGO_PORT", Self::DEFAULT_PORT),
            seed_users: env_or("DASHGO_SEED_USERS", Self::DEFAULT_SEED_USERS),
            page_size: env_or("DASHGO_PAGE_SIZE", Self::DEFAULT_PAGE_SIZE).max(1),
            allowed_origins: std::env::var("DASHGO_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
            seed_users: Self::DEFAULT_SEED_USERS,
            page_size: Self::DEFAULT_PAGE_SIZE,
            allowed_origins: vec!["*".to_string()],
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env_opt(name).unwrap_or(default)
}

fn env_opt<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("{} has an invalid value '{}', using the default", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:3000/api");
        assert_eq!(config.users_stale_time, Duration::from_secs(600));
        assert_eq!(config.query_cache_capacity, None);
    }

    #[test]
    fn test_with_base_url_keeps_other_defaults() {
        let config = ClientConfig::with_base_url("http://127.0.0.1:9999/api");
        assert_eq!(config.api_base_url, "http://127.0.0.1:9999/api");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_env_parsing_falls_back_on_garbage() {
        // Names are unique to this test so parallel tests do not race on them.
        unsafe {
            std::env::set_var("DASHGO_TEST_PARSE_OK", " 42 ");
            std::env::set_var("DASHGO_TEST_PARSE_BAD", "forty-two");
        }
        assert_eq!(env_or::<u64>("DASHGO_TEST_PARSE_OK", 7), 42);
        assert_eq!(env_or::<u64>("DASHGO_TEST_PARSE_BAD", 7), 7);
        assert_eq!(env_opt::<u64>("DASHGO_TEST_PARSE_MISSING"), None);
    }

    #[test]
    fn test_server_bind_address() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.page_size, 10);
    }
}
