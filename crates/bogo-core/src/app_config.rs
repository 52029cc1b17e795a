use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub upstream_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Admission limit for concurrent storefront fetches within one run.
    pub max_concurrent_fetches: usize,
    /// Wall-clock bound on a whole discovery run (listing walk plus fetches).
    pub run_timeout_secs: u64,
    pub max_listing_pages: usize,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
}
