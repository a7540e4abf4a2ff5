use std::path::PathBuf;

/// Browser-like `User-Agent` sent when nothing else is configured. Retail
/// sites answer bot-looking agents with captchas or empty result pages.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36";

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

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub retailers_path: PathBuf,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub inter_request_delay_ms: u64,
    pub scraper_service_url: String,
    pub scraper_service_command: String,
    pub scraper_service_warmup_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("retailers_path", &self.retailers_path)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field("scraper_service_url", &self.scraper_service_url)
            .field("scraper_service_command", &self.scraper_service_command)
            .field(
                "scraper_service_warmup_secs",
                &self.scraper_service_warmup_secs,
            )
            .finish()
    }
}
