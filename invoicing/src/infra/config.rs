use std::time::Duration;

use clap::Parser;

/// Service settings, read from flags or the environment (`.env` is loaded
/// first by `main`).
#[derive(Parser, Debug, Clone)]
#[command(name = "invoicing", version, about = "Invoice payment service")]
pub struct Config {
    #[arg(long, env = "HTTP_HOST", default_value = "127.0.0.1")]
    pub http_host: String,

    #[arg(long, env = "HTTP_PORT", default_value_t = 8080)]
    pub http_port: u16,

    /// Port of the internal listener serving `/ping` and `/metrics`.
    #[arg(long, env = "INTERNAL_PORT", default_value_t = 2112)]
    pub internal_port: u16,

    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub db_max_connections: u32,

    /// Deadline applied to every workflow call, in milliseconds.
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 5000)]
    pub request_timeout_ms: u64,

    #[arg(long, env = "SKIP_MIGRATIONS")]
    pub skip_migrations: bool,

    /// Browser origin allowed by CORS. Cross-origin calls are refused when unset.
    #[arg(long, env = "CORS_ORIGIN")]
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
