use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub services: ServicesConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// `sqlite://...` path, or `memory` for a non-durable in-process store.
    pub url: String,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url.eq_ignore_ascii_case("memory")
    }
}

/// Base URLs of the collaborator services, including any path prefix.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub user_directory_url: String,
    pub payment_gateway_url: String,
    pub notifier_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_workers() -> usize { 4 }
fn default_queue_capacity() -> usize { 256 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .set_default("server.port", 3002)?
            .set_default("database.url", "sqlite://data/orders.db")?
            .set_default("services.user_directory_url", "http://user-service:3001/api")?
            .set_default("services.payment_gateway_url", "http://payment-service:3003/api")?
            .set_default("services.notifier_url", "http://notification-service:3004/api")?
            .set_default("services.timeout_seconds", 5)?
            .set_default("notifications.workers", 4)?
            .set_default("notifications.queue_capacity", 256)?
            // Checked-in defaults, optional so the binary still starts without them
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `ORDERLY__SERVER__PORT=8080`
            .add_source(config::Environment::with_prefix("ORDERLY").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
