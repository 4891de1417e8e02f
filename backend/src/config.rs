use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use dotenvy::dotenv;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    pub addr: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    /// bcrypt work factor; 4 is the minimum bcrypt accepts.
    pub bcrypt_cost: u32,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub session_ttl_days: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub web: WebConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            web: WebConfig {
                addr: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "sqlite://books.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            auth: AuthConfig {
                bcrypt_cost: bcrypt::DEFAULT_COST,
                cookie_name: "books_session".to_string(),
                cookie_secure: false,
                session_ttl_days: 14,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, figment::Error> {
        dotenv().ok();

        let config: Result<Self, _> = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("Config.toml")) // For non-sensitive defaults
            .merge(Env::prefixed("APP_").split("__")) // e.g., APP_DATABASE__URL
            .extract();

        if let Ok(config) = &config {
            tracing::info!("Configuration loaded successfully, full config: {:?}", config);
        }

        config
    }
}
