use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub templates: TemplateConfig,
    pub static_files: StaticConfig,
    pub database: Option<DatabaseConfig>,
    pub redis: Option<RedisConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    #[serde(default)]
    pub in_production: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_lifetime")]
    pub lifetime_seconds: u64,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

fn default_lifetime() -> u64 { 24 * 60 * 60 }

fn default_cookie_name() -> String { "bookings_session".to_string() }

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime_seconds: default_lifetime(),
            cookie_name: default_cookie_name(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TemplateConfig {
    pub dir: String,
    /// Parse templates once at startup instead of on every render.
    #[serde(default)]
    pub use_cache: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StaticConfig {
    pub dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `BOOKINGS_SERVER__PORT=9000`
            .add_source(config::Environment::with_prefix("BOOKINGS").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
