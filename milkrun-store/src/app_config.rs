use milkrun_shared::BusinessClock;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub business: BusinessConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 { 5 }
fn default_acquire_timeout() -> u64 { 3 }

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

/// Credentials of the single administrator account
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessConfig {
    /// Offset of the business timezone from UTC. Decides which calendar day "today" is.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
    /// How often the paused-delivery sweep runs
    #[serde(default = "default_sweep_interval")]
    pub paused_sweep_interval_secs: u64,
}

fn default_utc_offset() -> i32 { 330 }
fn default_sweep_interval() -> u64 { 3600 }

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset(),
            paused_sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl BusinessConfig {
    pub fn clock(&self) -> Option<BusinessClock> {
        BusinessClock::from_offset_minutes(self.utc_offset_minutes)
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Machine-local secrets, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `MILKRUN_DATABASE__URL=postgres://...` sets `database.url`
            .add_source(config::Environment::with_prefix("MILKRUN").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Result<Config, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_default_file_parses() {
        let config = parse(include_str!("../../config/default.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.acquire_timeout_secs, 3);
        assert_eq!(config.business.utc_offset_minutes, 330);
        assert!(config.business.clock().is_some());
    }

    #[test]
    fn test_business_section_is_optional() {
        let config = parse(
            r#"
            [server]
            port = 9000
            [database]
            url = "postgres://localhost/milkrun"
            [auth]
            jwt_secret = "secret"
            jwt_expiration_seconds = 60
            [admin]
            email = "admin@example.com"
            password = "pw"
            "#,
        )
        .unwrap();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.business.utc_offset_minutes, 330);
        assert_eq!(config.business.paused_sweep_interval_secs, 3600);
    }

    #[test]
    fn test_out_of_range_offset_has_no_clock() {
        let business = BusinessConfig {
            utc_offset_minutes: 24 * 60,
            ..Default::default()
        };
        assert!(business.clock().is_none());
    }
}
