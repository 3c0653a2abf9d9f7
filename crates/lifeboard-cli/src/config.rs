use chrono_tz::Tz;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use lifeboard_core::error::CoreError;
use lifeboard_core::models::UserId;
use lifeboard_core::timezone::parse_timezone;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "lifeboard.toml";

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    pub database_path: String,
    /// IANA zone used to decide what "today" is
    pub timezone: String,
    /// Owner of records created from the CLI, and the fallback user for API
    /// requests without an `X-User-Id` header
    pub user_id: String,
    /// Unset means `info` for the server and `warn` for one-shot commands
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "lifeboard.db".to_string(),
            timezone: detect_system_timezone(),
            user_id: "local".to_string(),
            log_level: None,
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Defaults, then `lifeboard.toml`, then `LIFEBOARD_*` variables.
    /// Nested keys use a double underscore: `LIFEBOARD_SERVER__PORT=8080`.
    pub fn new() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("LIFEBOARD_").split("__"))
    }

    pub fn tz(&self) -> Result<Tz, CoreError> {
        parse_timezone(&self.timezone)
    }

    pub fn owner(&self) -> UserId {
        UserId::new(self.user_id.trim())
    }
}

/// Detects the system timezone, falling back to UTC if detection fails
pub fn detect_system_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if parse_timezone(&tz).is_ok() {
            return tz;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(tz) = std::fs::read_to_string("/etc/timezone") {
            let tz = tz.trim();
            if parse_timezone(tz).is_ok() {
                return tz.to_string();
            }
        }
    }

    if let Ok(local_tz) = iana_time_zone::get_timezone() {
        if parse_timezone(&local_tz).is_ok() {
            return local_tz;
        }
    }

    "UTC".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_jail| {
            let config = Config::new()?;
            assert_eq!(config.database_path, "lifeboard.db");
            assert_eq!(config.user_id, "local");
            assert_eq!(config.server, ServerConfig::default());
            assert!(config.log_level.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                database_path = "from-file.db"
                timezone = "Europe/Berlin"

                [server]
                port = 8080
                "#,
            )?;
            jail.set_env("LIFEBOARD_DATABASE_PATH", "from-env.db");
            jail.set_env("LIFEBOARD_SERVER__BIND", "0.0.0.0");

            let config = Config::new()?;
            assert_eq!(config.database_path, "from-env.db");
            assert_eq!(config.timezone, "Europe/Berlin");
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.server.bind, "0.0.0.0");
            assert_eq!(config.tz().unwrap(), chrono_tz::Europe::Berlin);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_timezone_is_reported() {
        let config = Config {
            timezone: "Mars/Olympus".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.tz(), Err(CoreError::InvalidTimezone(_))));
    }
}
