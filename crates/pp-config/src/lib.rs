//! Pitch Partner Configuration
//!
//! Layered configuration for the platform server:
//! 1. Built-in defaults
//! 2. Optional TOML file
//! 3. `PP_*` environment variable overrides
//!
//! ## Environment Variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `PP_HOST` | `server.host` |
//! | `PP_API_PORT` | `server.port` |
//! | `PP_DATABASE_URL` | `database.url` |
//! | `PP_DB_MAX_CONNECTIONS` | `database.max_connections` |
//! | `PP_JWT_SECRET` | `auth.jwt_secret` |
//! | `PP_JWT_ISSUER` | `auth.issuer` |
//! | `PP_TOKEN_TTL_SECS` | `auth.token_ttl_secs` |
//! | `PP_BOOTSTRAP_ADMIN_USERNAME` | `auth.bootstrap_admin.username` |
//! | `PP_BOOTSTRAP_ADMIN_PASSWORD` | `auth.bootstrap_admin.password` |
//! | `PP_LOG_LEVEL` | `logging.level` |
//! | `PP_LOG_FORMAT` | `logging.format` |

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod logging;

pub use logging::init_logging;

/// Minimum accepted length of the HS256 signing secret, in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection string, e.g. `sqlite://pitch-partner.db?mode=rwc`
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://pitch-partner.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    pub token_ttl_secs: i64,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            issuer: "pitch-partner".to_string(),
            audience: "pitch-partner".to_string(),
            token_ttl_secs: 3600,
            bootstrap_admin: None,
        }
    }
}

/// Admin account ensured at start-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl PlatformConfig {
    /// Load defaults, then the TOML file (if any), then process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `PP_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PP_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PP_API_PORT") {
            self.server.port = parse_env("PP_API_PORT", &v)?;
        }
        if let Some(v) = lookup("PP_DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("PP_DB_MAX_CONNECTIONS") {
            self.database.max_connections = parse_env("PP_DB_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("PP_JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Some(v) = lookup("PP_JWT_ISSUER") {
            self.auth.issuer = v;
        }
        if let Some(v) = lookup("PP_TOKEN_TTL_SECS") {
            self.auth.token_ttl_secs = parse_env("PP_TOKEN_TTL_SECS", &v)?;
        }
        match (lookup("PP_BOOTSTRAP_ADMIN_USERNAME"), lookup("PP_BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => {
                self.auth.bootstrap_admin = Some(BootstrapAdmin { username, password });
            }
            (None, None) => {}
            _ => {
                return Err(ConfigError::Invalid(
                    "PP_BOOTSTRAP_ADMIN_USERNAME and PP_BOOTSTRAP_ADMIN_PASSWORD must be set together"
                        .to_string(),
                ))
            }
        }
        if let Some(v) = lookup("PP_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("PP_LOG_FORMAT") {
            self.logging.format = parse_env("PP_LOG_FORMAT", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".to_string()));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url is required".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "auth.jwt_secret must be at least {} bytes",
                MIN_JWT_SECRET_LEN
            )));
        }
        if self.auth.token_ttl_secs <= 0 {
            return Err(ConfigError::Invalid("auth.token_ttl_secs must be positive".to_string()));
        }
        if let Some(admin) = &self.auth.bootstrap_admin {
            if admin.username.trim().is_empty() || admin.password.is_empty() {
                return Err(ConfigError::Invalid(
                    "auth.bootstrap_admin requires username and password".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PlatformConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        // No secret by default
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_file_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9000

[database]
url = "sqlite::memory:"
max_connections = 1

[auth]
jwt_secret = "{SECRET}"
token_ttl_secs = 60

[auth.bootstrap_admin]
username = "root"
password = "changeme123"

[logging]
level = "debug"
format = "json"
"#
        )
        .unwrap();

        let config = PlatformConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.auth.token_ttl_secs, 60);
        assert_eq!(config.auth.issuer, "pitch-partner");
        assert_eq!(config.auth.bootstrap_admin.as_ref().unwrap().username, "root");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = PlatformConfig::from_file(Path::new("/nonexistent/pp.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = PlatformConfig::default();
        config
            .apply_overrides(lookup(&[
                ("PP_API_PORT", "7070"),
                ("PP_JWT_SECRET", SECRET),
                ("PP_LOG_FORMAT", "JSON"),
                ("PP_DATABASE_URL", "sqlite::memory:"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 7070);
        assert_eq!(config.auth.jwt_secret, SECRET);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = PlatformConfig::default();
        let err = config
            .apply_overrides(lookup(&[("PP_API_PORT", "not-a-port")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { ref key, .. } if key == "PP_API_PORT"));
    }

    #[test]
    fn test_bootstrap_admin_requires_both_vars() {
        let mut config = PlatformConfig::default();
        let err = config
            .apply_overrides(lookup(&[("PP_BOOTSTRAP_ADMIN_USERNAME", "root")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = PlatformConfig::default();
        config.auth.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_addr() {
        let server = ServerConfig { host: "127.0.0.1".to_string(), port: 3000 };
        assert_eq!(server.bind_addr(), "127.0.0.1:3000");
    }
}
