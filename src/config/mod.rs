//! Configuration management
//!
//! Configuration is loaded from a YAML file (`config.yml` by default) and can be
//! overridden through environment variables. Missing values fall back to
//! defaults, so an absent or empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Outbound notification configuration
    #[serde(default)]
    pub notification: NotificationConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database driver (sqlite or mysql)
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Upper bound on pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Maximum lifetime of a pooled connection, in seconds
    #[serde(default = "default_max_lifetime_secs")]
    pub max_lifetime_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            url: default_database_url(),
            max_connections: default_max_connections(),
            max_lifetime_secs: default_max_lifetime_secs(),
        }
    }
}

fn default_database_url() -> String {
    "data/contentdesk.db".to_string()
}

fn default_max_connections() -> u32 {
    25
}

fn default_max_lifetime_secs() -> u64 {
    300
}

/// Database driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    /// SQLite (default)
    #[default]
    Sqlite,
    /// MySQL
    Mysql,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// How long a login session stays valid
    #[serde(default = "default_session_expiration_days")]
    pub session_expiration_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_expiration_days: default_session_expiration_days(),
        }
    }
}

/// Upper bound for `auth.session_expiration_days` (about ten years)
pub const MAX_SESSION_EXPIRATION_DAYS: i64 = 3650;

fn default_session_expiration_days() -> i64 {
    7
}

/// WhatsApp notification settings (Twilio)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// When false, notifications are only logged
    #[serde(default)]
    pub enabled: bool,
    /// Twilio REST API base URL
    #[serde(default = "default_twilio_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub twilio_account_sid: String,
    #[serde(default)]
    pub twilio_auth_token: String,
    /// Sender address, e.g. `whatsapp:+14155238886`
    #[serde(default)]
    pub whatsapp_from: String,
    /// Destination for new-content alerts
    #[serde(default)]
    pub admin_whatsapp_number: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base: default_twilio_api_base(),
            twilio_account_sid: String::new(),
            twilio_auth_token: String::new(),
            whatsapp_from: String::new(),
            admin_whatsapp_number: String::new(),
        }
    }
}

fn default_twilio_api_base() -> String {
    "https://api.twilio.com".to_string()
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// A missing or empty file yields the default configuration. Invalid YAML
    /// is reported with its line and column.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file, then apply environment overrides
    ///
    /// Recognised variables:
    /// - CONTENTDESK_SERVER_HOST / _PORT / _CORS_ORIGIN
    /// - CONTENTDESK_DATABASE_DRIVER / _URL / _MAX_CONNECTIONS
    /// - CONTENTDESK_AUTH_SESSION_EXPIRATION_DAYS
    /// - TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN, TWILIO_WHATSAPP_FROM,
    ///   ADMIN_WHATSAPP_NUMBER
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.auth.session_expiration_days <= 0 {
            return Err(ConfigError::ValidationError(
                "auth.session_expiration_days must be positive".to_string(),
            ));
        }
        if self.auth.session_expiration_days > MAX_SESSION_EXPIRATION_DAYS {
            return Err(ConfigError::ValidationError(format!(
                "auth.session_expiration_days must be at most {}",
                MAX_SESSION_EXPIRATION_DAYS
            )));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("CONTENTDESK_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("CONTENTDESK_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("CONTENTDESK_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(driver) = std::env::var("CONTENTDESK_DATABASE_DRIVER") {
            match driver.to_lowercase().as_str() {
                "sqlite" => self.database.driver = DatabaseDriver::Sqlite,
                "mysql" => self.database.driver = DatabaseDriver::Mysql,
                _ => {}
            }
        }
        if let Ok(url) = std::env::var("CONTENTDESK_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(max) = std::env::var("CONTENTDESK_DATABASE_MAX_CONNECTIONS") {
            if let Ok(max) = max.parse::<u32>() {
                self.database.max_connections = max;
            }
        }

        if let Ok(days) = std::env::var("CONTENTDESK_AUTH_SESSION_EXPIRATION_DAYS") {
            if let Ok(days) = days.parse::<i64>() {
                self.auth.session_expiration_days = days;
            }
        }

        // Conventional Twilio variables; providing an account SID turns delivery on.
        if let Ok(sid) = std::env::var("TWILIO_ACCOUNT_SID") {
            self.notification.twilio_account_sid = sid;
            self.notification.enabled = true;
        }
        if let Ok(token) = std::env::var("TWILIO_AUTH_TOKEN") {
            self.notification.twilio_auth_token = token;
        }
        if let Ok(from) = std::env::var("TWILIO_WHATSAPP_FROM") {
            self.notification.whatsapp_from = from;
        }
        if let Ok(to) = std::env::var("ADMIN_WHATSAPP_NUMBER") {
            self.notification.admin_whatsapp_number = to;
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared by every test module that touches process environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
const ENV_KEYS: &[&str] = &[
    "CONTENTDESK_SERVER_HOST",
    "CONTENTDESK_SERVER_PORT",
    "CONTENTDESK_SERVER_CORS_ORIGIN",
    "CONTENTDESK_DATABASE_DRIVER",
    "CONTENTDESK_DATABASE_URL",
    "CONTENTDESK_DATABASE_MAX_CONNECTIONS",
    "CONTENTDESK_AUTH_SESSION_EXPIRATION_DAYS",
    "TWILIO_ACCOUNT_SID",
    "TWILIO_AUTH_TOKEN",
    "TWILIO_WHATSAPP_FROM",
    "ADMIN_WHATSAPP_NUMBER",
];

#[cfg(test)]
fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        super::CONFIG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn valid_host_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            (0u8..=255, 0u8..=255, 0u8..=255, 0u8..=255)
                .prop_map(|(a, b, c, d)| format!("{}.{}.{}.{}", a, b, c, d)),
            Just("localhost".to_string()),
            "[a-z][a-z0-9]{0,10}",
        ]
    }

    fn valid_database_config_strategy() -> impl Strategy<Value = DatabaseConfig> {
        (
            prop_oneof![Just(DatabaseDriver::Sqlite), Just(DatabaseDriver::Mysql)],
            prop_oneof![
                "[a-z][a-z0-9_/]{0,20}\\.db",
                Just(":memory:".to_string()),
                Just("mysql://root@127.0.0.1:3306/contentdesk".to_string()),
            ],
            1u32..=200,
            1u64..=3600,
        )
            .prop_map(|(driver, url, max_connections, max_lifetime_secs)| DatabaseConfig {
                driver,
                url,
                max_connections,
                max_lifetime_secs,
            })
    }

    fn valid_config_strategy() -> impl Strategy<Value = Config> {
        (
            valid_host_strategy(),
            1u16..=65535,
            valid_database_config_strategy(),
            1i64..=365,
            any::<bool>(),
        )
            .prop_map(|(host, port, database, days, enabled)| Config {
                server: ServerConfig {
                    host,
                    port,
                    cors_origin: default_cors_origin(),
                },
                database,
                auth: AuthConfig {
                    session_expiration_days: days,
                },
                notification: NotificationConfig {
                    enabled,
                    ..NotificationConfig::default()
                },
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        #[test]
        fn config_survives_yaml_roundtrip(config in valid_config_strategy()) {
            let yaml = serde_yaml::to_string(&config).expect("Failed to serialize config");
            let mut file = NamedTempFile::new().expect("Failed to create temp file");
            write!(file, "{}", yaml).expect("Failed to write config");

            let parsed = Config::load(file.path()).expect("Failed to parse config");

            prop_assert_eq!(config.server.host, parsed.server.host);
            prop_assert_eq!(config.server.port, parsed.server.port);
            prop_assert_eq!(config.database.driver, parsed.database.driver);
            prop_assert_eq!(config.database.url, parsed.database.url);
            prop_assert_eq!(config.database.max_connections, parsed.database.max_connections);
            prop_assert_eq!(config.auth.session_expiration_days, parsed.auth.session_expiration_days);
            prop_assert_eq!(config.notification.enabled, parsed.notification.enabled);
        }

        #[test]
        fn env_port_override_wins_over_file(port in 1u16..=65535) {
            let _guard = lock_env();
            clear_env();

            let mut file = NamedTempFile::new().expect("Failed to create temp file");
            write!(file, "server:\n  port: 8081\n").expect("Failed to write config");
            std::env::set_var("CONTENTDESK_SERVER_PORT", port.to_string());

            let config = Config::load_with_env(file.path());
            clear_env();

            prop_assert_eq!(config.expect("Failed to load config").server.port, port);
        }
    }
}
