//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::fmt;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub lifetime: LifetimeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// What happens to group memberships of connections that went away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupCleanup {
    /// Keep memberships; disconnect stays O(1) and sends to stale members fail quietly
    #[default]
    Retain,
    /// Evict a member from a group when a send to it reports the peer closed
    Lazy,
    /// Remove the connection from every group on disconnect
    OnDisconnect,
}

impl FromStr for GroupCleanup {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retain" => Ok(Self::Retain),
            "lazy" => Ok(Self::Lazy),
            "on_disconnect" | "on-disconnect" => Ok(Self::OnDisconnect),
            other => Err(ConfigError::InvalidValue(
                "HUB_GROUP_CLEANUP",
                other.to_string(),
            )),
        }
    }
}

impl fmt::Display for GroupCleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Retain => "retain",
            Self::Lazy => "lazy",
            Self::OnDisconnect => "on_disconnect",
        })
    }
}

/// Connection lifetime configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LifetimeConfig {
    /// Capacity of each channel-backed connection's outbound queue
    #[serde(default = "default_connection_buffer")]
    pub connection_buffer: usize,
    /// Stale group membership policy
    #[serde(default)]
    pub group_cleanup: GroupCleanup,
}

impl Default for LifetimeConfig {
    fn default() -> Self {
        Self {
            connection_buffer: default_connection_buffer(),
            group_cleanup: GroupCleanup::default(),
        }
    }
}

impl LifetimeConfig {
    /// Build from a variable lookup function
    ///
    /// `from_env` passes `std::env::var`; tests pass a map.
    pub fn from_vars<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let connection_buffer = match get("HUB_CONNECTION_BUFFER") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(0) | Err(_) => {
                    return Err(ConfigError::InvalidValue("HUB_CONNECTION_BUFFER", raw));
                }
                Ok(n) => n,
            },
            None => default_connection_buffer(),
        };

        let group_cleanup = match get("HUB_GROUP_CLEANUP") {
            Some(raw) => raw.parse()?,
            None => GroupCleanup::default(),
        };

        Ok(Self {
            connection_buffer,
            group_cleanup,
        })
    }
}

// Default value functions
fn default_app_name() -> String {
    "hub-server".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_connection_buffer() -> usize {
    256
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is present but malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from a variable lookup function
    pub fn from_vars<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            app: AppSettings {
                name: get("APP_NAME").unwrap_or_else(default_app_name),
                env: get("APP_ENV")
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            lifetime: LifetimeConfig::from_vars(&get)?,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
