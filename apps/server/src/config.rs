//! # Server Configuration
//!
//! ## Sources (later wins)
//! 1. Defaults (this file)
//! 2. TOML file: `--config <path>`, else `ATELIER_CONFIG`, else
//!    `atelier.toml` in the platform config directory
//! 3. Environment variables (`ATELIER_*`)
//!
//! The result is validated before the server binds.
//!
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! path = "/var/lib/atelier/atelier.db"
//!
//! [store]
//! name = "Atelier Fashion"
//! tagline = "Colombo 07"
//! currency_symbol = "Rs."
//! receipt_prefix = "ATL"
//! ```

use std::env;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use atelier_core::receipt::{StoreHeader, DEFAULT_RECEIPT_WIDTH, MIN_RECEIPT_WIDTH};
use atelier_core::validation::validate_receipt_prefix;
use atelier_db::DbConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "atelier.toml";
const DATABASE_FILE_NAME: &str = "atelier.db";

/// Complete server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: HttpConfig,
    pub database: DatabaseConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file; created on first start.
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: default_database_path(),
            max_connections: 5,
        }
    }
}

/// What the receipt says about the shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub name: String,
    pub tagline: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub footer: String,
    pub currency_symbol: String,
    pub receipt_prefix: String,
    /// Characters per receipt line.
    pub receipt_width: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            name: "Atelier Fashion".to_string(),
            tagline: None,
            phone: None,
            address: None,
            footer: StoreHeader::named("").footer,
            currency_symbol: "Rs.".to_string(),
            receipt_prefix: "ATL".to_string(),
            receipt_width: DEFAULT_RECEIPT_WIDTH,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from every source and validates it.
    ///
    /// An explicitly named file (`--config` or `ATELIER_CONFIG`) must exist;
    /// the platform default is optional.
    pub fn load(cli_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let explicit = cli_path.or_else(|| env::var_os("ATELIER_CONFIG").map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => ServerConfig::default(),
            },
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Applies `ATELIER_*` overrides fetched through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("ATELIER_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(port) = lookup("ATELIER_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "ATELIER_PORT".to_string(),
                reason: format!("'{}' is not a port number", port),
            })?;
        }
        if let Some(path) = lookup("ATELIER_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(name) = lookup("ATELIER_STORE_NAME") {
            self.store.name = name;
        }
        if let Some(prefix) = lookup("ATELIER_RECEIPT_PREFIX") {
            self.store.receipt_prefix = prefix;
        }
        if let Some(symbol) = lookup("ATELIER_CURRENCY_SYMBOL") {
            self.store.currency_symbol = symbol;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        validate_receipt_prefix(&self.store.receipt_prefix).map_err(|e| {
            ConfigError::InvalidValue {
                key: "store.receipt_prefix".to_string(),
                reason: e.to_string(),
            }
        })?;

        if self.store.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "store.name".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if self.store.receipt_width < MIN_RECEIPT_WIDTH {
            return Err(ConfigError::InvalidValue {
                key: "store.receipt_width".to_string(),
                reason: format!("must be at least {}", MIN_RECEIPT_WIDTH),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "database.max_connections".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .server
            .bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: "server.bind_addr".to_string(),
                reason: format!("'{}' is not an IP address", self.server.bind_addr),
            })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    pub fn store_header(&self) -> StoreHeader {
        StoreHeader {
            name: self.store.name.clone(),
            tagline: self.store.tagline.clone(),
            phone: self.store.phone.clone(),
            address: self.store.address.clone(),
            footer: self.store.footer.clone(),
        }
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "Atelier", "atelier-pos")
}

fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn default_database_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.store.receipt_prefix, "ATL");
        assert_eq!(config.store.currency_symbol, "Rs.");
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ServerConfig::from_toml_str(
            r#"
            [store]
            name = "Atelier Galle"
            tagline = "Fort Branch"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.name, "Atelier Galle");
        assert_eq!(config.store.tagline.as_deref(), Some("Fort Branch"));
        assert_eq!(config.store.receipt_prefix, "ATL");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store_header().name, "Atelier Galle");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ATELIER_PORT", "9090"),
            ("ATELIER_RECEIPT_PREFIX", "GAL"),
            ("ATELIER_DB_PATH", "/tmp/galle.db"),
        ]
        .into_iter()
        .collect();

        let mut config = ServerConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.store.receipt_prefix, "GAL");
        assert_eq!(config.database.path, PathBuf::from("/tmp/galle.db"));
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = ServerConfig::default();
        let err = config
            .apply_overrides(|key| (key == "ATELIER_PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_validation_failures() {
        let mut config = ServerConfig::default();
        config.store.receipt_prefix = "atl".to_string();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.server.bind_addr = "localhost".to_string();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.store.receipt_width = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_file_is_an_error() {
        let err = ServerConfig::from_file(Path::new("/nonexistent/atelier.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
