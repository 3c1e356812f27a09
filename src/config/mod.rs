use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Open the interface in the default browser once the server is listening
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            open_browser: default_open_browser(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8520
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_open_browser() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database file name, relative to `server.data_dir`
    #[serde(default = "default_db_file_name")]
    pub file_name: String,
    /// Backup directory name, relative to `server.data_dir`
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            file_name: default_db_file_name(),
            backup_dir: default_backup_dir(),
        }
    }
}

fn default_db_file_name() -> String {
    "customer_data.db".to_string()
}

fn default_backup_dir() -> String {
    "backups".to_string()
}

/// Seed-admin policy. The account is created on first run only.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
        }
    }
}

fn default_admin_username() -> String {
    "jirowang".to_string()
}

fn default_admin_password() -> String {
    "123456".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| "Failed to parse configuration file")?;
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Reject settings the application cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("server.port must be between 1 and 65535");
        }
        if !is_plain_name(&self.database.file_name) {
            bail!(
                "database.file_name must be a plain file name, got {:?}",
                self.database.file_name
            );
        }
        if !is_plain_name(&self.database.backup_dir) {
            bail!(
                "database.backup_dir must be a plain directory name, got {:?}",
                self.database.backup_dir
            );
        }
        if self.auth.admin_username.trim().is_empty() {
            bail!("auth.admin_username must not be empty");
        }
        if self.auth.admin_password.is_empty() {
            bail!("auth.admin_password must not be empty");
        }
        Ok(())
    }

    /// Path of the live database file
    pub fn database_path(&self) -> PathBuf {
        self.server.data_dir.join(&self.database.file_name)
    }

    /// Directory holding backup copies of the database
    pub fn backup_dir(&self) -> PathBuf {
        self.server.data_dir.join(&self.database.backup_dir)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.trim().is_empty() && name != ".." && !name.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.auth.admin_username, "jirowang");
        assert_eq!(
            config.database_path(),
            PathBuf::from("./data").join("customer_data.db")
        );
        assert_eq!(config.backup_dir(), PathBuf::from("./data").join("backups"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[server]
port = 9000
open_browser = false

[auth]
admin_password = "s3cret"
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert!(!config.server.open_browser);
        assert_eq!(config.auth.admin_username, "jirowang");
        assert_eq!(config.auth.admin_password, "s3cret");
        assert_eq!(config.database.file_name, "customer_data.db");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        let mut config = Config::default();
        config.database.file_name = "../escape.db".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.database.backup_dir = String::new();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.auth.admin_username = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 8520);
    }
}
