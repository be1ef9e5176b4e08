//! Configuration management for the ftpjail server
//!
//! Configuration is loaded once at startup from `config.toml` with
//! environment overrides and is read-only afterwards. Every session gets a
//! shared reference to the same [`ServerConfig`].

use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// How the chroot jail is addressed.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageModeKind {
    /// The jail is a plain directory addressed with real paths.
    #[default]
    Direct,
    /// The jail is a tree handle resolved through a storage provider.
    Tree,
}

/// Complete server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the FTP control connection
    pub bind_address: String,

    /// Port for the FTP control connection
    pub control_port: u16,

    /// Root directory of the chroot jail
    pub server_root: String,

    #[serde(default)]
    pub storage_mode: StorageModeKind,

    /// Opaque URI of the storage tree (tree mode only)
    #[serde(default)]
    pub tree_uri: String,

    /// Directory the storage tree is mounted at (tree mode only)
    #[serde(default)]
    pub tree_mount: String,

    /// Whether `USER anonymous` may log in with guest rights
    #[serde(default)]
    pub allow_anonymous: bool,

    pub max_clients: usize,
    pub idle_timeout_secs: u64,
    pub max_command_length: usize,
    pub max_username_length: usize,

    /// Username to password table
    #[serde(default)]
    pub users: HashMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            control_port: 2121,
            server_root: "./server_root".to_string(),
            storage_mode: StorageModeKind::Direct,
            tree_uri: String::new(),
            tree_mount: String::new(),
            allow_anonymous: false,
            max_clients: 10,
            idle_timeout_secs: 300,
            max_command_length: 512,
            max_username_length: 32,
            users: HashMap::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `config.toml` with `FTPJAIL__*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from the given file basename (extension optional).
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("FTPJAIL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control_port == 0 {
            return Err(ConfigError::Invalid("control_port cannot be 0".into()));
        }

        if self.server_root.trim().is_empty() {
            return Err(ConfigError::Invalid("server_root cannot be empty".into()));
        }

        if self.storage_mode == StorageModeKind::Tree {
            if self.tree_uri.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "tree mode requires tree_uri".into(),
                ));
            }
            if self.tree_mount.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "tree mode requires tree_mount".into(),
                ));
            }
        }

        if self.max_clients == 0 {
            return Err(ConfigError::Invalid(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.idle_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "idle_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.max_command_length == 0 || self.max_username_length == 0 {
            return Err(ConfigError::Invalid(
                "length limits must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Bind address and control port as a socket address string
    pub fn control_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.control_port)
    }

    pub fn server_root_path(&self) -> PathBuf {
        PathBuf::from(&self.server_root)
    }

    pub fn tree_mount_path(&self) -> PathBuf {
        PathBuf::from(&self.tree_mount)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}
