//! Configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or malformed config file never stops startup; defaults apply.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "GDX_CONFIG";
pub const HOST_ENV: &str = "GDX_HOST";
pub const PORT_ENV: &str = "GDX_PORT";
pub const LOG_LEVEL_ENV: &str = "GDX_LOG_LEVEL";
pub const PRELOAD_FOLDER_ENV: &str = "GDX_PRELOAD_FOLDER";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7500;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of `config.toml`; every key optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    /// Folder to build the record cache from at startup
    pub preload_folder: Option<PathBuf>,
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub preload_folder: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
}

/// Resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub preload_folder: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            preload_folder: None,
        }
    }
}

impl ServiceConfig {
    /// Resolve configuration from CLI, environment, config file and defaults
    pub fn resolve(cli: &CliOverrides) -> Self {
        let (config, notes) = Self::resolve_with_notes(cli);
        for note in notes {
            tracing::warn!("{}", note);
        }
        config
    }

    /// Like [`ServiceConfig::resolve`], returning config file problems instead
    /// of logging them (for callers that resolve before tracing is initialized)
    pub fn resolve_with_notes(cli: &CliOverrides) -> (Self, Vec<String>) {
        let mut notes = Vec::new();
        let file = cli
            .config_file
            .clone()
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
            .or_else(default_config_path)
            .filter(|p| p.exists())
            .and_then(|path| match TomlConfig::load(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    notes.push(format!("Ignoring config file: {}", e));
                    None
                }
            })
            .unwrap_or_default();

        (Self::merge(cli, &file), notes)
    }

    /// Merge explicit sources over defaults (environment read here)
    pub fn merge(cli: &CliOverrides, file: &TomlConfig) -> Self {
        let defaults = Self::default();

        let port = cli.port.or_else(|| match env_value(PORT_ENV)?.parse() {
            Ok(port) => Some(port),
            Err(_) => {
                tracing::warn!("Ignoring invalid {}", PORT_ENV);
                None
            }
        });

        Self {
            host: cli
                .host
                .clone()
                .or_else(|| env_value(HOST_ENV))
                .or_else(|| file.host.clone())
                .unwrap_or(defaults.host),
            port: port.or(file.port).unwrap_or(defaults.port),
            log_level: cli
                .log_level
                .clone()
                .or_else(|| env_value(LOG_LEVEL_ENV))
                .or_else(|| file.log_level.clone())
                .unwrap_or(defaults.log_level),
            preload_folder: cli
                .preload_folder
                .clone()
                .or_else(|| env_value(PRELOAD_FOLDER_ENV).map(PathBuf::from))
                .or_else(|| file.preload_folder.clone()),
        }
    }

    /// `host:port` for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Platform config file location: `<config_dir>/gamedex/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gamedex").join("config.toml"))
}
