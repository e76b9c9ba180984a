//! Configuration loading for katalog services
//!
//! TOML file resolution follows the platform convention:
//! 1. Explicit path (command line / `KATALOG_CONFIG` environment variable)
//! 2. `~/.config/katalog/config.toml`
//! 3. `/etc/katalog/config.toml` (Linux only)
//!
//! Secrets (inventory token, registry API key) may live in the TOML file but
//! are normally supplied via environment variables; the per-service
//! resolution logic lives in the service crate.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// HTTP surface binding
    #[serde(default)]
    pub service: ServiceSection,

    /// Inventory platform endpoint
    #[serde(default)]
    pub inventory: InventorySection,

    /// National registry endpoint
    #[serde(default)]
    pub registry: RegistrySection,

    /// Path to the tariff-code → category mapping JSON document.
    /// Absence at startup is fatal.
    pub mapping_file: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSection,
}

/// HTTP surface settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Inventory platform client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySection {
    #[serde(default = "default_inventory_url")]
    pub base_url: String,
    /// Bearer token; normally resolved from the environment instead
    pub token: Option<String>,
    /// Page size for assortment pagination
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// National registry client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySection {
    #[serde(default = "default_registry_url")]
    pub base_url: String,
    /// API key passed as a query parameter; normally resolved from the
    /// environment instead
    pub api_key: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5731
}

fn default_inventory_url() -> String {
    "https://api.moysklad.ru/api/remap/1.2".to_string()
}

fn default_registry_url() -> String {
    "https://апи.национальный-каталог.рф".to_string()
}

fn default_page_limit() -> usize {
    1000
}

fn default_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for InventorySection {
    fn default() -> Self {
        Self {
            base_url: default_inventory_url(),
            token: None,
            page_limit: default_page_limit(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            base_url: default_registry_url(),
            api_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Locate the configuration file for the current platform
///
/// Returns the first existing candidate, or `None` when no file is present
/// (all sections then fall back to their defaults).
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var("KATALOG_CONFIG") {
        return Some(PathBuf::from(explicit));
    }

    let user_config = dirs::config_dir().map(|d| d.join("katalog").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/katalog/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Load and parse a TOML configuration file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load configuration from the default location, or defaults when absent
pub fn load_or_default() -> Result<TomlConfig> {
    match default_config_path() {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            load_toml_config(&path)
        }
        None => Ok(TomlConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_complete() {
        let config = TomlConfig::default();
        assert_eq!(config.service.port, 5731);
        assert_eq!(config.inventory.page_limit, 1000);
        assert_eq!(config.registry.timeout_seconds, 30);
        assert!(config.mapping_file.is_none());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            mapping_file = "/opt/katalog/mapping.json"

            [service]
            port = 9000
            "#
        )
        .unwrap();

        let config = load_toml_config(file.path()).unwrap();
        assert_eq!(config.service.port, 9000);
        assert_eq!(config.service.host, "127.0.0.1");
        assert_eq!(
            config.mapping_file.as_deref(),
            Some(Path::new("/opt/katalog/mapping.json"))
        );
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn missing_file_is_config_error() {
        let result = load_toml_config(Path::new("/nonexistent/katalog.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "service = not-a-table").unwrap();

        let result = load_toml_config(file.path());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
