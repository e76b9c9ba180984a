//! Configuration resolution for katalog-sync
//!
//! Secrets resolve with ENV → TOML priority; a value present in both places
//! logs a warning and the environment wins. The mapping-file path is
//! required; startup fails without it.

use katalog_common::config::TomlConfig;
use katalog_common::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable holding the inventory bearer token
pub const INVENTORY_TOKEN_ENV: &str = "KATALOG_INVENTORY_TOKEN";
/// Environment variable holding the registry API key
pub const REGISTRY_API_KEY_ENV: &str = "KATALOG_REGISTRY_API_KEY";
/// Environment variable overriding the mapping-file path
pub const MAPPING_FILE_ENV: &str = "KATALOG_MAPPING_FILE";

/// Inventory-side attribute names and characteristic keyword synonyms.
///
/// The characteristic keywords are matched case-insensitively as substrings
/// of characteristic names ("Цвет ткани" matches "цвет").
#[derive(Debug, Clone)]
pub struct FieldNames {
    pub sync_flag: String,
    pub composition: String,
    pub permit_docs: String,
    pub brand: String,
    pub product_type: String,
    pub color: String,
    pub size: String,
    pub target_gender: String,
    pub size_type: String,
    pub color_keywords: Vec<String>,
    pub size_keywords: Vec<String>,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            sync_flag: "Для нац.каталога".to_string(),
            composition: "Состав".to_string(),
            permit_docs: "Разрешительные документы".to_string(),
            brand: "Бренд НК".to_string(),
            product_type: "Вид товара".to_string(),
            color: "Цвет".to_string(),
            size: "Размер".to_string(),
            target_gender: "Пол".to_string(),
            size_type: "Тип размера".to_string(),
            color_keywords: vec!["цвет".to_string(), "color".to_string(), "окрас".to_string()],
            size_keywords: vec!["размер".to_string(), "size".to_string(), "рост".to_string()],
        }
    }
}

/// Fully resolved runtime configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub inventory_base_url: String,
    pub inventory_token: String,
    pub inventory_page_limit: usize,
    pub inventory_timeout: Duration,
    pub registry_base_url: String,
    pub registry_api_key: String,
    pub registry_timeout: Duration,
    pub mapping_file: PathBuf,
    pub log_level: String,
    pub fields: FieldNames,
}

impl AppConfig {
    /// Resolve the runtime configuration from a parsed TOML config plus the
    /// environment
    pub fn resolve(toml: &TomlConfig) -> Result<Self> {
        let inventory_token = resolve_secret(
            INVENTORY_TOKEN_ENV,
            toml.inventory.token.as_deref(),
            "inventory token",
        )?;
        let registry_api_key = resolve_secret(
            REGISTRY_API_KEY_ENV,
            toml.registry.api_key.as_deref(),
            "registry API key",
        )?;

        let mapping_file = std::env::var(MAPPING_FILE_ENV)
            .ok()
            .map(PathBuf::from)
            .or_else(|| toml.mapping_file.clone())
            .ok_or_else(|| {
                Error::Config(format!(
                    "Mapping file not configured. Set mapping_file in the TOML config \
                     or {}=path/to/mapping.json",
                    MAPPING_FILE_ENV
                ))
            })?;

        Ok(Self {
            host: toml.service.host.clone(),
            port: toml.service.port,
            inventory_base_url: toml.inventory.base_url.clone(),
            inventory_token,
            inventory_page_limit: toml.inventory.page_limit,
            inventory_timeout: Duration::from_secs(toml.inventory.timeout_seconds),
            registry_base_url: toml.registry.base_url.clone(),
            registry_api_key,
            registry_timeout: Duration::from_secs(toml.registry.timeout_seconds),
            mapping_file,
            log_level: toml.logging.level.clone(),
            fields: FieldNames::default(),
        })
    }
}

/// Resolve one secret with ENV → TOML priority
fn resolve_secret(env_var: &str, toml_value: Option<&str>, what: &str) -> Result<String> {
    let env_value = std::env::var(env_var).ok().filter(|v| is_valid_secret(v));
    let toml_value = toml_value.filter(|v| is_valid_secret(v));

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} found in both {} and the TOML config; using the environment value",
            what, env_var
        );
    }

    if let Some(value) = env_value {
        info!("{} loaded from environment variable", what);
        return Ok(value);
    }
    if let Some(value) = toml_value {
        info!("{} loaded from TOML config", what);
        return Ok(value.to_string());
    }

    Err(Error::Config(format!(
        "{} not configured. Set {}=your-value or add it to the TOML config.",
        what, env_var
    )))
}

/// Validate a secret (non-empty, non-whitespace)
pub fn is_valid_secret(value: &str) -> bool {
    !value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_validation_rejects_blank() {
        assert!(is_valid_secret("token"));
        assert!(!is_valid_secret(""));
        assert!(!is_valid_secret("   "));
    }

    #[test]
    fn toml_secret_used_when_env_absent() {
        // env vars deliberately not set for these names in the test run
        let result = resolve_secret("KATALOG_TEST_UNSET_SECRET", Some("from-toml"), "test secret");
        assert_eq!(result.unwrap(), "from-toml");
    }

    #[test]
    fn missing_secret_is_config_error() {
        let result = resolve_secret("KATALOG_TEST_UNSET_SECRET", None, "test secret");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn default_field_names_cover_all_sources() {
        let fields = FieldNames::default();
        assert_eq!(fields.sync_flag, "Для нац.каталога");
        assert!(fields.color_keywords.contains(&"цвет".to_string()));
        assert!(fields.size_keywords.contains(&"размер".to_string()));
    }
}
