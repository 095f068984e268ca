//! Configuration loading and data directory resolution
//!
//! Settings are layered, highest priority first:
//! 1. Command-line argument
//! 2. Environment variable (`OM_DATA_DIR`, ...)
//! 3. TOML config file
//! 4. Compiled default
//!
//! A missing or unreadable config file is never fatal: the server logs a
//! warning and carries on with defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{Error, Result};

pub const DATA_DIR_ENV: &str = "OM_DATA_DIR";
pub const CONFIG_ENV: &str = "OM_CONFIG";

/// Values used when nothing else is configured
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDefaults {
    pub data_dir: PathBuf,
    pub site_url: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./public/data"),
            site_url: "https://openmedicaid.org".to_string(),
            host: "127.0.0.1".to_string(),
            port: 5730,
            log_level: "info".to_string(),
        }
    }
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TomlConfig {
    pub site_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load from `explicit`, then `OM_CONFIG`, then the platform config
    /// directory. Falls back to an empty config with a warning.
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = match config_file_path(explicit) {
            Some(path) => path,
            None => {
                debug!("No config file found, using defaults");
                return Self::default();
            }
        };

        match Self::from_file(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Locate the config file. An explicit path or `OM_CONFIG` is returned even
/// when it does not exist, so the caller can warn about it.
fn config_file_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // ~/.config/openmedicaid/config.toml on Linux, the platform equivalent elsewhere
    let user_config = dirs::config_dir().map(|d| d.join("openmedicaid").join("config.toml"))?;
    user_config.exists().then_some(user_config)
}

/// Resolves the data directory using the priority order above
pub struct DataDirResolver<'a> {
    cli_arg: Option<&'a Path>,
    toml: &'a TomlConfig,
}

impl<'a> DataDirResolver<'a> {
    pub fn new(cli_arg: Option<&'a Path>, toml: &'a TomlConfig) -> Self {
        Self { cli_arg, toml }
    }

    pub fn resolve(&self) -> PathBuf {
        // Priority 1: command-line argument
        if let Some(path) = self.cli_arg {
            return path.to_path_buf();
        }

        // Priority 2: environment variable
        if let Ok(path) = std::env::var(DATA_DIR_ENV) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }

        // Priority 3: TOML config file
        if let Some(path) = &self.toml.data_dir {
            return path.clone();
        }

        // Priority 4: compiled default
        CompiledDefaults::default().data_dir
    }
}

/// Fully resolved site settings
#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    pub data_dir: PathBuf,
    /// Absolute site URL without a trailing slash, used in the feed and sitemap
    pub site_url: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl SiteConfig {
    /// Layer explicit values (already merged with their env fallbacks by the
    /// CLI parser) over the TOML config and the compiled defaults.
    pub fn resolve(
        data_dir: Option<&Path>,
        site_url: Option<&str>,
        host: Option<&str>,
        port: Option<u16>,
        toml: &TomlConfig,
    ) -> Self {
        let defaults = CompiledDefaults::default();
        let site_url = site_url
            .map(str::to_string)
            .or_else(|| toml.site_url.clone())
            .unwrap_or(defaults.site_url);

        Self {
            data_dir: DataDirResolver::new(data_dir, toml).resolve(),
            site_url: site_url.trim_end_matches('/').to_string(),
            host: host
                .map(str::to_string)
                .or_else(|| toml.host.clone())
                .unwrap_or(defaults.host),
            port: port.or(toml.port).unwrap_or(defaults.port),
            log_level: toml.log_level.clone().unwrap_or(defaults.log_level),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        let d = CompiledDefaults::default();
        Self {
            data_dir: d.data_dir,
            site_url: d.site_url,
            host: d.host,
            port: d.port,
            log_level: d.log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_toml() {
        let cfg = TomlConfig::from_toml_str("port = 8080\nsite_url = \"http://localhost\"").unwrap();
        assert_eq!(cfg.port, Some(8080));
        assert_eq!(cfg.site_url.as_deref(), Some("http://localhost"));
        assert!(cfg.data_dir.is_none());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("port = \"not a number\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_site_url_trailing_slash_trimmed() {
        let toml = TomlConfig::default();
        let cfg = SiteConfig::resolve(
            Some(Path::new("/tmp/data")),
            Some("https://example.org/"),
            None,
            None,
            &toml,
        );
        assert_eq!(cfg.site_url, "https://example.org");
        assert_eq!(cfg.port, 5730);
    }
}
