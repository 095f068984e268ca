//! Configuration layering and graceful degradation
//!
//! Tests that touch OM_DATA_DIR / OM_CONFIG are marked #[serial] so they
//! do not race each other on the process environment.

use std::env;
use std::path::{Path, PathBuf};

use om_common::config::{CompiledDefaults, DataDirResolver, SiteConfig, TomlConfig, DATA_DIR_ENV};
use serial_test::serial;
use tempfile::TempDir;

#[test]
fn test_compiled_defaults() {
    let d = CompiledDefaults::default();
    assert_eq!(d.data_dir, PathBuf::from("./public/data"));
    assert_eq!(d.site_url, "https://openmedicaid.org");
    assert_eq!(d.host, "127.0.0.1");
    assert_eq!(d.port, 5730);
    assert_eq!(d.log_level, "info");
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(DATA_DIR_ENV);
    let toml = TomlConfig::default();

    let dir = DataDirResolver::new(None, &toml).resolve();
    assert_eq!(dir, CompiledDefaults::default().data_dir);
}

#[test]
#[serial]
fn test_resolver_priority_order() {
    let toml = TomlConfig {
        data_dir: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    env::remove_var(DATA_DIR_ENV);
    assert_eq!(DataDirResolver::new(None, &toml).resolve(), PathBuf::from("/from/toml"));

    env::set_var(DATA_DIR_ENV, "/from/env");
    assert_eq!(DataDirResolver::new(None, &toml).resolve(), PathBuf::from("/from/env"));

    let cli = Path::new("/from/cli");
    assert_eq!(DataDirResolver::new(Some(cli), &toml).resolve(), PathBuf::from("/from/cli"));

    env::remove_var(DATA_DIR_ENV);
}

#[test]
#[serial]
fn test_missing_config_file_does_not_error() {
    let missing = Path::new("/nonexistent/openmedicaid-test-12345/config.toml");
    let cfg = TomlConfig::load(Some(missing));
    assert_eq!(cfg, TomlConfig::default());
}

#[test]
#[serial]
fn test_malformed_config_file_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "port = [this is not toml").unwrap();

    let cfg = TomlConfig::load(Some(&path));
    assert_eq!(cfg, TomlConfig::default());
}

#[test]
#[serial]
fn test_config_file_values_are_layered() {
    env::remove_var(DATA_DIR_ENV);
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        "site_url = \"https://mirror.example\"\nport = 9000\ndata_dir = \"/srv/om\"\nlog_level = \"debug\"\n",
    )
    .unwrap();

    let toml = TomlConfig::load(Some(&path));
    let cfg = SiteConfig::resolve(None, None, None, Some(7000), &toml);

    assert_eq!(cfg.site_url, "https://mirror.example");
    assert_eq!(cfg.data_dir, PathBuf::from("/srv/om"));
    assert_eq!(cfg.log_level, "debug");
    // explicit port beats the file
    assert_eq!(cfg.port, 7000);
    assert_eq!(cfg.host, "127.0.0.1");
}
