// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Layered settings loading.
//!
//! Sources are merged in this order, later ones overriding earlier ones:
//! 1. the file at `LATTICE_CONFIG_PATH` (`base_config/config.toml` by default),
//!    which must exist
//! 2. the file at `LATTICE_CONFIG_OVERRIDE_PATH` (`config/config.toml` by
//!    default) when present
//! 3. the user configuration directory of `app_name` when present
//! 4. environment variables starting with `env_prefix`, nested keys separated
//!    by `__` (`LATTICE__LEDGER__NETWORK=beta`)

use crate::ModelsError;
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Merges the settings sources into a `T`
pub fn build_lattice_settings<T: DeserializeOwned>(
    app_name: &str,
    env_prefix: &str,
) -> Result<T, ModelsError> {
    let mut builder = config::Config::builder();
    let config_path = std::env::var("LATTICE_CONFIG_PATH")
        .unwrap_or_else(|_| "base_config/config.toml".to_string());

    builder = builder.add_source(config::File::with_name(&config_path));

    let config_override_path = std::env::var("LATTICE_CONFIG_OVERRIDE_PATH")
        .unwrap_or_else(|_| "config/config.toml".to_string());

    if Path::new(&config_override_path).is_file() {
        builder = builder.add_source(config::File::with_name(&config_override_path));
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "Lattice", app_name) {
        let user_config_path = proj_dirs.config_dir();
        if user_config_path.exists() {
            let path_str = user_config_path.to_str().ok_or_else(|| {
                ModelsError::ConfigError(format!(
                    "non utf-8 config directory {}",
                    user_config_path.display()
                ))
            })?;
            builder = builder.add_source(config::File::with_name(path_str).required(false));
        }
    }

    let settings = builder
        .add_source(config::Environment::with_prefix(env_prefix).separator("__"))
        .build()
        .map_err(|err| ModelsError::ConfigError(err.to_string()))?;

    settings
        .try_deserialize()
        .map_err(|err| ModelsError::ConfigError(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;
    use assert_matches::assert_matches;
    use serde::Deserialize;
    use serial_test::serial;
    use std::io::Write;

    #[derive(Debug, Deserialize)]
    struct Section {
        network: Network,
    }

    #[derive(Debug, Deserialize)]
    struct TestSettings {
        ledger: Section,
    }

    fn write_config(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    #[serial]
    fn test_file_then_override() {
        let dir = tempfile::tempdir().unwrap();
        let base = write_config(&dir, "config.toml", "[ledger]\nnetwork = \"live\"\n");
        let overriding = write_config(&dir, "override.toml", "[ledger]\nnetwork = \"beta\"\n");

        std::env::set_var("LATTICE_CONFIG_PATH", &base);
        std::env::set_var("LATTICE_CONFIG_OVERRIDE_PATH", dir.path().join("missing.toml"));
        let settings: TestSettings =
            build_lattice_settings("lattice-settings-test", "LATTICE_SETTINGS_TEST").unwrap();
        assert_eq!(settings.ledger.network, Network::Live);

        std::env::set_var("LATTICE_CONFIG_OVERRIDE_PATH", &overriding);
        let settings: TestSettings =
            build_lattice_settings("lattice-settings-test", "LATTICE_SETTINGS_TEST").unwrap();
        assert_eq!(settings.ledger.network, Network::Beta);

        std::env::remove_var("LATTICE_CONFIG_PATH");
        std::env::remove_var("LATTICE_CONFIG_OVERRIDE_PATH");
    }

    #[test]
    #[serial]
    fn test_environment_wins() {
        let dir = tempfile::tempdir().unwrap();
        let base = write_config(&dir, "config.toml", "[ledger]\nnetwork = \"live\"\n");
        std::env::set_var("LATTICE_CONFIG_PATH", &base);
        std::env::set_var("LATTICE_SETTINGS_ENV__LEDGER__NETWORK", "test");
        let settings: TestSettings =
            build_lattice_settings("lattice-settings-test", "LATTICE_SETTINGS_ENV").unwrap();
        assert_eq!(settings.ledger.network, Network::Test);
        std::env::remove_var("LATTICE_SETTINGS_ENV__LEDGER__NETWORK");
        std::env::remove_var("LATTICE_CONFIG_PATH");
    }

    #[test]
    #[serial]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("LATTICE_CONFIG_PATH", dir.path().join("absent.toml"));
        let res: Result<TestSettings, _> =
            build_lattice_settings("lattice-settings-test", "LATTICE_SETTINGS_TEST");
        assert_matches!(res, Err(ModelsError::ConfigError(_)));
        std::env::remove_var("LATTICE_CONFIG_PATH");
    }
}
