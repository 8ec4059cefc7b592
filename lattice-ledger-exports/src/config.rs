// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! This file defines a configuration structure containing all settings for the ledger system

use lattice_models::{network::Network, settings::build_lattice_settings, ModelsError};
use serde::Deserialize;

/// Ledger configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct LedgerConfig {
    /// network whose genesis block seeds an empty ledger
    #[serde(default)]
    pub network: Network,
}

/// Node settings file, only the `[ledger]` section is read here
#[derive(Debug, Deserialize)]
struct LedgerSettings {
    #[serde(default)]
    ledger: LedgerConfig,
}

impl LedgerConfig {
    /// Loads the `[ledger]` section of the node settings.
    /// Environment overrides use the `LATTICE` prefix (`LATTICE__LEDGER__NETWORK=beta`).
    pub fn load() -> Result<Self, ModelsError> {
        let settings: LedgerSettings = build_lattice_settings("lattice", "LATTICE")?;
        Ok(settings.ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_deserialize() {
        let config: LedgerConfig = serde_json::from_str(r#"{"network":"test"}"#).unwrap();
        assert_eq!(config.network, Network::Test);
        let config: LedgerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LedgerConfig::default());
        assert_eq!(config.network, Network::Live);
    }

    #[test]
    #[serial]
    fn test_load_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ledger]\nnetwork = \"beta\"\n").unwrap();
        std::env::set_var("LATTICE_CONFIG_PATH", &path);
        std::env::set_var("LATTICE_CONFIG_OVERRIDE_PATH", dir.path().join("absent.toml"));
        assert_eq!(LedgerConfig::load().unwrap().network, Network::Beta);

        std::env::set_var("LATTICE__LEDGER__NETWORK", "test");
        assert_eq!(LedgerConfig::load().unwrap().network, Network::Test);
        std::env::remove_var("LATTICE__LEDGER__NETWORK");

        // a settings file without a ledger section falls back to the defaults
        std::fs::write(&path, "[other]\nkey = 1\n").unwrap();
        assert_eq!(LedgerConfig::load().unwrap(), LedgerConfig::default());

        std::env::remove_var("LATTICE_CONFIG_PATH");
        std::env::remove_var("LATTICE_CONFIG_OVERRIDE_PATH");
    }
}
