//! Battle configuration loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for battle configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Keys missing from the file keep their `BattleConfig::DEFAULT_*` value.
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        let config: BattleConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        Ok(config)
    }

    /// Like [`ConfigLoader::load`] but an absent file yields the defaults.
    pub fn load_or_default(path: &Path) -> LoadResult<BattleConfig> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(BattleConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("battle.toml");
        std::fs::write(&path, "click_window_ms = 600\ngauge_max = 1000\n").unwrap();

        let config = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.click_window_ms, 600);
        assert_eq!(config.gauge_max, 1000);
        assert_eq!(config.max_chakra, BattleConfig::DEFAULT_MAX_CHAKRA);
    }

    #[test]
    fn absent_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::load_or_default(&dir.path().join("battle.toml")).unwrap();
        assert_eq!(config, BattleConfig::default());
    }

    #[test]
    fn wrong_types_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("battle.toml");
        std::fs::write(&path, "max_chakra = \"ten\"\n").unwrap();
        let err = ConfigLoader::load(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config TOML"));
    }
}
