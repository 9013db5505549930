//! Content factory for building a [`ContentBundle`] from data files.

use std::path::{Path, PathBuf};

use battle_core::skill::LastStand;
use battle_core::{
    BattleConfig, CharacterDefinition, EnemyTemplate, MissionDefinition, TeamSpec,
};

use crate::bundle::ContentBundle;
use crate::loaders::{
    CharacterLoader, ConfigLoader, EnemyLoader, LastStandLoader, LoadResult, MissionLoader,
    TeamLoader,
};

/// Content factory that loads all battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── battle.toml      (optional)
/// ├── characters.json
/// ├── enemies.json
/// ├── last_stands.json (optional)
/// ├── missions.json
/// └── team.json
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CONFIG_FILE: &'static str = "battle.toml";
    pub const CHARACTERS_FILE: &'static str = "characters.json";
    pub const ENEMIES_FILE: &'static str = "enemies.json";
    pub const MISSIONS_FILE: &'static str = "missions.json";
    pub const LAST_STANDS_FILE: &'static str = "last_stands.json";
    pub const TEAM_FILE: &'static str = "team.json";

    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load battle configuration from `battle.toml`, or defaults if absent.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        ConfigLoader::load_or_default(&self.data_dir.join(Self::CONFIG_FILE))
    }

    pub fn load_characters(&self) -> LoadResult<Vec<CharacterDefinition>> {
        CharacterLoader::load(&self.data_dir.join(Self::CHARACTERS_FILE))
    }

    pub fn load_enemies(&self) -> LoadResult<Vec<EnemyTemplate>> {
        EnemyLoader::load(&self.data_dir.join(Self::ENEMIES_FILE))
    }

    pub fn load_missions(&self) -> LoadResult<Vec<MissionDefinition>> {
        MissionLoader::load(&self.data_dir.join(Self::MISSIONS_FILE))
    }

    /// Load Last Stand ultimates, or none if the file is absent.
    pub fn load_last_stands(&self) -> LoadResult<Vec<LastStand>> {
        LastStandLoader::load_or_empty(&self.data_dir.join(Self::LAST_STANDS_FILE))
    }

    /// Load the player team from `team.json`.
    pub fn load_team(&self) -> LoadResult<TeamSpec> {
        TeamLoader::load(&self.data_dir.join(Self::TEAM_FILE))
    }

    /// Load every catalogue into one bundle.
    pub fn load_bundle(&self) -> LoadResult<ContentBundle> {
        Ok(ContentBundle::new()
            .with_characters(self.load_characters()?)
            .with_enemies(self.load_enemies()?)
            .with_missions(self.load_missions()?)
            .with_last_stands(self.load_last_stands()?))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
