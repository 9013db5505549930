//! Enemy catalogue loader.

use std::path::Path;

use battle_core::{Ability, BaseStats, EnemyTemplate};
use serde::Deserialize;

use crate::loaders::characters::RawStats;
use crate::loaders::{LoadResult, parse_element, read_json};

#[derive(Debug, Deserialize)]
struct RawEnemy {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    element: Option<String>,
    #[serde(default)]
    stats: Option<RawStats>,
    #[serde(default)]
    abilities: Vec<Ability>,
}

/// Loader for `enemies.json`.
pub struct EnemyLoader;

impl EnemyLoader {
    /// Load enemy templates from a JSON array.
    ///
    /// Missing stats fall back to the engine's enemy defaults; a missing name
    /// falls back to the id.
    pub fn load(path: &Path) -> LoadResult<Vec<EnemyTemplate>> {
        let raw: Vec<RawEnemy> = read_json(path, "enemy catalogue")?;
        raw.into_iter()
            .map(|enemy| {
                let element = parse_element(enemy.element.as_deref(), &enemy.id)?;
                let stats = enemy
                    .stats
                    .map_or(BaseStats::ENEMY_FALLBACK, |s| s.or_fallback(BaseStats::ENEMY_FALLBACK));
                Ok(EnemyTemplate {
                    name: enemy.name.unwrap_or_else(|| enemy.id.clone()),
                    id: enemy.id,
                    element,
                    stats,
                    abilities: enemy.abilities,
                })
            })
            .collect()
    }
}
