//! Last Stand ultimate catalogue loader.

use std::path::Path;

use battle_core::skill::{LastStand, LastStandEffect, LastStandTarget};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_json};

#[derive(Debug, Deserialize)]
struct RawLastStand {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: String,
    /// Percent of attack per hit.
    #[serde(default)]
    power: u32,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    effects: Vec<String>,
}

/// Loader for `last_stands.json`.
///
/// ```json
/// [{ "id": "rasengan_ultimate", "name": "Massive Rasengan", "power": 500,
///    "target": "all_enemies", "effects": ["stun_1turns"] }]
/// ```
pub struct LastStandLoader;

impl LastStandLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<LastStand>> {
        let raw: Vec<RawLastStand> = read_json(path, "last stand catalogue")?;
        raw.into_iter().map(convert).collect()
    }

    /// Like [`LastStandLoader::load`] but an absent file is an empty catalogue.
    pub fn load_or_empty(path: &Path) -> LoadResult<Vec<LastStand>> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Vec::new())
        }
    }
}

fn convert(raw: RawLastStand) -> LoadResult<LastStand> {
    let target = match raw.target.as_deref().map(str::trim) {
        None | Some("") => LastStandTarget::default(),
        Some(name) => name.parse().map_err(|_| {
            anyhow::anyhow!("Unknown last stand target '{}' in '{}'", name, raw.id)
        })?,
    };

    let mut ultimate = LastStand::new(
        raw.id.clone(),
        raw.name.unwrap_or_else(|| raw.id.clone()),
        target,
    )
    .with_power(raw.power);
    ultimate.description = raw.description;

    // Chance-based tokens have no engine counterpart and are dropped.
    ultimate.effects = raw
        .effects
        .iter()
        .filter_map(|token| LastStandEffect::parse(token))
        .collect();
    Ok(ultimate)
}
