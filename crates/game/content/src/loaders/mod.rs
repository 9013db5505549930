//! Content loaders for reading battle data from files.
//!
//! Catalogues (characters, enemies, missions, last stands, teams) are JSON, engine tuning
//! is TOML. Every loader parses into private raw shapes first and converts
//! them into `battle-core` definitions, so data quirks never reach the engine.

pub mod characters;
pub mod config;
pub mod enemies;
pub mod factory;
pub mod last_stands;
pub mod missions;
pub mod team;

pub use characters::CharacterLoader;
pub use config::ConfigLoader;
pub use enemies::EnemyLoader;
pub use factory::ContentFactory;
pub use last_stands::LastStandLoader;
pub use missions::MissionLoader;
pub use team::TeamLoader;

use std::path::Path;

use battle_core::{Element, TierCode};
use serde::de::DeserializeOwned;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Reads and deserializes a JSON file; `what` names it in error messages.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> LoadResult<T> {
    let content = read_file(path)?;
    serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {} JSON at {}: {}", what, path.display(), e))
}

pub(crate) fn parse_tier(code: &str, owner: &str) -> LoadResult<TierCode> {
    code.trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Unknown tier code '{}' in '{}'", code, owner))
}

/// Empty strings count as "no element".
pub(crate) fn parse_element(name: Option<&str>, owner: &str) -> LoadResult<Option<Element>> {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        None => Ok(None),
        Some(name) => name
            .parse()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("Unknown element '{}' in '{}'", name, owner)),
    }
}
