//! Data-driven battle content and loaders.
//!
//! This crate houses static battle content and provides loaders for data files:
//! - Character catalogue with per-tier skill tables (JSON)
//! - Enemy templates (JSON)
//! - Missions with stages and waves per difficulty (JSON)
//! - Last Stand ultimates (JSON, optional)
//! - Player team selection (JSON)
//! - Battle configuration (TOML)
//!
//! Content is consumed by the battle session through [`ContentBundle`], which
//! implements `battle_core::ContentOracle`, and never appears in battle state.

pub mod bundle;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use bundle::ContentBundle;

#[cfg(feature = "loaders")]
pub use loaders::{
    CharacterLoader, ConfigLoader, ContentFactory, EnemyLoader, LastStandLoader, LoadResult,
    MissionLoader, TeamLoader,
};
