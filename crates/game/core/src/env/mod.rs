//! Read-only collaborators injected into the engine.
//!
//! Content definitions and the RNG are owned outside the engine; the session
//! reaches them only through these traits so tests can substitute fixtures.
mod content;
mod rng;

pub use content::{
    BaseStats, CharacterDefinition, ContentOracle, EnemyTemplate, MissionDefinition,
    StageDefinition, WaveDefinition,
};
pub use rng::{PcgRng, RngOracle, RollPurpose, compute_seed};
