//! Deterministic battle rules and data types shared across hosts.
//!
//! `battle-core` defines the canonical combat rules (speed gauges, chakra,
//! skills, statuses, waves) and exposes pure APIs reused by the async runtime
//! and offline tools. During combat all state mutation flows through
//! [`engine::BattleEngine`]; [`session::BattleSession`] wraps it with wave
//! progression and player input.
pub mod chakra;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod events;
pub mod session;
pub mod skill;
pub mod state;

pub use chakra::{ChakraGate, GateOutcome};
pub use combat::{BuffAggregator, BuffModifiers, Element, StatusBuffs, calculate_damage};
pub use config::BattleConfig;
pub use engine::{ActionError, BattleEngine, BattleEnv, TurnStart};
pub use env::{
    BaseStats, CharacterDefinition, ContentOracle, EnemyTemplate, MissionDefinition, PcgRng,
    RngOracle, StageDefinition, WaveDefinition,
};
pub use error::{BattleError, ErrorSeverity};
pub use events::{ActionKind, BattleEvent, DamageSource, EventSink};
pub use session::{
    BattleSession, BattleSummary, Outcome, Progress, SessionBuilder, SessionError,
    SessionSnapshot, TeamMember, TeamSpec,
};
pub use skill::{SkillEntry, SkillSet, SkillSlot, SkillTable, TierCode};
pub use state::{
    Ability, BattleState, ChakraMode, MissionModifiers, Roster, Side, StatusKind, SwapError,
    Unit, UnitId,
};
