//! Static battle content consumed by the session.
//!
//! Characters, enemy templates and missions are produced by an external
//! loader (see `battle-content`) and only ever read by the engine.

use crate::combat::Element;
use crate::skill::{LastStand, SkillSet, TierCode};
use crate::state::Ability;

/// Base combat stats as authored in content data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseStats {
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
    pub speed: u32,
}

impl BaseStats {
    /// Used for player units whose character definition lacks stats.
    pub const PLAYER_FALLBACK: Self = Self::new(1000, 100, 50, 100);
    /// Used for enemy ids missing from the enemy catalogue.
    pub const ENEMY_FALLBACK: Self = Self::new(800, 80, 30, 90);

    pub const fn new(hp: u32, atk: u32, def: u32, speed: u32) -> Self {
        Self { hp, atk, def, speed }
    }
}

/// Playable character definition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CharacterDefinition {
    pub id: String,
    pub name: String,
    pub element: Option<Element>,
    /// Lowest tier the character can be pulled at.
    pub base_tier: TierCode,
    pub stats: Option<BaseStats>,
    pub abilities: Vec<Ability>,
    pub skills: SkillSet,
    /// Field skill description, e.g. `"Boosts attack by 65-130"`.
    pub field_skill: Option<String>,
    /// Buddy skill description, same format as the field skill.
    pub buddy_skill: Option<String>,
}

/// Enemy template referenced by wave definitions.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyTemplate {
    pub id: String,
    pub name: String,
    pub element: Option<Element>,
    pub stats: BaseStats,
    pub abilities: Vec<Ability>,
}

/// Ordered enemy template ids spawned together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WaveDefinition {
    pub enemies: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StageDefinition {
    pub name: Option<String>,
    pub waves: Vec<WaveDefinition>,
}

/// Mission with stages per difficulty, in authored order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MissionDefinition {
    pub id: String,
    pub name: String,
    pub difficulties: Vec<(String, Vec<StageDefinition>)>,
}

impl MissionDefinition {
    /// Stages for `preferred`, falling back to the first authored difficulty.
    pub fn stages(&self, preferred: &str) -> Option<(&str, &[StageDefinition])> {
        self.difficulties
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(preferred))
            .or_else(|| self.difficulties.first())
            .map(|(name, stages)| (name.as_str(), stages.as_slice()))
    }
}

/// Read-only lookup of battle content.
pub trait ContentOracle: Send + Sync {
    fn character(&self, id: &str) -> Option<&CharacterDefinition>;

    fn enemy(&self, id: &str) -> Option<&EnemyTemplate>;

    fn mission(&self, id: &str) -> Option<&MissionDefinition>;

    /// Last Stand ultimate a team member can equip.
    fn last_stand(&self, _id: &str) -> Option<&LastStand> {
        None
    }
}
