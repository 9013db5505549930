//! Skill data and the rules that select it.
//!
//! Skills are authored per tier. [`resolve_skill`] picks the entry matching
//! the unit's tier and fills in slot defaults, [`is_unlocked`] applies the
//! fixed level/tier gates.
mod entry;
mod last_stand;
mod multiplier;
mod resolver;
mod support;
mod tier;

pub use entry::{
    BuffTarget, DEFAULT_HEAL_AMOUNT, DEFAULT_REVIVE_WINDOW_TURNS, EffectTarget, SecretEffects,
    SkillEffect, SkillEffects, SkillEntry, SkillSet, SkillSlot, SkillTable, parse_effects,
};
pub use last_stand::{
    LAST_STAND_BASIC_ATTACKS, LastStand, LastStandCharge, LastStandEffect, LastStandTarget,
};
pub use multiplier::Multiplier;
pub use resolver::{
    DEFAULT_JUTSU_COST, DEFAULT_SECRET_COST, DEFAULT_ULTIMATE_COST, JUTSU_UNLOCK_LEVEL,
    ResolvedSkill, SECRET_UNLOCK_TIER, ULTIMATE_UNLOCK_LEVEL, default_cost, default_multiplier,
    is_unlocked, resolve_skill,
};
pub use support::SupportBonus;
pub use tier::TierCode;
