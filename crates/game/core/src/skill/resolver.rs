//! Maps a unit and slot to the skill data that applies right now.

use crate::skill::{Multiplier, SkillEntry, SkillSlot, TierCode};
use crate::state::Unit;

pub const JUTSU_UNLOCK_LEVEL: u32 = 20;
pub const ULTIMATE_UNLOCK_LEVEL: u32 = 50;
pub const SECRET_UNLOCK_TIER: TierCode = TierCode::S6;

pub const DEFAULT_JUTSU_COST: u32 = 4;
pub const DEFAULT_ULTIMATE_COST: u32 = 8;
/// Secret techniques need a full chakra bar unless the data says otherwise.
pub const DEFAULT_SECRET_COST: u32 = 10;

/// Skill entry with slot defaults already applied.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedSkill<'a> {
    pub slot: SkillSlot,
    pub entry: &'a SkillEntry,
    pub chakra_cost: u32,
    pub multiplier: Multiplier,
}

pub const fn default_cost(slot: SkillSlot) -> u32 {
    match slot {
        SkillSlot::Basic => 0,
        SkillSlot::Jutsu => DEFAULT_JUTSU_COST,
        SkillSlot::Ultimate => DEFAULT_ULTIMATE_COST,
        SkillSlot::Secret => DEFAULT_SECRET_COST,
    }
}

pub const fn default_multiplier(slot: SkillSlot) -> Multiplier {
    match slot {
        SkillSlot::Jutsu => Multiplier::DEFAULT_JUTSU,
        SkillSlot::Ultimate => Multiplier::DEFAULT_ULTIMATE,
        SkillSlot::Basic | SkillSlot::Secret => Multiplier::BASIC,
    }
}

/// Looks up the entry for the unit's tier, falling back to the first tier.
///
/// Returns `None` when the unit has no skill in that slot. The basic attack
/// has no table and always resolves to `None`.
pub fn resolve_skill(unit: &Unit, slot: SkillSlot) -> Option<ResolvedSkill<'_>> {
    let entry = unit.profile.skills.table(slot)?.entry(unit.profile.tier)?;
    Some(ResolvedSkill {
        slot,
        entry,
        chakra_cost: entry.chakra_cost.unwrap_or(default_cost(slot)),
        multiplier: entry.multiplier.unwrap_or(default_multiplier(slot)),
    })
}

/// Fixed unlock policy: jutsu by level 20, ultimate by level 50, secret by tier.
pub fn is_unlocked(unit: &Unit, slot: SkillSlot) -> bool {
    match slot {
        SkillSlot::Basic => true,
        SkillSlot::Jutsu => unit.profile.level >= JUTSU_UNLOCK_LEVEL,
        SkillSlot::Ultimate => unit.profile.level >= ULTIMATE_UNLOCK_LEVEL,
        SkillSlot::Secret => unit.profile.tier >= SECRET_UNLOCK_TIER,
    }
}
