//! Field and buddy skills, applied once when the team is loaded.
//!
//! Every fielded unit receives its own field bonus. Each active/bench pair
//! sharing a slot exchanges buddy bonuses. Attack, defense, damage reduction
//! and crit rate ride on a permanent tagged buff; hp and speed raise the
//! unit's stats directly.

use crate::skill::SupportBonus;
use crate::state::{BuffPayload, BuffStacking, Roster, StackingMode, Unit, UnitId};

pub const FIELD_SKILL_TAG: &str = "field_skill";
pub const BUDDY_SKILL_TAG: &str = "buddy_skill";
/// Support buffs never run out during an encounter.
pub const SUPPORT_BUFF_TURNS: u32 = 999;

/// Applies `bonus` to `unit` under `tag`. Reapplying the same tag replaces the
/// buff rather than stacking it.
pub fn apply_support_bonus(unit: &mut Unit, tag: &str, bonus: &SupportBonus) {
    let signed = |value: u32| i32::try_from(value).unwrap_or(i32::MAX);
    let payload = BuffPayload {
        atk_boost: signed(bonus.atk),
        def_boost: signed(bonus.def),
        damage_reduction_percent: signed(bonus.damage_reduction_percent),
        crit_rate_percent: signed(bonus.crit_rate_percent),
        ..BuffPayload::default()
    };
    if !payload.is_empty() {
        let stacking = BuffStacking {
            unique: true,
            mode: StackingMode::Refresh,
            max_stacks: 1,
        };
        unit.statuses.add_buff(tag, SUPPORT_BUFF_TURNS, payload, stacking);
    }

    unit.stats.max_hp = unit.stats.max_hp.saturating_add(bonus.hp);
    unit.stats.hp = unit.stats.hp.saturating_add(bonus.hp);
    unit.stats.speed = unit.stats.speed.saturating_add(bonus.speed);
}

/// Field bonuses for fielded units, then buddy bonuses across every slot pair.
pub fn apply_support_skills(roster: &mut Roster) {
    for unit in roster.active_mut() {
        if unit.is_bench {
            continue;
        }
        if let Some(bonus) = unit.profile.field_bonus {
            apply_support_bonus(unit, FIELD_SKILL_TAG, &bonus);
        }
    }

    let pairs: Vec<(UnitId, UnitId)> = roster
        .active()
        .iter()
        .filter_map(|active| {
            roster
                .bench()
                .iter()
                .find(|bench| bench.slot == active.slot)
                .map(|bench| (active.id, bench.id))
        })
        .collect();

    for (active, bench) in pairs {
        let Some((active, bench)) = roster.pair_mut(active, bench) else {
            continue;
        };
        if let Some(bonus) = bench.profile.buddy_bonus {
            apply_support_bonus(active, BUDDY_SKILL_TAG, &bonus);
        }
        if let Some(bonus) = active.profile.buddy_bonus {
            apply_support_bonus(bench, BUDDY_SKILL_TAG, &bonus);
        }
    }
}
