//! Damage calculation and application.

use crate::combat::{BuffAggregator, BuffModifiers, modified_element_multiplier};
use crate::env::RngOracle;
use crate::skill::Multiplier;
use crate::state::Unit;

// ============================================================================
// Constants
// ============================================================================

/// Fraction of effective defense subtracted from raw damage.
pub const DEFENSE_EFFECTIVENESS: f64 = 0.5;
/// Damage factor while the defender is guarding.
pub const GUARD_FACTOR: f64 = 0.5;
pub const BASE_CRIT_CHANCE: f64 = 0.15;
pub const BASE_CRIT_MULTIPLIER: f64 = 1.5;
pub const VARIANCE_MIN: f64 = 0.9;
pub const VARIANCE_SPREAD: f64 = 0.2;

// ============================================================================
// Random inputs
// ============================================================================

/// Random inputs of one hit, drawn before the formula runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageRolls {
    /// Variance factor in `[0.9, 1.1)`.
    pub variance: f64,
    /// Uniform roll in `[0, 1)`; the hit is critical when below the crit chance.
    pub crit: f64,
}

impl DamageRolls {
    /// Variance at its midpoint and a crit roll that never hits.
    pub const NEUTRAL: Self = Self {
        variance: 1.0,
        crit: 1.0,
    };

    pub fn draw(rng: &dyn RngOracle, variance_seed: u64, crit_seed: u64) -> Self {
        Self {
            variance: VARIANCE_MIN + rng.roll_unit(variance_seed) * VARIANCE_SPREAD,
            crit: rng.roll_unit(crit_seed),
        }
    }
}

// ============================================================================
// Results
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageResult {
    /// Final integer damage after barrier absorption.
    pub damage: u32,
    pub is_critical: bool,
    /// Amount taken by a barrier before it reached hp.
    pub absorbed: f64,
}

// ============================================================================
// Damage Calculation
// ============================================================================

/// Damage before barrier absorption and rounding.
///
/// # Formula
///
/// ```text
/// atk    = attacker.atk + attacker_mods.atk_flat
/// def    = defender.def + defender_mods.def_flat
/// damage = atk * multiplier - def * 0.5
/// if guarding:         damage *= 0.5
/// if reduction > 0:    damage *= 1 - reduction / 100
/// damage *= variance
/// if crit:             damage *= 1.5 + crit_dmg / 100
/// damage *= element * (1 - element_reduction / 100) * damage_taken
/// ```
///
/// An attacker with the "nullify damage reduction" passive skips both
/// reduction steps. Returns the running value and whether the hit was critical.
pub fn compute_raw_damage(
    attacker: &Unit,
    defender: &Unit,
    multiplier: Multiplier,
    attacker_mods: &BuffModifiers,
    defender_mods: &BuffModifiers,
    rolls: DamageRolls,
) -> (f64, bool) {
    let ignores_reduction = attacker.passives.ignores_damage_reduction();

    let effective_atk = f64::from(attacker.stats.atk) + attacker_mods.atk_flat;
    let effective_def = f64::from(defender.stats.def) + defender_mods.def_flat;

    let mut damage = effective_atk * multiplier.value();
    damage -= effective_def * DEFENSE_EFFECTIVENESS;

    if defender.is_guarding {
        damage *= GUARD_FACTOR;
    }

    let reduction = defender_mods.damage_reduction_percent;
    if reduction > 0.0 && !ignores_reduction {
        damage *= 1.0 - reduction / 100.0;
    }

    damage *= rolls.variance;

    let crit_chance = BASE_CRIT_CHANCE + attacker_mods.crit_rate_percent / 100.0;
    let is_critical = rolls.crit < crit_chance;
    if is_critical {
        damage *= BASE_CRIT_MULTIPLIER + attacker_mods.crit_dmg_percent / 100.0;
    }

    damage *= modified_element_multiplier(attacker, defender);
    if let Some(element) = attacker.profile.element
        && !ignores_reduction
    {
        let element_reduction = f64::from(defender.passives.reduction_from(element).min(100));
        damage *= 1.0 - element_reduction / 100.0;
    }
    damage *= defender_mods.damage_taken_multiplier;

    (damage, is_critical)
}

/// Rounds a post-barrier value to the integer applied to hp.
///
/// A positive value never rounds down to 0.
pub fn finalize_damage(raw: f64) -> u32 {
    if raw <= 0.0 || raw.is_nan() {
        return 0;
    }
    (raw.floor() as u32).max(1)
}

/// Full hit resolution: formula, barrier absorption, rounding.
///
/// Mutates only the defender's barrier pool; hp is left to the caller.
pub fn calculate_damage(
    attacker: &Unit,
    defender: &mut Unit,
    multiplier: Multiplier,
    buffs: &dyn BuffAggregator,
    rolls: DamageRolls,
) -> DamageResult {
    let attacker_mods = buffs.modifiers(attacker);
    let defender_mods = buffs.modifiers(defender);
    let (mut raw, is_critical) = compute_raw_damage(
        attacker,
        defender,
        multiplier,
        &attacker_mods,
        &defender_mods,
        rolls,
    );

    let absorbed = defender.statuses.absorb(raw);
    raw -= absorbed;

    DamageResult {
        damage: finalize_damage(raw),
        is_critical,
        absorbed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{Element, StatusBuffs};
    use crate::env::BaseStats;
    use crate::state::{
        Ability, BuffPayload, BuffStacking, Passives, Side, StatusKind, UnitId, UnitProfile,
    };

    fn unit(id: u32, side: Side, atk: u32, def: u32) -> Unit {
        Unit::new(
            UnitId(id),
            format!("unit-{id}"),
            side,
            BaseStats::new(1000, atk, def, 100),
            UnitProfile::default(),
        )
    }

    fn with_element(mut unit: Unit, element: Element) -> Unit {
        unit.profile.element = Some(element);
        unit
    }

    #[test]
    fn reference_scenario_deals_175() {
        let attacker = unit(1, Side::Player, 100, 0);
        let mut defender = unit(2, Side::Enemy, 0, 50);
        let result = calculate_damage(
            &attacker,
            &mut defender,
            Multiplier::new(2.0),
            &StatusBuffs,
            DamageRolls::NEUTRAL,
        );
        assert_eq!(result.damage, 175);
        assert!(!result.is_critical);
    }

    #[test]
    fn guard_halves_damage() {
        let attacker = unit(1, Side::Player, 100, 0);
        let mut defender = unit(2, Side::Enemy, 0, 50);
        defender.is_guarding = true;
        let result = calculate_damage(
            &attacker,
            &mut defender,
            Multiplier::new(2.0),
            &StatusBuffs,
            DamageRolls::NEUTRAL,
        );
        assert_eq!(result.damage, 87);
    }

    #[test]
    fn critical_hit_multiplies() {
        let attacker = unit(1, Side::Player, 100, 0);
        let mut defender = unit(2, Side::Enemy, 0, 0);
        let rolls = DamageRolls {
            variance: 1.0,
            crit: 0.0,
        };
        let result = calculate_damage(
            &attacker,
            &mut defender,
            Multiplier::BASIC,
            &StatusBuffs,
            rolls,
        );
        assert!(result.is_critical);
        assert_eq!(result.damage, 150);
    }

    #[test]
    fn element_advantage_applies_last() {
        let attacker = with_element(unit(1, Side::Player, 100, 0), Element::Body);
        let mut defender = with_element(unit(2, Side::Enemy, 0, 0), Element::Skill);
        let result = calculate_damage(
            &attacker,
            &mut defender,
            Multiplier::BASIC,
            &StatusBuffs,
            DamageRolls::NEUTRAL,
        );
        assert_eq!(result.damage, 150);
    }

    #[test]
    fn small_positive_damage_rounds_up_to_one() {
        assert_eq!(finalize_damage(0.2), 1);
        assert_eq!(finalize_damage(0.0), 0);
        assert_eq!(finalize_damage(-40.0), 0);
        assert_eq!(finalize_damage(12.9), 12);
    }

    #[test]
    fn barrier_absorbs_before_hp() {
        let attacker = unit(1, Side::Player, 100, 0);
        let mut defender = unit(2, Side::Enemy, 0, 0);
        defender.statuses.add_buff(
            "wall",
            3,
            BuffPayload {
                barrier_hp: 60,
                ..BuffPayload::default()
            },
            BuffStacking::default(),
        );
        let result = calculate_damage(
            &attacker,
            &mut defender,
            Multiplier::BASIC,
            &StatusBuffs,
            DamageRolls::NEUTRAL,
        );
        assert_eq!(result.damage, 40);
        assert_eq!(result.absorbed, 60.0);
        assert!(!defender.statuses.has(StatusKind::Buff));
    }

    #[test]
    fn fully_absorbed_hit_deals_zero_but_keeps_crit() {
        let attacker = unit(1, Side::Player, 100, 0);
        let mut defender = unit(2, Side::Enemy, 0, 0);
        defender.statuses.add_buff(
            "wall",
            3,
            BuffPayload {
                barrier_hp: 1000,
                ..BuffPayload::default()
            },
            BuffStacking::default(),
        );
        let rolls = DamageRolls {
            variance: 1.0,
            crit: 0.0,
        };
        let result = calculate_damage(
            &attacker,
            &mut defender,
            Multiplier::BASIC,
            &StatusBuffs,
            rolls,
        );
        assert_eq!(result.damage, 0);
        assert!(result.is_critical);
    }

    #[test]
    fn invulnerable_takes_nothing() {
        let attacker = unit(1, Side::Player, 100, 0);
        let mut defender = unit(2, Side::Enemy, 0, 0);
        defender.apply_status(StatusKind::Invulnerable);
        let result = calculate_damage(
            &attacker,
            &mut defender,
            Multiplier::BASIC,
            &StatusBuffs,
            DamageRolls::NEUTRAL,
        );
        assert_eq!(result.damage, 0);
    }

    #[test]
    fn element_reduction_passive_applies() {
        let attacker = with_element(unit(1, Side::Player, 100, 0), Element::Heart);
        let mut defender = with_element(unit(2, Side::Enemy, 0, 0), Element::Heart).with_passives(
            Passives::from_abilities(&[Ability::new("Reduce Heart Damage", "Reduces damage by 50%.")]),
        );
        let result = calculate_damage(
            &attacker,
            &mut defender,
            Multiplier::BASIC,
            &StatusBuffs,
            DamageRolls::NEUTRAL,
        );
        assert_eq!(result.damage, 50);
    }
}
