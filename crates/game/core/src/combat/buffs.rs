//! Aggregation of active status effects into combat modifiers.
//!
//! The damage formula only sees flat stat deltas and percentages. Catalogue
//! stat multipliers are folded into flat deltas here so the formula stays the
//! same whatever produced the bonus.

use crate::state::{StatusKind, Unit};

/// Summed modifiers acting on one unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuffModifiers {
    pub atk_flat: f64,
    pub def_flat: f64,
    pub speed_percent: f64,
    pub damage_reduction_percent: f64,
    pub crit_rate_percent: f64,
    pub crit_dmg_percent: f64,
    /// Total remaining barrier pool.
    pub barrier_hp: u32,
    /// Product of incoming-damage factors (INVULNERABLE, MARKED).
    pub damage_taken_multiplier: f64,
}

impl BuffModifiers {
    pub const NONE: Self = Self {
        atk_flat: 0.0,
        def_flat: 0.0,
        speed_percent: 0.0,
        damage_reduction_percent: 0.0,
        crit_rate_percent: 0.0,
        crit_dmg_percent: 0.0,
        barrier_hp: 0,
        damage_taken_multiplier: 1.0,
    };

    /// Speed after percentage modifiers, never below 0.
    pub fn effective_speed(&self, base: u32) -> u32 {
        let speed = f64::from(base) * (1.0 + self.speed_percent / 100.0);
        speed.max(0.0).round() as u32
    }
}

impl Default for BuffModifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Computes the modifiers currently acting on a unit.
///
/// Injected into the engine so tests can substitute fixed modifiers.
pub trait BuffAggregator: Send + Sync {
    fn modifiers(&self, unit: &Unit) -> BuffModifiers;
}

/// Default aggregation over the unit's status list and passives.
///
/// # Formula
///
/// ```text
/// atk_flat   = sum(buff.atk_boost) + atk * (prod(status atk multipliers) - 1)
/// def_flat   = sum(buff.def_boost) + def * (prod(status def multipliers) - 1)
/// speed_pct  = sum(buff.speed_boost_percent) + 100 * (prod(status speed multipliers) - 1)
/// reduction  = min(100, sum(buff.damage_reduction_percent) + passive reduction)
/// taken      = prod(status damage taken multipliers)
/// ```
///
/// Stack-counting kinds (SPEED_SICKNESS) contribute one factor per stack.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatusBuffs;

impl BuffAggregator for StatusBuffs {
    fn modifiers(&self, unit: &Unit) -> BuffModifiers {
        let mut modifiers = BuffModifiers::NONE;
        let mut atk_factor = 1.0;
        let mut def_factor = 1.0;
        let mut speed_factor = 1.0;

        for effect in unit.statuses.iter() {
            let profile = effect.kind.profile();
            let n = effect.multiplier_exponent();
            atk_factor *= profile.atk_multiplier.powi(n);
            def_factor *= profile.def_multiplier.powi(n);
            speed_factor *= profile.speed_multiplier.powi(n);
            modifiers.damage_taken_multiplier *= profile.damage_taken_multiplier.powi(n);

            if effect.kind == StatusKind::Buff {
                let buff = &effect.payload.buff;
                modifiers.atk_flat += f64::from(buff.atk_boost);
                modifiers.def_flat += f64::from(buff.def_boost);
                modifiers.speed_percent += f64::from(buff.speed_boost_percent);
                modifiers.damage_reduction_percent += f64::from(buff.damage_reduction_percent);
                modifiers.crit_rate_percent += f64::from(buff.crit_rate_percent);
                modifiers.crit_dmg_percent += f64::from(buff.crit_dmg_percent);
                modifiers.barrier_hp = modifiers.barrier_hp.saturating_add(buff.barrier_hp);
            }
        }

        modifiers.atk_flat += f64::from(unit.stats.atk) * (atk_factor - 1.0);
        modifiers.def_flat += f64::from(unit.stats.def) * (def_factor - 1.0);
        modifiers.speed_percent += 100.0 * (speed_factor - 1.0);
        modifiers.damage_reduction_percent = (modifiers.damage_reduction_percent
            + f64::from(unit.passives.damage_reduction_percent))
        .min(100.0);
        modifiers
    }
}
