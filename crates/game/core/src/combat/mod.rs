//! Combat resolution system.
//!
//! This module provides the pure functions that turn two units and a skill
//! multiplier into a damage number.
//!
//! # Core Functions
//!
//! - [`calculate_damage`]: formula, barrier absorption and rounding
//! - [`element_multiplier`]: raw element table lookup
//! - [`modified_element_multiplier`]: table lookup adjusted by passives
//! - [`BuffAggregator`]: folds status effects into [`BuffModifiers`]

mod buffs;
mod damage;
mod element;

pub use buffs::{BuffAggregator, BuffModifiers, StatusBuffs};
pub use damage::{
    BASE_CRIT_CHANCE, BASE_CRIT_MULTIPLIER, DEFENSE_EFFECTIVENESS, DamageResult, DamageRolls,
    GUARD_FACTOR, calculate_damage, compute_raw_damage, finalize_damage,
};
pub use element::{
    ADVANTAGE_MULTIPLIER, Advantage, Affinity, DISADVANTAGE_MULTIPLIER, Element,
    NEUTRAL_MULTIPLIER, affinity, element_multiplier, modified_element_multiplier,
};
