//! Combatant record and its clamped mutators.

use core::fmt;

use crate::combat::Element;
use crate::config::BattleConfig;
use crate::env::BaseStats;
use crate::skill::{LastStandCharge, SkillSet, SupportBonus, TierCode};
use crate::state::{AddStatusOutcome, Passives, StatusEffect, StatusEffects, StatusKind};
use crate::state::{StatusPayload, StatusTick};

/// Unique identifier of a unit within one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub const fn opponent(self) -> Self {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

/// Action selected through the chakra gate.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChakraMode {
    #[default]
    None,
    Jutsu,
    Ultimate,
    Secret,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitStats {
    pub hp: u32,
    pub max_hp: u32,
    pub atk: u32,
    pub def: u32,
    pub speed: u32,
}

impl From<BaseStats> for UnitStats {
    fn from(base: BaseStats) -> Self {
        Self {
            hp: base.hp,
            max_hp: base.hp,
            atk: base.atk,
            def: base.def,
            speed: base.speed,
        }
    }
}

/// Read-only link to the definition the unit was built from.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitProfile {
    pub character_id: String,
    pub tier: TierCode,
    pub level: u32,
    pub element: Option<Element>,
    pub skills: SkillSet,
    /// Applied to the unit itself while it is fielded.
    pub field_bonus: Option<SupportBonus>,
    /// Applied to the unit sharing this unit's slot.
    pub buddy_bonus: Option<SupportBonus>,
}

/// Mutable combatant state.
///
/// # Invariants
///
/// - `0 <= stats.hp <= stats.max_hp`
/// - `0 <= chakra <= max_chakra`
/// - a unit with `hp == 0` never acts and is never a valid target
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub side: Side,
    /// Formation position; a bench unit can only replace the active unit in
    /// the same slot.
    pub slot: u8,
    pub is_bench: bool,
    pub is_active: bool,
    pub stats: UnitStats,
    pub chakra: u32,
    pub max_chakra: u32,
    pub chakra_mode: ChakraMode,
    pub speed_gauge: u32,
    pub is_paused: bool,
    pub is_guarding: bool,
    pub statuses: StatusEffects,
    pub passives: Passives,
    pub profile: UnitProfile,
    /// Global turn counter at the moment hp reached 0.
    pub died_at_turn: Option<u64>,
    pub last_stand: Option<LastStandCharge>,
}

impl Unit {
    pub fn new(
        id: UnitId,
        name: impl Into<String>,
        side: Side,
        base: BaseStats,
        profile: UnitProfile,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            side,
            slot: 0,
            is_bench: false,
            is_active: true,
            stats: base.into(),
            chakra: 0,
            max_chakra: BattleConfig::DEFAULT_MAX_CHAKRA,
            chakra_mode: ChakraMode::None,
            speed_gauge: 0,
            is_paused: false,
            is_guarding: false,
            statuses: StatusEffects::empty(),
            passives: Passives::default(),
            profile,
            died_at_turn: None,
            last_stand: None,
        }
    }

    pub fn with_slot(mut self, slot: u8) -> Self {
        self.slot = slot;
        self
    }

    pub fn with_max_chakra(mut self, max_chakra: u32) -> Self {
        self.max_chakra = max_chakra;
        self.chakra = self.chakra.min(max_chakra);
        self
    }

    /// Installs passives and applies their permanent stat changes.
    pub fn with_passives(mut self, passives: Passives) -> Self {
        self.stats.speed = self.stats.speed.saturating_add(passives.speed_up);
        self.passives = passives;
        self
    }

    pub fn is_player(&self) -> bool {
        self.side == Side::Player
    }

    pub fn is_alive(&self) -> bool {
        self.stats.hp > 0
    }

    pub fn hp_ratio(&self) -> f64 {
        if self.stats.max_hp == 0 {
            return 0.0;
        }
        f64::from(self.stats.hp) / f64::from(self.stats.max_hp)
    }

    /// Returns the hp actually lost.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.stats.hp);
        self.stats.hp -= lost;
        lost
    }

    /// Returns the hp actually restored.
    pub fn apply_heal(&mut self, amount: u32) -> u32 {
        let before = self.stats.hp;
        self.stats.hp = self.stats.hp.saturating_add(amount).min(self.stats.max_hp);
        self.stats.hp - before
    }

    /// Fails without mutation when the pool is too small.
    pub fn spend_chakra(&mut self, cost: u32) -> bool {
        if self.chakra < cost {
            return false;
        }
        self.chakra -= cost;
        true
    }

    /// Returns the chakra actually gained.
    pub fn gain_chakra(&mut self, amount: u32) -> u32 {
        let gained = amount.min(self.max_chakra.saturating_sub(self.chakra));
        self.chakra += gained;
        gained
    }

    /// Removes up to `amount` chakra and returns what was removed.
    pub fn drain_chakra(&mut self, amount: u32) -> u32 {
        let drained = amount.min(self.chakra);
        self.chakra -= drained;
        drained
    }

    /// Adds a status unless a passive nullifies it.
    pub fn add_status(
        &mut self,
        kind: StatusKind,
        turns: u32,
        payload: StatusPayload,
    ) -> AddStatusOutcome {
        self.add_effect(StatusEffect::new(kind, turns, payload))
    }

    /// [`Unit::add_status`] for a prepared entry, e.g. one carrying stacks.
    pub fn add_effect(&mut self, effect: StatusEffect) -> AddStatusOutcome {
        if self.passives.nullifies(effect.kind) {
            return AddStatusOutcome::Nullified;
        }
        self.statuses.add(effect)
    }

    /// [`Unit::add_status`] with catalogue defaults.
    pub fn apply_status(&mut self, kind: StatusKind) -> AddStatusOutcome {
        self.add_status(kind, kind.profile().turns, StatusPayload::for_kind(kind))
    }

    /// One upkeep step of every status on this unit.
    ///
    /// Each tick is paired with the hp right after it was applied. Damage and
    /// heal amounts are the hp actually changed.
    pub fn tick_statuses(&mut self) -> Vec<(StatusTick, u32)> {
        self.statuses
            .tick()
            .into_iter()
            .map(|mut tick| {
                match &mut tick {
                    StatusTick::Damage { amount, .. } => *amount = self.apply_damage(*amount),
                    StatusTick::Heal { amount, .. } => *amount = self.apply_heal(*amount),
                    StatusTick::Expired { .. } => {}
                }
                (tick, self.stats.hp)
            })
            .collect()
    }

    /// Returns to a neutral turn state after a wave or swap.
    pub fn reset_turn_state(&mut self) {
        self.speed_gauge = 0;
        self.is_paused = false;
        self.is_guarding = false;
        self.chakra_mode = ChakraMode::None;
    }
}
