//! Last Stand ultimates: once-per-battle techniques equipped to a character.
//!
//! A unit charges its Last Stand with consecutive basic attacks. Any skill use
//! breaks the streak. Once fired it stays spent for the rest of the encounter.

use crate::state::StatusKind;

use super::Multiplier;

/// Consecutive basic attacks needed before a Last Stand becomes ready.
pub const LAST_STAND_BASIC_ATTACKS: u32 = 3;

/// Who a Last Stand lands on.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LastStandTarget {
    #[default]
    AllEnemies,
    SingleEnemy,
    AllAllies,
}

/// One effect of a Last Stand, resolved after its damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LastStandEffect {
    /// The damage hit repeats this many times per target.
    MultiHit { hits: u32 },
    /// Restores a percentage of each target's max hp.
    Heal { percent: u32 },
    Status { kind: StatusKind, turns: u32 },
    /// Removes every harmful effect.
    Cleanse,
    /// Moves a percentage of each target's chakra to the user.
    ChakraDrain { percent: u32 },
}

impl LastStandEffect {
    /// Reads a catalogue token such as `"multi_hit_5"`, `"heal_30_percent"` or
    /// `"burn_3turns"`.
    ///
    /// Chance-based and penetration tokens have no counterpart and yield `None`.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim().to_ascii_lowercase();
        let parts: Vec<&str> = token.split('_').collect();

        match parts.as_slice() {
            ["multi", "hit", hits] => count(hits).map(|hits| Self::MultiHit { hits: hits.max(1) }),
            ["heal", percent, "percent"] => count(percent).map(|percent| Self::Heal { percent }),
            ["chakra", "drain", percent, "percent"] => {
                count(percent).map(|percent| Self::ChakraDrain { percent })
            }
            ["remove", "all", "debuffs"] | ["cleanse"] => Some(Self::Cleanse),
            [stat, "buff", _amount, turns] => {
                let kind = match *stat {
                    "atk" | "attack" => StatusKind::AttackBoost,
                    "def" | "defense" => StatusKind::DefenseBoost,
                    "speed" | "spd" => StatusKind::SpeedBoost,
                    _ => return None,
                };
                count(turns).map(|turns| Self::Status { kind, turns })
            }
            [name, turns] | ["ninjutsu", name, turns] if turns.ends_with("turns") => {
                let kind = match *name {
                    "burn" => StatusKind::Burn,
                    "poison" => StatusKind::Poison,
                    "bleed" => StatusKind::Bleed,
                    "stun" => StatusKind::Stun,
                    "seal" => StatusKind::Sealed,
                    "regen" => StatusKind::Healing,
                    _ => return None,
                };
                count(turns).map(|turns| Self::Status { kind, turns })
            }
            _ => None,
        }
    }
}

/// `"3turns"` and `"30"` both read as their number.
fn count(part: &str) -> Option<u32> {
    part.trim_end_matches("turns").parse().ok()
}

/// Catalogue entry of a Last Stand ultimate.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LastStand {
    pub id: String,
    pub name: String,
    pub description: String,
    pub target: LastStandTarget,
    /// Damage per hit; `None` for support techniques that deal none.
    pub multiplier: Option<Multiplier>,
    pub effects: Vec<LastStandEffect>,
}

impl LastStand {
    pub fn new(id: impl Into<String>, name: impl Into<String>, target: LastStandTarget) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            target,
            ..Self::default()
        }
    }

    /// Damage as a percentage of attack: `500` hits for 5.0x, `0` deals none.
    pub fn with_power(mut self, percent: u32) -> Self {
        self.multiplier = (percent > 0).then(|| Multiplier::new(f64::from(percent) / 100.0));
        self
    }

    pub fn with_effect(mut self, effect: LastStandEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Hits per target, at least one.
    pub fn hits(&self) -> u32 {
        self.effects
            .iter()
            .find_map(|effect| match *effect {
                LastStandEffect::MultiHit { hits } => Some(hits),
                _ => None,
            })
            .unwrap_or(1)
    }
}

/// Per-unit progress toward its Last Stand.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LastStandCharge {
    pub ultimate: LastStand,
    pub basic_attacks: u32,
    pub used: bool,
}

impl LastStandCharge {
    pub fn new(ultimate: LastStand) -> Self {
        Self {
            ultimate,
            basic_attacks: 0,
            used: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        !self.used && self.basic_attacks >= LAST_STAND_BASIC_ATTACKS
    }

    /// Counts one basic attack. Returns `true` when this attack made it ready.
    pub fn note_basic_attack(&mut self) -> bool {
        let was_ready = self.is_ready();
        self.basic_attacks = self.basic_attacks.saturating_add(1);
        !was_ready && self.is_ready()
    }

    pub fn break_streak(&mut self) {
        self.basic_attacks = 0;
    }

    /// Spends the charge. Returns `false` if it was not ready.
    pub fn consume(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.used = true;
        self.basic_attacks = 0;
        true
    }
}
