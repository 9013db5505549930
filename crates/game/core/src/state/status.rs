//! Status effect system for units.
//!
//! Status effects are temporary conditions that modify a unit's stats, deal
//! or restore hp every turn, or restrict what it may do.
//!
//! # Turn-based Duration
//!
//! Effects store `turns_remaining`, decremented once per owner turn by
//! [`StatusEffects::tick`]. An effect is removed when the counter reaches 0.

/// Types of status effects.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum StatusKind {
    // ========================================================================
    // Buffs
    // ========================================================================
    AttackBoost,
    DefenseBoost,
    SpeedBoost,
    Healing,
    Invulnerable,
    /// Next incoming hit deals no damage and consumes the effect.
    Dodge,
    /// Tagged skill buff carrying a [`BuffPayload`].
    Buff,

    // ========================================================================
    // Crowd control
    // ========================================================================
    Stun,
    Paralysis,
    Immobilized,
    /// Blocks jutsu, ultimate and secret techniques.
    Sealed,

    // ========================================================================
    // Debuffs
    // ========================================================================
    Poison,
    Burn,
    Bleed,
    Shock,
    Aftershock,
    Drowned,
    SpeedDebuff,
    AttackDebuff,
    Marked,
    SpeedSickness,
}

/// Static properties of a status kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusProfile {
    /// Duration used when the kind is applied without an explicit one.
    pub turns: u32,
    pub damage_per_turn: u32,
    pub heal_per_turn: u32,
    /// Stackable kinds append a new entry instead of refreshing.
    pub stackable: bool,
    /// Reapplication adds to the `stacks` counter of the single entry.
    /// Stat multipliers then apply once per stack.
    pub counts_stacks: bool,
    pub prevents_action: bool,
    pub prevents_skills: bool,
    pub atk_multiplier: f64,
    pub def_multiplier: f64,
    pub speed_multiplier: f64,
    /// Multiplies incoming damage (INVULNERABLE is 0, MARKED is 1.5).
    pub damage_taken_multiplier: f64,
    /// Removed by cleanse effects.
    pub harmful: bool,
}

impl StatusProfile {
    const BASE: Self = Self {
        turns: 1,
        damage_per_turn: 0,
        heal_per_turn: 0,
        stackable: false,
        counts_stacks: false,
        prevents_action: false,
        prevents_skills: false,
        atk_multiplier: 1.0,
        def_multiplier: 1.0,
        speed_multiplier: 1.0,
        damage_taken_multiplier: 1.0,
        harmful: false,
    };

    const DEBUFF: Self = Self {
        harmful: true,
        ..Self::BASE
    };

    const fn dot(turns: u32, damage_per_turn: u32) -> Self {
        Self {
            turns,
            damage_per_turn,
            stackable: true,
            ..Self::DEBUFF
        }
    }
}

impl StatusKind {
    pub const fn profile(self) -> StatusProfile {
        use StatusProfile as P;
        match self {
            StatusKind::AttackBoost => P {
                turns: 3,
                atk_multiplier: 1.3,
                ..P::BASE
            },
            StatusKind::DefenseBoost => P {
                turns: 3,
                def_multiplier: 1.3,
                ..P::BASE
            },
            StatusKind::SpeedBoost => P {
                turns: 2,
                speed_multiplier: 1.5,
                ..P::BASE
            },
            StatusKind::Healing => P {
                turns: 3,
                heal_per_turn: 15,
                stackable: true,
                ..P::BASE
            },
            StatusKind::Invulnerable => P {
                damage_taken_multiplier: 0.0,
                ..P::BASE
            },
            StatusKind::Dodge => P::BASE,
            StatusKind::Buff => P {
                stackable: true,
                ..P::BASE
            },
            StatusKind::Stun => P {
                prevents_action: true,
                ..P::DEBUFF
            },
            StatusKind::Paralysis => P {
                prevents_action: true,
                def_multiplier: 0.5,
                ..P::DEBUFF
            },
            StatusKind::Immobilized => P {
                turns: 3,
                prevents_action: true,
                ..P::DEBUFF
            },
            StatusKind::Sealed => P {
                turns: 2,
                prevents_skills: true,
                ..P::DEBUFF
            },
            StatusKind::Poison => P::dot(3, 10),
            StatusKind::Burn => P::dot(2, 15),
            StatusKind::Bleed => P::dot(3, 8),
            StatusKind::Shock => P::dot(2, 8),
            StatusKind::Aftershock => P::dot(4, 5),
            StatusKind::Drowned => P {
                turns: 3,
                damage_per_turn: 12,
                speed_multiplier: 0.6,
                ..P::DEBUFF
            },
            StatusKind::SpeedDebuff => P {
                turns: 2,
                speed_multiplier: 0.5,
                ..P::DEBUFF
            },
            StatusKind::AttackDebuff => P {
                turns: 2,
                atk_multiplier: 0.7,
                ..P::DEBUFF
            },
            StatusKind::Marked => P {
                turns: 3,
                damage_taken_multiplier: 1.5,
                ..P::DEBUFF
            },
            StatusKind::SpeedSickness => P {
                turns: 999,
                speed_multiplier: 0.9,
                counts_stacks: true,
                ..P::DEBUFF
            },
        }
    }

    /// Crowd control blocked by the "nullifies immobilization" passive.
    pub const fn is_immobilization(self) -> bool {
        matches!(
            self,
            StatusKind::Stun | StatusKind::Paralysis | StatusKind::Immobilized
        )
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// How a tagged skill buff combines with an existing buff of the same tag.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StackingMode {
    /// Payload fields are summed.
    #[default]
    Additive,
    /// Payload fields keep the larger value.
    Max,
    /// Payload and duration are replaced.
    Refresh,
}

/// Stat changes carried by a tagged skill buff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BuffPayload {
    pub atk_boost: i32,
    pub def_boost: i32,
    pub speed_boost_percent: i32,
    pub damage_reduction_percent: i32,
    /// Remaining pool; absorbs incoming damage before hp.
    pub barrier_hp: u32,
    pub crit_rate_percent: i32,
    pub crit_dmg_percent: i32,
    pub chakra_regen_per_turn: u32,
}

impl BuffPayload {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn merge(&mut self, other: &BuffPayload, mode: StackingMode) {
        match mode {
            StackingMode::Additive => {
                self.atk_boost += other.atk_boost;
                self.def_boost += other.def_boost;
                self.speed_boost_percent += other.speed_boost_percent;
                self.damage_reduction_percent += other.damage_reduction_percent;
                self.barrier_hp = self.barrier_hp.saturating_add(other.barrier_hp);
                self.crit_rate_percent += other.crit_rate_percent;
                self.crit_dmg_percent += other.crit_dmg_percent;
                self.chakra_regen_per_turn =
                    self.chakra_regen_per_turn.saturating_add(other.chakra_regen_per_turn);
            }
            StackingMode::Max => {
                self.atk_boost = self.atk_boost.max(other.atk_boost);
                self.def_boost = self.def_boost.max(other.def_boost);
                self.speed_boost_percent = self.speed_boost_percent.max(other.speed_boost_percent);
                self.damage_reduction_percent =
                    self.damage_reduction_percent.max(other.damage_reduction_percent);
                self.barrier_hp = self.barrier_hp.max(other.barrier_hp);
                self.crit_rate_percent = self.crit_rate_percent.max(other.crit_rate_percent);
                self.crit_dmg_percent = self.crit_dmg_percent.max(other.crit_dmg_percent);
                self.chakra_regen_per_turn =
                    self.chakra_regen_per_turn.max(other.chakra_regen_per_turn);
            }
            StackingMode::Refresh => *self = *other,
        }
    }
}

/// Effect-specific data attached to a status entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusPayload {
    pub damage_per_turn: u32,
    pub heal_per_turn: u32,
    pub buff: BuffPayload,
}

impl StatusPayload {
    /// Per-turn values from the catalogue.
    pub const fn for_kind(kind: StatusKind) -> Self {
        let profile = kind.profile();
        Self {
            damage_per_turn: profile.damage_per_turn,
            heal_per_turn: profile.heal_per_turn,
            buff: BuffPayload {
                atk_boost: 0,
                def_boost: 0,
                speed_boost_percent: 0,
                damage_reduction_percent: 0,
                barrier_hp: 0,
                crit_rate_percent: 0,
                crit_dmg_percent: 0,
                chakra_regen_per_turn: 0,
            },
        }
    }

    pub const fn buff(buff: BuffPayload) -> Self {
        Self {
            damage_per_turn: 0,
            heal_per_turn: 0,
            buff,
        }
    }
}

/// A single status effect with its remaining duration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub turns_remaining: u32,
    pub stacks: u8,
    pub payload: StatusPayload,
    /// Identifies tagged skill buffs; `None` for catalogue effects.
    pub tag: Option<String>,
}

impl StatusEffect {
    pub fn new(kind: StatusKind, turns: u32, payload: StatusPayload) -> Self {
        Self {
            kind,
            turns_remaining: turns,
            stacks: 1,
            payload,
            tag: None,
        }
    }

    /// Catalogue effect with default duration and payload.
    pub fn from_kind(kind: StatusKind) -> Self {
        Self::new(kind, kind.profile().turns, StatusPayload::for_kind(kind))
    }

    pub fn tagged_buff(tag: impl Into<String>, turns: u32, payload: BuffPayload) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::new(StatusKind::Buff, turns, StatusPayload::buff(payload))
        }
    }

    pub fn with_stacks(mut self, stacks: u8) -> Self {
        self.stacks = stacks.max(1);
        self
    }

    pub fn is_harmful(&self) -> bool {
        self.kind.profile().harmful
    }

    /// How many times the kind's stat multipliers apply.
    pub fn multiplier_exponent(&self) -> i32 {
        if self.kind.profile().counts_stacks {
            i32::from(self.stacks)
        } else {
            1
        }
    }
}

/// Result of an attempt to add a status effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddStatusOutcome {
    /// A new entry was appended.
    Applied,
    /// An existing entry had its duration (and possibly payload) updated.
    Refreshed,
    /// A passive ability rejected the effect.
    Nullified,
}

impl AddStatusOutcome {
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied | Self::Refreshed)
    }
}

/// Per-effect change produced by one upkeep tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTick {
    Damage { kind: StatusKind, amount: u32 },
    Heal { kind: StatusKind, amount: u32 },
    Expired { kind: StatusKind },
}

/// Options for tagged skill buffs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffStacking {
    /// Existing buffs with the same tag are replaced instead of stacked.
    pub unique: bool,
    pub mode: StackingMode,
    pub max_stacks: u8,
}

impl Default for BuffStacking {
    fn default() -> Self {
        Self {
            unique: false,
            mode: StackingMode::Additive,
            max_stacks: 1,
        }
    }
}

/// Active status effects on a unit, in application order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: Vec<StatusEffect>,
}

impl StatusEffects {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    pub fn count(&self, kind: StatusKind) -> usize {
        self.effects.iter().filter(|e| e.kind == kind).count()
    }

    /// Total stacks of `kind` over all its entries.
    pub fn stacks(&self, kind: StatusKind) -> u32 {
        self.effects
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| u32::from(e.stacks))
            .sum()
    }

    /// First action-preventing effect, if any.
    pub fn preventing_action(&self) -> Option<StatusKind> {
        self.effects
            .iter()
            .map(|e| e.kind)
            .find(|kind| kind.profile().prevents_action)
    }

    pub fn prevents_skills(&self) -> bool {
        self.effects.iter().any(|e| e.kind.profile().prevents_skills)
    }

    /// Adds an effect.
    ///
    /// Stackable kinds append. Stack-counting kinds add to the existing
    /// entry's counter, and every other kind refreshes its duration.
    pub fn add(&mut self, effect: StatusEffect) -> AddStatusOutcome {
        let profile = effect.kind.profile();
        if !profile.stackable
            && let Some(existing) = self.effects.iter_mut().find(|e| e.kind == effect.kind)
        {
            if profile.counts_stacks {
                existing.stacks = existing.stacks.saturating_add(effect.stacks);
                existing.turns_remaining = existing.turns_remaining.max(effect.turns_remaining);
            } else {
                existing.turns_remaining = effect.turns_remaining;
            }
            return AddStatusOutcome::Refreshed;
        }

        self.effects.push(effect);
        AddStatusOutcome::Applied
    }

    /// Adds or merges a tagged skill buff.
    pub fn add_buff(
        &mut self,
        tag: &str,
        turns: u32,
        payload: BuffPayload,
        stacking: BuffStacking,
    ) -> AddStatusOutcome {
        let existing = self
            .effects
            .iter_mut()
            .find(|e| e.kind == StatusKind::Buff && e.tag.as_deref() == Some(tag));

        if let Some(existing) = existing {
            if stacking.unique || stacking.mode == StackingMode::Refresh {
                existing.turns_remaining = turns;
                existing.payload.buff = payload;
                existing.stacks = 1;
                return AddStatusOutcome::Refreshed;
            }

            existing.turns_remaining = existing.turns_remaining.max(turns);
            if existing.stacks < stacking.max_stacks.max(1) {
                existing.stacks += 1;
                existing.payload.buff.merge(&payload, stacking.mode);
            }
            return AddStatusOutcome::Refreshed;
        }

        self.effects
            .push(StatusEffect::tagged_buff(tag, turns, payload));
        AddStatusOutcome::Applied
    }

    /// Removes one entry of `kind`. Returns whether one was present.
    pub fn consume(&mut self, kind: StatusKind) -> bool {
        match self.effects.iter().position(|e| e.kind == kind) {
            Some(index) => {
                self.effects.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes harmful effects, optionally only those of the listed kinds.
    ///
    /// Returns the removed kinds in their original order.
    pub fn cleanse(&mut self, only: &[StatusKind]) -> Vec<StatusKind> {
        let mut removed = Vec::new();
        self.effects.retain(|effect| {
            let targeted = only.is_empty() || only.contains(&effect.kind);
            if effect.is_harmful() && targeted {
                removed.push(effect.kind);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Absorbs up to `damage` with the first barrier-bearing buff.
    ///
    /// Returns the absorbed amount. The buff is removed once its pool is empty.
    pub fn absorb(&mut self, damage: f64) -> f64 {
        if damage <= 0.0 {
            return 0.0;
        }
        let Some(index) = self
            .effects
            .iter()
            .position(|e| e.kind == StatusKind::Buff && e.payload.buff.barrier_hp > 0)
        else {
            return 0.0;
        };

        let pool = &mut self.effects[index].payload.buff.barrier_hp;
        let absorbed = damage.min(f64::from(*pool));
        *pool = pool.saturating_sub(absorbed.ceil() as u32);
        if *pool == 0 {
            self.effects.remove(index);
        }
        absorbed
    }

    /// Chakra restored at turn start by skill buffs.
    pub fn chakra_regen(&self) -> u32 {
        self.effects
            .iter()
            .filter(|e| e.kind == StatusKind::Buff)
            .map(|e| e.payload.buff.chakra_regen_per_turn)
            .sum()
    }

    /// One upkeep step: report per-turn values, decrement, drop expired.
    ///
    /// Hp changes are returned rather than applied so the owner can clamp them.
    pub fn tick(&mut self) -> Vec<StatusTick> {
        let mut ticks = Vec::new();
        for effect in self.effects.iter_mut() {
            if effect.payload.damage_per_turn > 0 {
                ticks.push(StatusTick::Damage {
                    kind: effect.kind,
                    amount: effect.payload.damage_per_turn,
                });
            }
            if effect.payload.heal_per_turn > 0 {
                ticks.push(StatusTick::Heal {
                    kind: effect.kind,
                    amount: effect.payload.heal_per_turn,
                });
            }
            effect.turns_remaining = effect.turns_remaining.saturating_sub(1);
        }

        self.effects.retain(|effect| {
            if effect.turns_remaining == 0 {
                ticks.push(StatusTick::Expired { kind: effect.kind });
                false
            } else {
                true
            }
        });
        ticks
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}
