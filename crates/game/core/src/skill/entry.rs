//! Skill tables and their tier-specific entries.

use arrayvec::ArrayVec;

use crate::config::BattleConfig;
use crate::skill::{Multiplier, TierCode};
use crate::state::{BuffPayload, BuffStacking, StatusKind};

/// Action slot a skill occupies.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SkillSlot {
    Basic,
    Jutsu,
    Ultimate,
    Secret,
}

/// Who a parsed side-effect lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectTarget {
    Caster,
    /// Living units on the caster's side.
    Allies,
    /// Units hit by the skill.
    Struck,
}

/// Side-effect applied after a jutsu or ultimate resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkillEffect {
    Heal {
        amount: u32,
        percent: bool,
        target: EffectTarget,
    },
    Status {
        kind: StatusKind,
        turns: u32,
        target: EffectTarget,
    },
    /// Moves chakra from each struck unit to the caster.
    ChakraSteal { amount: u32 },
}

pub type SkillEffects = ArrayVec<SkillEffect, { BattleConfig::MAX_SKILL_EFFECTS }>;

/// Flat heal used when a heal description carries no number.
pub const DEFAULT_HEAL_AMOUNT: u32 = 500;

/// Scans a skill description for known side-effect keywords.
///
/// Durations come from the first `<n> turn` phrase; otherwise the keyword's
/// own default applies.
pub fn parse_effects(description: &str) -> SkillEffects {
    let mut effects = SkillEffects::new();
    if description.is_empty() {
        return effects;
    }

    let lower = description.to_lowercase();
    let has = |needle: &str| lower.contains(needle);
    let turns = |default: u32| turns_in(&lower).unwrap_or(default);
    let ally_scope = if has("all allies") || has("team") {
        EffectTarget::Allies
    } else {
        EffectTarget::Caster
    };
    let mut push = |effect: SkillEffect| {
        let _ = effects.try_push(effect);
    };
    let status = |kind: StatusKind, turns: u32, target: EffectTarget| SkillEffect::Status {
        kind,
        turns,
        target,
    };

    if has("heal") || has("recover") || has("restore hp") {
        push(SkillEffect::Heal {
            amount: heal_amount(&lower).unwrap_or(DEFAULT_HEAL_AMOUNT),
            percent: lower.contains('%'),
            target: ally_scope,
        });
    }
    if has("dodge") || has("evade") {
        push(status(StatusKind::Dodge, turns(2), EffectTarget::Caster));
    }
    if has("invulnerable") || has("immune") {
        push(status(StatusKind::Invulnerable, 1, EffectTarget::Caster));
    }
    if has("attack up") || has("boosts attack") || has("atk boost") {
        push(status(StatusKind::AttackBoost, turns(3), ally_scope));
    }
    if has("defense up") || has("boosts defense") || has("def boost") {
        push(status(StatusKind::DefenseBoost, turns(3), ally_scope));
    }
    if has("speed up") || has("boosts speed") || has("spd boost") {
        push(status(StatusKind::SpeedBoost, turns(2), ally_scope));
    }
    if has("attack down") || has("lowers attack") || has("reduces attack") {
        push(status(StatusKind::AttackDebuff, turns(2), EffectTarget::Struck));
    }
    if has("speed down") || has("lowers speed") || has("reduces speed") || has("immobilize") {
        push(status(StatusKind::SpeedDebuff, turns(2), EffectTarget::Struck));
    }
    if has("poison") {
        push(status(StatusKind::Poison, turns(3), EffectTarget::Struck));
    }
    if has("burn") || has("slip damage") {
        push(status(StatusKind::Burn, turns(2), EffectTarget::Struck));
    }
    if has("bleed") {
        push(status(StatusKind::Bleed, turns(3), EffectTarget::Struck));
    }
    if has("immobilize") {
        push(status(StatusKind::Immobilized, turns(3), EffectTarget::Struck));
    } else if has("stun") {
        push(status(StatusKind::Stun, 1, EffectTarget::Struck));
    }
    if has("jutsu seal") || has("seal jutsu") || has("prevent jutsu") || has("sealing") {
        push(status(StatusKind::Sealed, turns(3), EffectTarget::Struck));
    }
    if has("chakra steal") || has("steal chakra") || has("drain chakra") {
        push(SkillEffect::ChakraSteal { amount: 1 });
    }

    effects
}

/// First `<digits><spaces>turn` in the text.
fn turns_in(text: &str) -> Option<u32> {
    numbers(text).find_map(|(value, end)| {
        text[end..]
            .trim_start()
            .starts_with("turn")
            .then_some(value)
    })
}

/// First number that is followed somewhere later by "heal" or "hp".
fn heal_amount(text: &str) -> Option<u32> {
    numbers(text).find_map(|(value, end)| {
        let rest = &text[end..];
        (rest.contains("heal") || rest.contains("hp")).then_some(value)
    })
}

/// Decimal integers in `text` with the byte offset just past each one.
fn numbers(text: &str) -> impl Iterator<Item = (u32, usize)> + '_ {
    let bytes = text.as_bytes();
    let mut index = 0;
    core::iter::from_fn(move || {
        while index < bytes.len() {
            if bytes[index].is_ascii_digit() {
                let start = index;
                while index < bytes.len() && bytes[index].is_ascii_digit() {
                    index += 1;
                }
                if let Ok(value) = text[start..index].parse() {
                    return Some((value, index));
                }
            } else {
                index += 1;
            }
        }
        None
    })
}

/// Recipients of a secret technique.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BuffTarget {
    #[default]
    AllAllies,
    Caster,
}

/// Revives fallen allies that died at most this many turns ago.
pub const DEFAULT_REVIVE_WINDOW_TURNS: u32 = 3;

/// Support effects of a secret technique.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SecretEffects {
    pub target: BuffTarget,
    pub heal_percent: u32,
    pub chakra_gain: u32,
    /// Timed buff is only registered when this is positive.
    pub duration_turns: u32,
    pub payload: BuffPayload,
    /// `Some(kinds)` cleanses harmful effects; an empty list means all of them.
    pub cleanse: Option<Vec<StatusKind>>,
    /// `Some(window)` revives allies that fell within the window.
    pub revive_window: Option<u32>,
    pub tag: Option<String>,
    pub stacking: BuffStacking,
}

/// Resolved data for one tier of a skill.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillEntry {
    pub name: String,
    pub description: String,
    /// `None` means the slot default applies.
    pub chakra_cost: Option<u32>,
    /// `None` means the slot default applies.
    pub multiplier: Option<Multiplier>,
    /// Targeting geometry, only meaningful to presentation layers.
    pub shape: Option<String>,
    pub shape_args: Vec<f64>,
    pub cooldown: u32,
    pub effects: SkillEffects,
    pub secret: Option<SecretEffects>,
}

impl SkillEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the description and parses its side-effects.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self.effects = parse_effects(&self.description);
        self
    }

    pub fn with_cost(mut self, cost: u32) -> Self {
        self.chakra_cost = Some(cost);
        self
    }

    pub fn with_multiplier(mut self, multiplier: Multiplier) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    pub fn with_secret(mut self, secret: SecretEffects) -> Self {
        self.secret = Some(secret);
        self
    }
}

/// Per-tier table of one skill, in authored order.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillTable {
    pub name: String,
    pub tiers: Vec<(TierCode, SkillEntry)>,
}

impl SkillTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tiers: Vec::new(),
        }
    }

    pub fn with_tier(mut self, tier: TierCode, entry: SkillEntry) -> Self {
        self.tiers.push((tier, entry));
        self
    }

    /// Entry for `tier`, or the first authored entry.
    pub fn entry(&self, tier: TierCode) -> Option<&SkillEntry> {
        self.tiers
            .iter()
            .find(|(code, _)| *code == tier)
            .or_else(|| self.tiers.first())
            .map(|(_, entry)| entry)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillSet {
    pub jutsu: Option<SkillTable>,
    pub ultimate: Option<SkillTable>,
    pub secret: Option<SkillTable>,
}

impl SkillSet {
    pub fn table(&self, slot: SkillSlot) -> Option<&SkillTable> {
        match slot {
            SkillSlot::Basic => None,
            SkillSlot::Jutsu => self.jutsu.as_ref(),
            SkillSlot::Ultimate => self.ultimate.as_ref(),
            SkillSlot::Secret => self.secret.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(effects: &SkillEffects) -> Vec<StatusKind> {
        effects
            .iter()
            .filter_map(|e| match e {
                SkillEffect::Status { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn parses_debuffs_with_turns() {
        let effects = parse_effects("Deals damage and inflicts Poison for 4 turns.");
        assert_eq!(
            effects.as_slice(),
            &[SkillEffect::Status {
                kind: StatusKind::Poison,
                turns: 4,
                target: EffectTarget::Struck
            }]
        );
    }

    #[test]
    fn immobilize_wins_over_stun() {
        let effects = parse_effects("Immobilize and stun the target");
        assert_eq!(
            kinds(&effects),
            vec![StatusKind::SpeedDebuff, StatusKind::Immobilized]
        );
    }

    #[test]
    fn heal_reads_percent_and_scope() {
        let effects = parse_effects("Recovers 30% HP for all allies");
        assert_eq!(
            effects[0],
            SkillEffect::Heal {
                amount: 30,
                percent: true,
                target: EffectTarget::Allies
            }
        );
    }

    #[test]
    fn chakra_steal_and_seal() {
        let effects = parse_effects("Steal chakra and apply jutsu seal");
        assert!(effects.contains(&SkillEffect::ChakraSteal { amount: 1 }));
        assert_eq!(kinds(&effects), vec![StatusKind::Sealed]);
    }

    #[test]
    fn table_falls_back_to_first_tier() {
        let table = SkillTable::new("Rasengan")
            .with_tier(TierCode::S5, SkillEntry::new("five").with_cost(4))
            .with_tier(TierCode::S6, SkillEntry::new("six").with_cost(5));
        assert_eq!(table.entry(TierCode::S6).unwrap().name, "six");
        assert_eq!(table.entry(TierCode::S9).unwrap().name, "five");
        assert!(SkillTable::new("empty").entry(TierCode::S3).is_none());
    }
}
