//! Character catalogue loader.
//!
//! Loads `characters.json`: an array of playable characters with per-tier
//! skill tables. Skill descriptions are scanned for side-effects and the
//! `effects` descriptor of secret techniques becomes typed [`SecretEffects`].

use std::collections::BTreeMap;
use std::path::Path;

use battle_core::skill::{BuffTarget, Multiplier, SecretEffects};
use battle_core::state::{BuffPayload, BuffStacking, StackingMode};
use battle_core::{
    Ability, BaseStats, CharacterDefinition, SkillEntry, SkillSet, SkillTable, StatusKind,
};
use serde::Deserialize;

use crate::loaders::{LoadResult, parse_element, parse_tier, read_json};

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawStats {
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
    pub speed: u32,
}

impl RawStats {
    /// Zero fields take the player fallback, matching how the game treats
    /// missing numbers.
    pub(crate) fn or_fallback(self, fallback: BaseStats) -> BaseStats {
        let pick = |value: u32, default: u32| if value == 0 { default } else { value };
        BaseStats::new(
            pick(self.hp, fallback.hp),
            pick(self.atk, fallback.atk),
            pick(self.def, fallback.def),
            pick(self.speed, fallback.speed),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCharacter {
    id: String,
    name: String,
    #[serde(default)]
    element: Option<String>,
    #[serde(default = "default_star_min")]
    star_min_code: String,
    #[serde(default)]
    stats_base: Option<RawStats>,
    #[serde(default)]
    stats_max: Option<RawStats>,
    #[serde(default)]
    abilities: Vec<Ability>,
    #[serde(default)]
    skills: RawSkills,
}

fn default_star_min() -> String {
    "5S".to_owned()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawSkills {
    jutsu: Option<RawSkill>,
    ultimate: Option<RawSkill>,
    secret: Option<RawSkill>,
    field_skill: Option<RawSupportSkill>,
    buddy_skill: Option<RawSupportSkill>,
}

/// A field or buddy skill; only its prose matters to the engine.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSupportSkill {
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSkill {
    #[serde(default)]
    name: String,
    /// Tier code to entry, in authored order.
    #[serde(default)]
    by_tier: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawSkillEntry {
    name: Option<String>,
    description: String,
    chakra_cost: Option<u32>,
    multiplier: Option<String>,
    shape: Option<String>,
    shape_args: Vec<f64>,
    cooldown: u32,
    effects: Option<RawEffects>,
}

/// Support effects descriptor of a secret technique.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawEffects {
    heal_percent: u32,
    chakra_gain: u32,
    duration_turns: u32,
    atk_boost: i32,
    def_boost: i32,
    speed_boost_percent: i32,
    damage_reduction_percent: i32,
    #[serde(rename = "barrierHP")]
    barrier_hp: u32,
    crit_rate_percent: i32,
    crit_dmg_percent: i32,
    chakra_regen_per_turn: u32,
    cleanse_debuffs: bool,
    cleanse_types: Vec<String>,
    revive: bool,
    revive_window_turns: Option<u32>,
    target: Option<String>,
    tag: Option<String>,
    unique: bool,
    stacking: Option<RawStacking>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStacking {
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    max_stacks: Option<u8>,
}

/// Loader for the character catalogue.
pub struct CharacterLoader;

impl CharacterLoader {
    /// Load every character from a JSON file.
    ///
    /// `statsMax` wins over `statsBase`; a character with neither gets the
    /// engine's player fallback when it is built into a unit.
    pub fn load(path: &Path) -> LoadResult<Vec<CharacterDefinition>> {
        let raw: Vec<RawCharacter> = read_json(path, "character catalogue")?;
        raw.into_iter().map(convert_character).collect()
    }
}

fn convert_character(raw: RawCharacter) -> LoadResult<CharacterDefinition> {
    let owner = raw.id.as_str();
    let stats = raw
        .stats_max
        .or(raw.stats_base)
        .map(|s| s.or_fallback(BaseStats::PLAYER_FALLBACK));

    let support = |skill: Option<RawSupportSkill>| {
        skill
            .map(|s| s.description.trim().to_owned())
            .filter(|d| !d.is_empty())
    };
    let field_skill = support(raw.skills.field_skill);
    let buddy_skill = support(raw.skills.buddy_skill);

    let skills = SkillSet {
        jutsu: raw.skills.jutsu.map(|s| convert_skill(s, owner)).transpose()?,
        ultimate: raw
            .skills
            .ultimate
            .map(|s| convert_skill(s, owner))
            .transpose()?,
        secret: raw.skills.secret.map(|s| convert_skill(s, owner)).transpose()?,
    };

    Ok(CharacterDefinition {
        element: parse_element(raw.element.as_deref(), owner)?,
        base_tier: parse_tier(&raw.star_min_code, owner)?,
        stats,
        abilities: raw.abilities,
        skills,
        field_skill,
        buddy_skill,
        id: raw.id,
        name: raw.name,
    })
}

fn convert_skill(raw: RawSkill, owner: &str) -> LoadResult<SkillTable> {
    let mut table = SkillTable::new(raw.name.clone());
    for (code, value) in raw.by_tier {
        let tier = parse_tier(&code, owner)?;
        let entry: RawSkillEntry = serde_json::from_value(value).map_err(|e| {
            anyhow::anyhow!(
                "Failed to parse skill '{}' tier {} of '{}': {}",
                raw.name,
                code,
                owner,
                e
            )
        })?;
        table = table.with_tier(tier, convert_entry(entry, &raw.name, owner)?);
    }
    Ok(table)
}

fn convert_entry(raw: RawSkillEntry, skill: &str, owner: &str) -> LoadResult<SkillEntry> {
    let mut entry = SkillEntry::new(raw.name.unwrap_or_else(|| skill.to_owned()))
        .with_description(raw.description);
    entry.chakra_cost = raw.chakra_cost;
    // Unparseable multipliers fall back to the slot default.
    entry.multiplier = raw.multiplier.as_deref().and_then(Multiplier::parse);
    entry.shape = raw.shape;
    entry.shape_args = raw.shape_args;
    entry.cooldown = raw.cooldown;
    entry.secret = raw.effects.map(|e| convert_effects(e, owner)).transpose()?;
    Ok(entry)
}

pub(crate) fn convert_effects(raw: RawEffects, owner: &str) -> LoadResult<SecretEffects> {
    let target = match raw.target.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("allallies") | Some("all_allies") | Some("team") => BuffTarget::AllAllies,
        Some("self") | Some("caster") => BuffTarget::Caster,
        Some(other) => anyhow::bail!("Unknown effects target '{}' in '{}'", other, owner),
    };

    let cleanse = if raw.cleanse_debuffs {
        let kinds = raw
            .cleanse_types
            .iter()
            .map(|name| {
                cleanse_kind(name)
                    .ok_or_else(|| anyhow::anyhow!("Unknown cleanse type '{}' in '{}'", name, owner))
            })
            .collect::<LoadResult<Vec<_>>>()?;
        Some(kinds)
    } else {
        None
    };

    let stacking = match raw.stacking {
        None => BuffStacking {
            unique: raw.unique,
            ..BuffStacking::default()
        },
        Some(stacking) => BuffStacking {
            unique: raw.unique,
            mode: match stacking.mode.as_deref().map(str::to_ascii_lowercase).as_deref() {
                None | Some("additive") => StackingMode::Additive,
                Some("max") => StackingMode::Max,
                Some("refresh") => StackingMode::Refresh,
                Some(other) => anyhow::bail!("Unknown stacking mode '{}' in '{}'", other, owner),
            },
            max_stacks: stacking.max_stacks.unwrap_or(1).max(1),
        },
    };

    Ok(SecretEffects {
        target,
        heal_percent: raw.heal_percent,
        chakra_gain: raw.chakra_gain,
        duration_turns: raw.duration_turns,
        payload: BuffPayload {
            atk_boost: raw.atk_boost,
            def_boost: raw.def_boost,
            speed_boost_percent: raw.speed_boost_percent,
            damage_reduction_percent: raw.damage_reduction_percent,
            barrier_hp: raw.barrier_hp,
            crit_rate_percent: raw.crit_rate_percent,
            crit_dmg_percent: raw.crit_dmg_percent,
            chakra_regen_per_turn: raw.chakra_regen_per_turn,
        },
        cleanse,
        revive_window: raw.revive.then(|| {
            raw.revive_window_turns
                .unwrap_or(battle_core::skill::DEFAULT_REVIVE_WINDOW_TURNS)
        }),
        tag: raw.tag,
        stacking,
    })
}

/// Maps the game's ailment tags onto status kinds.
fn cleanse_kind(name: &str) -> Option<StatusKind> {
    let aliases: BTreeMap<&str, StatusKind> = BTreeMap::from([
        ("slip", StatusKind::Burn),
        ("immobilize", StatusKind::Immobilized),
        ("seal", StatusKind::Sealed),
        ("silence", StatusKind::Sealed),
        ("slow", StatusKind::SpeedDebuff),
        ("spddown", StatusKind::SpeedDebuff),
        ("atkdown", StatusKind::AttackDebuff),
        ("vulnerability", StatusKind::Marked),
    ]);
    let lower = name.trim().to_ascii_lowercase();
    aliases
        .get(lower.as_str())
        .copied()
        .or_else(|| lower.parse().ok())
}
