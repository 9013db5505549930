use crate::config::BattleConfig;
use crate::env::{BaseStats, CharacterDefinition, EnemyTemplate, RngOracle, RollPurpose, compute_seed};
use crate::skill::{SupportBonus, TierCode};
use crate::state::{BattleState, Passives, Side, StatusEffect, StatusKind, Unit, UnitProfile};

/// Default level of a team member that does not specify one.
pub const DEFAULT_MEMBER_LEVEL: u32 = 1;

/// One owned character placed in the team.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamMember {
    pub character_id: String,
    /// Falls back to the character's base tier.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tier: Option<TierCode>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub level: Option<u32>,
    /// Slot position shared with the bench unit it can swap with.
    pub slot: u8,
    /// Id of the equipped Last Stand ultimate.
    #[cfg_attr(feature = "serde", serde(default))]
    pub last_stand: Option<String>,
}

impl TeamMember {
    pub fn new(character_id: impl Into<String>, slot: u8) -> Self {
        Self {
            character_id: character_id.into(),
            tier: None,
            level: None,
            slot,
            last_stand: None,
        }
    }

    pub fn with_tier(mut self, tier: TierCode) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_last_stand(mut self, id: impl Into<String>) -> Self {
        self.last_stand = Some(id.into());
        self
    }
}

/// Player team as chosen in the team builder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TeamSpec {
    pub active: Vec<TeamMember>,
    pub bench: Vec<TeamMember>,
    pub commander: Option<TeamMember>,
}

/// Stacks of speed sickness for a unit of `speed`.
///
/// # Formula
///
/// ```text
/// excess = speed - max_speed
/// stacks = floor(excess / step)   when excess > step, else 0
/// ```
pub fn speed_sickness_stacks(speed: u32, config: &BattleConfig) -> u32 {
    let excess = speed.saturating_sub(config.max_speed);
    if config.speed_sickness_step == 0 || excess <= config.speed_sickness_step {
        return 0;
    }
    excess / config.speed_sickness_step
}

fn afflict_speed_sickness(unit: &mut Unit, config: &BattleConfig) {
    let stacks = speed_sickness_stacks(unit.stats.speed, config);
    if stacks == 0 {
        return;
    }
    let stacks = u8::try_from(stacks).unwrap_or(u8::MAX);
    unit.add_effect(StatusEffect::from_kind(StatusKind::SpeedSickness).with_stacks(stacks));
}

/// Random starting gauge in `[0, initial_gauge_spread)`.
pub(crate) fn roll_initial_gauge(
    state: &mut BattleState,
    rng: &dyn RngOracle,
    unit: &Unit,
    config: &BattleConfig,
) -> u32 {
    if config.initial_gauge_spread == 0 {
        return 0;
    }
    let nonce = state.next_nonce();
    let seed = compute_seed(state.seed, nonce, unit.id.0, RollPurpose::InitialGauge.context());
    rng.next_u32(seed) % config.initial_gauge_spread
}

/// Builds a player unit from its character definition.
pub fn build_player_unit(
    state: &mut BattleState,
    character: &CharacterDefinition,
    member: &TeamMember,
    config: &BattleConfig,
) -> Unit {
    let profile = UnitProfile {
        character_id: character.id.clone(),
        tier: member.tier.unwrap_or(character.base_tier),
        level: member.level.unwrap_or(DEFAULT_MEMBER_LEVEL),
        element: character.element,
        skills: character.skills.clone(),
        field_bonus: character.field_skill.as_deref().and_then(SupportBonus::parse),
        buddy_bonus: character.buddy_skill.as_deref().and_then(SupportBonus::parse),
    };
    let mut unit = Unit::new(
        state.allocate_unit_id(),
        character.name.clone(),
        Side::Player,
        character.stats.unwrap_or(BaseStats::PLAYER_FALLBACK),
        profile,
    )
    .with_slot(member.slot)
    .with_max_chakra(config.max_chakra)
    .with_passives(Passives::from_abilities(&character.abilities));
    afflict_speed_sickness(&mut unit, config);
    unit
}

/// Builds an enemy from its template, or from fallback stats named after
/// `id` when the catalogue has no such template.
pub fn build_enemy_unit(
    state: &mut BattleState,
    id: &str,
    template: Option<&EnemyTemplate>,
    slot: u8,
    config: &BattleConfig,
) -> Unit {
    let (name, element, stats, passives) = match template {
        Some(template) => (
            template.name.clone(),
            template.element,
            template.stats,
            Passives::from_abilities(&template.abilities),
        ),
        None => (
            id.to_owned(),
            None,
            BaseStats::ENEMY_FALLBACK,
            Passives::default(),
        ),
    };
    let profile = UnitProfile {
        character_id: id.to_owned(),
        tier: TierCode::default(),
        level: DEFAULT_MEMBER_LEVEL,
        element,
        ..UnitProfile::default()
    };
    let mut unit = Unit::new(state.allocate_unit_id(), name, Side::Enemy, stats, profile)
        .with_slot(slot)
        .with_max_chakra(config.max_chakra)
        .with_passives(passives);
    afflict_speed_sickness(&mut unit, config);
    unit
}
