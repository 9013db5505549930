//! Asynchronous abstraction for sourcing player intent.
//!
//! Runtime users plug in [`ActionProvider`] implementations so the simulation
//! can run with human input, scripted fixtures, or simple policies. Providers
//! are only consulted while a player unit awaits input and auto mode is off;
//! enemy turns and auto turns are decided by the engine itself.
use async_trait::async_trait;
use battle_core::chakra::mode_for_clicks;
use battle_core::skill::{SkillSlot, is_unlocked, resolve_skill};
use battle_core::{BattleState, MissionModifiers, SessionSnapshot, Side, Unit, UnitId};

use super::errors::Result;

/// What the awaiting unit should do, in terms of session input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerIntent {
    /// Click the acting unit `clicks` times, then click `target`.
    ///
    /// Zero clicks is a basic attack.
    Strike { clicks: u8, target: UnitId },
    Guard,
    MultiAttack,
    MultiJutsu,
    Combo { targets: Vec<UnitId> },
    /// Fire a charged Last Stand; does not end the turn by itself.
    LastStand { unit: UnitId, target: Option<UnitId> },
    EndTurn,
}

/// Trait for providing player intent based on the current session.
///
/// Different implementations can handle:
/// - Player input (from UI/CLI)
/// - Scripted/replayed input
/// - Testing fixtures
#[async_trait]
pub trait ActionProvider: Send + Sync {
    /// Decide what `actor` does, given a read-only snapshot taken while it
    /// awaits input.
    async fn provide_intent(&self, actor: UnitId, snapshot: &SessionSnapshot)
    -> Result<PlayerIntent>;
}

/// Fires a charged Last Stand first. Otherwise clicks for the strongest
/// affordable chakra mode, then strikes the enemy with the least hp.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyProvider;

impl GreedyProvider {
    /// Strongest mode first; each needs the gate threshold and a castable skill.
    const MODES: [(u8, SkillSlot); 3] = [
        (3, SkillSlot::Secret),
        (2, SkillSlot::Ultimate),
        (1, SkillSlot::Jutsu),
    ];

    pub fn choose(state: &BattleState, actor: UnitId) -> PlayerIntent {
        let (Some(unit), Some(target)) = (state.roster.unit(actor), weakest_enemy(state)) else {
            return PlayerIntent::EndTurn;
        };
        if unit.last_stand.as_ref().is_some_and(|charge| charge.is_ready()) {
            return PlayerIntent::LastStand {
                unit: actor,
                target: Some(target),
            };
        }
        let clicks = Self::MODES
            .into_iter()
            .find(|&(clicks, slot)| castable(state, unit, clicks, slot))
            .map_or(0, |(clicks, _)| clicks);

        PlayerIntent::Strike { clicks, target }
    }
}

#[async_trait]
impl ActionProvider for GreedyProvider {
    async fn provide_intent(
        &self,
        actor: UnitId,
        snapshot: &SessionSnapshot,
    ) -> Result<PlayerIntent> {
        Ok(Self::choose(&snapshot.state, actor))
    }
}

fn weakest_enemy(state: &BattleState) -> Option<UnitId> {
    state
        .roster
        .living(Side::Enemy)
        .into_iter()
        .filter_map(|id| state.roster.unit(id))
        .min_by_key(|unit| (unit.stats.hp, unit.id))
        .map(|unit| unit.id)
}

fn castable(state: &BattleState, unit: &Unit, clicks: u8, slot: SkillSlot) -> bool {
    let Some((_, threshold)) = mode_for_clicks(clicks) else {
        return false;
    };
    if unit.chakra < threshold || unit.statuses.prevents_skills() {
        return false;
    }
    if unit.is_player() && state.modifiers.contains(MissionModifiers::NO_JUTSU) {
        return false;
    }
    is_unlocked(unit, slot)
        && resolve_skill(unit, slot).is_some_and(|skill| unit.chakra >= skill.chakra_cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_content::ContentBundle;
    use battle_core::{
        BaseStats, BattleEvent, CharacterDefinition, EnemyTemplate, MissionDefinition,
        SessionBuilder, SkillEntry, SkillSet, SkillTable, StageDefinition, TeamMember, TeamSpec,
        TierCode, WaveDefinition,
    };

    fn bundle() -> ContentBundle {
        let table = |name: &str| Some(SkillTable::new(name).with_tier(TierCode::S5, SkillEntry::new(name)));
        let hero = CharacterDefinition {
            id: "hero".into(),
            name: "Hero".into(),
            element: None,
            base_tier: TierCode::S5,
            stats: Some(BaseStats::new(5000, 100, 50, 150)),
            abilities: Vec::new(),
            skills: SkillSet {
                jutsu: table("Fireball"),
                ultimate: table("Inferno"),
                secret: None,
            },
            ..CharacterDefinition::default()
        };
        let enemy = |id: &str, hp: u32| EnemyTemplate {
            id: id.into(),
            name: id.into(),
            element: None,
            stats: BaseStats::new(hp, 1, 0, 10),
            abilities: Vec::new(),
        };
        let mission = MissionDefinition {
            id: "m1".into(),
            name: "m1".into(),
            difficulties: vec![(
                "normal".into(),
                vec![StageDefinition {
                    name: None,
                    waves: vec![WaveDefinition {
                        enemies: vec!["brute".into(), "runt".into()],
                    }],
                }],
            )],
        };
        ContentBundle::new()
            .with_characters([hero])
            .with_enemies([enemy("brute", 900), enemy("runt", 300)])
            .with_missions([mission])
    }

    fn started_state(level: u32, modifiers: MissionModifiers) -> (BattleState, UnitId) {
        let content = bundle();
        let team = TeamSpec {
            active: vec![TeamMember::new("hero", 0).with_level(level)],
            ..TeamSpec::default()
        };
        let mut session = SessionBuilder::new(&content, "m1")
            .team(team)
            .modifiers(modifiers)
            .build()
            .unwrap();
        let mut events: Vec<BattleEvent> = Vec::new();
        session.start(&mut events).unwrap();
        let state = session.snapshot().state;
        let hero = state.roster.active()[0].id;
        (state, hero)
    }

    fn with_chakra(mut state: BattleState, unit: UnitId, chakra: u32) -> BattleState {
        state.roster.unit_mut(unit).unwrap().chakra = chakra;
        state
    }

    fn with_charged_last_stand(mut state: BattleState, unit: UnitId) -> BattleState {
        use battle_core::skill::{LastStand, LastStandCharge, LastStandTarget};

        let ultimate = LastStand::new("chidori", "Lightning Blade", LastStandTarget::SingleEnemy);
        let mut charge = LastStandCharge::new(ultimate);
        for _ in 0..3 {
            charge.note_basic_attack();
        }
        state.roster.unit_mut(unit).unwrap().last_stand = Some(charge);
        state
    }

    fn runt(state: &BattleState) -> UnitId {
        state
            .roster
            .enemies()
            .iter()
            .find(|u| u.stats.hp == 300)
            .unwrap()
            .id
    }

    #[test]
    fn targets_the_weakest_enemy() {
        let (state, hero) = started_state(1, MissionModifiers::empty());
        let target = runt(&state);
        assert_eq!(
            GreedyProvider::choose(&state, hero),
            PlayerIntent::Strike { clicks: 0, target }
        );
    }

    #[test]
    fn picks_the_strongest_castable_mode() {
        let (state, hero) = started_state(60, MissionModifiers::empty());
        let target = runt(&state);

        // No secret skill, so a full bar still only reaches the ultimate.
        let full = with_chakra(state.clone(), hero, 10);
        assert_eq!(
            GreedyProvider::choose(&full, hero),
            PlayerIntent::Strike { clicks: 2, target }
        );

        let some = with_chakra(state, hero, 5);
        assert_eq!(
            GreedyProvider::choose(&some, hero),
            PlayerIntent::Strike { clicks: 1, target }
        );
    }

    #[test]
    fn locked_or_disabled_skills_fall_back_to_basic() {
        let (state, hero) = started_state(10, MissionModifiers::empty());
        let locked = with_chakra(state, hero, 10);
        assert!(matches!(
            GreedyProvider::choose(&locked, hero),
            PlayerIntent::Strike { clicks: 0, .. }
        ));

        let (state, hero) = started_state(60, MissionModifiers::NO_JUTSU);
        let disabled = with_chakra(state, hero, 10);
        assert!(matches!(
            GreedyProvider::choose(&disabled, hero),
            PlayerIntent::Strike { clicks: 0, .. }
        ));
    }

    #[test]
    fn charged_last_stand_goes_first() {
        let (state, hero) = started_state(60, MissionModifiers::empty());
        let target = runt(&state);
        let charged = with_charged_last_stand(with_chakra(state, hero, 10), hero);
        assert_eq!(
            GreedyProvider::choose(&charged, hero),
            PlayerIntent::LastStand {
                unit: hero,
                target: Some(target)
            }
        );

        let mut spent = charged;
        if let Some(charge) = spent.roster.unit_mut(hero).unwrap().last_stand.as_mut() {
            charge.consume();
        }
        assert_eq!(
            GreedyProvider::choose(&spent, hero),
            PlayerIntent::Strike { clicks: 2, target }
        );
    }
}
