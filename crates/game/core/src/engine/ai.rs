use crate::env::RollPurpose;
use crate::events::ActionKind;
use crate::skill::SkillSlot;
use crate::state::UnitId;

use super::BattleEngine;

/// Roll an AI must beat to cast its ultimate.
pub const AI_ULTIMATE_THRESHOLD: f64 = 0.7;
/// Roll an AI must beat to cast its jutsu.
pub const AI_JUTSU_THRESHOLD: f64 = 0.5;
/// Roll an AI must beat to guard at low hp.
pub const AI_GUARD_THRESHOLD: f64 = 0.6;
/// Hp ratio under which an AI considers guarding.
pub const AI_LOW_HP_RATIO: f64 = 0.3;

impl<'a> BattleEngine<'a> {
    /// Picks and executes an action for `actor`.
    ///
    /// Priority: ultimate when castable and the roll beats 0.7, jutsu when
    /// castable and the roll beats 0.5, guard below 30% hp when the roll beats
    /// 0.6, otherwise a basic attack on a random living opponent. Returns
    /// `None` when there is nothing to attack.
    pub fn run_ai(&mut self, actor: UnitId) -> Option<ActionKind> {
        let targets = self.living_opponents(actor);
        if targets.is_empty() {
            return None;
        }
        let target = targets[self.pick(actor, targets.len())];

        if self.can_use(actor, SkillSlot::Ultimate)
            && self.roll(actor, RollPurpose::AiUltimate) > AI_ULTIMATE_THRESHOLD
            && self.ultimate(actor).is_ok()
        {
            return Some(ActionKind::Ultimate);
        }

        if self.can_use(actor, SkillSlot::Jutsu)
            && self.roll(actor, RollPurpose::AiJutsu) > AI_JUTSU_THRESHOLD
            && self.jutsu(actor, target).is_ok()
        {
            return Some(ActionKind::Jutsu);
        }

        let low_hp = self
            .state
            .roster
            .unit(actor)
            .is_some_and(|u| u.hp_ratio() < AI_LOW_HP_RATIO);
        if low_hp
            && self.roll(actor, RollPurpose::AiGuard) > AI_GUARD_THRESHOLD
            && self.guard(actor).is_ok()
        {
            return Some(ActionKind::Guard);
        }

        self.attack(actor, target).ok().map(|()| ActionKind::Attack)
    }
}

#[cfg(test)]
mod tests {
    use crate::combat::StatusBuffs;
    use crate::config::BattleConfig;
    use crate::engine::{BattleEngine, BattleEnv};
    use crate::env::{BaseStats, RngOracle};
    use crate::events::{ActionKind, BattleEvent};
    use crate::skill::{SkillEntry, SkillSet, SkillTable, TierCode};
    use crate::state::{BattleState, Side, Unit, UnitId, UnitProfile};

    /// Always rolls just under 1.0.
    struct HighRng;

    impl RngOracle for HighRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            u32::MAX
        }
    }

    /// Always rolls 0.
    struct LowRng;

    impl RngOracle for LowRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            0
        }
    }

    fn state(chakra: u32, hp: u32) -> BattleState {
        let skills = SkillSet {
            jutsu: Some(SkillTable::new("Fire Style").with_tier(TierCode::S6, SkillEntry::new("Fireball"))),
            ultimate: Some(
                SkillTable::new("Amaterasu").with_tier(TierCode::S6, SkillEntry::new("Amaterasu")),
            ),
            secret: None,
        };
        let mut enemy = Unit::new(
            UnitId(10),
            "Itachi",
            Side::Enemy,
            BaseStats::new(1000, 100, 50, 100),
            UnitProfile {
                tier: TierCode::S6,
                level: 60,
                skills,
                ..UnitProfile::default()
            },
        );
        enemy.chakra = chakra;
        enemy.stats.hp = hp;

        let mut state = BattleState::default();
        state
            .roster
            .push_active(Unit::new(
                UnitId(1),
                "Sasuke",
                Side::Player,
                BaseStats::new(1000, 100, 50, 100),
                UnitProfile::default(),
            ))
            .unwrap();
        state.roster.set_enemies(vec![enemy]).unwrap();
        state
    }

    #[test]
    fn high_rolls_cast_the_ultimate() {
        let config = BattleConfig::default();
        let mut state = state(10, 1000);
        let mut events: Vec<BattleEvent> = Vec::new();
        let env = BattleEnv::new(&config, &HighRng, &StatusBuffs);
        let mut engine = BattleEngine::new(&mut state, env, &mut events);
        engine.start_turn(UnitId(10));
        assert_eq!(engine.run_ai(UnitId(10)), Some(ActionKind::Ultimate));
        assert_eq!(engine.state().roster.unit(UnitId(10)).unwrap().chakra, 2);
    }

    #[test]
    fn unaffordable_skills_fall_back_to_guard_at_low_hp() {
        let config = BattleConfig::default();
        let mut state = state(2, 100);
        let mut events: Vec<BattleEvent> = Vec::new();
        let env = BattleEnv::new(&config, &HighRng, &StatusBuffs);
        let mut engine = BattleEngine::new(&mut state, env, &mut events);
        engine.start_turn(UnitId(10));
        assert_eq!(engine.run_ai(UnitId(10)), Some(ActionKind::Guard));
    }

    #[test]
    fn low_rolls_attack() {
        let config = BattleConfig::default();
        let mut state = state(10, 100);
        let mut events: Vec<BattleEvent> = Vec::new();
        let env = BattleEnv::new(&config, &LowRng, &StatusBuffs);
        let mut engine = BattleEngine::new(&mut state, env, &mut events);
        engine.start_turn(UnitId(10));
        assert_eq!(engine.run_ai(UnitId(10)), Some(ActionKind::Attack));
    }

    #[test]
    fn no_opponents_means_no_action() {
        let config = BattleConfig::default();
        let mut state = state(0, 1000);
        state.roster.unit_mut(UnitId(1)).unwrap().stats.hp = 0;
        let mut events: Vec<BattleEvent> = Vec::new();
        let mut engine =
            BattleEngine::new(&mut state, BattleEnv::with_defaults(&config), &mut events);
        engine.start_turn(UnitId(10));
        assert_eq!(engine.run_ai(UnitId(10)), None);
    }
}
