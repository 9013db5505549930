use crate::events::BattleEvent;
use crate::state::UnitId;

use super::{BattleEngine, Upkeep};

/// Result of a tick that handed out the turn lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnStart {
    /// The unit holds the lock and must act before the gauges move again.
    Act(UnitId),
    /// The unit's turn was consumed by upkeep and has already ended.
    Skipped(UnitId),
}

impl TurnStart {
    pub fn unit(self) -> UnitId {
        match self {
            Self::Act(unit) | Self::Skipped(unit) => unit,
        }
    }
}

/// Gauge scheduling methods for BattleEngine.
impl<'a> BattleEngine<'a> {
    /// One scheduler step.
    ///
    /// Does nothing while the session is paused or a unit holds the lock.
    /// Otherwise every living combatant gains gauge and the first one to reach
    /// the threshold, in combatant order, starts its turn.
    pub fn tick(&mut self) -> Option<TurnStart> {
        if self.state.turn.paused || self.state.turn.locked {
            return None;
        }
        self.advance_gauges();
        let ready = self.find_ready()?;
        Some(self.start_turn(ready))
    }

    /// Adds `effective_speed * speed_multiplier` to every living, unpaused
    /// combatant, capped at the gauge threshold.
    fn advance_gauges(&mut self) {
        let gauge_max = self.env.config.gauge_max;
        let multiplier = self.state.turn.speed_multiplier;
        let buffs = self.env.buffs;

        let combatants = self.state.roster.combatants().to_vec();
        for id in combatants {
            let Some(unit) = self.state.roster.unit_mut(id) else {
                continue;
            };
            if !unit.is_alive() || unit.is_paused {
                continue;
            }
            let speed = buffs.modifiers(unit).effective_speed(unit.stats.speed);
            let gain = speed.saturating_mul(multiplier);
            unit.speed_gauge = unit.speed_gauge.saturating_add(gain).min(gauge_max);
        }
    }

    fn find_ready(&self) -> Option<UnitId> {
        let gauge_max = self.env.config.gauge_max;
        self.state.roster.combatants().iter().copied().find(|id| {
            self.state
                .roster
                .unit(*id)
                .is_some_and(|u| u.is_alive() && u.speed_gauge >= gauge_max)
        })
    }

    /// Hands the lock to `unit`, pauses everyone else and runs upkeep.
    pub fn start_turn(&mut self, unit: UnitId) -> TurnStart {
        let gauge_max = self.env.config.gauge_max;
        self.state.turn.locked = true;
        self.state.turn.current = Some(unit);
        self.state.turn.global_turn += 1;
        let global_turn = self.state.turn.global_turn;

        let combatants = self.state.roster.combatants().to_vec();
        for id in combatants {
            if let Some(other) = self.state.roster.unit_mut(id) {
                other.is_paused = id != unit;
            }
        }
        if let Some(actor) = self.state.roster.unit_mut(unit) {
            actor.speed_gauge = gauge_max;
            actor.is_guarding = false;
        }

        self.emit(BattleEvent::TurnStarted { unit, global_turn });

        match self.upkeep(unit) {
            Upkeep::Act => TurnStart::Act(unit),
            Upkeep::Skip(reason) => {
                self.emit(BattleEvent::TurnSkipped { unit, reason });
                self.end_turn();
                TurnStart::Skipped(unit)
            }
            Upkeep::Died => {
                self.end_turn();
                TurnStart::Skipped(unit)
            }
        }
    }

    /// Releases the lock held by the current unit.
    ///
    /// Resets its chakra mode and gauge and lets every combatant move again.
    /// Returns `false` when no unit held the lock.
    pub fn end_turn(&mut self) -> bool {
        let Some(unit) = self.state.turn.current.take() else {
            return false;
        };
        self.state.turn.locked = false;

        if let Some(actor) = self.state.roster.unit_mut(unit) {
            actor.chakra_mode = crate::state::ChakraMode::None;
            actor.speed_gauge = 0;
        }
        let combatants = self.state.roster.combatants().to_vec();
        for id in combatants {
            if let Some(other) = self.state.roster.unit_mut(id) {
                other.is_paused = false;
            }
        }

        self.emit(BattleEvent::TurnEnded { unit });
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BattleConfig;
    use crate::engine::{BattleEngine, BattleEnv, TurnStart};
    use crate::env::BaseStats;
    use crate::events::BattleEvent;
    use crate::state::{BattleState, Side, StatusKind, Unit, UnitId, UnitProfile};

    fn unit(id: u32, side: Side, speed: u32) -> Unit {
        Unit::new(
            UnitId(id),
            format!("unit-{id}"),
            side,
            BaseStats::new(1000, 100, 50, speed),
            UnitProfile::default(),
        )
    }

    fn state() -> BattleState {
        let mut state = BattleState::default();
        state.roster.push_active(unit(1, Side::Player, 100)).unwrap();
        state
            .roster
            .set_enemies(vec![unit(2, Side::Enemy, 250)])
            .unwrap();
        state
    }

    #[test]
    fn faster_unit_reaches_threshold_first() {
        let config = BattleConfig::default();
        let mut state = state();
        let mut events: Vec<BattleEvent> = Vec::new();
        let mut engine = BattleEngine::new(&mut state, BattleEnv::with_defaults(&config), &mut events);

        let mut started = None;
        for _ in 0..20 {
            if let Some(start) = engine.tick() {
                started = Some(start);
                break;
            }
        }
        assert_eq!(started, Some(TurnStart::Act(UnitId(2))));
        assert!(engine.state().turn.locked);
        assert_eq!(engine.state().turn.global_turn, 1);
        assert!(engine.state().roster.unit(UnitId(1)).unwrap().is_paused);
    }

    #[test]
    fn locked_tick_leaves_gauges_alone() {
        let config = BattleConfig::default();
        let mut state = state();
        let mut events: Vec<BattleEvent> = Vec::new();
        let mut engine = BattleEngine::new(&mut state, BattleEnv::with_defaults(&config), &mut events);
        engine.start_turn(UnitId(1));
        let before = engine.state().roster.unit(UnitId(2)).unwrap().speed_gauge;
        assert!(engine.tick().is_none());
        assert_eq!(
            engine.state().roster.unit(UnitId(2)).unwrap().speed_gauge,
            before
        );
    }

    #[test]
    fn end_turn_resets_gauge_and_releases_lock() {
        let config = BattleConfig::default();
        let mut state = state();
        let mut events: Vec<BattleEvent> = Vec::new();
        let mut engine = BattleEngine::new(&mut state, BattleEnv::with_defaults(&config), &mut events);
        engine.start_turn(UnitId(1));
        assert!(engine.end_turn());
        assert!(!engine.end_turn());

        let state = engine.state();
        assert!(!state.turn.locked);
        assert_eq!(state.turn.current, None);
        assert_eq!(state.roster.unit(UnitId(1)).unwrap().speed_gauge, 0);
        assert!(state.roster.units().all(|u| !u.is_paused));
        assert!(events.contains(&BattleEvent::TurnEnded { unit: UnitId(1) }));
    }

    #[test]
    fn stunned_unit_skips_its_turn() {
        let config = BattleConfig::default();
        let mut state = state();
        state
            .roster
            .unit_mut(UnitId(1))
            .unwrap()
            .apply_status(StatusKind::Stun);
        let mut events: Vec<BattleEvent> = Vec::new();
        let mut engine = BattleEngine::new(&mut state, BattleEnv::with_defaults(&config), &mut events);

        assert_eq!(engine.start_turn(UnitId(1)), TurnStart::Skipped(UnitId(1)));
        assert!(!engine.state().turn.locked);
        assert!(events.contains(&BattleEvent::TurnSkipped {
            unit: UnitId(1),
            reason: StatusKind::Stun,
        }));
    }

    #[test]
    fn paused_session_does_not_advance() {
        let config = BattleConfig::default();
        let mut state = state();
        state.turn.paused = true;
        let mut events: Vec<BattleEvent> = Vec::new();
        let mut engine = BattleEngine::new(&mut state, BattleEnv::with_defaults(&config), &mut events);
        assert!(engine.tick().is_none());
        assert!(engine.state().roster.units().all(|u| u.speed_gauge == 0));
    }

    fn mixed_state() -> BattleState {
        let mut state = BattleState::default();
        state.roster.push_active(unit(1, Side::Player, 100)).unwrap();
        state.roster.push_active(unit(2, Side::Player, 175)).unwrap();
        state
            .roster
            .set_enemies(vec![unit(3, Side::Enemy, 90), unit(4, Side::Enemy, 240)])
            .unwrap();
        state
    }

    #[test]
    fn only_the_turn_holder_moves_across_many_turns() {
        let config = BattleConfig::default();
        let mut state = mixed_state();
        let mut events: Vec<BattleEvent> = Vec::new();
        let mut engine = BattleEngine::new(&mut state, BattleEnv::with_defaults(&config), &mut events);

        let mut turns = 0;
        for step in 0..600 {
            let started = engine.tick();
            let turn = &engine.state().turn;
            let roster = &engine.state().roster;
            match turn.current {
                Some(holder) => {
                    assert!(turn.locked);
                    for id in roster.combatants() {
                        let paused = roster.unit(*id).unwrap().is_paused;
                        assert_eq!(paused, *id != holder, "unit {id:?} at step {step}");
                    }
                }
                None => {
                    assert!(!turn.locked);
                    assert!(roster.units().all(|u| !u.is_paused));
                }
            }
            if let Some(TurnStart::Act(unit)) = started {
                turns += 1;
                // A locked scheduler hands out nothing until the holder ends.
                assert_eq!(engine.tick(), None);
                assert_eq!(engine.state().turn.current, Some(unit));
                assert!(engine.end_turn());
            }
        }
        assert!(turns > 20);
    }

    fn gauges(engine: &BattleEngine<'_>) -> Vec<(UnitId, u32)> {
        engine
            .state()
            .roster
            .units()
            .map(|u| (u.id, u.speed_gauge))
            .collect()
    }

    #[test]
    fn gauges_only_rise_until_the_turn_ends() {
        let config = BattleConfig::default();
        let mut state = mixed_state();
        let mut events: Vec<BattleEvent> = Vec::new();
        let mut engine = BattleEngine::new(&mut state, BattleEnv::with_defaults(&config), &mut events);

        let mut previous = gauges(&engine);
        let mut ended = 0;
        for _ in 0..400 {
            let started = engine.tick();
            let current = gauges(&engine);
            for ((id, before), (_, after)) in previous.iter().zip(&current) {
                assert!(after >= before, "gauge of {id:?} fell from {before} to {after}");
                assert!(*after <= config.gauge_max);
            }
            previous = current;

            if let Some(TurnStart::Act(unit)) = started {
                assert_eq!(
                    engine.state().roster.unit(unit).unwrap().speed_gauge,
                    config.gauge_max
                );
                engine.end_turn();
                assert_eq!(engine.state().roster.unit(unit).unwrap().speed_gauge, 0);
                ended += 1;
                previous = gauges(&engine);
            }
        }
        assert!(ended > 10);
    }

    #[test]
    fn simultaneous_threshold_goes_to_roster_order() {
        let config = BattleConfig::default();
        let mut state = BattleState::default();
        state.roster.push_active(unit(1, Side::Player, 100)).unwrap();
        state
            .roster
            .set_enemies(vec![unit(2, Side::Enemy, 100), unit(3, Side::Enemy, 60)])
            .unwrap();
        let mut events: Vec<BattleEvent> = Vec::new();
        let mut engine = BattleEngine::new(&mut state, BattleEnv::with_defaults(&config), &mut events);

        for _ in 0..11 {
            assert_eq!(engine.tick(), None);
        }
        assert_eq!(engine.tick(), Some(TurnStart::Act(UnitId(1))));
        assert_eq!(engine.state().turn.global_turn, 1);
        let waiting = engine.state().roster.unit(UnitId(2)).unwrap();
        assert_eq!(waiting.speed_gauge, config.gauge_max);
        assert!(waiting.is_paused);

        assert_eq!(engine.tick(), None);
        engine.end_turn();

        assert_eq!(engine.tick(), Some(TurnStart::Act(UnitId(2))));
        assert_eq!(engine.state().turn.global_turn, 2);
        assert_eq!(engine.state().roster.unit(UnitId(1)).unwrap().speed_gauge, 0);
        engine.end_turn();

        // The slower unit has not reached the threshold yet.
        assert_eq!(engine.tick(), None);
        assert_eq!(engine.state().turn.global_turn, 2);
    }
}
