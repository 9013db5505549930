use crate::events::{BattleEvent, DamageSource};
use crate::state::{StatusKind, StatusTick, UnitId};

use super::BattleEngine;

/// What remains of a turn after upkeep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upkeep {
    Act,
    /// An action-preventing status consumed the turn.
    Skip(StatusKind),
    /// Damage over time defeated the unit.
    Died,
}

impl<'a> BattleEngine<'a> {
    /// Turn-start processing for `unit`.
    ///
    /// Order: note whether a status prevents acting, restore buff chakra,
    /// then tick every status once. The prevention check happens before the
    /// tick so a one-turn stun still costs exactly one turn.
    pub(super) fn upkeep(&mut self, unit: UnitId) -> Upkeep {
        let Some(actor) = self.state.roster.unit_mut(unit) else {
            return Upkeep::Died;
        };
        let prevented = actor.statuses.preventing_action();
        let regen = actor.statuses.chakra_regen();
        let gained = actor.gain_chakra(regen);
        let ticks = actor.tick_statuses();
        let alive = actor.is_alive();

        self.chakra_changed(unit, gained as i32);
        for (tick, remaining_hp) in ticks {
            let event = match tick {
                StatusTick::Damage { kind, amount } => BattleEvent::Damage {
                    source: DamageSource::Status(kind),
                    target: unit,
                    amount,
                    is_critical: false,
                    absorbed: 0,
                    remaining_hp,
                },
                StatusTick::Heal { amount, .. } => BattleEvent::Healed {
                    target: unit,
                    amount,
                    remaining_hp,
                },
                StatusTick::Expired { kind } => BattleEvent::StatusExpired { unit, kind },
            };
            self.emit(event);
        }

        if !alive {
            self.note_if_defeated(unit);
            return Upkeep::Died;
        }
        match prevented {
            Some(kind) => Upkeep::Skip(kind),
            None => Upkeep::Act,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BattleConfig;
    use crate::engine::{BattleEngine, BattleEnv, Upkeep};
    use crate::env::BaseStats;
    use crate::events::{BattleEvent, DamageSource};
    use crate::state::{BattleState, Side, StatusKind, Unit, UnitId, UnitProfile};

    fn state(hp: u32) -> BattleState {
        let mut state = BattleState::default();
        state
            .roster
            .push_active(Unit::new(
                UnitId(1),
                "Naruto",
                Side::Player,
                BaseStats::new(hp, 100, 50, 100),
                UnitProfile::default(),
            ))
            .unwrap();
        state
    }

    #[test]
    fn poison_ticks_and_reports_damage() {
        let config = BattleConfig::default();
        let mut state = state(1000);
        state
            .roster
            .unit_mut(UnitId(1))
            .unwrap()
            .apply_status(StatusKind::Poison);
        let damage = StatusKind::Poison.profile().damage_per_turn;

        let mut events: Vec<BattleEvent> = Vec::new();
        let mut engine =
            BattleEngine::new(&mut state, BattleEnv::with_defaults(&config), &mut events);
        assert_eq!(engine.upkeep(UnitId(1)), Upkeep::Act);
        assert_eq!(
            engine.state().roster.unit(UnitId(1)).unwrap().stats.hp,
            1000 - damage
        );
        assert!(events.iter().any(|e| matches!(
            e,
            BattleEvent::Damage {
                source: DamageSource::Status(StatusKind::Poison),
                ..
            }
        )));
    }

    #[test]
    fn damage_events_follow_hp_step_by_step() {
        let config = BattleConfig::default();
        let mut state = state(1000);
        let unit = state.roster.unit_mut(UnitId(1)).unwrap();
        unit.apply_status(StatusKind::Poison);
        unit.apply_status(StatusKind::Bleed);

        let mut events: Vec<BattleEvent> = Vec::new();
        let mut engine =
            BattleEngine::new(&mut state, BattleEnv::with_defaults(&config), &mut events);
        engine.upkeep(UnitId(1));

        let remaining: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                BattleEvent::Damage { remaining_hp, .. } => Some(*remaining_hp),
                _ => None,
            })
            .collect();
        assert_eq!(remaining, vec![990, 982]);
    }

    #[test]
    fn lethal_tick_defeats_unit() {
        let config = BattleConfig::default();
        let mut state = state(1);
        state
            .roster
            .unit_mut(UnitId(1))
            .unwrap()
            .apply_status(StatusKind::Burn);

        let mut events: Vec<BattleEvent> = Vec::new();
        let mut engine =
            BattleEngine::new(&mut state, BattleEnv::with_defaults(&config), &mut events);
        assert_eq!(engine.upkeep(UnitId(1)), Upkeep::Died);
        assert_eq!(
            engine.state().roster.unit(UnitId(1)).unwrap().died_at_turn,
            Some(0)
        );
        assert!(events.contains(&BattleEvent::UnitDefeated { unit: UnitId(1) }));
    }

    #[test]
    fn paralysis_skips_even_on_last_turn() {
        let config = BattleConfig::default();
        let mut state = state(1000);
        let unit = state.roster.unit_mut(UnitId(1)).unwrap();
        unit.add_status(
            StatusKind::Paralysis,
            1,
            crate::state::StatusPayload::for_kind(StatusKind::Paralysis),
        );

        let mut events: Vec<BattleEvent> = Vec::new();
        let mut engine =
            BattleEngine::new(&mut state, BattleEnv::with_defaults(&config), &mut events);
        assert_eq!(engine.upkeep(UnitId(1)), Upkeep::Skip(StatusKind::Paralysis));
        assert!(
            !engine
                .state()
                .roster
                .unit(UnitId(1))
                .unwrap()
                .statuses
                .has(StatusKind::Paralysis)
        );
    }
}
