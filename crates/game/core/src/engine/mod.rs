//! Turn scheduling and action execution.
//!
//! The [`BattleEngine`] is the only code that mutates a [`BattleState`] during
//! combat. It advances speed gauges, hands out the turn lock, runs upkeep,
//! resolves actions and reports every change to an [`EventSink`]. Anything
//! random is drawn through the injected [`RngOracle`] with a seed derived from
//! the state's nonce, so the same inputs always replay the same battle.

mod actions;
mod ai;
mod turns;
mod upkeep;

pub use actions::{
    ATTACK_CHAKRA_GAIN, ActionError, DEFAULT_SECRET_TAG, GUARD_CHAKRA_GAIN, REVIVE_HP_PERCENT,
};
pub use ai::{AI_GUARD_THRESHOLD, AI_JUTSU_THRESHOLD, AI_LOW_HP_RATIO, AI_ULTIMATE_THRESHOLD};
pub use turns::TurnStart;
pub use upkeep::Upkeep;

use crate::combat::{BuffAggregator, DamageRolls, StatusBuffs};
use crate::config::BattleConfig;
use crate::env::{PcgRng, RngOracle, RollPurpose, compute_seed};
use crate::events::{BattleEvent, EventSink};
use crate::state::{BattleState, UnitId};

/// Read-only collaborators the engine needs for one call.
#[derive(Clone, Copy)]
pub struct BattleEnv<'a> {
    pub config: &'a BattleConfig,
    pub rng: &'a dyn RngOracle,
    pub buffs: &'a dyn BuffAggregator,
}

impl<'a> BattleEnv<'a> {
    pub fn new(
        config: &'a BattleConfig,
        rng: &'a dyn RngOracle,
        buffs: &'a dyn BuffAggregator,
    ) -> Self {
        Self { config, rng, buffs }
    }

    /// Default PCG rng and status-based buff aggregation.
    pub fn with_defaults(config: &'a BattleConfig) -> Self {
        Self::new(config, &PcgRng, &StatusBuffs)
    }
}

/// Battle engine bound to one state, one environment and one event sink.
///
/// Cheap to construct; hosts create one per call.
pub struct BattleEngine<'a> {
    state: &'a mut BattleState,
    env: BattleEnv<'a>,
    sink: &'a mut dyn EventSink,
}

impl<'a> BattleEngine<'a> {
    pub fn new(state: &'a mut BattleState, env: BattleEnv<'a>, sink: &'a mut dyn EventSink) -> Self {
        Self { state, env, sink }
    }

    pub fn state(&self) -> &BattleState {
        self.state
    }

    fn emit(&mut self, event: BattleEvent) {
        self.sink.emit(event);
    }

    /// Fresh seed for one roll on behalf of `unit`.
    fn seed_for(&mut self, unit: UnitId, purpose: RollPurpose) -> u64 {
        let nonce = self.state.next_nonce();
        compute_seed(self.state.seed, nonce, unit.0, purpose.context())
    }

    /// Uniform roll in `[0, 1)`.
    fn roll(&mut self, unit: UnitId, purpose: RollPurpose) -> f64 {
        let seed = self.seed_for(unit, purpose);
        self.env.rng.roll_unit(seed)
    }

    fn pick(&mut self, unit: UnitId, len: usize) -> usize {
        let seed = self.seed_for(unit, RollPurpose::AiTarget);
        self.env.rng.pick_index(seed, len)
    }

    fn damage_rolls(&mut self, attacker: UnitId) -> DamageRolls {
        let variance_seed = self.seed_for(attacker, RollPurpose::DamageVariance);
        let crit_seed = self.seed_for(attacker, RollPurpose::Critical);
        DamageRolls::draw(self.env.rng, variance_seed, crit_seed)
    }

    /// Records a death once and reports it.
    fn note_if_defeated(&mut self, unit: UnitId) {
        let turn = self.state.turn.global_turn;
        let Some(target) = self.state.roster.unit_mut(unit) else {
            return;
        };
        if target.is_alive() || target.died_at_turn.is_some() {
            return;
        }
        target.died_at_turn = Some(turn);
        target.speed_gauge = 0;
        target.statuses.clear();
        self.emit(BattleEvent::UnitDefeated { unit });
    }

    fn chakra_changed(&mut self, unit: UnitId, delta: i32) {
        if delta == 0 {
            return;
        }
        if let Some(chakra) = self.state.roster.unit(unit).map(|u| u.chakra) {
            self.emit(BattleEvent::ChakraChanged {
                unit,
                chakra,
                delta,
            });
        }
    }
}
