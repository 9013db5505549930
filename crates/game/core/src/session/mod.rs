//! Battle session orchestration.
//!
//! A [`BattleSession`] owns one encounter: the battle state, the chakra gate,
//! the injected rng and buff aggregation, and the mission layout. Hosts drive
//! it with [`BattleSession::tick`] on a fixed interval and forward player input
//! through the click and control methods. Everything observable is reported
//! to the [`EventSink`] passed into each call.

mod builder;
mod commander;
mod progress;
mod support;
mod team;

pub use builder::SessionBuilder;
pub use commander::{
    COMMANDER_MAX_PERCENT, CommanderBuff, CommanderStat, apply_commander_buffs, commander_buffs,
};
pub use progress::{Advance, BattleSummary, Outcome, Progress};
pub use support::{
    BUDDY_SKILL_TAG, FIELD_SKILL_TAG, SUPPORT_BUFF_TURNS, apply_support_bonus, apply_support_skills,
};
pub use team::{
    DEFAULT_MEMBER_LEVEL, TeamMember, TeamSpec, build_enemy_unit, build_player_unit,
    speed_sickness_stacks,
};

use builder::Encounter;

use crate::chakra::ChakraGate;
use crate::combat::BuffAggregator;
use crate::config::BattleConfig;
use crate::engine::{ActionError, BattleEngine, BattleEnv, TurnStart};
use crate::env::RngOracle;
use crate::error::{BattleError, ErrorSeverity};
use crate::events::{BattleEvent, EventSink};
use crate::skill::SkillSlot;
use crate::state::{
    BattleState, ChakraMode, MissionModifiers, RosterError, Side, SwapError, UnitId,
};

/// Enemy stat growth per survival round.
pub const SURVIVAL_SCALING_PER_ROUND: f64 = 0.2;
/// Enemy hp and atk factor under the hard modifier.
pub const HARD_STAT_FACTOR: u32 = 2;

/// Errors raised while building or driving a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("unknown mission '{0}'")]
    UnknownMission(String),

    #[error("mission '{mission}' has no stages for difficulty '{difficulty}'")]
    NoStages { mission: String, difficulty: String },

    #[error("unknown character '{0}'")]
    UnknownCharacter(String),

    #[error("unknown last stand ultimate '{0}'")]
    UnknownLastStand(String),

    #[error("the active team is empty")]
    EmptyTeam,

    #[error("stage {stage} wave {wave} has {size} enemies")]
    WaveTooLarge {
        stage: usize,
        wave: usize,
        size: usize,
    },

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("no player unit is waiting for input")]
    NotAwaitingInput,

    #[error("the encounter has already ended")]
    Finished,

    #[error(transparent)]
    Swap(#[from] SwapError),

    #[error(transparent)]
    Action(#[from] ActionError),
}

impl BattleError for SessionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Swap(e) => e.severity(),
            Self::Action(e) => e.severity(),
            Self::NotAwaitingInput | Self::Finished => ErrorSeverity::Validation,
            _ => ErrorSeverity::Fatal,
        }
    }
}

/// Cloneable view of a session for presentation layers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionSnapshot {
    pub state: BattleState,
    pub progress: Progress,
    pub awaiting: Option<UnitId>,
    pub speed_run_failed: bool,
    pub summary: Option<BattleSummary>,
}

/// One encounter from first wave to victory or defeat.
pub struct BattleSession {
    state: BattleState,
    config: BattleConfig,
    gate: ChakraGate,
    rng: Box<dyn RngOracle>,
    buffs: Box<dyn BuffAggregator>,
    encounter: Encounter,
    progress: Progress,
    started: bool,
    start_ms: Option<u64>,
    speed_run_failed: bool,
    /// Player unit holding the turn lock and waiting for clicks.
    awaiting: Option<UnitId>,
    summary: Option<BattleSummary>,
}

impl BattleSession {
    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn mission_id(&self) -> &str {
        &self.encounter.mission_id
    }

    pub fn difficulty(&self) -> &str {
        &self.encounter.difficulty
    }

    pub fn awaiting(&self) -> Option<UnitId> {
        self.awaiting
    }

    pub fn summary(&self) -> Option<&BattleSummary> {
        self.summary.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.summary.is_some()
    }

    pub fn gate(&self) -> &ChakraGate {
        &self.gate
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state.clone(),
            progress: self.progress,
            awaiting: self.awaiting,
            speed_run_failed: self.speed_run_failed,
            summary: self.summary.clone(),
        }
    }

    fn engine<'s>(&'s mut self, sink: &'s mut dyn EventSink) -> BattleEngine<'s> {
        let env = BattleEnv::new(&self.config, self.rng.as_ref(), self.buffs.as_ref());
        BattleEngine::new(&mut self.state, env, sink)
    }

    // ========================================================================
    // Main loop
    // ========================================================================

    /// Loads the first wave. Called implicitly by the first tick.
    pub fn start(&mut self, sink: &mut dyn EventSink) -> Result<(), SessionError> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        self.load_wave(0, 0, sink)
    }

    /// One scheduler step at host time `now_ms`.
    ///
    /// Order: speed-run clock, click window expiry, pause check, pending auto
    /// turn, gauge advance, then victory/defeat detection.
    pub fn tick(&mut self, now_ms: u64, sink: &mut dyn EventSink) -> Result<(), SessionError> {
        if self.is_finished() {
            return Ok(());
        }
        self.start(sink)?;
        let started_at = *self.start_ms.get_or_insert(now_ms);
        self.check_speed_run(now_ms.saturating_sub(started_at), sink);
        self.expire_clicks(now_ms, sink);

        if self.state.turn.paused {
            return Ok(());
        }

        if let Some(actor) = self.awaiting {
            if self.state.turn.auto_mode {
                self.awaiting = None;
                self.play_ai_turn(actor, sink);
                return self.check_outcome(sink);
            }
            return Ok(());
        }

        let started = self.engine(sink).tick();
        if let Some(TurnStart::Act(actor)) = started {
            let human = self
                .state
                .roster
                .unit(actor)
                .is_some_and(|u| u.is_player())
                && !self.state.turn.auto_mode;
            if human {
                self.awaiting = Some(actor);
                sink.emit(BattleEvent::AwaitingInput { unit: actor });
            } else {
                self.play_ai_turn(actor, sink);
            }
        }
        self.check_outcome(sink)
    }

    fn play_ai_turn(&mut self, actor: UnitId, sink: &mut dyn EventSink) {
        self.reset_mode(actor, sink);
        let mut engine = self.engine(sink);
        engine.run_ai(actor);
        engine.end_turn();
    }

    fn check_speed_run(&mut self, elapsed_ms: u64, sink: &mut dyn EventSink) {
        if self.state.modifiers.contains(MissionModifiers::SPEED_RUN)
            && !self.speed_run_failed
            && elapsed_ms > self.config.speed_run_limit_ms
        {
            self.speed_run_failed = true;
            sink.emit(BattleEvent::SpeedRunFailed { elapsed_ms });
        }
    }

    fn expire_clicks(&mut self, now_ms: u64, sink: &mut dyn EventSink) {
        for unit in self.gate.expired(now_ms) {
            self.set_mode(unit, ChakraMode::None, sink);
        }
    }

    fn set_mode(&mut self, unit: UnitId, mode: ChakraMode, sink: &mut dyn EventSink) {
        let Some(target) = self.state.roster.unit_mut(unit) else {
            return;
        };
        if target.chakra_mode != mode {
            target.chakra_mode = mode;
            sink.emit(BattleEvent::ChakraModeChanged { unit, mode });
        }
    }

    fn reset_mode(&mut self, unit: UnitId, sink: &mut dyn EventSink) {
        self.gate.forget(unit);
        self.set_mode(unit, ChakraMode::None, sink);
    }

    // ========================================================================
    // Waves and outcome
    // ========================================================================

    fn load_wave(
        &mut self,
        stage: usize,
        wave: usize,
        sink: &mut dyn EventSink,
    ) -> Result<(), SessionError> {
        if self.state.turn.locked {
            self.awaiting = None;
            self.engine(sink).end_turn();
        }
        self.progress.stage = stage;
        self.progress.wave = wave;

        let hard = self.state.modifiers.contains(MissionModifiers::HARD);
        let scale = 1.0 + SURVIVAL_SCALING_PER_ROUND * f64::from(self.progress.survival_round);
        let scaled = |value: u32| (f64::from(value) * scale).round() as u32;

        let slots = self.encounter.wave(stage, wave).to_vec();
        let mut enemies = Vec::with_capacity(slots.len());
        for (index, slot) in slots.iter().enumerate() {
            let mut unit = build_enemy_unit(
                &mut self.state,
                &slot.id,
                slot.template.as_ref(),
                index as u8,
                &self.config,
            );
            if hard {
                unit.stats.hp = unit.stats.hp.saturating_mul(HARD_STAT_FACTOR);
                unit.stats.max_hp = unit.stats.max_hp.saturating_mul(HARD_STAT_FACTOR);
                unit.stats.atk = unit.stats.atk.saturating_mul(HARD_STAT_FACTOR);
            }
            if self.progress.survival_round > 0 {
                unit.stats.hp = scaled(unit.stats.hp);
                unit.stats.max_hp = scaled(unit.stats.max_hp);
                unit.stats.atk = scaled(unit.stats.atk);
            }
            unit.speed_gauge = team::roll_initial_gauge(
                &mut self.state,
                self.rng.as_ref(),
                &unit,
                &self.config,
            );
            enemies.push(unit);
        }
        let ids: Vec<UnitId> = enemies.iter().map(|u| u.id).collect();
        self.state.roster.set_enemies(enemies)?;

        let active: Vec<UnitId> = self.state.roster.active().iter().map(|u| u.id).collect();
        for id in active {
            let Some(unit) = self.state.roster.unit(id).cloned() else {
                continue;
            };
            let gauge =
                team::roll_initial_gauge(&mut self.state, self.rng.as_ref(), &unit, &self.config);
            if let Some(unit) = self.state.roster.unit_mut(id) {
                unit.speed_gauge = gauge;
                unit.is_guarding = false;
                unit.is_paused = false;
            }
        }

        sink.emit(BattleEvent::WaveStarted {
            stage,
            wave,
            enemies: ids,
        });
        Ok(())
    }

    /// Detects a wiped side and advances or ends the encounter exactly once.
    fn check_outcome(&mut self, sink: &mut dyn EventSink) -> Result<(), SessionError> {
        if self.is_finished() || self.state.turn.locked {
            return Ok(());
        }
        if self.state.roster.is_wiped(Side::Player) {
            self.finish(Outcome::Defeat, sink);
            return Ok(());
        }
        if !self.state.roster.is_wiped(Side::Enemy) {
            return Ok(());
        }

        let waves = self.encounter.wave_counts();
        match self.progress.advance(&waves, self.state.modifiers) {
            Advance::NextWave { stage, wave } => self.load_wave(stage, wave, sink),
            Advance::NextStage { cleared, stage } => {
                sink.emit(BattleEvent::StageCleared { stage: cleared });
                self.load_wave(stage, 0, sink)
            }
            Advance::Survival { round } => {
                let (stage, wave) = (self.progress.stage, self.progress.wave);
                if self.encounter.wave(stage, wave).is_empty() {
                    self.finish(Outcome::Victory, sink);
                    return Ok(());
                }
                self.progress.survival_round = round;
                self.load_wave(stage, wave, sink)
            }
            Advance::Victory => {
                self.finish(Outcome::Victory, sink);
                Ok(())
            }
        }
    }

    fn finish(&mut self, outcome: Outcome, sink: &mut dyn EventSink) {
        self.awaiting = None;
        self.engine(sink).end_turn();
        self.gate.clear();
        self.state.turn.paused = true;

        let summary = BattleSummary::collect(
            outcome,
            &self.state.roster,
            &self.progress,
            self.state.modifiers,
            self.speed_run_failed,
        );
        self.summary = Some(summary.clone());
        sink.emit(match outcome {
            Outcome::Victory => BattleEvent::Victory { summary },
            Outcome::Defeat => BattleEvent::Defeat { summary },
        });
    }

    // ========================================================================
    // Player input
    // ========================================================================

    fn ensure_running(&self) -> Result<(), SessionError> {
        if self.is_finished() {
            Err(SessionError::Finished)
        } else {
            Ok(())
        }
    }

    /// Click on any unit while a player unit awaits input.
    ///
    /// Clicking the acting unit cycles its chakra mode through the gate.
    /// Clicking an enemy executes the selected mode against it (NONE attacks,
    /// SECRET falls back to the ultimate when no secret is castable) and the
    /// mode returns to NONE whatever the outcome. Clicking an ally drops the
    /// click count.
    pub fn click_unit(
        &mut self,
        unit: UnitId,
        now_ms: u64,
        sink: &mut dyn EventSink,
    ) -> Result<(), SessionError> {
        self.ensure_running()?;
        let actor = self.awaiting.ok_or(SessionError::NotAwaitingInput)?;

        if unit == actor {
            let Some(acting) = self.state.roster.unit_mut(actor) else {
                return Err(SessionError::NotAwaitingInput);
            };
            let before = acting.chakra_mode;
            let outcome = self.gate.click(acting, now_ms);
            if let Some(previous) = outcome.superseded {
                self.set_mode(previous, ChakraMode::None, sink);
            }
            if outcome.mode != before {
                sink.emit(BattleEvent::ChakraModeChanged {
                    unit: actor,
                    mode: outcome.mode,
                });
            }
            return Ok(());
        }

        let side = self.state.roster.unit(unit).map(|u| u.side);
        if side != Some(Side::Enemy) {
            self.reset_mode(actor, sink);
            return Ok(());
        }

        let mode = self
            .state
            .roster
            .unit(actor)
            .map_or(ChakraMode::None, |u| u.chakra_mode);
        self.reset_mode(actor, sink);
        self.player_action(sink, |engine, actor| match mode {
            ChakraMode::None => engine.attack(actor, unit),
            ChakraMode::Jutsu => engine.jutsu(actor, unit),
            ChakraMode::Ultimate => engine.ultimate(actor),
            ChakraMode::Secret if engine.can_use(actor, SkillSlot::Secret) => engine.secret(actor),
            ChakraMode::Secret => engine.ultimate(actor),
        })
    }

    pub fn guard(&mut self, sink: &mut dyn EventSink) -> Result<(), SessionError> {
        self.player_action(sink, |engine, actor| engine.guard(actor))
    }

    /// Basic attack on every living enemy.
    pub fn multi_attack(&mut self, sink: &mut dyn EventSink) -> Result<(), SessionError> {
        self.player_action(sink, |engine, actor| {
            let targets = engine.living_opponents(actor);
            engine.multi_attack(actor, &targets)
        })
    }

    /// Jutsu on every living enemy.
    pub fn multi_jutsu(&mut self, sink: &mut dyn EventSink) -> Result<(), SessionError> {
        self.player_action(sink, |engine, actor| {
            let targets = engine.living_opponents(actor);
            engine.multi_jutsu(actor, &targets)
        })
    }

    /// Proximity combo on the listed enemies.
    pub fn combo(
        &mut self,
        targets: &[UnitId],
        sink: &mut dyn EventSink,
    ) -> Result<(), SessionError> {
        self.player_action(sink, |engine, actor| engine.combo(actor, targets))
    }

    /// Fires a charged Last Stand for `unit`.
    ///
    /// A free action: it needs no turn and leaves the scheduler alone, unless
    /// it wipes the enemy wave, in which case the waiting turn is released so
    /// the wave can advance.
    pub fn last_stand(
        &mut self,
        unit: UnitId,
        target: Option<UnitId>,
        sink: &mut dyn EventSink,
    ) -> Result<(), SessionError> {
        self.ensure_running()?;
        if !self.state.roster.unit(unit).is_some_and(|u| u.is_player()) {
            return Err(ActionError::CannotAct(unit).into());
        }
        self.engine(sink).last_stand(unit, target)?;

        if self.state.roster.is_wiped(Side::Enemy) {
            if let Some(actor) = self.awaiting.take() {
                self.reset_mode(actor, sink);
            }
            self.engine(sink).end_turn();
        }
        self.check_outcome(sink)
    }

    /// Runs `action` for the awaiting unit and ends its turn unless the
    /// failure lets the player choose again.
    fn player_action<F>(&mut self, sink: &mut dyn EventSink, action: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut BattleEngine<'_>, UnitId) -> Result<(), ActionError>,
    {
        self.ensure_running()?;
        let actor = self.awaiting.ok_or(SessionError::NotAwaitingInput)?;

        let result = {
            let mut engine = self.engine(sink);
            action(&mut engine, actor)
        };
        let wastes_turn = match &result {
            Ok(()) => true,
            Err(error) => matches!(error, ActionError::InvalidTarget(_) | ActionError::NoTargets),
        };
        if wastes_turn {
            self.awaiting = None;
            self.reset_mode(actor, sink);
            self.engine(sink).end_turn();
            self.check_outcome(sink)?;
        }
        result.map_err(SessionError::from)
    }

    /// Exchanges an active unit with the bench unit of the same slot.
    pub fn swap(
        &mut self,
        active: UnitId,
        bench: UnitId,
        sink: &mut dyn EventSink,
    ) -> Result<(), SessionError> {
        self.ensure_running()?;
        let acting = self.state.acting_unit().map(|u| u.id);
        self.state.roster.swap(active, bench, acting)?;
        self.gate.forget(active);
        sink.emit(BattleEvent::Swapped {
            outgoing: active,
            incoming: bench,
        });
        Ok(())
    }

    /// Ends the current turn without an action.
    pub fn force_end_turn(&mut self, sink: &mut dyn EventSink) -> Result<bool, SessionError> {
        self.ensure_running()?;
        if let Some(actor) = self.awaiting.take() {
            self.reset_mode(actor, sink);
        }
        let ended = self.engine(sink).end_turn();
        self.check_outcome(sink)?;
        Ok(ended)
    }

    // ========================================================================
    // Controls
    // ========================================================================

    pub fn toggle_auto(&mut self, sink: &mut dyn EventSink) -> bool {
        let enabled = !self.state.turn.auto_mode;
        self.state.turn.auto_mode = enabled;
        sink.emit(BattleEvent::AutoModeChanged { enabled });
        enabled
    }

    pub fn cycle_speed(&mut self, sink: &mut dyn EventSink) -> u32 {
        let multiplier = self.state.turn.cycle_speed();
        sink.emit(BattleEvent::SpeedChanged { multiplier });
        multiplier
    }

    pub fn pause(&mut self, sink: &mut dyn EventSink) {
        if self.is_finished() || self.state.turn.paused {
            return;
        }
        self.state.turn.paused = true;
        sink.emit(BattleEvent::Paused);
    }

    pub fn resume(&mut self, sink: &mut dyn EventSink) {
        if self.is_finished() || !self.state.turn.paused {
            return;
        }
        self.state.turn.paused = false;
        sink.emit(BattleEvent::Resumed);
    }
}

#[cfg(test)]
mod tests;
