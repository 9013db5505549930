//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels,
//! and exposes a builder-based API for clients to drive an encounter.

use std::time::Duration;

use battle_core::{
    BattleConfig, BattleSession, BattleSummary, ContentOracle, MissionModifiers, SessionBuilder,
    SessionSnapshot, TeamSpec, UnitId,
};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::api::{
    ActionProvider, PlayerIntent, ProviderKind, Result, RuntimeError, RuntimeHandle,
};
use crate::events::{Event, EventBus, Topic};
use crate::workers::{Command, SimulationWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub battle_config: BattleConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Battle seed; a random one is drawn at build time when absent.
    pub seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            battle_config: BattleConfig::default(),
            event_buffer_size: EventBus::DEFAULT_CAPACITY,
            command_buffer_size: 32,
            seed: None,
        }
    }
}

/// How long [`Runtime::run_to_completion`] waits for an event before
/// re-checking the session.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Main runtime that orchestrates one encounter.
///
/// Design: Runtime owns the worker and the player provider.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    player_provider: Option<Box<dyn ActionProvider>>,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Subscribe to events from one topic
    pub fn subscribe(&self, topic: Topic) -> Result<broadcast::Receiver<Event>> {
        self.handle.subscribe(topic)
    }

    /// Set the player action provider
    pub fn set_player_provider(&mut self, provider: impl ActionProvider + 'static) {
        self.player_provider = Some(Box::new(provider));
    }

    /// Drives the encounter until victory or defeat and returns the summary.
    ///
    /// The player provider is consulted whenever a player unit awaits input
    /// while auto mode is off and the session is not paused. In auto mode no
    /// provider is needed.
    pub async fn run_to_completion(&mut self) -> Result<BattleSummary> {
        let mut signals = self
            .handle
            .subscribe_multiple(&[Topic::Turn, Topic::Encounter]);
        let (Some(mut turn_rx), Some(mut encounter_rx)) = (
            signals.remove(&Topic::Turn),
            signals.remove(&Topic::Encounter),
        ) else {
            return Err(RuntimeError::EventBusClosed);
        };

        loop {
            let snapshot = self.handle.query_snapshot().await?;
            if let Some(summary) = snapshot.summary {
                info!(
                    target: "runtime",
                    outcome = %summary.outcome,
                    stage = summary.stage,
                    wave = summary.wave,
                    "encounter complete"
                );
                return Ok(summary);
            }

            let turn = &snapshot.state.turn;
            if let Some(actor) = snapshot.awaiting
                && !turn.auto_mode
                && !turn.paused
            {
                self.serve_input(actor, &snapshot).await?;
                continue;
            }

            wait_for_signal(&mut turn_rx, &mut encounter_rx).await?;
        }
    }

    /// Asks the player provider for `actor`'s intent and applies it.
    ///
    /// Input the session rejects ends the turn so the encounter keeps moving.
    async fn serve_input(&self, actor: UnitId, snapshot: &SessionSnapshot) -> Result<()> {
        let provider = self
            .player_provider
            .as_ref()
            .ok_or(RuntimeError::ProviderNotSet {
                kind: ProviderKind::Player,
            })?;

        let intent = provider.provide_intent(actor, snapshot).await?;
        debug!(target: "runtime", unit = %actor, ?intent, "player intent");

        match self.apply_intent(actor, intent).await {
            Err(e) if e.is_rejected_input() => {
                warn!(target: "runtime", unit = %actor, error = %e, "intent rejected, ending turn");
                let still_waiting = self.handle.query_snapshot().await?.awaiting == Some(actor);
                if still_waiting {
                    self.handle.force_end_turn().await?;
                }
                Ok(())
            }
            other => other,
        }
    }

    async fn apply_intent(&self, actor: UnitId, intent: PlayerIntent) -> Result<()> {
        match intent {
            PlayerIntent::Strike { clicks, target } => {
                for _ in 0..clicks {
                    self.handle.click_unit(actor).await?;
                }
                self.handle.click_unit(target).await
            }
            PlayerIntent::Guard => self.handle.guard().await,
            PlayerIntent::MultiAttack => self.handle.multi_attack().await,
            PlayerIntent::MultiJutsu => self.handle.multi_jutsu().await,
            PlayerIntent::Combo { targets } => self.handle.combo(targets).await,
            PlayerIntent::LastStand { unit, target } => self.handle.last_stand(unit, target).await,
            PlayerIntent::EndTurn => self.handle.force_end_turn().await.map(|_| ()),
        }
    }

    /// Shutdown the runtime gracefully
    ///
    /// Waits for the worker, so every other handle clone must be dropped first.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)
    }
}

/// Waits for any turn or encounter event, or the idle poll interval.
async fn wait_for_signal(
    turn_rx: &mut broadcast::Receiver<Event>,
    encounter_rx: &mut broadcast::Receiver<Event>,
) -> Result<()> {
    let signal = tokio::time::timeout(IDLE_POLL, async {
        tokio::select! {
            received = turn_rx.recv() => received,
            received = encounter_rx.recv() => received,
        }
    })
    .await;

    match signal {
        Ok(Err(RecvError::Closed)) => Err(RuntimeError::EventBusClosed),
        Ok(Err(RecvError::Lagged(skipped))) => {
            debug!(target: "runtime", skipped, "event receiver lagged");
            Ok(())
        }
        Ok(Ok(_)) | Err(_) => Ok(()),
    }
}

/// Builder for [`Runtime`] with flexible configuration.
///
/// Either provide content plus a mission and team, or a prebuilt session.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    content: Option<Box<dyn ContentOracle>>,
    mission_id: String,
    difficulty: Option<String>,
    team: TeamSpec,
    modifiers: MissionModifiers,
    speed: u32,
    auto_mode: bool,
    session: Option<BattleSession>,
    event_bus: Option<EventBus>,
    player_provider: Option<Box<dyn ActionProvider>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            content: None,
            mission_id: String::new(),
            difficulty: None,
            team: TeamSpec::default(),
            modifiers: MissionModifiers::empty(),
            speed: 1,
            auto_mode: false,
            session: None,
            event_bus: None,
            player_provider: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Content the session is built from
    pub fn content(mut self, content: impl ContentOracle + 'static) -> Self {
        self.content = Some(Box::new(content));
        self
    }

    pub fn mission(mut self, mission_id: impl Into<String>) -> Self {
        self.mission_id = mission_id.into();
        self
    }

    /// Difficulty key; the session falls back to the first authored one.
    pub fn difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    pub fn team(mut self, team: TeamSpec) -> Self {
        self.team = team;
        self
    }

    pub fn modifiers(mut self, modifiers: MissionModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Initial speed multiplier (1-3)
    pub fn speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self
    }

    /// Let the engine AI drive player units
    pub fn auto_mode(mut self, enabled: bool) -> Self {
        self.auto_mode = enabled;
        self
    }

    /// Run an already built session instead of building one from content
    pub fn session(mut self, session: BattleSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Publish to an existing bus.
    ///
    /// Subscribing to it before `build` guarantees no event is missed.
    pub fn event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Set player action provider (optional in auto mode)
    pub fn player_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.player_provider = Some(Box::new(provider));
        self
    }

    fn build_session(&mut self) -> Result<BattleSession> {
        if let Some(session) = self.session.take() {
            return Ok(session);
        }
        let content = self.content.as_deref().ok_or(RuntimeError::MissingContent)?;
        let seed = self.config.seed.unwrap_or_else(rand::random);
        info!(target: "runtime", seed, mission = %self.mission_id, "building session");

        let mut builder = SessionBuilder::new(content, self.mission_id.clone())
            .team(self.team.clone())
            .config(self.config.battle_config.clone())
            .modifiers(self.modifiers)
            .seed(seed)
            .speed(self.speed)
            .auto_mode(self.auto_mode);
        if let Some(difficulty) = &self.difficulty {
            builder = builder.difficulty(difficulty.clone());
        }
        Ok(builder.build()?)
    }

    /// Build the runtime and spawn its worker
    pub async fn build(mut self) -> Result<Runtime> {
        let session = self.build_session()?;

        let (command_tx, command_rx) =
            tokio::sync::mpsc::channel::<Command>(self.config.command_buffer_size.max(1));
        let event_bus = self
            .event_bus
            .take()
            .unwrap_or_else(|| EventBus::with_capacity(self.config.event_buffer_size));
        let epoch = Instant::now();

        let handle = RuntimeHandle::new(command_tx, event_bus.clone(), epoch);
        let sim_worker = SimulationWorker::new(session, command_rx, event_bus, epoch);
        let sim_worker_handle = tokio::spawn(sim_worker.run());

        Ok(Runtime {
            handle,
            player_provider: self.player_provider,
            sim_worker_handle,
        })
    }
}
