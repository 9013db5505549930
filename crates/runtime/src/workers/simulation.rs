//! Simulation worker that owns the authoritative [`battle_core::BattleSession`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), drives the
//! fixed-interval tick and publishes every battle event to the EventBus.

use std::time::Duration;

use battle_core::{BattleEvent, BattleSession, EventSink, SessionError, SessionSnapshot, UnitId};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

use crate::api::{Result, RuntimeError};
use crate::events::{Event, EventBus};

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Click on any unit while a player unit awaits input.
    ClickUnit {
        unit: UnitId,
        now_ms: u64,
        reply: oneshot::Sender<Result<()>>,
    },
    Guard {
        reply: oneshot::Sender<Result<()>>,
    },
    Swap {
        active: UnitId,
        bench: UnitId,
        reply: oneshot::Sender<Result<()>>,
    },
    MultiAttack {
        reply: oneshot::Sender<Result<()>>,
    },
    MultiJutsu {
        reply: oneshot::Sender<Result<()>>,
    },
    Combo {
        targets: Vec<UnitId>,
        reply: oneshot::Sender<Result<()>>,
    },
    LastStand {
        unit: UnitId,
        target: Option<UnitId>,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Ends the current turn; replies whether a turn was running.
    ForceEndTurn {
        reply: oneshot::Sender<Result<bool>>,
    },
    ToggleAuto {
        reply: oneshot::Sender<bool>,
    },
    CycleSpeed {
        reply: oneshot::Sender<u32>,
    },
    Pause {
        reply: oneshot::Sender<()>,
    },
    Resume {
        reply: oneshot::Sender<()>,
    },
    /// Query the current session (read-only snapshot).
    QuerySnapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

impl Command {
    fn label(&self) -> &'static str {
        match self {
            Command::ClickUnit { .. } => "click_unit",
            Command::Guard { .. } => "guard",
            Command::Swap { .. } => "swap",
            Command::MultiAttack { .. } => "multi_attack",
            Command::MultiJutsu { .. } => "multi_jutsu",
            Command::Combo { .. } => "combo",
            Command::LastStand { .. } => "last_stand",
            Command::ForceEndTurn { .. } => "force_end_turn",
            Command::ToggleAuto { .. } => "toggle_auto",
            Command::CycleSpeed { .. } => "cycle_speed",
            Command::Pause { .. } => "pause",
            Command::Resume { .. } => "resume",
            Command::QuerySnapshot { .. } => "query_snapshot",
        }
    }
}

/// Publishes session events to the bus with a stream-wide sequence number.
struct BusSink<'a> {
    bus: &'a EventBus,
    next_sequence: &'a mut u64,
}

impl<'a> BusSink<'a> {
    fn new(bus: &'a EventBus, next_sequence: &'a mut u64) -> Self {
        Self { bus, next_sequence }
    }
}

impl EventSink for BusSink<'_> {
    fn emit(&mut self, event: BattleEvent) {
        let sequence = *self.next_sequence;
        *self.next_sequence += 1;
        trace!(target: "runtime::bus", sequence, ?event, "publish");
        if event.is_terminal() {
            info!(target: "runtime::bus", sequence, "encounter finished");
        }
        self.bus.publish(Event::new(sequence, event));
    }
}

/// Background task that owns the session and processes commands.
///
/// The session is only ever touched from this task, so ticks and player
/// input are serialized through the `select!` loop.
pub struct SimulationWorker {
    session: BattleSession,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    epoch: Instant,
    tick_interval: Duration,
    next_sequence: u64,
}

impl SimulationWorker {
    pub fn new(
        session: BattleSession,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        epoch: Instant,
    ) -> Self {
        let tick_interval = Duration::from_millis(session.config().tick_interval_ms.max(1));
        info!(
            target: "runtime::worker",
            mission = session.mission_id(),
            difficulty = session.difficulty(),
            players = session.state().roster.active().len(),
            tick_ms = tick_interval.as_millis() as u64,
            "SimulationWorker initialized"
        );

        Self {
            session,
            command_rx,
            event_bus,
            epoch,
            tick_interval,
            next_sequence: 0,
        }
    }

    /// Main worker loop.
    ///
    /// Runs until every command sender is dropped or the session fails
    /// fatally. Ticking stops once the encounter is finished.
    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                maybe_cmd = self.command_rx.recv() => match maybe_cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = interval.tick(), if !self.session.is_finished() => {
                    if let Err(e) = self.handle_tick() {
                        error!(target: "runtime::worker", error = %e, "session tick failed, worker exiting");
                        return;
                    }
                }
            }
        }

        debug!(target: "runtime::worker", "command channel closed, worker exiting");
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn handle_tick(&mut self) -> std::result::Result<(), SessionError> {
        let now_ms = self.now_ms();
        let mut sink = BusSink::new(&self.event_bus, &mut self.next_sequence);
        self.session.tick(now_ms, &mut sink)
    }

    fn handle_command(&mut self, cmd: Command) {
        let label = cmd.label();
        trace!(target: "runtime::worker", command = label, "received");

        let mut sink = BusSink::new(&self.event_bus, &mut self.next_sequence);
        let session = &mut self.session;
        let delivered = match cmd {
            Command::ClickUnit {
                unit,
                now_ms,
                reply,
            } => reply
                .send(log_rejected(label, session.click_unit(unit, now_ms, &mut sink)))
                .is_ok(),
            Command::Guard { reply } => reply
                .send(log_rejected(label, session.guard(&mut sink)))
                .is_ok(),
            Command::Swap {
                active,
                bench,
                reply,
            } => reply
                .send(log_rejected(label, session.swap(active, bench, &mut sink)))
                .is_ok(),
            Command::MultiAttack { reply } => reply
                .send(log_rejected(label, session.multi_attack(&mut sink)))
                .is_ok(),
            Command::MultiJutsu { reply } => reply
                .send(log_rejected(label, session.multi_jutsu(&mut sink)))
                .is_ok(),
            Command::Combo { targets, reply } => reply
                .send(log_rejected(label, session.combo(&targets, &mut sink)))
                .is_ok(),
            Command::LastStand {
                unit,
                target,
                reply,
            } => reply
                .send(log_rejected(label, session.last_stand(unit, target, &mut sink)))
                .is_ok(),
            Command::ForceEndTurn { reply } => reply
                .send(log_rejected(label, session.force_end_turn(&mut sink)))
                .is_ok(),
            Command::ToggleAuto { reply } => reply.send(session.toggle_auto(&mut sink)).is_ok(),
            Command::CycleSpeed { reply } => reply.send(session.cycle_speed(&mut sink)).is_ok(),
            Command::Pause { reply } => {
                session.pause(&mut sink);
                reply.send(()).is_ok()
            }
            Command::Resume { reply } => {
                session.resume(&mut sink);
                reply.send(()).is_ok()
            }
            Command::QuerySnapshot { reply } => reply.send(session.snapshot()).is_ok(),
        };

        if !delivered {
            debug!(target: "runtime::worker", command = label, "reply channel closed (caller dropped)");
        }
    }
}

/// Converts a session result and logs input the session refused.
fn log_rejected<T>(command: &'static str, result: std::result::Result<T, SessionError>) -> Result<T> {
    result.map_err(|e| {
        let e = RuntimeError::from(e);
        if e.is_rejected_input() {
            debug!(target: "runtime::worker", command, error = %e, "input rejected");
        } else {
            warn!(target: "runtime::worker", command, error = %e, "command failed");
        }
        e
    })
}
