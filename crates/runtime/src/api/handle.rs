//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! player input, session controls and streaming events from specific topics.
use std::collections::HashMap;

use battle_core::{SessionSnapshot, UnitId};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::Instant;

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
    epoch: Instant,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus, epoch: Instant) -> Self {
        Self {
            command_tx,
            event_bus,
            epoch,
        }
    }

    /// Milliseconds since the runtime started, on the worker's clock.
    pub fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    // ========================================================================
    // Player input
    // ========================================================================

    /// Click `unit` at an explicit host time.
    ///
    /// Clicking the awaiting unit cycles its chakra mode; clicking an enemy
    /// executes the selected mode against it.
    pub async fn click_unit_at(&self, unit: UnitId, now_ms: u64) -> Result<()> {
        self.request(|reply| Command::ClickUnit {
            unit,
            now_ms,
            reply,
        })
        .await?
    }

    /// Click `unit` now.
    pub async fn click_unit(&self, unit: UnitId) -> Result<()> {
        self.click_unit_at(unit, self.now_ms()).await
    }

    pub async fn guard(&self) -> Result<()> {
        self.request(|reply| Command::Guard { reply }).await?
    }

    pub async fn swap(&self, active: UnitId, bench: UnitId) -> Result<()> {
        self.request(|reply| Command::Swap {
            active,
            bench,
            reply,
        })
        .await?
    }

    pub async fn multi_attack(&self) -> Result<()> {
        self.request(|reply| Command::MultiAttack { reply }).await?
    }

    pub async fn multi_jutsu(&self) -> Result<()> {
        self.request(|reply| Command::MultiJutsu { reply }).await?
    }

    pub async fn combo(&self, targets: Vec<UnitId>) -> Result<()> {
        self.request(|reply| Command::Combo { targets, reply })
            .await?
    }

    /// Fires `unit`'s charged Last Stand; `target` picks a single-enemy victim.
    pub async fn last_stand(&self, unit: UnitId, target: Option<UnitId>) -> Result<()> {
        self.request(|reply| Command::LastStand {
            unit,
            target,
            reply,
        })
        .await?
    }

    /// Ends the current turn; returns whether a turn was running.
    pub async fn force_end_turn(&self) -> Result<bool> {
        self.request(|reply| Command::ForceEndTurn { reply })
            .await?
    }

    // ========================================================================
    // Session controls
    // ========================================================================

    /// Flips auto mode and returns the new setting.
    pub async fn toggle_auto(&self) -> Result<bool> {
        self.request(|reply| Command::ToggleAuto { reply }).await
    }

    /// Advances the speed multiplier 1 -> 2 -> 3 -> 1 and returns it.
    pub async fn cycle_speed(&self) -> Result<u32> {
        self.request(|reply| Command::CycleSpeed { reply }).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.request(|reply| Command::Pause { reply }).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.request(|reply| Command::Resume { reply }).await
    }

    /// Query the current session (read-only snapshot)
    pub async fn query_snapshot(&self) -> Result<SessionSnapshot> {
        self.request(|reply| Command::QuerySnapshot { reply })
            .await
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Combat` - Damage, heals, statuses and chakra
    /// - `Topic::Turn` - Turn start/end/skip, awaiting input, controls
    /// - `Topic::Encounter` - Waves, stages, swaps, victory and defeat
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use battle_runtime::Topic;
    ///
    /// let mut encounter_rx = handle.subscribe(Topic::Encounter)?;
    /// while let Ok(event) = encounter_rx.recv().await {
    ///     if event.is_terminal() {
    ///         break;
    ///     }
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> Result<broadcast::Receiver<Event>> {
        self.event_bus
            .subscribe(topic)
            .ok_or(RuntimeError::EventBusClosed)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
