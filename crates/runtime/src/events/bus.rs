//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use battle_core::BattleEvent;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Hits, heals, statuses and chakra
    Combat,
    /// Turn flow and session controls
    Turn,
    /// Waves, stages, swaps and the final outcome
    Encounter,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Combat, Topic::Turn, Topic::Encounter];

    /// Routes a battle event to its topic.
    pub fn of(event: &BattleEvent) -> Topic {
        match event {
            BattleEvent::TurnStarted { .. }
            | BattleEvent::AwaitingInput { .. }
            | BattleEvent::TurnSkipped { .. }
            | BattleEvent::TurnEnded { .. }
            | BattleEvent::Paused
            | BattleEvent::Resumed
            | BattleEvent::SpeedChanged { .. }
            | BattleEvent::AutoModeChanged { .. } => Topic::Turn,

            BattleEvent::Swapped { .. }
            | BattleEvent::WaveStarted { .. }
            | BattleEvent::StageCleared { .. }
            | BattleEvent::SpeedRunFailed { .. }
            | BattleEvent::Victory { .. }
            | BattleEvent::Defeat { .. } => Topic::Encounter,

            BattleEvent::ActionPerformed { .. }
            | BattleEvent::Damage { .. }
            | BattleEvent::Dodged { .. }
            | BattleEvent::Healed { .. }
            | BattleEvent::Guarding { .. }
            | BattleEvent::UnitDefeated { .. }
            | BattleEvent::UnitRevived { .. }
            | BattleEvent::StatusApplied { .. }
            | BattleEvent::StatusNullified { .. }
            | BattleEvent::StatusExpired { .. }
            | BattleEvent::StatusCleansed { .. }
            | BattleEvent::BuffApplied { .. }
            | BattleEvent::ChakraChanged { .. }
            | BattleEvent::ChakraModeChanged { .. }
            | BattleEvent::LastStandReady { .. } => Topic::Combat,
        }
    }
}

/// Battle event stamped with its position in the session's event stream.
///
/// Sequences are global across topics so consumers of several topics can
/// restore the emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub sequence: u64,
    pub payload: BattleEvent,
}

impl Event {
    pub fn new(sequence: u64, payload: BattleEvent) -> Self {
        Self { sequence, payload }
    }

    pub fn topic(&self) -> Topic {
        Topic::of(&self.payload)
    }

    pub fn is_terminal(&self) -> bool {
        self.payload.is_terminal()
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about.
pub struct EventBus {
    channels: Arc<RwLock<HashMap<Topic, broadcast::Sender<Event>>>>,
}

impl EventBus {
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let channels = Topic::ALL
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity).0))
            .collect();

        Self {
            channels: Arc::new(RwLock::new(channels)),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();

        // Events are best-effort; skip rather than block the worker.
        match self.channels.try_read() {
            Ok(channels) => {
                if let Some(tx) = channels.get(&topic)
                    && tx.send(event).is_err()
                {
                    tracing::trace!(target: "runtime::bus", ?topic, "no subscribers");
                }
            }
            Err(_) => {
                tracing::debug!(target: "runtime::bus", ?topic, "event bus lock contended, event dropped");
            }
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns `None` only when the channel table is being modified.
    pub fn subscribe(&self, topic: Topic) -> Option<broadcast::Receiver<Event>> {
        let channels = self.channels.try_read().ok()?;
        channels.get(&topic).map(broadcast::Sender::subscribe)
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        let Ok(channels) = self.channels.try_read() else {
            return HashMap::new();
        };
        topics
            .iter()
            .filter_map(|&topic| channels.get(&topic).map(|tx| (topic, tx.subscribe())))
            .collect()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::UnitId;

    #[tokio::test]
    async fn routes_events_by_topic() {
        let bus = EventBus::with_capacity(8);
        let mut turn = bus.subscribe(Topic::Turn).unwrap();
        let mut combat = bus.subscribe(Topic::Combat).unwrap();

        bus.publish(Event::new(0, BattleEvent::TurnStarted {
            unit: UnitId(1),
            global_turn: 1,
        }));
        bus.publish(Event::new(1, BattleEvent::Guarding { unit: UnitId(1) }));

        assert_eq!(turn.recv().await.unwrap().sequence, 0);
        assert_eq!(combat.recv().await.unwrap().sequence, 1);
        assert!(turn.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let bus = EventBus::default();
        bus.publish(Event::new(0, BattleEvent::Paused));
        assert_eq!(bus.subscribe_multiple(&Topic::ALL).len(), 3);
    }

    #[test]
    fn events_serialize_with_their_sequence() {
        let event = Event::new(4, BattleEvent::SpeedChanged { multiplier: 2 });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["sequence"], 4);

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back.payload, event.payload);
    }
}
