//! Topic-based event bus for runtime events.
//!
//! The simulation worker stamps every [`battle_core::BattleEvent`] with a
//! sequence number and publishes it to the topic it belongs to. Consumers
//! subscribe only to the topics they need.

mod bus;

pub use bus::{Event, EventBus, Topic};
