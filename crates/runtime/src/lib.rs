//! Runtime orchestration for the deterministic battle simulation.
//!
//! This crate wires together the action provider abstraction, the event bus
//! and the simulation worker into a cohesive runtime API. Consumers embed
//! [`Runtime`] to drive an encounter, subscribe to events, and send player
//! input through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{
    ActionProvider, GreedyProvider, PlayerIntent, ProviderKind, Result, RuntimeError,
    RuntimeHandle,
};
pub use events::{Event, EventBus, Topic};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
