//! Async runtime hosting a combat encounter.
//!
//! The [`combat_core::Arena`] is owned by a single worker task. Clients talk
//! to it through a cloneable [`RuntimeHandle`], and every notice the arena
//! emits is broadcast on the topic-based [`EventBus`]. Action completions and
//! decision cycles run on real tokio timers.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`workers`] keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{BusSink, EncounterEvent, Event, EventBus, Topic};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
