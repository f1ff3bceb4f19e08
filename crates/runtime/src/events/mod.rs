//! Topic-based event bus for runtime events.
//!
//! Every notice the arena emits is published to one topic, and consumers can
//! subscribe only to the topics they need.

mod bus;
mod sink;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use sink::BusSink;
pub use types::EncounterEvent;
