use serde::{Deserialize, Serialize};

use combat_core::{ActorId, EncounterOutcome};

/// Encounter-level lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterEvent {
    /// The worker is running and autonomous actors have been started.
    Started {
        actors: usize,
        autonomous: usize,
    },
    /// One side has no living members left.
    Finished { outcome: EncounterOutcome },
    /// A timer fired for an actor whose completion was already cleared.
    StaleTimer { actor: ActorId },
}
