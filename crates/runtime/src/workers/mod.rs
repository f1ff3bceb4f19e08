//! Worker tasks that back the runtime orchestration.
//!
//! The arena worker owns the encounter and serializes every mutation; timers
//! are small sleep tasks that report back to it.

mod arena;
mod timer;

pub use arena::{ArenaWorker, Command};
pub use timer::TokioScheduler;
