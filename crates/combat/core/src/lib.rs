//! Deterministic combat rules shared by the runtime and offline tools.
//!
//! `combat-core` defines the actor model, the closed action state machine, and
//! the [`Arena`] that schedules timed actions on top of it. Time, randomness,
//! and message output are injected through the [`Scheduler`],
//! [`RandomSource`], and [`MessageSink`] traits so the same rules run against a
//! [`VirtualClock`] in tests and against real timers in the runtime.
pub mod ambient;
pub mod arena;
pub mod config;
pub mod error;
pub mod machine;
pub mod notice;
pub mod random;
pub mod state;
pub mod timer;

pub use ambient::{AmbientLines, HealthBracket};
pub use arena::{Arena, CycleOutcome, DamageOutcome, EncounterOutcome};
pub use config::CombatConfig;
pub use error::{ArenaError, ErrorSeverity, IllegalAction, IllegalReason, InvariantViolation};
pub use machine::{
    ActionStateMachine, PostHook, TRANSITIONS, Transition, TransitionError, TransitionHooks,
    Trigger,
};
pub use notice::{MessageSink, Notice, NoticeKind, NullSink};
pub use random::{RandomSource, SequenceRandom, choose};
pub use state::{
    ActionKind, Actor, ActorId, ActorSnapshot, ActorState, ActorTemplate, Control, Roster,
    RosterEntry,
};
pub use timer::{Scheduler, TimerId, VirtualClock, Wakeup};
