//! Actor data model.
//!
//! Actors are owned by the [`crate::Arena`]; everything outside the arena
//! observes them through shared references or [`ActorSnapshot`] copies and
//! mutates them only through arena operations.
pub mod actor;
pub mod roster;

use core::fmt;

pub use actor::{Actor, ActorSnapshot, ActorTemplate};
pub use roster::{Roster, RosterEntry};

use crate::machine::Trigger;

/// Stable identifier of an actor inside one arena.
///
/// Identifiers are handed out sequentially and never reused, so a stale
/// target reference can always be detected by looking the id up again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Behavioral state of an actor. `Dead` is terminal.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ActorState {
    #[default]
    Idle,
    Attacking,
    Defending,
    Dead,
}

impl ActorState {
    /// Returns true while a timed action is in flight.
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Attacking | Self::Defending)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Dead)
    }
}

/// Who decides what an actor does next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Control {
    /// Driven by explicit requests from a client.
    Player,
    /// Driven by the periodic decision cycle.
    #[default]
    Autonomous,
}

/// Timed action an actor can begin from `Idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActionKind {
    Attack,
    Defend,
}

impl ActionKind {
    /// Both actions, in the order the decision cycle draws from.
    pub const ALL: [ActionKind; 2] = [ActionKind::Attack, ActionKind::Defend];

    /// Trigger that starts this action.
    pub const fn trigger(self) -> Trigger {
        match self {
            ActionKind::Attack => Trigger::BeginAttack,
            ActionKind::Defend => Trigger::BeginDefense,
        }
    }
}
