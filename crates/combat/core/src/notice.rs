//! Messages emitted while an encounter runs.

use core::fmt;

use crate::state::{ActionKind, ActorId};

/// What happened to an actor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoticeKind {
    PreparingAttack,
    AttackLanded,
    Interrupted,
    Defending,
    DefenseLowered,
    TookDamage { amount: u32 },
    Blocked,
    Died,
    NewTarget { target: String },
    /// Flavor line sampled before a transition.
    Ambient { line: String },
    /// A player request was refused.
    CannotAct { action: ActionKind },
}

/// A message about one actor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Notice {
    pub actor: ActorId,
    pub name: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn new(actor: ActorId, name: impl Into<String>, kind: NoticeKind) -> Self {
        Self {
            actor,
            name: name.into(),
            kind,
        }
    }

    /// Player feedback rather than an in-world event.
    pub fn is_feedback(&self) -> bool {
        matches!(self.kind, NoticeKind::CannotAct { .. })
    }

    pub fn is_ambient(&self) -> bool {
        matches!(self.kind, NoticeKind::Ambient { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = &self.name;
        match &self.kind {
            NoticeKind::PreparingAttack => write!(f, "{name}: preparing attack"),
            NoticeKind::AttackLanded => write!(f, "{name}: attack landed"),
            NoticeKind::Interrupted => write!(f, "{name} was interrupted by the attack!"),
            NoticeKind::Defending => write!(f, "{name}: defense"),
            NoticeKind::DefenseLowered => write!(f, "{name}: no defense"),
            NoticeKind::TookDamage { amount } => write!(f, "{name} takes damage: {amount}"),
            NoticeKind::Blocked => write!(f, "{name} blocked the attack!"),
            NoticeKind::Died => write!(f, "{name} died."),
            NoticeKind::NewTarget { target } => write!(f, "{name} picked a new target: {target}"),
            NoticeKind::Ambient { line } => write!(f, "{name}: {line}"),
            NoticeKind::CannotAct { action } => write!(f, "{name}: can't {action} now!"),
        }
    }
}

/// Fire-and-forget output for notices. Implementations must not fail the
/// caller; delivery problems are theirs to swallow.
pub trait MessageSink {
    fn notify(&mut self, notice: Notice);
}

impl MessageSink for Vec<Notice> {
    fn notify(&mut self, notice: Notice) {
        self.push(notice);
    }
}

impl<T: MessageSink + ?Sized> MessageSink for Box<T> {
    fn notify(&mut self, notice: Notice) {
        (**self).notify(notice);
    }
}

/// Sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl MessageSink for NullSink {
    fn notify(&mut self, _notice: Notice) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_player_feedback() {
        let notice = Notice::new(
            ActorId(0),
            "Hero",
            NoticeKind::CannotAct {
                action: ActionKind::Attack,
            },
        );
        assert_eq!(notice.to_string(), "Hero: can't attack now!");
        assert!(notice.is_feedback());
    }

    #[test]
    fn renders_damage_amount() {
        let notice = Notice::new(ActorId(2), "Bones", NoticeKind::TookDamage { amount: 20 });
        assert_eq!(notice.to_string(), "Bones takes damage: 20");
    }
}
