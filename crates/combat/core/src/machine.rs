//! Closed action state machine.
//!
//! The legal transitions form a fixed table, [`TRANSITIONS`], checked at
//! compile time: every `(trigger, source)` pair appears at most once and no
//! edge leaves [`ActorState::Dead`]. Firing a trigger runs three steps in
//! order through a [`TransitionHooks`] implementation:
//!
//! 1. `before_transition` - observational pre-hook, state not yet changed
//! 2. `enter_state` - commit the destination state
//! 3. `after_transition` - run the edge's [`PostHook`]
//!
//! A trigger with no edge from the current state yields
//! [`TransitionError::InvalidTransition`] and none of the steps run.

use crate::state::{ActorId, ActorState};

/// Events that move an actor between states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Trigger {
    BeginAttack,
    Interrupt,
    BeginDefense,
    ActionComplete,
    Die,
}

/// Side effect attached to a transition edge, run after the state changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PostHook {
    /// Announce that an attack is being prepared.
    AnnounceAttack,
    /// Cancel the pending completion and announce the interruption.
    CancelInterrupted,
    /// Raise the defense flag.
    RaiseDefense,
    /// Deal base damage to the current target, if any.
    ResolveAttack,
    /// Lower the defense flag.
    LowerDefense,
    /// Cancel anything in flight and announce death.
    AnnounceDeath,
}

/// One edge of the transition table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub trigger: Trigger,
    pub source: ActorState,
    pub dest: ActorState,
    pub hook: PostHook,
}

const fn edge(trigger: Trigger, source: ActorState, dest: ActorState, hook: PostHook) -> Transition {
    Transition {
        trigger,
        source,
        dest,
        hook,
    }
}

/// Every legal transition.
pub const TRANSITIONS: [Transition; 8] = [
    edge(
        Trigger::BeginAttack,
        ActorState::Idle,
        ActorState::Attacking,
        PostHook::AnnounceAttack,
    ),
    edge(
        Trigger::Interrupt,
        ActorState::Attacking,
        ActorState::Idle,
        PostHook::CancelInterrupted,
    ),
    edge(
        Trigger::BeginDefense,
        ActorState::Idle,
        ActorState::Defending,
        PostHook::RaiseDefense,
    ),
    edge(
        Trigger::ActionComplete,
        ActorState::Attacking,
        ActorState::Idle,
        PostHook::ResolveAttack,
    ),
    edge(
        Trigger::ActionComplete,
        ActorState::Defending,
        ActorState::Idle,
        PostHook::LowerDefense,
    ),
    edge(
        Trigger::Die,
        ActorState::Idle,
        ActorState::Dead,
        PostHook::AnnounceDeath,
    ),
    edge(
        Trigger::Die,
        ActorState::Attacking,
        ActorState::Dead,
        PostHook::AnnounceDeath,
    ),
    edge(
        Trigger::Die,
        ActorState::Defending,
        ActorState::Dead,
        PostHook::AnnounceDeath,
    ),
];

const fn table_is_sound(table: &[Transition]) -> bool {
    let mut i = 0;
    while i < table.len() {
        if matches!(table[i].source, ActorState::Dead) {
            return false;
        }
        let mut j = i + 1;
        while j < table.len() {
            if table[i].trigger as u8 == table[j].trigger as u8
                && table[i].source as u8 == table[j].source as u8
            {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const _: () = assert!(
    table_is_sound(&TRANSITIONS),
    "transition table must be deterministic and keep Dead terminal"
);

/// Rejected trigger. Callers are expected to check preconditions first, so
/// this always indicates a logic fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("trigger {trigger} is not valid from state {state}")]
    InvalidTransition { trigger: Trigger, state: ActorState },
}

/// Lifecycle callbacks invoked while firing a trigger.
pub trait TransitionHooks {
    /// Runs before the state changes. Must not mutate actor state.
    fn before_transition(&mut self, actor: ActorId, transition: &Transition);

    /// Commits the destination state.
    fn enter_state(&mut self, actor: ActorId, state: ActorState);

    /// Runs the edge's post-hook once the new state is in place.
    fn after_transition(&mut self, actor: ActorId, transition: &Transition);
}

/// Validator and driver for the transition table.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActionStateMachine;

impl ActionStateMachine {
    /// Looks up the edge for `trigger` from `state`.
    pub fn transition(
        state: ActorState,
        trigger: Trigger,
    ) -> Result<&'static Transition, TransitionError> {
        TRANSITIONS
            .iter()
            .find(|t| t.trigger == trigger && t.source == state)
            .ok_or(TransitionError::InvalidTransition { trigger, state })
    }

    pub fn can_fire(state: ActorState, trigger: Trigger) -> bool {
        Self::transition(state, trigger).is_ok()
    }

    /// Triggers accepted from `state`, in table order.
    pub fn triggers_from(state: ActorState) -> impl Iterator<Item = Trigger> {
        TRANSITIONS
            .iter()
            .filter(move |t| t.source == state)
            .map(|t| t.trigger)
    }

    /// Fires `trigger` for `actor`, currently in `state`.
    pub fn fire<H>(
        hooks: &mut H,
        actor: ActorId,
        state: ActorState,
        trigger: Trigger,
    ) -> Result<Transition, TransitionError>
    where
        H: TransitionHooks + ?Sized,
    {
        let transition = *Self::transition(state, trigger)?;

        hooks.before_transition(actor, &transition);
        hooks.enter_state(actor, transition.dest);
        hooks.after_transition(actor, &transition);

        Ok(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[derive(Default)]
    struct Recorder {
        state: ActorState,
        calls: Vec<String>,
    }

    impl TransitionHooks for Recorder {
        fn before_transition(&mut self, _actor: ActorId, transition: &Transition) {
            self.calls.push(format!("before:{}:{}", transition.trigger, self.state));
        }

        fn enter_state(&mut self, _actor: ActorId, state: ActorState) {
            self.state = state;
            self.calls.push(format!("enter:{}", state));
        }

        fn after_transition(&mut self, _actor: ActorId, transition: &Transition) {
            self.calls.push(format!("after:{}:{}", transition.hook, self.state));
        }
    }

    #[test]
    fn dead_has_no_outgoing_edges() {
        assert_eq!(ActionStateMachine::triggers_from(ActorState::Dead).count(), 0);
    }

    #[test]
    fn die_is_legal_from_every_living_state() {
        for state in ActorState::iter().filter(|s| !s.is_terminal()) {
            let transition = ActionStateMachine::transition(state, Trigger::Die).unwrap();
            assert_eq!(transition.dest, ActorState::Dead);
        }
    }

    #[test]
    fn action_complete_routes_by_source() {
        let attack = ActionStateMachine::transition(ActorState::Attacking, Trigger::ActionComplete)
            .unwrap();
        assert_eq!(attack.hook, PostHook::ResolveAttack);

        let defend = ActionStateMachine::transition(ActorState::Defending, Trigger::ActionComplete)
            .unwrap();
        assert_eq!(defend.hook, PostHook::LowerDefense);
    }

    #[test]
    fn interrupt_only_from_attacking() {
        for state in ActorState::iter() {
            assert_eq!(
                ActionStateMachine::can_fire(state, Trigger::Interrupt),
                state == ActorState::Attacking,
                "interrupt from {state}"
            );
        }
    }

    #[test]
    fn every_trigger_has_at_least_one_edge() {
        for trigger in Trigger::iter() {
            assert!(TRANSITIONS.iter().any(|t| t.trigger == trigger), "{trigger}");
        }
    }

    #[test]
    fn fire_runs_hooks_in_order() {
        let mut hooks = Recorder::default();

        let transition =
            ActionStateMachine::fire(&mut hooks, ActorId(1), ActorState::Idle, Trigger::BeginAttack)
                .unwrap();

        assert_eq!(transition.dest, ActorState::Attacking);
        assert_eq!(
            hooks.calls,
            vec![
                "before:begin_attack:idle",
                "enter:attacking",
                "after:announce_attack:attacking",
            ]
        );
    }

    #[test]
    fn invalid_trigger_runs_no_hooks() {
        let mut hooks = Recorder {
            state: ActorState::Defending,
            ..Default::default()
        };

        let err = ActionStateMachine::fire(
            &mut hooks,
            ActorId(1),
            ActorState::Defending,
            Trigger::Interrupt,
        )
        .unwrap_err();

        assert_eq!(
            err,
            TransitionError::InvalidTransition {
                trigger: Trigger::Interrupt,
                state: ActorState::Defending,
            }
        );
        assert!(hooks.calls.is_empty());
        assert_eq!(hooks.state, ActorState::Defending);
    }
}
