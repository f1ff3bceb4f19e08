use std::time::Duration;

use super::{ActorId, ActorState, Control};
use crate::error::InvariantViolation;
use crate::timer::TimerId;

/// Immutable creation parameters for an actor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActorTemplate {
    pub name: String,
    pub control: Control,
    pub max_health: u32,
    pub damage: u32,
    pub action_time: Duration,
}

impl ActorTemplate {
    pub const DEFAULT_MAX_HEALTH: u32 = 100;
    pub const CREATURE_DAMAGE: u32 = 5;
    pub const CREATURE_ACTION_TIME: Duration = Duration::from_secs(3);
    pub const PLAYER_DAMAGE: u32 = 20;
    pub const PLAYER_ACTION_TIME: Duration = Duration::from_secs(2);

    /// Autonomous creature with the stock creature profile.
    pub fn creature(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            control: Control::Autonomous,
            max_health: Self::DEFAULT_MAX_HEALTH,
            damage: Self::CREATURE_DAMAGE,
            action_time: Self::CREATURE_ACTION_TIME,
        }
    }

    /// Player-controlled actor with the stock player profile.
    pub fn player(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            control: Control::Player,
            max_health: Self::DEFAULT_MAX_HEALTH,
            damage: Self::PLAYER_DAMAGE,
            action_time: Self::PLAYER_ACTION_TIME,
        }
    }

    /// Stock profile for the given control kind.
    pub fn for_control(name: impl Into<String>, control: Control) -> Self {
        match control {
            Control::Player => Self::player(name),
            Control::Autonomous => Self::creature(name),
        }
    }

    /// Max health is clamped to at least 1 so a fresh actor is always alive.
    pub fn with_max_health(mut self, max_health: u32) -> Self {
        self.max_health = max_health.max(1);
        self
    }

    pub fn with_damage(mut self, damage: u32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_action_time(mut self, action_time: Duration) -> Self {
        self.action_time = action_time;
        self
    }
}

/// A creature participating in an encounter.
///
/// Fields are only mutated by the arena: health by damage resolution, and
/// state, defense, and the pending completion by state-machine transitions.
#[derive(Clone, Debug)]
pub struct Actor {
    pub(crate) id: ActorId,
    pub(crate) name: String,
    pub(crate) control: Control,
    pub(crate) health: u32,
    pub(crate) max_health: u32,
    pub(crate) damage: u32,
    pub(crate) action_time: Duration,
    pub(crate) state: ActorState,
    pub(crate) defense: bool,
    /// Non-owning; may point at a dead actor.
    pub(crate) target: Option<ActorId>,
    /// Candidate targets for the decision cycle, populated once at setup.
    pub(crate) known_targets: Vec<ActorId>,
    /// Completion of the in-flight action, if any.
    pub(crate) pending: Option<TimerId>,
    /// Next decision-cycle wakeup for autonomous actors.
    pub(crate) decision_timer: Option<TimerId>,
}

impl Actor {
    pub(crate) fn new(id: ActorId, template: ActorTemplate) -> Self {
        let max_health = template.max_health.max(1);
        Self {
            id,
            name: template.name,
            control: template.control,
            health: max_health,
            max_health,
            damage: template.damage,
            action_time: template.action_time,
            state: ActorState::Idle,
            defense: false,
            target: None,
            known_targets: Vec::new(),
            pending: None,
            decision_timer: None,
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn control(&self) -> Control {
        self.control
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn damage(&self) -> u32 {
        self.damage
    }

    pub fn action_time(&self) -> Duration {
        self.action_time
    }

    pub fn state(&self) -> ActorState {
        self.state
    }

    pub fn is_alive(&self) -> bool {
        !self.state.is_terminal()
    }

    pub fn is_defending(&self) -> bool {
        self.defense
    }

    pub fn target(&self) -> Option<ActorId> {
        self.target
    }

    pub fn known_targets(&self) -> &[ActorId] {
        &self.known_targets
    }

    pub fn pending(&self) -> Option<TimerId> {
        self.pending
    }

    pub fn is_player(&self) -> bool {
        matches!(self.control, Control::Player)
    }

    /// Checks the data-model invariants tying health, state, defense, and
    /// the pending completion together.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let alive = self.is_alive();
        if alive != (self.health > 0) {
            return Err(InvariantViolation::HealthStateMismatch {
                actor: self.id,
                health: self.health,
                state: self.state,
            });
        }
        if self.health > self.max_health {
            return Err(InvariantViolation::HealthAboveMax {
                actor: self.id,
                health: self.health,
                max_health: self.max_health,
            });
        }
        if self.defense != matches!(self.state, ActorState::Defending) {
            return Err(InvariantViolation::DefenseMismatch {
                actor: self.id,
                state: self.state,
            });
        }
        if self.pending.is_some() != self.state.is_busy() {
            return Err(InvariantViolation::PendingMismatch {
                actor: self.id,
                state: self.state,
            });
        }
        Ok(())
    }

    pub fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            id: self.id,
            name: self.name.clone(),
            control: self.control,
            health: self.health,
            max_health: self.max_health,
            state: self.state,
            defense: self.defense,
            target: self.target,
            action_pending: self.pending.is_some(),
        }
    }
}

/// Read-only copy of an actor handed to clients.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub name: String,
    pub control: Control,
    pub health: u32,
    pub max_health: u32,
    pub state: ActorState,
    pub defense: bool,
    pub target: Option<ActorId>,
    pub action_pending: bool,
}

impl ActorSnapshot {
    pub fn is_alive(&self) -> bool {
        !self.state.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_actor_starts_idle_at_full_health() {
        let actor = Actor::new(ActorId(1), ActorTemplate::creature("Bones").with_max_health(40));

        assert_eq!(actor.state(), ActorState::Idle);
        assert_eq!(actor.health(), 40);
        assert!(actor.is_alive());
        assert!(!actor.is_defending());
        assert!(actor.pending().is_none());
        assert!(actor.validate().is_ok());
    }

    #[test]
    fn zero_max_health_is_clamped() {
        let actor = Actor::new(ActorId(1), ActorTemplate::player("Hero").with_max_health(0));
        assert_eq!(actor.max_health(), 1);
        assert!(actor.is_alive());
    }

    #[test]
    fn validate_reports_stray_defense_flag() {
        let mut actor = Actor::new(ActorId(3), ActorTemplate::creature("Bones"));
        actor.defense = true;

        assert!(matches!(
            actor.validate(),
            Err(InvariantViolation::DefenseMismatch { .. })
        ));
    }

    #[test]
    fn validate_reports_busy_state_without_completion() {
        let mut actor = Actor::new(ActorId(3), ActorTemplate::creature("Bones"));
        actor.state = ActorState::Attacking;

        assert!(matches!(
            actor.validate(),
            Err(InvariantViolation::PendingMismatch { .. })
        ));
    }

    #[test]
    fn templates_carry_stock_profiles() {
        let player = ActorTemplate::player("Hero");
        assert_eq!(player.damage, 20);
        assert_eq!(player.action_time, Duration::from_secs(2));

        let creature = ActorTemplate::for_control("Bones", Control::Autonomous);
        assert_eq!(creature.damage, 5);
        assert_eq!(creature.action_time, Duration::from_secs(3));
    }
}
