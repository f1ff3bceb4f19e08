//! Timed-action scheduling on top of the action state machine.
//!
//! The [`Arena`] owns every actor of an encounter and is the only place their
//! health, state, defense flag, target, and pending completion change. It binds
//! the transition table to three injected collaborators:
//!
//! - a [`Scheduler`] that arms completions and decision cycles
//! - a [`RandomSource`] for target, action, and flavor-line picks
//! - a [`MessageSink`] receiving every [`Notice`]
//!
//! All operations take `&mut self`, so a single owner serializes every
//! mutation. Timers never call back directly; whoever drives time hands the
//! fired [`Wakeup`] to [`Arena::dispatch`], which ignores completions whose
//! handle no longer matches the actor's pending one.

use std::time::Duration;

use tracing::{debug, error, info, trace, warn};

use crate::ambient::{AmbientLines, HealthBracket};
use crate::config::CombatConfig;
use crate::error::{ArenaError, IllegalAction, IllegalReason, InvariantViolation};
use crate::machine::{ActionStateMachine, PostHook, Transition, TransitionHooks, Trigger};
use crate::notice::{MessageSink, Notice, NoticeKind};
use crate::random::{RandomSource, choose};
use crate::state::{
    ActionKind, Actor, ActorId, ActorSnapshot, ActorState, ActorTemplate, Control, Roster,
};
use crate::timer::{Scheduler, TimerId, VirtualClock, Wakeup};

/// Result of a damage event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The actor was already dead.
    Ignored,
    /// The actor was defending; health unchanged.
    Blocked,
    /// Health reduced, actor still alive.
    Wounded { remaining: u32 },
    /// Health reached zero and the actor died.
    Killed,
}

/// Result of one autonomous decision cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The actor is dead or not autonomous; the loop ends.
    Stopped,
    /// No candidate target is alive; nothing to do this cycle.
    NoCandidates,
    /// An action is already in flight.
    Busy,
    /// A new action began.
    Acted(ActionKind),
    /// The chosen action was refused.
    Skipped(IllegalReason),
}

impl CycleOutcome {
    /// Delay before the next cycle, or `None` once the loop has ended.
    pub fn next_delay(&self, config: &CombatConfig) -> Option<Duration> {
        match self {
            CycleOutcome::Stopped => None,
            CycleOutcome::NoCandidates => Some(config.idle_backoff),
            _ => Some(config.decision_interval),
        }
        .map(|delay| delay.max(CombatConfig::MIN_DELAY))
    }
}

/// Whether one side has been wiped out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum EncounterOutcome {
    Ongoing,
    PlayersDefeated,
    HostilesDefeated,
}

impl EncounterOutcome {
    pub fn is_over(&self) -> bool {
        !matches!(self, EncounterOutcome::Ongoing)
    }
}

/// Owner of all actors in one encounter.
pub struct Arena<S, R, M> {
    config: CombatConfig,
    ambient: AmbientLines,
    actors: Vec<Actor>,
    scheduler: S,
    rng: R,
    sink: M,
}

fn index(id: ActorId) -> usize {
    id.0 as usize
}

impl<S, R, M> Arena<S, R, M>
where
    S: Scheduler,
    R: RandomSource,
    M: MessageSink,
{
    pub fn new(config: CombatConfig, scheduler: S, rng: R, sink: M) -> Self {
        Self {
            config,
            ambient: AmbientLines::default(),
            actors: Vec::new(),
            scheduler,
            rng,
            sink,
        }
    }

    /// Replaces the flavor-line pools.
    pub fn with_ambient(mut self, ambient: AmbientLines) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn sink(&self) -> &M {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut M {
        &mut self.sink
    }

    // ===== roster =====

    /// Adds an idle actor at full health.
    ///
    /// Ids are dense `u32` indices; spawning past `u32::MAX` actors fails
    /// with [`ArenaError::RosterFull`].
    pub fn spawn(&mut self, template: ActorTemplate) -> Result<ActorId, ArenaError> {
        let id = u32::try_from(self.actors.len())
            .map(ActorId)
            .map_err(|_| ArenaError::RosterFull)?;
        debug!(actor = %id, name = %template.name, control = %template.control, "spawned actor");
        self.actors.push(Actor::new(id, template));
        Ok(id)
    }

    /// Spawns every roster entry, gives each autonomous actor every
    /// player-controlled actor as a candidate target, and resolves the named
    /// initial targets.
    ///
    /// Decision loops are not started; see [`Arena::start_all_autonomous`].
    pub fn populate(&mut self, roster: &Roster) -> Result<Vec<ActorId>, ArenaError> {
        let ids: Vec<ActorId> = roster
            .entries
            .iter()
            .map(|entry| self.spawn(entry.template.clone()))
            .collect::<Result<_, _>>()?;

        let players: Vec<ActorId> = ids
            .iter()
            .copied()
            .filter(|id| self.actor(*id).is_some_and(Actor::is_player))
            .collect();

        for id in &ids {
            let actor = self.get_mut(*id)?;
            if actor.control == Control::Autonomous {
                actor.known_targets = players.clone();
            }
        }

        for (entry, id) in roster.entries.iter().zip(&ids) {
            let Some(name) = &entry.target else {
                continue;
            };
            let target = ids
                .iter()
                .copied()
                .find(|candidate| self.actor(*candidate).is_some_and(|a| a.name == *name))
                .ok_or_else(|| ArenaError::UnknownName(name.clone()))?;
            self.get_mut(*id)?.target = Some(target);
        }

        info!(actors = ids.len(), players = players.len(), "encounter populated");
        Ok(ids)
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(index(id))
    }

    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// First actor with the given name.
    pub fn find(&self, name: &str) -> Option<ActorId> {
        self.actors
            .iter()
            .find(|actor| actor.name == name)
            .map(|actor| actor.id)
    }

    pub fn snapshot(&self, id: ActorId) -> Option<ActorSnapshot> {
        self.actor(id).map(Actor::snapshot)
    }

    pub fn snapshots(&self) -> Vec<ActorSnapshot> {
        self.actors.iter().map(Actor::snapshot).collect()
    }

    /// Unknown ids count as not alive.
    pub fn is_alive(&self, id: ActorId) -> bool {
        self.actor(id).is_some_and(Actor::is_alive)
    }

    /// Points `id` at `target` (or clears it). The target may be dead.
    pub fn set_target(&mut self, id: ActorId, target: Option<ActorId>) -> Result<(), ArenaError> {
        if let Some(target) = target {
            self.get(target)?;
        }
        self.get_mut(id)?.target = target;
        debug!(actor = %id, target = ?target, "target assigned");
        Ok(())
    }

    /// Replaces the candidate pool the decision cycle draws targets from.
    pub fn set_known_targets(
        &mut self,
        id: ActorId,
        pool: Vec<ActorId>,
    ) -> Result<(), ArenaError> {
        if let Some(missing) = pool.iter().copied().find(|t| self.actor(*t).is_none()) {
            return Err(ArenaError::UnknownActor(missing));
        }
        self.get_mut(id)?.known_targets = pool;
        Ok(())
    }

    /// Whether one side has no living members left.
    pub fn outcome(&self) -> EncounterOutcome {
        let side = |control: Control| {
            let members = self.actors.iter().filter(|a| a.control == control);
            let total = members.clone().count();
            let alive = members.filter(|a| a.is_alive()).count();
            (total, alive)
        };

        match (side(Control::Player), side(Control::Autonomous)) {
            ((players, 0), _) if players > 0 => EncounterOutcome::PlayersDefeated,
            (_, (hostiles, 0)) if hostiles > 0 => EncounterOutcome::HostilesDefeated,
            _ => EncounterOutcome::Ongoing,
        }
    }

    /// Validates the data-model invariants of every actor.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.actors.iter().try_for_each(Actor::validate)
    }

    // ===== actions =====

    /// Starts a timed attack or defense.
    ///
    /// Requires a living, idle actor; a player-controlled attack additionally
    /// needs a living target. On success the completion is armed after the
    /// actor's action time and its handle is stored on the actor.
    pub fn begin_action(&mut self, id: ActorId, kind: ActionKind) -> Result<TimerId, ArenaError> {
        self.check_action(id, kind)?;
        self.fire(id, kind.trigger())?;

        let actor = self
            .actors
            .get_mut(index(id))
            .ok_or(ArenaError::UnknownActor(id))?;
        let timer = self
            .scheduler
            .schedule_after(actor.action_time, Wakeup::ActionComplete(id));
        if let Some(previous) = actor.pending.replace(timer) {
            self.scheduler.cancel(previous);
        }

        debug!(actor = %id, action = %kind, timer = timer.0, delay = ?actor.action_time, "action armed");
        self.post_validate();
        Ok(timer)
    }

    /// Player entry point for attacking.
    pub fn request_attack(&mut self, id: ActorId) -> Result<TimerId, ArenaError> {
        self.request(id, ActionKind::Attack)
    }

    /// Player entry point for defending.
    pub fn request_defend(&mut self, id: ActorId) -> Result<TimerId, ArenaError> {
        self.request(id, ActionKind::Defend)
    }

    /// Like [`Arena::begin_action`], but a refusal is also reported to the
    /// sink as player feedback.
    pub fn request(&mut self, id: ActorId, kind: ActionKind) -> Result<TimerId, ArenaError> {
        match self.begin_action(id, kind) {
            Err(ArenaError::Illegal(illegal)) => {
                warn!(actor = %id, action = %kind, reason = %illegal.reason, "action request refused");
                self.notify(id, NoticeKind::CannotAct { action: kind });
                Err(illegal.into())
            }
            other => other,
        }
    }

    /// Resolves incoming damage.
    ///
    /// Defending blocks it entirely. Otherwise an attacking actor is
    /// interrupted first, then health drops and the actor dies at zero.
    pub fn take_damage(&mut self, id: ActorId, amount: u32) -> Result<DamageOutcome, ArenaError> {
        let outcome = self.apply_damage(id, amount)?;
        self.post_validate();
        Ok(outcome)
    }

    /// One autonomous decision: retarget if needed, then maybe act.
    pub fn decision_cycle(&mut self, id: ActorId) -> Result<CycleOutcome, ArenaError> {
        let actor = self.get(id)?;
        if !actor.is_alive() || actor.control != Control::Autonomous {
            return Ok(CycleOutcome::Stopped);
        }

        let needs_target = actor.target.is_none_or(|target| !self.is_alive(target));
        if needs_target {
            let candidates: Vec<ActorId> = actor
                .known_targets
                .iter()
                .copied()
                .filter(|candidate| self.is_alive(*candidate))
                .collect();
            let Some(&target) = choose(&mut self.rng, &candidates) else {
                trace!(actor = %id, "no living candidate target");
                return Ok(CycleOutcome::NoCandidates);
            };

            self.get_mut(id)?.target = Some(target);
            let target_name = self.get(target)?.name.clone();
            debug!(actor = %id, target = %target, "picked a new target");
            self.notify(
                id,
                NoticeKind::NewTarget {
                    target: target_name,
                },
            );
        }

        let actor = self.get(id)?;
        if actor.state != ActorState::Idle || actor.target.is_none() {
            return Ok(CycleOutcome::Busy);
        }

        let Some(&kind) = choose(&mut self.rng, &ActionKind::ALL) else {
            return Ok(CycleOutcome::Busy);
        };
        match self.begin_action(id, kind) {
            Ok(_) => Ok(CycleOutcome::Acted(kind)),
            Err(ArenaError::Illegal(illegal)) => {
                debug!(actor = %id, action = %kind, reason = %illegal.reason, "decision skipped");
                Ok(CycleOutcome::Skipped(illegal.reason))
            }
            Err(err) => Err(err),
        }
    }

    /// Arms the first decision cycle of an autonomous actor.
    ///
    /// Returns `false` if the actor is dead, player-controlled, or its loop is
    /// already running.
    pub fn start_autonomy(&mut self, id: ActorId) -> Result<bool, ArenaError> {
        let actor = self
            .actors
            .get_mut(index(id))
            .ok_or(ArenaError::UnknownActor(id))?;
        if !actor.is_alive()
            || actor.control != Control::Autonomous
            || actor.decision_timer.is_some()
        {
            return Ok(false);
        }

        let timer = self
            .scheduler
            .schedule_after(Duration::ZERO, Wakeup::Decide(id));
        actor.decision_timer = Some(timer);
        debug!(actor = %id, "decision loop started");
        Ok(true)
    }

    /// Starts the decision loop of every living autonomous actor.
    pub fn start_all_autonomous(&mut self) -> usize {
        let ids: Vec<ActorId> = self.actors.iter().map(|actor| actor.id).collect();
        ids.into_iter()
            .filter(|id| matches!(self.start_autonomy(*id), Ok(true)))
            .count()
    }

    /// Handles a fired timer.
    pub fn dispatch(&mut self, timer: TimerId, wakeup: Wakeup) {
        match wakeup {
            Wakeup::ActionComplete(id) => self.complete_action(id, timer),
            Wakeup::Decide(id) => self.run_decision(id, timer),
        }
        self.post_validate();
    }

    // ===== internals =====

    fn get(&self, id: ActorId) -> Result<&Actor, ArenaError> {
        self.actors.get(index(id)).ok_or(ArenaError::UnknownActor(id))
    }

    fn get_mut(&mut self, id: ActorId) -> Result<&mut Actor, ArenaError> {
        self.actors
            .get_mut(index(id))
            .ok_or(ArenaError::UnknownActor(id))
    }

    fn check_action(&self, id: ActorId, kind: ActionKind) -> Result<(), ArenaError> {
        let actor = self.get(id)?;

        let reason = if !actor.is_alive() {
            Some(IllegalReason::Dead)
        } else if actor.state != ActorState::Idle {
            Some(IllegalReason::Busy(actor.state))
        } else if kind == ActionKind::Attack && actor.is_player() {
            match actor.target {
                None => Some(IllegalReason::NoTarget),
                Some(target) if !self.is_alive(target) => Some(IllegalReason::TargetDown(target)),
                Some(_) => None,
            }
        } else {
            None
        };

        match reason {
            Some(reason) => Err(IllegalAction {
                actor: id,
                action: kind,
                reason,
            }
            .into()),
            None => Ok(()),
        }
    }

    fn fire(&mut self, id: ActorId, trigger: Trigger) -> Result<Transition, ArenaError> {
        let state = self.get(id)?.state;
        let transition = ActionStateMachine::fire(&mut Lifecycle(&mut *self), id, state, trigger)
            .map_err(|source| ArenaError::Transition { actor: id, source })?;
        debug!(
            actor = %id,
            %trigger,
            from = %transition.source,
            to = %transition.dest,
            "transition"
        );
        Ok(transition)
    }

    fn apply_damage(&mut self, id: ActorId, amount: u32) -> Result<DamageOutcome, ArenaError> {
        let actor = self.get(id)?;
        if !actor.is_alive() {
            trace!(actor = %id, amount, "damage against a dead actor ignored");
            return Ok(DamageOutcome::Ignored);
        }
        if actor.defense {
            self.notify(id, NoticeKind::Blocked);
            return Ok(DamageOutcome::Blocked);
        }
        if actor.state == ActorState::Attacking {
            self.fire(id, Trigger::Interrupt)?;
        }

        self.notify(id, NoticeKind::TookDamage { amount });
        let actor = self.get_mut(id)?;
        actor.health = actor.health.saturating_sub(amount);
        let remaining = actor.health;

        if remaining == 0 {
            self.fire(id, Trigger::Die)?;
            Ok(DamageOutcome::Killed)
        } else {
            Ok(DamageOutcome::Wounded { remaining })
        }
    }

    fn complete_action(&mut self, id: ActorId, timer: TimerId) {
        let Some(actor) = self.actors.get_mut(index(id)) else {
            warn!(actor = %id, timer = timer.0, "completion for unknown actor");
            return;
        };
        if actor.pending != Some(timer) {
            warn!(actor = %id, timer = timer.0, "stale completion ignored");
            return;
        }
        actor.pending = None;

        if let Err(err) = self.fire(id, Trigger::ActionComplete) {
            error!(actor = %id, "action completion rejected: {err}");
        }
    }

    fn run_decision(&mut self, id: ActorId, timer: TimerId) {
        let Some(actor) = self.actors.get_mut(index(id)) else {
            warn!(actor = %id, timer = timer.0, "decision wakeup for unknown actor");
            return;
        };
        if actor.decision_timer != Some(timer) {
            trace!(actor = %id, timer = timer.0, "stale decision wakeup ignored");
            return;
        }
        actor.decision_timer = None;

        let outcome = match self.decision_cycle(id) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(actor = %id, "decision cycle failed: {err}");
                return;
            }
        };
        trace!(actor = %id, ?outcome, "decision cycle");

        let Some(delay) = outcome.next_delay(&self.config) else {
            info!(actor = %id, "decision loop stopped");
            return;
        };
        let next = self.scheduler.schedule_after(delay, Wakeup::Decide(id));
        if let Some(actor) = self.actors.get_mut(index(id)) {
            actor.decision_timer = Some(next);
        }
    }

    fn cancel_pending(&mut self, id: ActorId) {
        let pending = self
            .actors
            .get_mut(index(id))
            .and_then(|actor| actor.pending.take());
        if let Some(timer) = pending {
            self.scheduler.cancel(timer);
            trace!(actor = %id, timer = timer.0, "pending completion cancelled");
        }
    }

    fn set_defense(&mut self, id: ActorId, raised: bool) {
        if let Some(actor) = self.actors.get_mut(index(id)) {
            actor.defense = raised;
        }
    }

    fn notify(&mut self, id: ActorId, kind: NoticeKind) {
        let name = self
            .actors
            .get(index(id))
            .map(|actor| actor.name.clone())
            .unwrap_or_default();
        self.sink.notify(Notice::new(id, name, kind));
    }

    fn ambient_line(&mut self, id: ActorId, transition: &Transition) {
        let Some(actor) = self.actors.get(index(id)) else {
            return;
        };
        let bracket = HealthBracket::of(actor.health, actor.max_health);
        let Some(line) = self.ambient.sample(bracket, &mut self.rng) else {
            return;
        };
        let line = line.to_owned();
        trace!(actor = %id, trigger = %transition.trigger, %bracket, "{line}");
        self.notify(id, NoticeKind::Ambient { line });
    }

    fn run_post_hook(&mut self, id: ActorId, hook: PostHook) {
        match hook {
            PostHook::AnnounceAttack => self.notify(id, NoticeKind::PreparingAttack),
            PostHook::CancelInterrupted => {
                self.cancel_pending(id);
                self.notify(id, NoticeKind::Interrupted);
            }
            PostHook::RaiseDefense => {
                self.set_defense(id, true);
                self.notify(id, NoticeKind::Defending);
            }
            PostHook::ResolveAttack => self.resolve_attack(id),
            PostHook::LowerDefense => {
                self.set_defense(id, false);
                self.notify(id, NoticeKind::DefenseLowered);
            }
            PostHook::AnnounceDeath => {
                self.cancel_pending(id);
                self.set_defense(id, false);
                info!(actor = %id, "actor died");
                self.notify(id, NoticeKind::Died);
            }
        }
    }

    fn resolve_attack(&mut self, id: ActorId) {
        let Some(actor) = self.actors.get(index(id)) else {
            return;
        };
        let (target, damage) = (actor.target, actor.damage);

        self.notify(id, NoticeKind::AttackLanded);
        let Some(target) = target else {
            return;
        };
        match self.apply_damage(target, damage) {
            Ok(outcome) => debug!(actor = %id, %target, damage, ?outcome, "attack resolved"),
            Err(err) => warn!(actor = %id, %target, "attack could not resolve: {err}"),
        }
    }

    fn post_validate(&self) {
        if let Err(violation) = self.check_invariants() {
            error!(%violation, "actor invariant violated");
            debug_assert!(false, "actor invariant violated: {violation}");
        }
    }
}

impl<R, M> Arena<VirtualClock, R, M>
where
    R: RandomSource,
    M: MessageSink,
{
    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Moves virtual time forward by `by`, dispatching every timer that comes
    /// due (including ones armed along the way). Returns how many fired.
    pub fn advance(&mut self, by: Duration) -> usize {
        let until = self.scheduler.now() + by;
        let mut fired = 0;
        while let Some((timer, wakeup)) = self.scheduler.pop_due(until) {
            self.dispatch(timer, wakeup);
            fired += 1;
        }
        self.scheduler.advance_to(until);
        fired
    }

    /// Advances in `step` increments until one side is wiped out or `limit`
    /// of virtual time has passed.
    pub fn run_encounter(&mut self, step: Duration, limit: Duration) -> EncounterOutcome {
        let deadline = self.now() + limit;
        let step = step.max(Duration::from_millis(1));
        while self.now() < deadline {
            let outcome = self.outcome();
            if outcome.is_over() {
                return outcome;
            }
            self.advance(step.min(deadline - self.now()));
        }
        self.outcome()
    }
}

/// Adapter running transition hooks against the arena.
struct Lifecycle<'a, S, R, M>(&'a mut Arena<S, R, M>);

impl<S, R, M> TransitionHooks for Lifecycle<'_, S, R, M>
where
    S: Scheduler,
    R: RandomSource,
    M: MessageSink,
{
    fn before_transition(&mut self, actor: ActorId, transition: &Transition) {
        self.0.ambient_line(actor, transition);
    }

    fn enter_state(&mut self, actor: ActorId, state: ActorState) {
        if let Some(actor) = self.0.actors.get_mut(index(actor)) {
            actor.state = state;
        }
    }

    fn after_transition(&mut self, actor: ActorId, transition: &Transition) {
        self.0.run_post_hook(actor, transition.hook);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SequenceRandom;

    const SEC: Duration = Duration::from_secs(1);

    type TestArena = Arena<VirtualClock, SequenceRandom, Vec<Notice>>;

    fn arena() -> TestArena {
        Arena::new(
            CombatConfig::default(),
            VirtualClock::new(),
            SequenceRandom::default(),
            Vec::new(),
        )
        .with_ambient(AmbientLines::silent())
    }

    fn kinds(arena: &TestArena) -> Vec<NoticeKind> {
        arena.sink().iter().map(|n| n.kind.clone()).collect()
    }

    #[test]
    fn begin_action_arms_completion() {
        let mut arena = arena();
        let a = arena.spawn(ActorTemplate::creature("A")).unwrap();

        let timer = arena.begin_action(a, ActionKind::Defend).unwrap();

        let actor = arena.actor(a).unwrap();
        assert_eq!(actor.state(), ActorState::Defending);
        assert!(actor.is_defending());
        assert_eq!(actor.pending(), Some(timer));
        assert!(arena.scheduler().is_pending(timer));
    }

    #[test]
    fn defense_completes_and_lowers_flag() {
        let mut arena = arena();
        let a = arena.spawn(ActorTemplate::creature("A")).unwrap();
        arena.begin_action(a, ActionKind::Defend).unwrap();

        arena.advance(3 * SEC);

        let actor = arena.actor(a).unwrap();
        assert_eq!(actor.state(), ActorState::Idle);
        assert!(!actor.is_defending());
        assert!(actor.pending().is_none());
        assert_eq!(
            kinds(&arena),
            vec![NoticeKind::Defending, NoticeKind::DefenseLowered]
        );
    }

    #[test]
    fn busy_actor_cannot_begin_again() {
        let mut arena = arena();
        let a = arena.spawn(ActorTemplate::creature("A")).unwrap();
        let timer = arena.begin_action(a, ActionKind::Attack).unwrap();

        let err = arena.begin_action(a, ActionKind::Defend).unwrap_err();

        assert_eq!(
            err.as_illegal().map(|i| i.reason),
            Some(IllegalReason::Busy(ActorState::Attacking))
        );
        assert_eq!(arena.actor(a).unwrap().pending(), Some(timer));
        assert_eq!(arena.scheduler().pending_count(), 1);
    }

    #[test]
    fn player_attack_requires_living_target() {
        let mut arena = arena();
        let hero = arena.spawn(ActorTemplate::player("Hero")).unwrap();
        let bones = arena.spawn(ActorTemplate::creature("Bones").with_max_health(1)).unwrap();

        let err = arena.request_attack(hero).unwrap_err();
        assert_eq!(err.as_illegal().map(|i| i.reason), Some(IllegalReason::NoTarget));

        arena.set_target(hero, Some(bones)).unwrap();
        arena.take_damage(bones, 1).unwrap();
        let err = arena.request_attack(hero).unwrap_err();
        assert_eq!(
            err.as_illegal().map(|i| i.reason),
            Some(IllegalReason::TargetDown(bones))
        );

        let refusals = arena.sink().iter().filter(|n| n.is_feedback()).count();
        assert_eq!(refusals, 2);
        assert_eq!(arena.actor(hero).unwrap().state(), ActorState::Idle);
        assert_eq!(arena.scheduler().pending_count(), 0);
    }

    #[test]
    fn player_may_defend_without_target() {
        let mut arena = arena();
        let hero = arena.spawn(ActorTemplate::player("Hero")).unwrap();

        assert!(arena.request_defend(hero).is_ok());
    }

    #[test]
    fn damage_to_dead_actor_is_ignored() {
        let mut arena = arena();
        let a = arena.spawn(ActorTemplate::creature("A").with_max_health(5)).unwrap();
        assert_eq!(arena.take_damage(a, 10).unwrap(), DamageOutcome::Killed);

        assert_eq!(arena.take_damage(a, 10).unwrap(), DamageOutcome::Ignored);
        let deaths = kinds(&arena)
            .into_iter()
            .filter(|k| *k == NoticeKind::Died)
            .count();
        assert_eq!(deaths, 1);
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut arena = arena();
        let a = arena.spawn(ActorTemplate::creature("A")).unwrap();
        let timer = arena.begin_action(a, ActionKind::Attack).unwrap();
        arena.take_damage(a, 1).unwrap();

        arena.dispatch(timer, Wakeup::ActionComplete(a));

        assert_eq!(arena.actor(a).unwrap().state(), ActorState::Idle);
        assert!(!kinds(&arena).contains(&NoticeKind::AttackLanded));
    }

    #[test]
    fn unknown_target_is_rejected() {
        let mut arena = arena();
        let a = arena.spawn(ActorTemplate::creature("A")).unwrap();

        assert_eq!(
            arena.set_target(a, Some(ActorId(9))),
            Err(ArenaError::UnknownActor(ActorId(9)))
        );
        assert_eq!(
            arena.begin_action(ActorId(9), ActionKind::Attack),
            Err(ArenaError::UnknownActor(ActorId(9)))
        );
    }

    #[test]
    fn ambient_line_precedes_transition() {
        let mut arena = Arena::new(
            CombatConfig::default(),
            VirtualClock::new(),
            SequenceRandom::default(),
            Vec::new(),
        );
        let a = arena.spawn(ActorTemplate::creature("A")).unwrap();

        arena.begin_action(a, ActionKind::Attack).unwrap();

        assert_eq!(
            kinds(&arena),
            vec![
                NoticeKind::Ambient {
                    line: "looks pretty healthy".to_owned()
                },
                NoticeKind::PreparingAttack,
            ]
        );
    }

    #[test]
    fn outcome_tracks_wiped_sides() {
        let mut arena = arena();
        let hero = arena.spawn(ActorTemplate::player("Hero").with_max_health(1)).unwrap();
        let bones = arena.spawn(ActorTemplate::creature("Bones").with_max_health(1)).unwrap();
        assert_eq!(arena.outcome(), EncounterOutcome::Ongoing);

        arena.take_damage(bones, 1).unwrap();
        assert_eq!(arena.outcome(), EncounterOutcome::HostilesDefeated);

        arena.take_damage(hero, 1).unwrap();
        assert_eq!(arena.outcome(), EncounterOutcome::PlayersDefeated);
    }
}
