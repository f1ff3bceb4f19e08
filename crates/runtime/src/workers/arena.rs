//! Arena worker that owns the authoritative [`combat_core::Arena`].
//!
//! Receives commands from [`crate::RuntimeHandle`] and fired timers from the
//! [`TokioScheduler`], handling them one at a time so no actor is ever
//! mutated concurrently.

use rand::rngs::SmallRng;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use combat_core::{
    ActionKind, ActorId, ActorSnapshot, Arena, ArenaError, EncounterOutcome, TimerId, Wakeup,
};

use super::timer::{FiredTimer, TokioScheduler};
use crate::api::Result;
use crate::events::{BusSink, EncounterEvent, Event, EventBus};

pub type RuntimeArena = Arena<TokioScheduler, SmallRng, BusSink>;

/// Commands that can be sent to the arena worker
pub enum Command {
    /// Begin a timed action on behalf of a player.
    BeginAction {
        actor: ActorId,
        action: ActionKind,
        reply: oneshot::Sender<Result<TimerId>>,
    },
    /// Point an actor at a new target (or clear it).
    SetTarget {
        actor: ActorId,
        target: Option<ActorId>,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Read-only copy of one actor.
    QueryActor {
        actor: ActorId,
        reply: oneshot::Sender<Result<ActorSnapshot>>,
    },
    /// Read-only copy of every actor.
    QueryActors {
        reply: oneshot::Sender<Vec<ActorSnapshot>>,
    },
    /// Resolve an actor name.
    FindActor {
        name: String,
        reply: oneshot::Sender<Option<ActorId>>,
    },
    QueryOutcome {
        reply: oneshot::Sender<EncounterOutcome>,
    },
}

/// Background task that processes commands and timers.
pub struct ArenaWorker {
    arena: RuntimeArena,
    command_rx: mpsc::Receiver<Command>,
    fired_rx: mpsc::UnboundedReceiver<FiredTimer>,
    event_bus: EventBus,
    outcome: EncounterOutcome,
}

impl ArenaWorker {
    pub fn new(
        arena: RuntimeArena,
        command_rx: mpsc::Receiver<Command>,
        fired_rx: mpsc::UnboundedReceiver<FiredTimer>,
        event_bus: EventBus,
    ) -> Self {
        info!(actors = arena.len(), "ArenaWorker initialized");
        let outcome = arena.outcome();
        Self {
            arena,
            command_rx,
            fired_rx,
            event_bus,
            outcome,
        }
    }

    /// Main worker loop. Ends once every command sender is dropped.
    pub async fn run(mut self) {
        let autonomous = self.arena.start_all_autonomous();
        self.event_bus
            .publish(Event::Encounter(EncounterEvent::Started {
                actors: self.arena.len(),
                autonomous,
            }));

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                Some((timer, wakeup)) = self.fired_rx.recv() => {
                    self.handle_timer(timer, wakeup);
                }
            }
            self.publish_outcome();
        }

        info!("ArenaWorker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::BeginAction {
                actor,
                action,
                reply,
            } => {
                let result = self.arena.request(actor, action).map_err(Into::into);
                if reply.send(result).is_err() {
                    debug!("BeginAction reply channel closed (caller dropped)");
                }
            }
            Command::SetTarget {
                actor,
                target,
                reply,
            } => {
                let result = self.arena.set_target(actor, target).map_err(Into::into);
                if reply.send(result).is_err() {
                    debug!("SetTarget reply channel closed (caller dropped)");
                }
            }
            Command::QueryActor { actor, reply } => {
                let result = self
                    .arena
                    .snapshot(actor)
                    .ok_or(ArenaError::UnknownActor(actor))
                    .map_err(Into::into);
                if reply.send(result).is_err() {
                    debug!("QueryActor reply channel closed (caller dropped)");
                }
            }
            Command::QueryActors { reply } => {
                if reply.send(self.arena.snapshots()).is_err() {
                    debug!("QueryActors reply channel closed (caller dropped)");
                }
            }
            Command::FindActor { name, reply } => {
                if reply.send(self.arena.find(&name)).is_err() {
                    debug!("FindActor reply channel closed (caller dropped)");
                }
            }
            Command::QueryOutcome { reply } => {
                if reply.send(self.arena.outcome()).is_err() {
                    debug!("QueryOutcome reply channel closed (caller dropped)");
                }
            }
        }
    }

    fn handle_timer(&mut self, timer: TimerId, wakeup: Wakeup) {
        if !self.arena.scheduler_mut().take_fired(timer) {
            // Cancelled after its sleep task had already sent.
            warn!(timer = timer.0, ?wakeup, "dropping timer cancelled in flight");
            self.event_bus
                .publish(Event::Encounter(EncounterEvent::StaleTimer {
                    actor: wakeup.actor(),
                }));
            return;
        }
        self.arena.dispatch(timer, wakeup);
    }

    fn publish_outcome(&mut self) {
        let outcome = self.arena.outcome();
        if outcome == self.outcome {
            return;
        }
        self.outcome = outcome;
        if outcome.is_over() {
            info!(%outcome, "encounter finished");
            self.event_bus
                .publish(Event::Encounter(EncounterEvent::Finished { outcome }));
        }
    }
}
