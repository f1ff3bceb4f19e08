//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! issuing player actions, querying actors, or streaming events from
//! specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use combat_core::{ActionKind, ActorId, ActorSnapshot, EncounterOutcome, TimerId};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Begin an attack. A refusal also reaches [`Topic::Feedback`].
    pub async fn attack(&self, actor: ActorId) -> Result<TimerId> {
        self.begin_action(actor, ActionKind::Attack).await
    }

    /// Begin a defense. A refusal also reaches [`Topic::Feedback`].
    pub async fn defend(&self, actor: ActorId) -> Result<TimerId> {
        self.begin_action(actor, ActionKind::Defend).await
    }

    pub async fn begin_action(&self, actor: ActorId, action: ActionKind) -> Result<TimerId> {
        self.request(|reply| Command::BeginAction {
            actor,
            action,
            reply,
        })
        .await?
    }

    /// Point `actor` at `target`, or clear its target with `None`.
    pub async fn set_target(&self, actor: ActorId, target: Option<ActorId>) -> Result<()> {
        self.request(|reply| Command::SetTarget {
            actor,
            target,
            reply,
        })
        .await?
    }

    /// Read-only snapshot of one actor
    pub async fn query_actor(&self, actor: ActorId) -> Result<ActorSnapshot> {
        self.request(|reply| Command::QueryActor { actor, reply })
            .await?
    }

    /// Read-only snapshots of every actor, in spawn order
    pub async fn query_actors(&self) -> Result<Vec<ActorSnapshot>> {
        self.request(|reply| Command::QueryActors { reply }).await
    }

    /// Look up an actor by name
    pub async fn find_actor(&self, name: impl Into<String>) -> Result<Option<ActorId>> {
        let name = name.into();
        self.request(|reply| Command::FindActor { name, reply })
            .await
    }

    pub async fn outcome(&self) -> Result<EncounterOutcome> {
        self.request(|reply| Command::QueryOutcome { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Combat` - Attacks, damage, blocks, deaths, retargeting
    /// - `Topic::Ambient` - Flavor lines
    /// - `Topic::Feedback` - Refused player requests
    /// - `Topic::Encounter` - Start and finish of the encounter
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
