//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use combat_core::Notice;

use super::types::EncounterEvent;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize, strum::EnumIter)]
pub enum Topic {
    /// In-world combat notices (attacks, damage, deaths, retargeting)
    Combat,
    /// Flavor lines sampled before transitions
    Ambient,
    /// Refusals of player requests
    Feedback,
    /// Encounter lifecycle
    Encounter,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Combat(Notice),
    Ambient(Notice),
    Feedback(Notice),
    Encounter(EncounterEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Combat(_) => Topic::Combat,
            Event::Ambient(_) => Topic::Ambient,
            Event::Feedback(_) => Topic::Feedback,
            Event::Encounter(_) => Topic::Encounter,
        }
    }

    /// Routes an arena notice to the topic it belongs on.
    pub fn from_notice(notice: Notice) -> Self {
        if notice.is_ambient() {
            Event::Ambient(notice)
        } else if notice.is_feedback() {
            Event::Feedback(notice)
        } else {
            Event::Combat(notice)
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Event::Combat(notice) | Event::Ambient(notice) | Event::Feedback(notice) => {
                Some(notice)
            }
            Event::Encounter(_) => None,
        }
    }
}

struct Channels {
    combat: broadcast::Sender<Event>,
    ambient: broadcast::Sender<Event>,
    feedback: broadcast::Sender<Event>,
    encounter: broadcast::Sender<Event>,
}

impl Channels {
    fn get(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Combat => &self.combat,
            Topic::Ambient => &self.ambient,
            Topic::Feedback => &self.feedback,
            Topic::Encounter => &self.encounter,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing is best-effort: events sent while a
/// topic has no subscribers are dropped.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Channels {
                combat: broadcast::channel(capacity).0,
                ambient: broadcast::channel(capacity).0,
                feedback: broadcast::channel(capacity).0,
                encounter: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.channels.get(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels.get(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
