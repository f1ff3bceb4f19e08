//! Encounter setup description.

use super::ActorTemplate;

/// One actor to spawn, plus the name of the actor it initially targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RosterEntry {
    pub template: ActorTemplate,
    pub target: Option<String>,
}

impl RosterEntry {
    pub fn new(template: ActorTemplate) -> Self {
        Self {
            template,
            target: None,
        }
    }

    pub fn targeting(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// Ordered list of actors forming an encounter.
///
/// Actor names are expected to be unique; targets are resolved by name once
/// every entry has been spawned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    pub entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, entry: RosterEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn push(&mut self, entry: RosterEntry) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
