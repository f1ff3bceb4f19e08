//! High-level runtime orchestrator.
//!
//! The runtime owns the arena worker, wires up command/event channels, and
//! exposes a builder-based API for clients to drive an encounter.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use combat_content::Encounter;
use combat_core::{AmbientLines, Arena, CombatConfig, Roster};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{BusSink, Event, EventBus, Topic};
use crate::workers::{ArenaWorker, Command, TokioScheduler};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub combat: CombatConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Seed for target, action, and flavor picks. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            combat: CombatConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
            seed: None,
        }
    }
}

/// Main runtime hosting one encounter
///
/// Design: Runtime owns the worker task. [`RuntimeHandle`] provides a
/// cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker stops once this and every cloned handle are dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    roster: Roster,
    ambient: AmbientLines,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            roster: Roster::new(),
            ambient: AmbientLines::default(),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a loaded encounter: its roster, flavor lines, and combat timing.
    pub fn encounter(mut self, encounter: Encounter) -> Self {
        self.config.combat = encounter.combat;
        self.roster = encounter.roster;
        self.ambient = encounter.ambient;
        self
    }

    pub fn roster(mut self, roster: Roster) -> Self {
        self.roster = roster;
        self
    }

    pub fn ambient(mut self, ambient: AmbientLines) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Build the runtime and spawn its worker.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn build(self) -> Result<Runtime> {
        if self.roster.is_empty() {
            return Err(RuntimeError::EmptyRoster);
        }

        let rng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let (command_tx, command_rx) =
            mpsc::channel::<Command>(self.config.command_buffer_size.max(1));
        let (scheduler, fired_rx) = TokioScheduler::new();

        let mut arena = Arena::new(
            self.config.combat,
            scheduler,
            rng,
            BusSink::new(event_bus.clone()),
        )
        .with_ambient(self.ambient);
        arena.populate(&self.roster)?;

        let handle = RuntimeHandle::new(command_tx, event_bus.clone());
        let worker = ArenaWorker::new(arena, command_rx, fired_rx, event_bus);

        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime {
            handle,
            worker_handle,
        })
    }
}
