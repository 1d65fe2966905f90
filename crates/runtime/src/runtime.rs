//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up the command channel and
//! the event bus, and hands out [`RuntimeHandle`]s to clients.

use armada_core::Scenario;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::workers::{Command, SimulationWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Capacity of each topic channel; slow subscribers lag past it.
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// End idle turns after the scenario's turn timeout (default: true)
    pub enable_turn_timer: bool,
}

impl RuntimeConfig {
    pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 256;
    pub const DEFAULT_COMMAND_BUFFER_SIZE: usize = 32;
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: Self::DEFAULT_EVENT_BUFFER_SIZE,
            command_buffer_size: Self::DEFAULT_COMMAND_BUFFER_SIZE,
            enable_turn_timer: true,
        }
    }
}

/// Main runtime that owns the simulation worker.
///
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Starts the scenario (unless it already runs) and spawns its worker.
    ///
    /// Dispatches produced while starting are discarded: nobody can be
    /// subscribed yet, and clients obtain the initial state through
    /// [`RuntimeHandle::sync`].
    pub async fn start(config: RuntimeConfig, mut scenario: Scenario) -> Result<Self> {
        if !scenario.is_running() {
            scenario.start().map_err(RuntimeError::Game)?;
        }
        let discarded = scenario.drain_outbox().len();
        debug!(target: "armada::runtime", discarded, "start dispatches discarded");

        let event_bus = EventBus::new(
            scenario.teams().iter().map(|team| team.id()),
            config.event_buffer_size,
        );
        let (command_tx, command_rx) = mpsc::channel::<Command>(config.command_buffer_size);
        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let sim_worker =
            SimulationWorker::new(scenario, command_rx, event_bus, config.enable_turn_timer);
        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        info!(target: "armada::runtime", ?config, "runtime started");
        Ok(Self {
            handle,
            sim_worker_handle,
        })
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    pub async fn shutdown(self) -> Result<()> {
        match self.handle.shutdown().await {
            // Already stopped through another handle.
            Ok(()) | Err(RuntimeError::CommandChannelClosed) => {}
            Err(err) => return Err(err),
        }
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)
    }
}
