//! Async orchestration around a deterministic [`armada_core::Scenario`].
//!
//! One worker task owns the scenario and applies requests sequentially; the
//! turn timer is armed from the turn manager's epoch and expires into the
//! same advance an explicit turn end uses. Client dispatches fan out over a
//! topic-per-team event bus.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and its configuration
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - `workers` keeps the background task internal to the crate
pub mod api;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{Event, EventBus, Topic};
pub use runtime::{Runtime, RuntimeConfig};
