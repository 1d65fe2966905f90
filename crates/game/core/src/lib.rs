//! Deterministic engine of a data-driven, turn-based fleet game.
//!
//! `armada-core` owns the rules: the hierarchical event registrar that orders
//! every gameplay reaction, the attribute watcher that turns state changes
//! into minimal client diffs, the turn manager and the ship visibility
//! bookkeeping. It performs no I/O and never blocks; hosts feed requests into
//! a [`Scenario`] and drain the resulting [`Dispatch`] records.
pub mod attributes;
pub mod board;
pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod objects;
pub mod rng;
pub mod scenario;
mod spotting;
pub mod turns;

pub use attributes::{
    Attribute, AttributeDiff, AttributeInfo, AttributeKey, AttributeWatcher, Builtin, Descriptor,
};
pub use board::{Board, Pattern, Position};
pub use config::GameConfig;
pub use error::{BuildError, ErrorSeverity, GameError};
pub use events::{
    AbilityEvent, EvaluationState, EventContext, EventDetail, EventHost, EventKind, EventName,
    ListenerId, PlayerEvent, Priority, Registrar, RegistrarId, RegistrarTree, ScenarioEvent,
    ShipEvent, TeamEvent, evaluate_events,
};
pub use ids::{AbilityId, ObjectRef, PlayerId, ShipId, TeamId, TrackingId};
pub use objects::{
    Ability, AbilityAction, KnownTo, Player, Ship, Team, Trigger, TriggerEffect,
};
pub use rng::TrackingIdIssuer;
pub use scenario::{
    AbilitySetup, ClientEvent, Dispatch, GamePhase, OwnerRef, Scenario, ScenarioBuilder,
    ShipSetup, ShipSnapshot,
};
pub use turns::{TurnManager, TurnOrdering};
