//! Event propagation: priorities, event catalogs and the registrar tree.
//!
//! Every domain object owns one registrar node. Gameplay code queues events
//! on the node of the object that originated them and then drains the tree
//! with [`evaluate_events`]; listeners anywhere in the tree run in one global
//! priority order.

mod context;
mod names;
mod priority;
mod registrar;

pub use context::{EventContext, EventDetail};
pub use names::{
    AbilityEvent, EventKind, EventName, PlayerEvent, ScenarioEvent, ShipEvent, TeamEvent,
};
pub use priority::Priority;
pub use registrar::{
    CompletionFn, EvaluationState, EventHost, Listener, ListenerFn, ListenerId, Registrar,
    RegistrarId, RegistrarTree, evaluate_events,
};
