//! Domain objects of a scenario.
//!
//! Each object owns one registrar node and one attribute watcher. Parent
//! relationships are stored as ids and resolved through the owning
//! [`Scenario`](crate::scenario::Scenario).

mod ability;
mod player;
mod ship;
mod team;
mod trigger;

pub use ability::{Ability, AbilityAction};
pub use player::Player;
pub use ship::{KnownTo, Ship};
pub use team::Team;
pub use trigger::{Trigger, TriggerEffect};
