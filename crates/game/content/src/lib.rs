//! Scenario authoring format and loaders.
//!
//! A scenario file describes the board, the teams with their players, ships
//! and abilities, every authored attribute and the triggers that react to
//! events. [`ScenarioSpec`] is the serde model of that file and
//! [`ScenarioSpec::build`] hands it to the core's `ScenarioBuilder`.
//!
//! With the default `loaders` feature the crate also reads scenarios from RON
//! and game configuration from TOML.

pub mod spec;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use spec::{
    AbilitySpec, AttributeSpec, BoardSpec, PlayerSpec, ScenarioSpec, ShipSpec, TeamSpec,
};

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult, ScenarioLoader};
