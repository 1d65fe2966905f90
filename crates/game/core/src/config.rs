use std::time::Duration;

use crate::turns::TurnOrdering;

/// Scenario-wide tunables applied when a scenario is built.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Vision radius used by ships that do not declare their own.
    pub default_vision_radius: u32,
    /// How the turn order interleaves teams.
    pub turn_ordering: TurnOrdering,
    /// Seconds before an idle turn is ended automatically; `None` disables it.
    pub turn_timeout_secs: Option<u64>,
    /// Seed of the tracking id issuer.
    pub seed: u64,
}

impl GameConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_VISION_RADIUS: u32 = 3;
    pub const DEFAULT_TURN_TIMEOUT_SECS: u64 = 60;
    pub const DEFAULT_SEED: u64 = 0x5eed;

    pub fn new() -> Self {
        Self {
            default_vision_radius: Self::DEFAULT_VISION_RADIUS,
            turn_ordering: TurnOrdering::default(),
            turn_timeout_secs: Some(Self::DEFAULT_TURN_TIMEOUT_SECS),
            seed: Self::DEFAULT_SEED,
        }
    }

    pub fn turn_timeout(&self) -> Option<Duration> {
        self.turn_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
