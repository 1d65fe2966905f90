//! Server configuration read from the environment.
use std::env;
use std::path::PathBuf;

use armada_runtime::RuntimeConfig;

/// How the tracking id seed is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedChoice {
    /// Keep the seed from the data files.
    FromContent,
    Fixed(u64),
    /// Draw a fresh seed at startup.
    Random,
}

impl SeedChoice {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "" => Some(SeedChoice::FromContent),
            "random" => Some(SeedChoice::Random),
            other => other.parse().ok().map(SeedChoice::Fixed),
        }
    }

    pub fn resolve(self, content_seed: u64) -> u64 {
        match self {
            SeedChoice::FromContent => content_seed,
            SeedChoice::Fixed(seed) => seed,
            SeedChoice::Random => rand::random(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub scenario: String,
    pub seed: SeedChoice,
    pub log_dir: Option<PathBuf>,
    pub session_id: Option<String>,
    pub runtime: RuntimeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            scenario: "duel".to_string(),
            seed: SeedChoice::FromContent,
            log_dir: None,
            session_id: None,
            runtime: RuntimeConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Construct server configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ARMADA_DATA_DIR` - Content directory (default: `data`)
    /// - `ARMADA_SCENARIO` - Scenario name under `scenarios/` (default: `duel`)
    /// - `ARMADA_SEED` - Tracking id seed, a number or `random`
    /// - `ARMADA_LOG_DIR` - Log directory (default: platform cache dir)
    /// - `ARMADA_SESSION_ID` - Log session name (default: timestamp)
    /// - `ARMADA_TURN_TIMER` - `false` disables turn timeouts
    /// - `ARMADA_EVENT_BUFFER` - Per-topic event channel capacity
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("ARMADA_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(name) = lookup("ARMADA_SCENARIO") {
            config.scenario = name;
        }
        if let Some(seed) = lookup("ARMADA_SEED") {
            match SeedChoice::parse(&seed) {
                Some(choice) => config.seed = choice,
                None => eprintln!("ignoring invalid ARMADA_SEED={seed:?}"),
            }
        }
        config.log_dir = lookup("ARMADA_LOG_DIR").map(PathBuf::from);
        config.session_id = lookup("ARMADA_SESSION_ID");
        if let Some(enabled) = lookup("ARMADA_TURN_TIMER").and_then(|v| v.parse().ok()) {
            config.runtime.enable_turn_timer = enabled;
        }
        if let Some(size) = lookup("ARMADA_EVENT_BUFFER").and_then(|v| v.parse::<usize>().ok()) {
            config.runtime.event_buffer_size = size.max(1);
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.scenario, "duel");
        assert_eq!(config.seed, SeedChoice::FromContent);
        assert!(config.runtime.enable_turn_timer);
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("ARMADA_SCENARIO", "convoy"),
            ("ARMADA_SEED", "42"),
            ("ARMADA_TURN_TIMER", "false"),
            ("ARMADA_EVENT_BUFFER", "0"),
        ]));
        assert_eq!(config.scenario, "convoy");
        assert_eq!(config.seed, SeedChoice::Fixed(42));
        assert_eq!(config.seed.resolve(7), 42);
        assert!(!config.runtime.enable_turn_timer);
        assert_eq!(config.runtime.event_buffer_size, 1);
    }

    #[test]
    fn seed_choices() {
        assert_eq!(SeedChoice::parse("random"), Some(SeedChoice::Random));
        assert_eq!(SeedChoice::parse("nope"), None);
        assert_eq!(SeedChoice::FromContent.resolve(7), 7);
    }
}
