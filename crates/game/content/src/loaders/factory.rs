//! Content factory that resolves files inside a data directory.

use std::path::{Path, PathBuf};

use armada_core::{GameConfig, Scenario};

use crate::loaders::{ConfigLoader, LoadResult, ScenarioLoader};
use crate::spec::ScenarioSpec;

/// Loads scenarios and configuration from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── scenarios/
///     ├── duel.ron
///     └── convoy.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load game configuration from `config.toml`, or the defaults when the
    /// file does not exist.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(GameConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load `scenarios/{name}.ron`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<ScenarioSpec> {
        ScenarioLoader::load(&self.scenario_path(name))
    }

    /// Loads and builds a scenario, configured by `config.toml` unless the
    /// scenario file carries its own config.
    pub fn build_scenario(&self, name: &str) -> LoadResult<Scenario> {
        let config = self.load_config()?;
        self.load_scenario(name)?.build_with(&config)
    }

    pub fn scenario_path(&self, name: &str) -> PathBuf {
        self.data_dir.join("scenarios").join(format!("{name}.ron"))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
        assert_eq!(
            factory.scenario_path("duel"),
            Path::new("/tmp/data/scenarios/duel.ron")
        );
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let factory = ContentFactory::new("/nonexistent/armada-data");
        assert_eq!(factory.load_config().unwrap(), GameConfig::default());
        assert!(factory.load_scenario("duel").is_err());
    }
}
