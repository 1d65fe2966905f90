//! Scenario file loader.

use std::path::Path;

use tracing::debug;

use crate::loaders::{LoadResult, read_file};
use crate::spec::ScenarioSpec;

/// Loader for scenario descriptions from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<ScenarioSpec> {
        let content = read_file(path)?;
        let spec = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON {}: {}", path.display(), e))?;

        debug!(
            target: "armada::content",
            path = %path.display(),
            name = %spec.name,
            teams = spec.teams.len(),
            "scenario loaded"
        );
        Ok(spec)
    }

    pub fn parse(content: &str) -> LoadResult<ScenarioSpec> {
        let spec: ScenarioSpec = ron::from_str(content)?;
        Ok(spec)
    }
}
