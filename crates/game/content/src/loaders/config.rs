//! Game configuration loader.

use std::path::Path;

use armada_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for game configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys fall back to the `GameConfig::DEFAULT_*` values.
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armada_core::TurnOrdering;

    #[test]
    fn partial_files_keep_defaults() {
        let config = ConfigLoader::parse("turn_ordering = \"team\"\nseed = 42\n").unwrap();

        assert_eq!(config.turn_ordering, TurnOrdering::Team);
        assert_eq!(config.seed, 42);
        assert_eq!(config.default_vision_radius, GameConfig::DEFAULT_VISION_RADIUS);
        assert_eq!(
            config.turn_timeout_secs,
            Some(GameConfig::DEFAULT_TURN_TIMEOUT_SECS)
        );
    }

    #[test]
    fn rejects_unknown_orderings() {
        assert!(ConfigLoader::parse("turn_ordering = \"random\"").is_err());
    }
}
