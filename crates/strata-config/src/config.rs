//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name used inside the config directory.
const CONFIG_FILE: &str = "config.ron";

/// Top-level voxel world configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Chunk dimensions and world seed.
    pub world: WorldConfig,
    /// Chunk streaming and meshing workers.
    pub streaming: StreamingConfig,
    /// Ray marching and block placement.
    pub interaction: InteractionConfig,
    /// Procedural texture atlas.
    pub atlas: AtlasSettings,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// World layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Horizontal chunk edge length in blocks (X and Z).
    pub chunk_size: u32,
    /// Vertical chunk extent in blocks.
    pub chunk_height: u32,
    /// Seed handed to the terrain generator.
    pub seed: u64,
}

/// Streaming configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    /// Radius (in chunks) of the circular resident set around the viewpoint.
    pub render_distance: u32,
    /// Extra chunks beyond `render_distance` kept before eviction.
    pub eviction_margin: u32,
    /// Maximum chunk generations per update tick.
    pub loads_per_tick: u32,
    /// Meshing worker threads (0 = derive from CPU count).
    pub mesh_workers: u32,
    /// Capacity of the bounded meshing queue.
    pub mesh_queue_capacity: u32,
}

/// Interaction configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InteractionConfig {
    /// Maximum ray length in blocks.
    pub reach: f32,
    /// Fixed ray-march step in blocks.
    pub ray_step: f32,
    /// Width of the actor's collision box.
    pub actor_width: f32,
    /// Height of the actor's collision box.
    pub actor_height: f32,
    /// Eye height above the actor's feet.
    pub eye_height: f32,
}

/// Texture atlas configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AtlasSettings {
    /// Edge length of a single texture tile in pixels.
    pub tile_size: u32,
    /// Seed used to re-seed the noise generator for every tile.
    pub seed: u64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Report triangle counts after each streaming tick.
    pub show_triangle_count: bool,
}

// --- Default implementations ---

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: 16,
            chunk_height: 128,
            seed: 0,
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            render_distance: 4,
            eviction_margin: 2,
            loads_per_tick: 8,
            mesh_workers: 0,
            mesh_queue_capacity: 64,
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            reach: 5.0,
            ray_step: 0.1,
            actor_width: 0.6,
            actor_height: 1.8,
            eye_height: 1.62,
        }
    }
}

impl Default for AtlasSettings {
    fn default() -> Self {
        Self {
            tile_size: 16,
            seed: 42,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            show_triangle_count: false,
        }
    }
}

// --- Load / Save / Reload ---

/// Returns the platform config directory for this project (`<config>/strata`).
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("strata"))
        .ok_or(ConfigError::NoConfigDir)
}

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("chunk_size: 16"));
        assert!(ron_str.contains("render_distance: 4"));
    }

    #[test]
    fn test_defaults_match_classic_world() {
        let config = Config::default();
        assert_eq!(config.world.chunk_height, 128);
        assert_eq!(config.streaming.eviction_margin, 2);
        assert_eq!(config.interaction.reach, 5.0);
        assert_eq!(config.atlas.tile_size, 16);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.world.seed = 987_654_321;
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(world: (seed: 7), streaming: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.chunk_size, 16);
        assert_eq!(config.interaction, InteractionConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.streaming.render_distance = 9;
        config.debug.log_level = "debug".to_string();

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.streaming.mesh_workers = 3;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.map(|c| c.streaming.mesh_workers), Some(3));
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
