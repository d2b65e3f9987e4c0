//! Engine configuration.
//!
//! Scheduler radii and budgets, terrain noise, the collision probe, targeting
//! reach and the headless session length. Loaded from a JSON file; every field
//! is optional and falls back to its default.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    physics::CollisionProbe,
    voxels::{chunk_manager::ChunkManagerSettings, edits::DEFAULT_SAVE_FILE, terrain::NoiseParameters},
};

/// Configuration file read when no path is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "voxel.json";

/// Failures of [`EngineConfig::load`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("config file {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file is not valid configuration JSON.
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// File involved.
        path: PathBuf,
        /// Parser failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Keep-set radius in chunks
    pub render_distance: i32,
    /// Keep-set radius while the observer is in fast (no-clip) mode
    pub fast_render_distance: i32,
    /// Number of generation worker threads
    pub worker_count: usize,
    /// Generation results published per tick
    pub finalize_budget: usize,
    /// Plane steps per tick
    pub plane_budget: usize,
    /// Plane steps per tick in fast mode
    pub fast_plane_budget: usize,
    /// Culled remeshes per tick
    pub dirty_budget: usize,
    /// Remove an evicted chunk's voxels from the world map
    pub purge_on_destroy: bool,
    /// Edit store file
    pub save_path: PathBuf,
    /// Terrain noise
    pub noise: NoiseParameters,
    /// Observer collision probe
    pub probe: CollisionProbe,
    /// Targeting ray length
    pub reach: f32,
    /// Targeting ray step
    pub ray_step: f32,
    /// Ticks run by the headless session
    pub session_ticks: u32,
    /// Pause between ticks of the headless session, in milliseconds
    pub tick_millis: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let scheduler = ChunkManagerSettings::default();
        EngineConfig {
            render_distance: scheduler.render_distance,
            fast_render_distance: scheduler.fast_render_distance,
            worker_count: 2,
            finalize_budget: scheduler.finalize_budget,
            plane_budget: scheduler.plane_budget,
            fast_plane_budget: scheduler.fast_plane_budget,
            dirty_budget: scheduler.dirty_budget,
            purge_on_destroy: scheduler.purge_on_destroy,
            save_path: PathBuf::from(DEFAULT_SAVE_FILE),
            noise: NoiseParameters::default(),
            probe: CollisionProbe::default(),
            reach: 6.0,
            ray_step: 0.1,
            session_ticks: 600,
            tick_millis: 16,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: EngineConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate();

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads configuration from `path`, falling back to the defaults.
    ///
    /// A missing file is silent; any other failure is logged first.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            Err(error) => {
                warn!("{}, using defaults", error);
                Self::default()
            }
        }
    }

    /// Writes the configuration to `path` as pretty-printed JSON.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Clamps values that would stall or break the engine.
    pub fn validate(&mut self) {
        self.render_distance = self.render_distance.max(0);
        self.fast_render_distance = self.fast_render_distance.max(0);
        self.finalize_budget = self.finalize_budget.max(1);
        self.plane_budget = self.plane_budget.max(1);
        self.fast_plane_budget = self.fast_plane_budget.max(1);
        self.dirty_budget = self.dirty_budget.max(1);
        self.noise.octaves = self.noise.octaves.max(1);
        if self.noise.scale <= 0.0 {
            self.noise.scale = NoiseParameters::default().scale;
        }
        if self.ray_step <= 0.0 {
            self.ray_step = 0.1;
        }
        self.reach = self.reach.max(0.0);
    }

    /// The scheduler part of the configuration.
    pub fn chunk_settings(&self) -> ChunkManagerSettings {
        ChunkManagerSettings {
            render_distance: self.render_distance,
            fast_render_distance: self.fast_render_distance,
            finalize_budget: self.finalize_budget,
            plane_budget: self.plane_budget,
            fast_plane_budget: self.fast_plane_budget,
            dirty_budget: self.dirty_budget,
            purge_on_destroy: self.purge_on_destroy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.render_distance, 4);
        assert_eq!(config.fast_render_distance, 8);
        assert_eq!(config.worker_count, 2);
        assert_eq!(config.dirty_budget, 6);
        assert_eq!(config.save_path, PathBuf::from("world.dat"));
        assert_eq!(config.chunk_settings(), ChunkManagerSettings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("voxel.json");
        fs::write(&path, r#"{ "render_distance": 2, "noise": { "seed": 9 } }"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.render_distance, 2);
        assert_eq!(config.noise.seed, 9);
        assert_eq!(config.noise.octaves, 5);
        assert_eq!(config.dirty_budget, 6);
    }

    #[test]
    fn test_config_save_load() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("voxel.json");

        let mut config = EngineConfig::default();
        config.worker_count = 3;
        config.purge_on_destroy = false;
        config.save_to(&path).unwrap();

        assert_eq!(EngineConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_or_invalid_file_falls_back() {
        let directory = tempfile::tempdir().unwrap();
        let missing = directory.path().join("absent.json");
        assert!(matches!(EngineConfig::load(&missing), Err(ConfigError::Io { .. })));
        assert_eq!(EngineConfig::load_or_default(&missing), EngineConfig::default());

        let invalid = directory.path().join("broken.json");
        fs::write(&invalid, "{ render_distance: ").unwrap();
        assert!(matches!(EngineConfig::load(&invalid), Err(ConfigError::Parse { .. })));
        assert_eq!(EngineConfig::load_or_default(&invalid), EngineConfig::default());
    }

    #[test]
    fn test_validation_clamps_budgets() {
        let mut config = EngineConfig::default();
        config.dirty_budget = 0;
        config.render_distance = -3;
        config.ray_step = 0.0;
        config.validate();

        assert_eq!(config.dirty_budget, 1);
        assert_eq!(config.render_distance, 0);
        assert_eq!(config.ray_step, 0.1);
    }
}
