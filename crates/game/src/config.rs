//! Game configuration (window, world, assets). Loaded from config.ron at startup.

use procgen::{ChunkSettings, EvictionStrategy, FarthestFirst, LeastRecentlyUsed, NoEviction};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Largest accepted `view_radius`; the visible square is `(2r+1)^2` chunks.
pub const MAX_VIEW_RADIUS: i32 = 32;

/// A `world` value that was rejected and replaced by its default.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum WorldConfigError {
    #[error("chunk_size must be finite and positive, got {0}")]
    ChunkSize(f32),
    #[error("resolution must be at least 1")]
    Resolution,
    #[error("view_radius must be between 0 and 32, got {0}")]
    ViewRadius(i32),
}

/// Persistent game settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_true")]
    pub vsync: bool,
    /// Start in borderless fullscreen.
    #[serde(default)]
    pub fullscreen: bool,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub assets: AssetPaths,
}

/// Terrain generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Noise and gameplay seed. A random one is drawn (and logged) when unset.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: f32,
    /// Cells per chunk side.
    #[serde(default = "default_resolution")]
    pub resolution: u32,
    /// Chunks drawn in each direction around the plane.
    #[serde(default = "default_view_radius")]
    pub view_radius: i32,
    #[serde(default)]
    pub eviction: EvictionPolicy,
}

/// Which chunk eviction strategy the terrain cache uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EvictionPolicy {
    /// Keep every chunk ever generated.
    #[default]
    None,
    FarthestFirst { max_chunks: usize },
    LeastRecentlyUsed { max_chunks: usize },
}

impl EvictionPolicy {
    pub fn into_strategy(self) -> Box<dyn EvictionStrategy> {
        match self {
            EvictionPolicy::None => Box::new(NoEviction),
            EvictionPolicy::FarthestFirst { max_chunks } => Box::new(FarthestFirst { max_chunks }),
            EvictionPolicy::LeastRecentlyUsed { max_chunks } => {
                Box::new(LeastRecentlyUsed { max_chunks })
            }
        }
    }
}

/// Asset file locations, relative to the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPaths {
    #[serde(default = "default_plane_model")]
    pub plane_model: PathBuf,
    #[serde(default)]
    pub plane_texture: Option<PathBuf>,
    #[serde(default = "default_goal_model")]
    pub goal_model: PathBuf,
    #[serde(default)]
    pub goal_texture: Option<PathBuf>,
    #[serde(default = "default_terrain_texture")]
    pub terrain_texture: Option<PathBuf>,
    /// Directory holding the six faces of the level 1 skybox.
    #[serde(default = "default_skybox_a")]
    pub skybox_a: PathBuf,
    /// Level 2 skybox, also reflected by the plane.
    #[serde(default = "default_skybox_b")]
    pub skybox_b: PathBuf,
}

fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}
fn default_true() -> bool {
    true
}
fn default_chunk_size() -> f32 {
    ChunkSettings::default().chunk_size
}
fn default_resolution() -> u32 {
    ChunkSettings::default().resolution
}
fn default_view_radius() -> i32 {
    4
}
fn default_plane_model() -> PathBuf {
    PathBuf::from("assets/models/paper_plane.glb")
}
fn default_goal_model() -> PathBuf {
    PathBuf::from("assets/models/star.glb")
}
fn default_terrain_texture() -> Option<PathBuf> {
    Some(PathBuf::from("assets/textures/grass.jpg"))
}
fn default_skybox_a() -> PathBuf {
    PathBuf::from("assets/skybox/day")
}
fn default_skybox_b() -> PathBuf {
    PathBuf::from("assets/skybox/dusk")
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            vsync: default_true(),
            fullscreen: false,
            world: WorldConfig::default(),
            assets: AssetPaths::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: None,
            chunk_size: default_chunk_size(),
            resolution: default_resolution(),
            view_radius: default_view_radius(),
            eviction: EvictionPolicy::default(),
        }
    }
}

impl WorldConfig {
    /// Reset out-of-range values to their defaults and report each one.
    pub fn sanitize(&mut self) -> Vec<WorldConfigError> {
        let mut rejected = Vec::new();
        if !(self.chunk_size.is_finite() && self.chunk_size > 0.0) {
            rejected.push(WorldConfigError::ChunkSize(self.chunk_size));
            self.chunk_size = default_chunk_size();
        }
        if self.resolution == 0 {
            rejected.push(WorldConfigError::Resolution);
            self.resolution = default_resolution();
        }
        if !(0..=MAX_VIEW_RADIUS).contains(&self.view_radius) {
            rejected.push(WorldConfigError::ViewRadius(self.view_radius));
            self.view_radius = default_view_radius();
        }
        rejected
    }

    pub fn chunk_settings(&self) -> ChunkSettings {
        ChunkSettings {
            chunk_size: self.chunk_size,
            resolution: self.resolution,
        }
    }
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            plane_model: default_plane_model(),
            plane_texture: None,
            goal_model: default_goal_model(),
            goal_texture: None,
            terrain_texture: default_terrain_texture(),
            skybox_a: default_skybox_a(),
            skybox_b: default_skybox_b(),
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            match Self::from_ron_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        } else {
            log::info!("No config at {:?}, using defaults", path);
        }
        Self::default()
    }

    /// Parse a config. Out-of-range `world` values fall back to their defaults with a
    /// warning; only malformed RON is an error.
    pub fn from_ron_str(data: &str) -> Result<Self, ron::error::SpannedError> {
        let mut config: Self = ron::from_str(data)?;
        for rejected in config.world.sanitize() {
            log::warn!("Invalid world config: {}, using default", rejected);
        }
        Ok(config)
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_struct_uses_defaults() {
        let config = GameConfig::from_ron_str("()").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.world.chunk_size, 40.0);
        assert_eq!(config.world.resolution, 20);
        assert_eq!(config.world.view_radius, 4);
        assert_eq!(config.world.eviction, EvictionPolicy::None);
        assert!(config.vsync);
    }

    #[test]
    fn parses_partial_config() {
        let config = GameConfig::from_ron_str(
            r#"(
                window_width: 800,
                world: (
                    seed: Some(42),
                    view_radius: 2,
                    eviction: FarthestFirst(max_chunks: 64),
                ),
                assets: (
                    plane_texture: Some("plane.png"),
                    terrain_texture: None,
                ),
            )"#,
        )
        .unwrap();
        assert_eq!(config.window_width, 800);
        assert_eq!(config.window_height, 720);
        assert_eq!(config.world.seed, Some(42));
        assert_eq!(config.world.view_radius, 2);
        assert_eq!(config.world.chunk_size, 40.0);
        assert_eq!(
            config.world.eviction,
            EvictionPolicy::FarthestFirst { max_chunks: 64 }
        );
        assert_eq!(config.assets.plane_texture, Some(PathBuf::from("plane.png")));
        assert_eq!(config.assets.terrain_texture, None);
        assert_eq!(config.assets.goal_model, default_goal_model());
    }

    #[test]
    fn invalid_config_is_an_error() {
        assert!(GameConfig::from_ron_str("(window_width: \"wide\")").is_err());
    }

    #[test]
    fn bad_chunk_size_falls_back_to_default() {
        for value in ["0.0", "-5.0"] {
            let config =
                GameConfig::from_ron_str(&format!("(world: (chunk_size: {}))", value)).unwrap();
            assert_eq!(config.world.chunk_size, 40.0, "chunk_size {}", value);
        }
        for value in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            let mut world = WorldConfig {
                chunk_size: value,
                ..WorldConfig::default()
            };
            let rejected = world.sanitize();
            assert_eq!(rejected.len(), 1);
            assert!(matches!(rejected[0], WorldConfigError::ChunkSize(_)));
            assert_eq!(world.chunk_size, 40.0);
        }
    }

    #[test]
    fn zero_resolution_falls_back_to_default() {
        let config = GameConfig::from_ron_str("(world: (resolution: 0))").unwrap();
        assert_eq!(config.world.resolution, 20);
    }

    #[test]
    fn view_radius_out_of_range_falls_back_to_default() {
        for value in [-1, MAX_VIEW_RADIUS + 1, i32::MAX] {
            let config =
                GameConfig::from_ron_str(&format!("(world: (view_radius: {}))", value)).unwrap();
            assert_eq!(config.world.view_radius, 4, "view_radius {}", value);
        }
        let edge = format!("(world: (view_radius: {}))", MAX_VIEW_RADIUS);
        let config = GameConfig::from_ron_str(&edge).unwrap();
        assert_eq!(config.world.view_radius, MAX_VIEW_RADIUS);
    }

    #[test]
    fn sanitize_keeps_valid_values() {
        let mut world = WorldConfig {
            seed: Some(9),
            chunk_size: 12.5,
            resolution: 1,
            view_radius: 0,
            eviction: EvictionPolicy::FarthestFirst { max_chunks: 4 },
        };
        let before = world.clone();
        assert!(world.sanitize().is_empty());
        assert_eq!(world, before);
    }

    #[test]
    fn sanitize_reports_every_rejection() {
        let mut world = WorldConfig {
            chunk_size: 0.0,
            resolution: 0,
            view_radius: -3,
            ..WorldConfig::default()
        };
        assert_eq!(
            world.sanitize(),
            vec![
                WorldConfigError::ChunkSize(0.0),
                WorldConfigError::Resolution,
                WorldConfigError::ViewRadius(-3),
            ]
        );
        assert_eq!(world, WorldConfig::default());
    }

    #[test]
    fn eviction_policy_builds_strategy() {
        assert_eq!(EvictionPolicy::None.into_strategy().name(), "none");
        assert_eq!(
            EvictionPolicy::LeastRecentlyUsed { max_chunks: 10 }
                .into_strategy()
                .name(),
            "least-recently-used"
        );
    }
}
