use std::{
    fs, io,
    path::{Path, PathBuf},
};

use deepsky_lib::{math::bounds::CellBounds, octree::OctreeParams};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("octree root size should be positive and finite, got {0}")]
    InvalidRootSize(f64),
    #[error("max octree depth should be at most {}, got {0}", CatalogConfig::MAX_OCTREE_DEPTH)]
    InvalidMaxDepth(u8),
}

/// Settings for building a deep sky catalog.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Half the edge length of the root octree cell in light years.
    pub octree_root_size: f64,
    /// The apparent magnitude that an object at the root limit has when seen from the edge of the
    /// root cell.
    pub octree_magnitude: f32,
    /// Depth at which octree nodes stop subdividing.
    pub max_octree_depth: u8,
    /// The smallest capacity the object list grows to.
    pub min_capacity: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            octree_root_size: 1.0e10,
            octree_magnitude: 8.0,
            max_octree_depth: 48,
            min_capacity: 100,
        }
    }
}

impl CatalogConfig {
    /// Cells below this depth would be smaller than the precision of their center.
    pub const MAX_OCTREE_DEPTH: u8 = 64;

    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let toml = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&toml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.octree_root_size > 0.0 && self.octree_root_size.is_finite()) {
            return Err(ConfigError::InvalidRootSize(self.octree_root_size));
        }
        if self.max_octree_depth > Self::MAX_OCTREE_DEPTH {
            return Err(ConfigError::InvalidMaxDepth(self.max_octree_depth));
        }
        Ok(())
    }

    /// The octree layout for these settings, with the root cell centered at the origin.
    ///
    /// # Panics
    ///
    /// Panics if [`Self::octree_root_size`] is negative or `NaN`.
    pub fn octree_params(&self) -> OctreeParams {
        OctreeParams::from_apparent_magnitude(
            CellBounds::new(DVec3::ZERO, self.octree_root_size),
            self.octree_magnitude,
            self.max_octree_depth,
        )
    }
}
