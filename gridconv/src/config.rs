//! Run configuration: paths and sizing for a conversion batch.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// Configuration for the conversion process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Reference tilemap image path
    pub tilemap: PathBuf,
    /// Directory of map images to decompose
    pub input_dir: PathBuf,
    /// Directory for grid JSON files and recreated images
    pub output_dir: PathBuf,
    /// Tile edge length in pixels
    pub tile_size: u32,
    /// Map image edge length in pixels, a multiple of `tile_size`
    pub map_size: u32,
    /// Treat unmatched cells as a per-image error instead of a warning
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tilemap: PathBuf::from("tilemap.png"),
            input_dir: PathBuf::from("input_images"),
            output_dir: PathBuf::from("output_grids"),
            tile_size: 16,
            map_size: 320,
            strict: false,
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, GridError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Check the sizing invariants before any image is touched
    pub fn validate(&self) -> Result<(), GridError> {
        if self.tile_size == 0 {
            return Err(GridError::InvalidConfig("tile size must be nonzero".into()));
        }
        if self.map_size == 0 || self.map_size % self.tile_size != 0 {
            return Err(GridError::InvalidConfig(format!(
                "map size {} must be a nonzero multiple of tile size {}",
                self.map_size, self.tile_size
            )));
        }
        Ok(())
    }

    /// Number of cells along each edge of a map image
    pub fn grid_dim(&self) -> u32 {
        self.map_size / self.tile_size
    }
}
