//! Error types for catalog construction and map conversion.

use std::io;

use thiserror::Error;

/// Errors that can occur during decomposition or reconstruction
#[derive(Error, Debug)]
pub enum GridError {
    #[error("Tilemap dimensions {0}x{1} are not multiples of tile size {2}")]
    TilemapDimensions(u32, u32, u32),

    #[error("Map image dimensions {0}x{1} don't match expected {2}x{2}")]
    ImageDimensions(u32, u32, u32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{count} cells matched neither a catalog tile nor a composite")]
    UnmatchedCells { count: usize },

    #[error("Grid is {rows}x{cols} cells but the map expects {expected}x{expected}")]
    GridShape {
        rows: usize,
        cols: usize,
        expected: usize,
    },

    #[error("Tile id {id} is out of range for a catalog of {count} tiles")]
    TileIdOutOfRange { id: i32, count: usize },

    #[error("Failed to read image: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
