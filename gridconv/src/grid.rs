//! Two-layer integer grid model and its JSON persistence.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// Sentinel for "no tile at this cell"
pub const NO_TILE: i32 = -1;

/// Decomposed map: base terrain ids and overlay decoration ids per cell.
///
/// `grass_layer` holds -1 or a base tile id (0..3); `decor_layer` holds -1
/// or an overlay tile id (3 and up). Both layers have the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    pub grass_layer: Vec<Vec<i32>>,
    pub decor_layer: Vec<Vec<i32>>,
}

impl TileGrid {
    /// Square grid of the given dimension with every cell empty
    pub fn new(dim: usize) -> Self {
        TileGrid {
            grass_layer: vec![vec![NO_TILE; dim]; dim],
            decor_layer: vec![vec![NO_TILE; dim]; dim],
        }
    }

    pub fn rows(&self) -> usize {
        self.grass_layer.len()
    }

    pub fn cols(&self) -> usize {
        self.grass_layer.first().map_or(0, Vec::len)
    }

    /// Write the grid as pretty-printed JSON. The write is atomic: the file
    /// appears under its final name only once fully written.
    pub fn save(&self, path: &Path) -> Result<(), GridError> {
        let tmp = tmp_path(path);
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        drop(writer);
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Reload a grid previously written by [`TileGrid::save`]
    pub fn load(path: &Path) -> Result<Self, GridError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

/// Sibling path used for atomic writes
pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("out"));
    name.push(".tmp");
    path.with_file_name(name)
}
