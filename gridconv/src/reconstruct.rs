//! Rebuilds a map image from a two-layer grid and verifies round-trips.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use image::{ImageFormat, RgbaImage};
use itertools::izip;

use crate::catalog::TileCatalog;
use crate::error::GridError;
use crate::grid::{tmp_path, TileGrid, NO_TILE};

/// Paint the grid back into a full map image.
///
/// Starts from a fully transparent canvas. Per cell, the grass tile is
/// painted opaquely, then the decor tile is pasted on top using its own
/// alpha as mask. Cells with neither stay transparent.
pub fn reconstruct(
    grid: &TileGrid,
    catalog: &TileCatalog,
    map_size: u32,
) -> Result<RgbaImage, GridError> {
    let tile_size = catalog.tile_size();
    let expected = (map_size / tile_size) as usize;
    if grid.rows() != expected || grid.cols() != expected || grid.decor_layer.len() != expected {
        return Err(GridError::GridShape {
            rows: grid.rows(),
            cols: grid.cols(),
            expected,
        });
    }

    let mut img = RgbaImage::new(map_size, map_size);
    for (row, grass_row, decor_row) in izip!(0u32.., &grid.grass_layer, &grid.decor_layer) {
        for (col, &grass, &decor) in izip!(0u32.., grass_row, decor_row) {
            let x = col * tile_size;
            let y = row * tile_size;
            if grass != NO_TILE {
                paint(&mut img, fetch(catalog, grass)?, x, y, false);
            }
            if decor != NO_TILE {
                paint(&mut img, fetch(catalog, decor)?, x, y, true);
            }
        }
    }
    Ok(img)
}

/// Resolve a grid id against the catalog. Ids can be out of range when the
/// grid was hand-edited or written by a different tilemap's run.
fn fetch(catalog: &TileCatalog, id: i32) -> Result<&RgbaImage, GridError> {
    usize::try_from(id)
        .ok()
        .and_then(|id| catalog.tile(id))
        .ok_or(GridError::TileIdOutOfRange {
            id,
            count: catalog.len(),
        })
}

/// Copy `tile` onto the canvas at `(x, y)`. With `masked`, pixels with zero
/// alpha are skipped, leaving the canvas unchanged underneath.
fn paint(canvas: &mut RgbaImage, tile: &RgbaImage, x: u32, y: u32, masked: bool) {
    for (tx, ty, px) in tile.enumerate_pixels() {
        if !masked || px[3] > 0 {
            canvas.put_pixel(x + tx, y + ty, *px);
        }
    }
}

/// Exact per-pixel RGBA equality, no tolerance
pub fn images_match(a: &RgbaImage, b: &RgbaImage) -> bool {
    a.dimensions() == b.dimensions() && a.as_raw() == b.as_raw()
}

/// Write a PNG atomically: encode to a temporary sibling, then rename
pub fn save_png(img: &RgbaImage, path: &Path) -> Result<(), GridError> {
    let tmp = tmp_path(path);
    let mut writer = BufWriter::new(File::create(&tmp)?);
    img.write_to(&mut writer, ImageFormat::Png)?;
    drop(writer);
    fs::rename(&tmp, path)?;
    Ok(())
}
