//! Tile palette built from the reference tilemap.
//!
//! The catalog slices the tilemap into fixed-size tiles, indexes them by
//! exact pixel content, and precomputes every (base, overlay) composite so
//! decomposition can recover the base tile hidden under a decoration.

use std::collections::HashMap;

use image::imageops::crop_imm;
use image::RgbaImage;
use itertools::iproduct;

use crate::error::GridError;

/// Number of base ("grass") tiles at the front of the catalog. Composites
/// are only precomputed over these bases.
pub const BASE_TILES: usize = 3;

/// A precomputed overlay-over-base blend and the ids that produced it
#[derive(Debug, Clone)]
pub struct Composite {
    pixels: Vec<u8>,
    pub overlay_id: usize,
    pub base_id: usize,
}

/// Ordered tile palette with an exact-match index and composite list
pub struct TileCatalog {
    tile_size: u32,
    tiles: Vec<RgbaImage>,
    index: HashMap<Vec<u8>, usize>,
    composites: Vec<Composite>,
}

impl TileCatalog {
    /// Slice `img` into tiles in raster order, index them by content, and
    /// precompute all (base, overlay) composites.
    ///
    /// Fails if either image dimension is not a multiple of `tile_size`.
    pub fn from_image(img: &RgbaImage, tile_size: u32) -> Result<Self, GridError> {
        let (width, height) = img.dimensions();
        if tile_size == 0 || width % tile_size != 0 || height % tile_size != 0 {
            return Err(GridError::TilemapDimensions(width, height, tile_size));
        }

        let step = tile_size as usize;
        let mut tiles = Vec::with_capacity(((width / tile_size) * (height / tile_size)) as usize);
        for (y, x) in iproduct!((0..height).step_by(step), (0..width).step_by(step)) {
            tiles.push(crop_imm(img, x, y, tile_size, tile_size).to_image());
        }

        // First occurrence wins if the tilemap contains duplicate tiles.
        let mut index = HashMap::with_capacity(tiles.len());
        for (id, tile) in tiles.iter().enumerate() {
            index.entry(tile.as_raw().clone()).or_insert(id);
        }

        let base_count = BASE_TILES.min(tiles.len());
        let mut composites = Vec::new();
        for (base_id, overlay_id) in iproduct!(0..base_count, BASE_TILES..tiles.len()) {
            let mut blended = tiles[base_id].clone();
            mask_paste(&mut blended, &tiles[overlay_id]);
            composites.push(Composite {
                pixels: blended.into_raw(),
                overlay_id,
                base_id,
            });
        }

        Ok(TileCatalog {
            tile_size,
            tiles,
            index,
            composites,
        })
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Total number of tiles sliced from the tilemap
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Pixels of the tile with the given id
    pub fn tile(&self, id: usize) -> Option<&RgbaImage> {
        self.tiles.get(id)
    }

    /// Exact pixel-content lookup
    pub fn lookup_exact(&self, pixels: &[u8]) -> Option<usize> {
        self.index.get(pixels).copied()
    }

    /// Match `pixels` against the precomputed composites, returning
    /// `(overlay_id, base_id)`. Linear scan; first match in catalog order
    /// wins. Fine while the catalog stays at a few hundred tiles.
    pub fn lookup_composite(&self, pixels: &[u8]) -> Option<(usize, usize)> {
        self.composites
            .iter()
            .find(|c| c.pixels == pixels)
            .map(|c| (c.overlay_id, c.base_id))
    }
}

/// Paste `overlay` onto `base`, replacing each pixel wherever the overlay's
/// alpha is nonzero. All-or-nothing per pixel, never a weighted blend.
pub fn mask_paste(base: &mut RgbaImage, overlay: &RgbaImage) {
    for (dst, src) in base.pixels_mut().zip(overlay.pixels()) {
        if src[3] > 0 {
            *dst = *src;
        }
    }
}

/// Raw RGBA bytes of the tile-sized block at pixel origin `(x, y)`
pub(crate) fn block_bytes(img: &RgbaImage, x: u32, y: u32, tile_size: u32) -> Vec<u8> {
    crop_imm(img, x, y, tile_size, tile_size).to_image().into_raw()
}
