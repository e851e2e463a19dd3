//! Calculation of raster tile indices covering a map view.

use crate::geo::Rect;
use crate::view::MapView;

const RESOLUTION_TOLERANCE: f64 = 0.01;

const WEB_WORLD_HALF_SIZE: f64 = 20037508.342787;
const WEB_TOP_RESOLUTION: f64 = 156543.03392800014;

/// Index of a single tile in the tile pyramid.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub struct TileIndex {
    /// X index, growing eastwards.
    pub x: i32,
    /// Y index, growing southwards.
    pub y: i32,
    /// Zoom level.
    pub z: u32,
}

impl TileIndex {
    /// Creates a new index instance.
    pub fn new(x: i32, y: i32, z: u32) -> Self {
        Self { x, y, z }
    }
}

/// Tile grid parameters: tile sizes, available zoom levels and the extent of
/// the tiled world.
///
/// The grid is centered on the projection origin, and tile `(0, 0)` of every
/// zoom level sits at the north-west corner of the world (OSM convention).
/// Each zoom level halves the resolution of the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSchema {
    world_half_size: f64,
    top_resolution: f64,
    lod_count: u32,
    tile_size: u32,
}

impl TileSchema {
    /// Standard Web Mercator schema used by OSM and compatible tile services.
    pub fn web(lod_count: u32) -> Self {
        Self {
            world_half_size: WEB_WORLD_HALF_SIZE,
            top_resolution: WEB_TOP_RESOLUTION,
            lod_count,
            tile_size: 256,
        }
    }

    /// Width and height of a single tile in pixels.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Resolution of the given zoom level, if the level exists.
    pub fn lod_resolution(&self, z: u32) -> Option<f64> {
        (z < self.lod_count).then(|| self.top_resolution / 2f64.powi(z as i32))
    }

    /// Selects the zoom level to display for the given view resolution.
    ///
    /// Returns the coarsest level that is not noticeably coarser than the
    /// requested resolution, falling back to the finest level available.
    pub fn select_zoom(&self, resolution: f64) -> Option<u32> {
        if !resolution.is_finite() || self.lod_count == 0 {
            return None;
        }

        for z in 0..self.lod_count {
            let lod_resolution = self.top_resolution / 2f64.powi(z as i32);
            if lod_resolution * (1.0 - RESOLUTION_TOLERANCE) <= resolution {
                return Some(z);
            }
        }

        Some(self.lod_count - 1)
    }

    /// Iterates over indices of the tiles that cover the given view.
    pub fn iter_tiles(&self, view: &MapView) -> Option<impl Iterator<Item = TileIndex>> {
        let bbox = view.bbox()?;
        self.iter_tiles_over_bbox(view.resolution(), bbox)
    }

    fn iter_tiles_over_bbox(
        &self,
        resolution: f64,
        bbox: Rect,
    ) -> Option<impl Iterator<Item = TileIndex>> {
        let z = self.select_zoom(resolution)?;
        let lod_resolution = self.lod_resolution(z)?;
        let tile_m = lod_resolution * self.tile_size as f64;
        let max_index = (self.world_half_size * 2.0 / tile_m).round() as i32 - 1;

        let x_min = ((bbox.x_min() + self.world_half_size) / tile_m).floor() as i32;
        let x_min = x_min.max(0);

        let x_max_adj = bbox.x_max() + self.world_half_size;
        let x_add_one = if (x_max_adj % tile_m) < 0.001 { -1 } else { 0 };
        let x_max = ((x_max_adj / tile_m) as i32 + x_add_one).min(max_index);

        // Y indices grow southwards, so the north edge of the bbox gives the
        // first row.
        let y_min = ((self.world_half_size - bbox.y_max()) / tile_m) as i32;
        let y_min = y_min.max(0);

        let y_max_adj = self.world_half_size - bbox.y_min();
        let y_add_one = if (y_max_adj % tile_m) < 0.001 { -1 } else { 0 };
        let y_max = ((y_max_adj / tile_m) as i32 + y_add_one).min(max_index);

        Some(
            (x_min..=x_max)
                .flat_map(move |x| (y_min..=y_max).map(move |y| TileIndex::new(x, y, z))),
        )
    }

    /// Bounds of the given tile in projected map coordinates.
    pub fn tile_bbox(&self, index: TileIndex) -> Option<Rect> {
        let resolution = self.lod_resolution(index.z)?;
        let tile_m = resolution * self.tile_size as f64;

        let x_min = -self.world_half_size + index.x as f64 * tile_m;
        let y_max = self.world_half_size - index.y as f64 * tile_m;

        Some(Rect::new(x_min, y_max - tile_m, x_min + tile_m, y_max))
    }
}
