use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::config::EDGE_ZONE_ID;

// ---------------------------------------------------------------------------
// Map descriptor (backend-supplied data shape)
// ---------------------------------------------------------------------------

/// Raw map data handed to the engine by the backend. Raster layers are
/// row-major, `width * height` entries each.
#[derive(Debug, Clone, Deserialize)]
pub struct MapDescriptor {
    pub width: usize,
    pub height: usize,
    pub tile_width: f32,
    pub tile_height: f32,
    pub ground_layer: Vec<u16>,
    pub road_layer: Vec<u16>,
    pub zone_layer: Vec<u8>,
    #[serde(default)]
    pub building_data: Vec<BuildingDescriptor>,
    #[serde(default)]
    pub decoration_data: Vec<DecorationDescriptor>,
}

/// Precomputed building footprint. `floors` is the number of indoor floor
/// records, each as wide as the footprint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BuildingDescriptor {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub floors: usize,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DecorationDescriptor {
    pub x: usize,
    pub y: usize,
    pub kind: u16,
}

#[derive(Error, Debug, PartialEq)]
pub enum MapError {
    #[error("map dimensions must be non-zero (got {width}x{height})")]
    ZeroDimension { width: usize, height: usize },
    #[error("{layer} layer has {got} entries, expected {expected}")]
    LayerSize {
        layer: &'static str,
        got: usize,
        expected: usize,
    },
    #[error("tile size must be positive (got {tile_width}x{tile_height})")]
    BadTileSize { tile_width: f32, tile_height: f32 },
}

impl MapDescriptor {
    /// Reject malformed descriptors before any engine state is touched.
    pub fn validate(&self) -> Result<(), MapError> {
        if self.width == 0 || self.height == 0 {
            return Err(MapError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.tile_width > 0.0 && self.tile_height > 0.0) {
            return Err(MapError::BadTileSize {
                tile_width: self.tile_width,
                tile_height: self.tile_height,
            });
        }
        let expected = self.width * self.height;
        for (layer, got) in [
            ("ground", self.ground_layer.len()),
            ("road", self.road_layer.len()),
            ("zone", self.zone_layer.len()),
        ] {
            if got != expected {
                return Err(MapError::LayerSize {
                    layer,
                    got,
                    expected,
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TileGrid resource
// ---------------------------------------------------------------------------

/// Immutable raster snapshot for the current map version. Replaced wholesale
/// on every rebuild; consumers must never observe a partially updated grid.
#[derive(Resource, Debug, Clone, Default)]
pub struct TileGrid {
    /// Bumped on every rebuild. Version 0 means no map has been built yet.
    pub version: u64,
    pub width: usize,
    pub height: usize,
    pub tile_width: f32,
    pub tile_height: f32,
    pub ground: Vec<u16>,
    pub roads: Vec<u16>,
    pub zones: Vec<u8>,
    pub decorations: Vec<DecorationDescriptor>,
}

impl TileGrid {
    pub fn from_descriptor(d: &MapDescriptor, version: u64) -> Self {
        Self {
            version,
            width: d.width,
            height: d.height,
            tile_width: d.tile_width,
            tile_height: d.tile_height,
            ground: d.ground_layer.clone(),
            roads: d.road_layer.clone(),
            zones: d.zone_layer.clone(),
            decorations: d.decoration_data.clone(),
        }
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn ground_id(&self, x: usize, y: usize) -> u16 {
        self.ground[self.index(x, y)]
    }

    #[inline]
    pub fn road_id(&self, x: usize, y: usize) -> u16 {
        self.roads[self.index(x, y)]
    }

    /// Edge zones are ineligible for entity placement.
    #[inline]
    pub fn is_edge_zone(&self, x: usize, y: usize) -> bool {
        self.zones[self.index(x, y)] == EDGE_ZONE_ID
    }

    /// Center of a grid cell in world coordinates.
    pub fn grid_to_world(&self, gx: usize, gy: usize) -> (f32, f32) {
        (
            gx as f32 * self.tile_width + self.tile_width * 0.5,
            gy as f32 * self.tile_height + self.tile_height * 0.5,
        )
    }

    pub fn world_to_grid(&self, wx: f32, wy: f32) -> (i32, i32) {
        (
            (wx / self.tile_width).floor() as i32,
            (wy / self.tile_height).floor() as i32,
        )
    }

    pub fn world_width(&self) -> f32 {
        self.width as f32 * self.tile_width
    }

    pub fn world_height(&self) -> f32 {
        self.height as f32 * self.tile_height
    }
}
