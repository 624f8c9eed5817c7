//! Typed tile-variant registry.
//!
//! Raw raster ids come from the backend map generator and are open-ended;
//! rendering maps them onto a small fixed set of variants at compose time,
//! with an explicit fallback for ids the registry does not know.

use std::collections::HashMap;

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileVariant {
    Grass,
    Dirt,
    Pavement,
    Water,
    RoadStraight,
    RoadCorner,
    RoadCross,
}

#[derive(Resource, Debug)]
pub struct VariantRegistry {
    ground: HashMap<u16, TileVariant>,
    road: HashMap<u16, TileVariant>,
    pub ground_fallback: TileVariant,
    pub road_fallback: TileVariant,
}

impl Default for VariantRegistry {
    fn default() -> Self {
        Self {
            ground: HashMap::from([
                (1, TileVariant::Grass),
                (2, TileVariant::Dirt),
                (3, TileVariant::Pavement),
                (4, TileVariant::Water),
            ]),
            road: HashMap::from([
                (1, TileVariant::RoadStraight),
                (2, TileVariant::RoadStraight),
                (3, TileVariant::RoadCorner),
                (4, TileVariant::RoadCorner),
                (5, TileVariant::RoadCross),
            ]),
            ground_fallback: TileVariant::Grass,
            road_fallback: TileVariant::RoadStraight,
        }
    }
}

impl VariantRegistry {
    pub fn resolve_ground(&self, id: u16) -> TileVariant {
        self.ground.get(&id).copied().unwrap_or(self.ground_fallback)
    }

    pub fn resolve_road(&self, id: u16) -> TileVariant {
        self.road.get(&id).copied().unwrap_or(self.road_fallback)
    }
}
