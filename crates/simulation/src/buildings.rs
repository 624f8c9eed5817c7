use std::collections::HashMap;

use bevy::prelude::*;

use crate::config::FLOOR_UNIT_CAPACITY;
use crate::map::{BuildingDescriptor, TileGrid};

// ---------------------------------------------------------------------------
// Components and resources
// ---------------------------------------------------------------------------

/// One indoor floor of a building. Capacity is proportional to the floor's
/// width; occupants are agent entities placed by the indoor allocator.
#[derive(Debug, Clone)]
pub struct Floor {
    pub width: usize,
    pub capacity: usize,
    pub occupants: Vec<Entity>,
}

impl Floor {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            capacity: width * FLOOR_UNIT_CAPACITY,
            occupants: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.occupants.len() >= self.capacity
    }
}

#[derive(Component, Debug, Clone)]
pub struct Building {
    /// Sequential id within the current map version.
    pub id: u32,
    pub origin: (usize, usize),
    pub size: (usize, usize),
    /// Every grid cell covered by the footprint.
    pub cells: Vec<(usize, usize)>,
    pub floors: Vec<Floor>,
    /// All indoor occupants, across floors.
    pub occupants: Vec<Entity>,
}

impl Building {
    pub fn indoor_capacity(&self) -> usize {
        self.floors.iter().map(|f| f.capacity).sum()
    }
}

/// Grid cell -> building entity claiming it.
///
/// Published wholesale at map build time and read by the population
/// allocator; never mutated mid-pass. Invariant: every key maps to exactly
/// one building, so footprints are pairwise disjoint.
#[derive(Resource, Debug, Default)]
pub struct OccupancyIndex {
    pub cells: HashMap<(usize, usize), Entity>,
}

impl OccupancyIndex {
    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.cells.contains_key(&(x, y))
    }

    pub fn building_at(&self, x: usize, y: usize) -> Option<Entity> {
        self.cells.get(&(x, y)).copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// Register every descriptor into the occupancy index and spawn a `Building`
/// entity per accepted footprint. Returns the number of buildings placed.
///
/// Descriptors whose origin cell was already processed are silently skipped
/// (the upstream map generator de-duplicates by origin only). A footprint
/// that would collide with an already-reserved cell is rejected whole, with
/// a warning, so the disjointness invariant holds even against bad input.
pub fn place_all(world: &mut World, descriptors: &[BuildingDescriptor]) -> usize {
    let (grid_w, grid_h) = {
        let grid = world.resource::<TileGrid>();
        (grid.width, grid.height)
    };

    world.resource_scope(|world, mut occupancy: Mut<OccupancyIndex>| {
        let mut placed: u32 = 0;
        for d in descriptors {
            let origin = (d.x, d.y);
            if occupancy.cells.contains_key(&origin) {
                debug!("building at {:?} already processed, skipping", origin);
                continue;
            }
            if d.width == 0 || d.height == 0 || d.x + d.width > grid_w || d.y + d.height > grid_h {
                warn!(
                    "building at {:?} ({}x{}) does not fit the {}x{} grid, skipping",
                    origin, d.width, d.height, grid_w, grid_h
                );
                continue;
            }

            let mut cells = Vec::with_capacity(d.width * d.height);
            for dy in 0..d.height {
                for dx in 0..d.width {
                    cells.push((d.x + dx, d.y + dy));
                }
            }
            // Footprint overlap is an unverified upstream assumption; reject
            // the whole descriptor rather than reserving a partial footprint.
            if let Some(claimed) = cells.iter().find(|c| occupancy.cells.contains_key(c)) {
                warn!(
                    "building at {:?} overlaps cell {:?} already claimed by another building, skipping",
                    origin, claimed
                );
                continue;
            }

            let floors = (0..d.floors).map(|_| Floor::new(d.width)).collect();
            let entity = world
                .spawn(Building {
                    id: placed,
                    origin,
                    size: (d.width, d.height),
                    cells: cells.clone(),
                    floors,
                    occupants: Vec::new(),
                })
                .id();
            for cell in cells {
                occupancy.cells.insert(cell, entity);
            }
            placed += 1;
        }
        placed as usize
    })
}
