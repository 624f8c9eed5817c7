//! Population allocation: type-balanced queue construction, outdoor
//! rejection-sampled placement, and breadth-first indoor placement.
//!
//! Every exhaustion path here is a counter/queue-length check, logged and
//! non-fatal. Nothing in this module panics on bad luck or empty input.

use std::collections::{HashMap, HashSet, VecDeque};

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::agents::{
    Agent, AgentId, GridPosition, Indoors, Inside, MoveState, Position, Profile, RosterEntry,
    Velocity, VisualCategory,
};
use crate::buildings::{Building, OccupancyIndex};
use crate::config::{OUTDOOR_DENSITY, OUTDOOR_MARGIN, PLACEMENT_ATTEMPT_LIMIT};
use crate::lifecycle::{MapReady, MapState};
use crate::map::TileGrid;
use crate::roads::{RoadGraph, RoadNode};
use crate::sim_rng::SimRng;

// ---------------------------------------------------------------------------
// Configuration and bookkeeping resources
// ---------------------------------------------------------------------------

/// Declared agent type -> visual category. Unmapped types resolve to
/// [`VisualCategory::FALLBACK`].
#[derive(Resource, Debug, Clone, Default)]
pub struct CategoryTable(pub HashMap<String, VisualCategory>);

impl CategoryTable {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, VisualCategory)>,
    {
        Self(pairs.into_iter().collect())
    }

    pub fn category_for(&self, agent_type: &str) -> VisualCategory {
        self.0
            .get(agent_type)
            .copied()
            .unwrap_or(VisualCategory::FALLBACK)
    }
}

/// Running count of entities created for the current map version, bounded by
/// the global population capacity. Reset to zero on every map rebuild before
/// any new allocation call.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PopulationCounter {
    pub spawned: u32,
    pub capacity: u32,
}

impl PopulationCounter {
    pub fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.spawned)
    }
}

/// Grid cells already holding an outdoor agent for this map version. Outdoor
/// sampling rejects claimed cells so agents never stack on spawn.
#[derive(Resource, Debug, Default)]
pub struct OutdoorClaims(pub HashSet<(usize, usize)>);

/// Identity ids already turned into entities for this map version. Queue
/// construction skips them, so an identity is consumed at most once even
/// across repeated allocation calls.
#[derive(Resource, Debug, Default)]
pub struct PlacedIdentities(pub HashSet<u64>);

// ---------------------------------------------------------------------------
// Spawn queue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub id: u64,
    pub agent_type: String,
    pub category: VisualCategory,
    pub profile: crate::agents::AgentProfile,
}

/// Type-balanced identity queue. Identities are grouped by declared type,
/// each group is shuffled independently, and the groups are interleaved
/// round-robin up to the longest group's length.
#[derive(Resource, Debug, Default)]
pub struct SpawnQueue {
    entries: VecDeque<QueueEntry>,
}

impl SpawnQueue {
    pub fn build<'a, I, R>(roster: I, table: &CategoryTable, rng: &mut R) -> Self
    where
        I: IntoIterator<Item = &'a RosterEntry>,
        R: Rng + ?Sized,
    {
        // Group by declared type, preserving first-seen type order so the
        // interleave is stable for a given roster + seed.
        let mut type_order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<QueueEntry>> = HashMap::new();
        for entry in roster {
            let agent_type = entry.profile.agent_type.clone();
            if !groups.contains_key(&agent_type) {
                type_order.push(agent_type.clone());
            }
            groups.entry(agent_type.clone()).or_default().push(QueueEntry {
                id: entry.id,
                category: table.category_for(&agent_type),
                agent_type,
                profile: entry.profile.clone(),
            });
        }

        // Shuffle groups in first-seen type order. Iterating the map here
        // would consume the RNG stream in the map's per-instance order and
        // break seed reproducibility.
        for agent_type in &type_order {
            if let Some(group) = groups.get_mut(agent_type) {
                group.shuffle(rng);
            }
        }

        let longest = groups.values().map(Vec::len).max().unwrap_or(0);
        let mut entries = VecDeque::new();
        for round in 0..longest {
            for agent_type in &type_order {
                if let Some(entry) = groups.get(agent_type).and_then(|g| g.get(round)) {
                    entries.push_back(entry.clone());
                }
            }
        }
        Self { entries }
    }

    /// Pop the queue head. `None` signals exhaustion; callers stop
    /// gracefully rather than treating it as an error.
    pub fn next(&mut self) -> Option<QueueEntry> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Allocation request handling
// ---------------------------------------------------------------------------

#[derive(Event, Debug, Clone)]
pub struct AllocatePopulationRequest {
    pub roster: Vec<RosterEntry>,
    /// Global population capacity for this map version.
    pub capacity: u32,
}

/// Effective outdoor capacity for a grid: one agent per [`OUTDOOR_DENSITY`]
/// interior cells, with a fixed border margin excluded.
pub fn outdoor_capacity(width: usize, height: usize) -> usize {
    width.saturating_sub(OUTDOOR_MARGIN) * height.saturating_sub(OUTDOOR_MARGIN) / OUTDOOR_DENSITY
}

#[allow(clippy::too_many_arguments)]
pub fn handle_allocate_requests(
    mut commands: Commands,
    mut events: EventReader<AllocatePopulationRequest>,
    state: Res<State<MapState>>,
    grid: Res<TileGrid>,
    roads: Res<RoadGraph>,
    occupancy: Res<OccupancyIndex>,
    table: Res<CategoryTable>,
    mut queue: ResMut<SpawnQueue>,
    mut counter: ResMut<PopulationCounter>,
    mut claims: ResMut<OutdoorClaims>,
    mut placed_ids: ResMut<PlacedIdentities>,
    mut rng: ResMut<SimRng>,
    mut buildings: Query<(Entity, &mut Building)>,
    mut ready: EventWriter<MapReady>,
) {
    for request in events.read() {
        if *state.get() != MapState::Ready {
            warn!(
                "allocate_population called before the map is ready; ignoring {} identities",
                request.roster.len()
            );
            continue;
        }

        counter.capacity = request.capacity;
        let unused: Vec<&RosterEntry> = request
            .roster
            .iter()
            .filter(|e| !placed_ids.0.contains(&e.id))
            .collect();
        *queue = SpawnQueue::build(unused, &table, &mut rng.0);

        let outdoor = place_outdoor(
            &mut commands,
            &grid,
            &roads,
            &occupancy,
            &mut claims,
            &mut queue,
            &mut counter,
            &mut placed_ids,
            &mut rng.0,
        );
        let indoor = place_indoor(
            &mut commands,
            &grid,
            &mut buildings,
            &mut queue,
            &mut counter,
            &mut placed_ids,
        );

        info!(
            "population allocated for map v{}: {} outdoor, {} indoor, {} identities left in queue",
            grid.version,
            outdoor,
            indoor,
            queue.len()
        );
        ready.send(MapReady {
            version: grid.version,
            outdoor,
            indoor,
        });
    }
}

// ---------------------------------------------------------------------------
// Outdoor placement
// ---------------------------------------------------------------------------

/// Sample a spawnable cell from the road graph's node set: not
/// building-occupied, not an edge zone, and not already claimed by another
/// outdoor agent. Bounded by [`PLACEMENT_ATTEMPT_LIMIT`]; `None` means the
/// ceiling was exhausted.
fn sample_outdoor_cell<R: Rng + ?Sized>(
    nodes: &[RoadNode],
    grid: &TileGrid,
    occupancy: &OccupancyIndex,
    claims: &OutdoorClaims,
    rng: &mut R,
) -> Option<(usize, usize)> {
    if nodes.is_empty() {
        return None;
    }
    for _ in 0..PLACEMENT_ATTEMPT_LIMIT {
        let RoadNode(x, y) = nodes[rng.gen_range(0..nodes.len())];
        if occupancy.contains(x, y) || grid.is_edge_zone(x, y) || claims.0.contains(&(x, y)) {
            continue;
        }
        return Some((x, y));
    }
    None
}

#[allow(clippy::too_many_arguments)]
fn place_outdoor<R: Rng + ?Sized>(
    commands: &mut Commands,
    grid: &TileGrid,
    roads: &RoadGraph,
    occupancy: &OccupancyIndex,
    claims: &mut OutdoorClaims,
    queue: &mut SpawnQueue,
    counter: &mut PopulationCounter,
    placed_ids: &mut PlacedIdentities,
    rng: &mut R,
) -> u32 {
    let effective = outdoor_capacity(grid.width, grid.height).min(counter.remaining() as usize);
    // Sorted snapshot of the node set, so sampling order is a function of
    // the seed alone.
    let mut nodes: Vec<RoadNode> = roads.edges.keys().copied().collect();
    nodes.sort_unstable();

    let mut placed = 0u32;
    for _ in 0..effective {
        // Find the cell before dequeuing so a failed search never consumes
        // an identity.
        let Some((gx, gy)) = sample_outdoor_cell(&nodes, grid, occupancy, claims, rng) else {
            // Fail fast: the whole pass aborts, not just this unit.
            warn!(
                "outdoor allocation: no valid cell within {} attempts after {} placements; aborting pass",
                PLACEMENT_ATTEMPT_LIMIT, placed
            );
            return placed;
        };
        let Some(entry) = queue.next() else {
            info!(
                "outdoor allocation: roster queue exhausted after {} placements",
                placed
            );
            return placed;
        };

        let (wx, wy) = grid.grid_to_world(gx, gy);
        placed_ids.0.insert(entry.id);
        commands.spawn((
            Agent,
            AgentId(entry.id),
            entry.category,
            Profile(entry.profile),
            Position { x: wx, y: wy },
            GridPosition { x: gx, y: gy },
            Velocity::default(),
            MoveState::default(),
        ));
        claims.0.insert((gx, gy));
        counter.spawned += 1;
        placed += 1;
    }
    placed
}

// ---------------------------------------------------------------------------
// Indoor placement
// ---------------------------------------------------------------------------

/// Fill building floors breadth-first: each outer pass gives every floor
/// still under capacity at most one new occupant, so occupancy spreads
/// evenly across floors and buildings before any floor fills.
fn place_indoor(
    commands: &mut Commands,
    grid: &TileGrid,
    buildings: &mut Query<(Entity, &mut Building)>,
    queue: &mut SpawnQueue,
    counter: &mut PopulationCounter,
    placed_ids: &mut PlacedIdentities,
) -> u32 {
    let mut placed = 0u32;
    loop {
        if counter.remaining() == 0 {
            info!(
                "indoor allocation stopped: global capacity reached ({} placed)",
                placed
            );
            return placed;
        }
        let mut open_floors = false;
        for (building_entity, mut building) in buildings.iter_mut() {
            let (bx, by) = building.origin;
            let (wx, wy) = grid.grid_to_world(bx, by);
            for floor in 0..building.floors.len() {
                if building.floors[floor].is_full() {
                    continue;
                }
                open_floors = true;
                if counter.remaining() == 0 {
                    info!(
                        "indoor allocation stopped: global capacity reached ({} placed)",
                        placed
                    );
                    return placed;
                }
                let Some(entry) = queue.next() else {
                    info!(
                        "indoor allocation stopped: roster queue exhausted ({} placed)",
                        placed
                    );
                    return placed;
                };

                placed_ids.0.insert(entry.id);
                let agent = commands
                    .spawn((
                        Agent,
                        AgentId(entry.id),
                        entry.category,
                        Profile(entry.profile),
                        Position { x: wx, y: wy },
                        GridPosition { x: bx, y: by },
                        Velocity::default(),
                        MoveState::default(),
                        Indoors,
                        Inside {
                            building: building_entity,
                            floor,
                        },
                    ))
                    .id();
                building.floors[floor].occupants.push(agent);
                building.occupants.push(agent);
                counter.spawned += 1;
                placed += 1;
            }
        }
        if !open_floors {
            info!(
                "indoor allocation stopped: no candidate floors remain ({} placed)",
                placed
            );
            return placed;
        }
    }
}

pub struct PopulationPlugin;

impl Plugin for PopulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CategoryTable>()
            .init_resource::<SpawnQueue>()
            .init_resource::<PopulationCounter>()
            .init_resource::<OutdoorClaims>()
            .init_resource::<PlacedIdentities>()
            .add_event::<AllocatePopulationRequest>()
            .add_systems(Update, handle_allocate_requests);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
