//! Map lifecycle: build requests, atomic rebuild, and the compose gate.
//!
//! A rebuild tears down the previous map's entities and republishes every
//! map-derived resource in a single exclusive system, so no fixed-step
//! system ever observes a half-built world. The `Composing` state then
//! holds the simulation off until layer composition has run.

use bevy::prelude::*;

use crate::agents::Agent;
use crate::buildings::{self, Building, OccupancyIndex};
use crate::map::{MapDescriptor, TileGrid};
use crate::population::{OutdoorClaims, PlacedIdentities, PopulationCounter, SpawnQueue};
use crate::roads::RoadGraph;

/// Request a full map rebuild from a backend-supplied descriptor.
#[derive(Event, Debug, Clone)]
pub struct BuildMapRequest(pub MapDescriptor);

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MapState {
    /// No map has been built yet.
    #[default]
    Boot,
    /// Map resources are published; layer composition is in flight.
    Composing,
    /// The map is live and the simulation may advance.
    Ready,
}

/// Emitted once a build request has been fully processed and population
/// allocated for it.
#[derive(Event, Debug, Clone, Copy)]
pub struct MapReady {
    pub version: u64,
    pub outdoor: u32,
    pub indoor: u32,
}

/// Drain pending build requests and rebuild the world from the last valid
/// one. Runs exclusively: teardown, resource republication, and building
/// placement are not observable mid-way.
pub fn process_build_requests(world: &mut World) {
    let requests: Vec<BuildMapRequest> = world
        .resource_mut::<Events<BuildMapRequest>>()
        .drain()
        .collect();
    if requests.is_empty() {
        return;
    }
    if *world.resource::<State<MapState>>().get() == MapState::Composing {
        warn!(
            "map rebuild requested while composition is in flight; dropping {} request(s)",
            requests.len()
        );
        return;
    }

    // Several requests in one frame: the last valid descriptor wins.
    let mut accepted = None;
    for BuildMapRequest(descriptor) in requests {
        match descriptor.validate() {
            Ok(()) => accepted = Some(descriptor),
            Err(err) => error!("rejecting map descriptor: {err}"),
        }
    }
    let Some(descriptor) = accepted else {
        return;
    };

    // Tear down the previous map version before publishing the next one.
    let mut stale_query = world.query_filtered::<Entity, Or<(With<Agent>, With<Building>)>>();
    let stale: Vec<Entity> = stale_query.iter(world).collect();
    let stale_count = stale.len();
    for entity in stale {
        world.entity_mut(entity).despawn_recursive();
    }

    *world.resource_mut::<PopulationCounter>() = PopulationCounter::default();
    *world.resource_mut::<SpawnQueue>() = SpawnQueue::default();
    world.resource_mut::<OutdoorClaims>().0.clear();
    world.resource_mut::<PlacedIdentities>().0.clear();
    *world.resource_mut::<OccupancyIndex>() = OccupancyIndex::default();

    let version = world.resource::<TileGrid>().version + 1;
    let grid = TileGrid::from_descriptor(&descriptor, version);
    world.insert_resource(RoadGraph::build(&grid.roads, grid.width, grid.height));
    let (width, height) = (grid.width, grid.height);
    world.insert_resource(grid);

    let placed = buildings::place_all(world, &descriptor.building_data);
    info!(
        "map v{version} built: {width}x{height}, {placed} buildings, {stale_count} stale entities cleared"
    );
    world
        .resource_mut::<NextState<MapState>>()
        .set(MapState::Composing);
}

/// Composition finishes within the frame the `Composing` transition fired
/// (layer composition runs in its `OnEnter`), so the next `Update` pass can
/// hand the state to `Ready`.
pub fn finish_compose(mut next: ResMut<NextState<MapState>>) {
    next.set(MapState::Ready);
}

pub struct LifecyclePlugin;

impl Plugin for LifecyclePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<MapState>()
            .init_resource::<TileGrid>()
            .init_resource::<RoadGraph>()
            .init_resource::<OccupancyIndex>()
            .add_event::<BuildMapRequest>()
            .add_event::<MapReady>()
            .add_systems(
                Update,
                (
                    process_build_requests,
                    finish_compose.run_if(in_state(MapState::Composing)),
                )
                    .chain(),
            );
    }
}
