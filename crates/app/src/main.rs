//! Headless demo host: builds a small town, allocates the demo roster, runs
//! a couple hundred ticks, and exits.

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use rendering::RenderingPlugin;
use simulation::agents::{RosterEntry, VisualCategory};
use simulation::config::EDGE_ZONE_ID;
use simulation::lifecycle::{BuildMapRequest, MapReady, MapState};
use simulation::map::{BuildingDescriptor, DecorationDescriptor, MapDescriptor};
use simulation::population::{AllocatePopulationRequest, CategoryTable};
use simulation::{SimulationPlugin, TickCounter};

const DEMO_ROSTER: &str = include_str!("../assets/demo_roster.json");
const DEMO_TICKS: u64 = 200;

fn main() {
    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_millis(16))),
        )
        .add_plugins((LogPlugin::default(), StatesPlugin))
        .add_plugins((SimulationPlugin, RenderingPlugin))
        .insert_resource(demo_categories())
        .add_systems(Startup, request_demo_map)
        .add_systems(
            Update,
            (
                allocate_on_ready.run_if(in_state(MapState::Ready)),
                report_map_ready,
                exit_after_demo,
            ),
        )
        .run();
}

fn demo_categories() -> CategoryTable {
    CategoryTable::from_pairs([
        ("manager".to_string(), VisualCategory::Executive),
        ("engineer".to_string(), VisualCategory::Office),
        ("support".to_string(), VisualCategory::Service),
        ("barista".to_string(), VisualCategory::Casual),
    ])
}

fn demo_map() -> MapDescriptor {
    let (width, height) = (48usize, 32usize);
    let idx = |x: usize, y: usize| y * width + x;

    let mut ground = vec![1u16; width * height];
    let mut roads = vec![0u16; width * height];
    let mut zones = vec![0u8; width * height];

    // Border ring is an edge zone: nothing spawns there.
    for x in 0..width {
        zones[idx(x, 0)] = EDGE_ZONE_ID;
        zones[idx(x, height - 1)] = EDGE_ZONE_ID;
    }
    for y in 0..height {
        zones[idx(0, y)] = EDGE_ZONE_ID;
        zones[idx(width - 1, y)] = EDGE_ZONE_ID;
    }

    // A dirt patch by the south road.
    for y in 25..29 {
        for x in 38..44 {
            ground[idx(x, y)] = 2;
        }
    }

    // Two avenues and two cross streets.
    for x in 2..width - 2 {
        roads[idx(x, 8)] = 1;
        roads[idx(x, 20)] = 1;
    }
    for y in 2..height - 2 {
        roads[idx(12, y)] = 2;
        roads[idx(30, y)] = 2;
    }
    for (x, y) in [(12, 8), (30, 8), (12, 20), (30, 20)] {
        roads[idx(x, y)] = 5;
    }

    let building = |x, y, width, height, floors| BuildingDescriptor {
        x,
        y,
        width,
        height,
        floors,
    };
    let tree = |x, y, kind| DecorationDescriptor { x, y, kind };

    MapDescriptor {
        width,
        height,
        tile_width: 16.0,
        tile_height: 16.0,
        ground_layer: ground,
        road_layer: roads,
        zone_layer: zones,
        building_data: vec![
            building(4, 3, 3, 2, 3),
            building(16, 4, 4, 3, 4),
            building(33, 10, 3, 3, 2),
            building(14, 24, 5, 2, 3),
        ],
        decoration_data: vec![tree(6, 12, 1), tree(7, 12, 1), tree(35, 25, 2), tree(20, 14, 3)],
    }
}

fn request_demo_map(mut requests: EventWriter<BuildMapRequest>) {
    requests.send(BuildMapRequest(demo_map()));
}

fn allocate_on_ready(
    mut sent: Local<bool>,
    mut requests: EventWriter<AllocatePopulationRequest>,
) {
    if *sent {
        return;
    }
    *sent = true;
    match serde_json::from_str::<Vec<RosterEntry>>(DEMO_ROSTER) {
        Ok(roster) => {
            let capacity = roster.len() as u32;
            requests.send(AllocatePopulationRequest { roster, capacity });
        }
        Err(err) => error!("demo roster is malformed: {err}"),
    }
}

fn report_map_ready(mut events: EventReader<MapReady>) {
    for ready in events.read() {
        info!(
            "map v{} ready: {} outdoor, {} indoor",
            ready.version, ready.outdoor, ready.indoor
        );
    }
}

fn exit_after_demo(ticks: Res<TickCounter>, mut exit: EventWriter<AppExit>) {
    if ticks.0 >= DEMO_TICKS {
        exit.send(AppExit::Success);
    }
}
