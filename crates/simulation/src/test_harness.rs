//! Headless app harness for engine tests.
//!
//! Runs the full `SimulationPlugin` under `MinimalPlugins`; fixed ticks are
//! driven explicitly with [`TestTown::tick`] so tests never depend on wall
//! clock time.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use crate::agents::{Agent, AgentProfile, Indoors, RosterEntry};
use crate::lifecycle::{BuildMapRequest, MapState};
use crate::map::MapDescriptor;
use crate::population::AllocatePopulationRequest;
use crate::sim_rng::SimRng;
use crate::SimulationPlugin;

pub struct TestTown {
    pub app: App,
}

impl TestTown {
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin, SimulationPlugin));
        app.update();
        Self { app }
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut town = Self::new();
        town.app.insert_resource(SimRng::from_seed_u64(seed));
        town
    }

    /// Send a build request and pump updates until the state machine has had
    /// the chance to reach `Ready` (request, compose, transition).
    pub fn build_map(&mut self, descriptor: MapDescriptor) {
        self.app.world_mut().send_event(BuildMapRequest(descriptor));
        for _ in 0..3 {
            self.app.update();
        }
    }

    pub fn allocate(&mut self, roster: Vec<RosterEntry>, capacity: u32) {
        self.app
            .world_mut()
            .send_event(AllocatePopulationRequest { roster, capacity });
        self.app.update();
    }

    /// Advance exactly one fixed simulation tick.
    pub fn tick(&mut self) {
        self.app.world_mut().run_schedule(FixedUpdate);
    }

    pub fn state(&self) -> MapState {
        *self.app.world().resource::<State<MapState>>().get()
    }

    pub fn agent_count(&mut self) -> usize {
        let world = self.app.world_mut();
        let mut query = world.query_filtered::<(), With<Agent>>();
        query.iter(world).count()
    }

    pub fn outdoor_count(&mut self) -> usize {
        let world = self.app.world_mut();
        let mut query = world.query_filtered::<(), (With<Agent>, Without<Indoors>)>();
        query.iter(world).count()
    }

    pub fn indoor_count(&mut self) -> usize {
        let world = self.app.world_mut();
        let mut query = world.query_filtered::<(), (With<Agent>, With<Indoors>)>();
        query.iter(world).count()
    }
}

/// An all-grass descriptor with empty road and zone layers.
pub fn open_map(width: usize, height: usize) -> MapDescriptor {
    MapDescriptor {
        width,
        height,
        tile_width: 16.0,
        tile_height: 16.0,
        ground_layer: vec![1; width * height],
        road_layer: vec![0; width * height],
        zone_layer: vec![0; width * height],
        building_data: Vec::new(),
        decoration_data: Vec::new(),
    }
}

pub fn set_road(descriptor: &mut MapDescriptor, x: usize, y: usize) {
    descriptor.road_layer[y * descriptor.width + x] = 1;
}

pub fn roster(counts: &[(&str, usize)]) -> Vec<RosterEntry> {
    let mut id = 0u64;
    let mut out = Vec::new();
    for &(agent_type, n) in counts {
        for _ in 0..n {
            out.push(RosterEntry {
                id,
                profile: AgentProfile {
                    agent_type: agent_type.to_string(),
                    display_name: format!("{agent_type}-{id}"),
                },
            });
            id += 1;
        }
    }
    out
}
