//! Headless tile-world simulation engine.
//!
//! The engine owns map lifecycle (raster grid, road graph, building
//! occupancy), capacity-bounded population allocation, and the fixed-step
//! clock that movement integration runs on. Rendering composition and
//! movement decisions live in other crates; everything here is
//! deterministic given a seed and a descriptor.

use bevy::prelude::*;

pub mod agents;
pub mod buildings;
pub mod clock;
pub mod config;
pub mod lifecycle;
pub mod map;
pub mod movement;
pub mod population;
pub mod roads;
pub mod sim_rng;

#[cfg(test)]
mod test_harness;


/// Ordering sets for the fixed simulation step.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Tick bookkeeping.
    Clock,
    /// Position integration and grid-cell tracking.
    Movement,
}

/// Fixed simulation ticks since startup. Advances whenever the fixed
/// schedule runs, paused or not.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct TickCounter(pub u64);

fn count_ticks(mut counter: ResMut<TickCounter>) {
    counter.0 += 1;
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (SimulationSet::Clock, SimulationSet::Movement).chain(),
        )
        .init_resource::<TickCounter>()
        .add_systems(FixedUpdate, count_ticks.in_set(SimulationSet::Clock))
        .add_plugins((
            sim_rng::SimRngPlugin,
            clock::ClockPlugin,
            lifecycle::LifecyclePlugin,
            population::PopulationPlugin,
            movement::MovementPlugin,
        ));
    }
}
