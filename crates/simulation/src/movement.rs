//! Fixed-step movement integration for outdoor agents.
//!
//! Movement decisions (velocities, move state) are written by the external
//! mover; this module only integrates them. One tick always advances a
//! moving agent by `velocity * SIM_TICK_SECONDS`, regardless of clock speed.

use bevy::prelude::*;

use crate::agents::{GridPosition, HoverPaused, Indoors, MoveState, Position, Velocity};
use crate::clock::simulation_active;
use crate::config::SIM_TICK_SECONDS;
use crate::map::TileGrid;
use crate::SimulationSet;

pub fn apply_velocity(
    mut movers: Query<
        (&mut Position, &Velocity, &MoveState),
        (Without<Indoors>, Without<HoverPaused>),
    >,
) {
    for (mut position, velocity, state) in movers.iter_mut() {
        if *state != MoveState::Moving {
            continue;
        }
        position.x += velocity.x * SIM_TICK_SECONDS;
        position.y += velocity.y * SIM_TICK_SECONDS;
    }
}

/// Re-derive the grid cell of agents whose world position changed, clamped
/// to the map bounds.
pub fn update_grid_positions(
    grid: Res<TileGrid>,
    mut movers: Query<(&Position, &mut GridPosition), Changed<Position>>,
) {
    for (position, mut cell) in movers.iter_mut() {
        let (gx, gy) = grid.world_to_grid(position.x, position.y);
        let gx = gx.clamp(0, grid.width.saturating_sub(1) as i32) as usize;
        let gy = gy.clamp(0, grid.height.saturating_sub(1) as i32) as usize;
        if cell.x != gx || cell.y != gy {
            *cell = GridPosition { x: gx, y: gy };
        }
    }
}

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (apply_velocity, update_grid_positions)
                .chain()
                .run_if(simulation_active)
                .in_set(SimulationSet::Movement),
        );
    }
}
