//! Scene depth keying: painter's-algorithm ordering by vertical coordinate.
//!
//! Every scene member's draw depth is re-derived each frame from its live
//! vertical position, so a walking agent slides behind or in front of
//! buildings as it moves. Depth keying keeps running while the simulation
//! is paused.

use bevy::prelude::*;

use simulation::agents::{Agent, Indoors, Position};
use simulation::buildings::Building;
use simulation::map::TileGrid;

use crate::layers::{SceneMember, SCENE_Z_BASE};

/// World units of vertical position per unit of depth. Keeps scene depth
/// within its layer band for any sane map size.
const DEPTH_SCALE: f32 = 1.0e-4;

pub fn depth_for(y: f32) -> f32 {
    SCENE_Z_BASE + y * DEPTH_SCALE
}

/// Newly spawned outdoor agents join the scene layer. Indoor agents render
/// inside their building's interior, not in the outdoor scene.
pub fn attach_agents(
    mut commands: Commands,
    agents: Query<(Entity, &Position), (Added<Agent>, Without<Indoors>)>,
) {
    for (entity, position) in agents.iter() {
        commands.entity(entity).insert((
            SceneMember,
            Transform::from_xyz(position.x, position.y, depth_for(position.y)),
        ));
    }
}

/// Newly placed buildings join the scene layer at their origin cell.
pub fn attach_buildings(
    mut commands: Commands,
    grid: Res<TileGrid>,
    buildings: Query<(Entity, &Building), Added<Building>>,
) {
    for (entity, building) in buildings.iter() {
        let (wx, wy) = grid.grid_to_world(building.origin.0, building.origin.1);
        commands
            .entity(entity)
            .insert((SceneMember, Transform::from_xyz(wx, wy, depth_for(wy))));
    }
}

/// Re-key depth from each mobile member's live position.
pub fn update_scene_depth(
    mut members: Query<(&Position, &mut Transform), With<SceneMember>>,
) {
    for (position, mut transform) in members.iter_mut() {
        transform.translation.x = position.x;
        transform.translation.y = position.y;
        transform.translation.z = depth_for(position.y);
    }
}
