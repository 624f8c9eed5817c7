//! Render-side composition over the simulation engine: tile layers, scene
//! depth keying, and the logical camera rig.
//!
//! This crate owns no GPU surface; it maintains the composed entity tree
//! and transforms that a host renderer draws from.

use bevy::prelude::*;

pub mod camera;
pub mod depth;
pub mod layers;
pub mod variants;

use simulation::lifecycle::MapState;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<variants::VariantRegistry>()
            .init_resource::<camera::CameraRig>()
            .init_resource::<camera::ViewExtent>()
            .add_event::<camera::FollowAgent>()
            .add_event::<camera::ViewResized>()
            .add_systems(Startup, layers::spawn_layer_roots)
            .add_systems(OnEnter(MapState::Composing), layers::compose_layers)
            .add_systems(
                Update,
                (
                    depth::attach_agents,
                    depth::attach_buildings,
                    depth::update_scene_depth,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    camera::handle_follow_events,
                    camera::handle_view_resized,
                    camera::update_camera,
                )
                    .chain(),
            );
    }
}
