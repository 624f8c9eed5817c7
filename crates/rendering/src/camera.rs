//! Camera rig: follow target, viewport clamping, resize handling.
//!
//! The rig is a logical camera; the host embeds it into whatever render
//! surface it owns. Following and clamping run every frame, pause or not,
//! so the view stays usable while the simulation is suspended.

use bevy::prelude::*;

use simulation::agents::Position;
use simulation::map::TileGrid;

#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct CameraRig {
    pub position: Vec2,
    pub follow: Option<Entity>,
}

/// Current viewport size in world units.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ViewExtent {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewExtent {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Start following an agent, or stop with `None`.
#[derive(Event, Debug, Clone, Copy)]
pub struct FollowAgent(pub Option<Entity>);

/// Host viewport was resized.
#[derive(Event, Debug, Clone, Copy)]
pub struct ViewResized {
    pub width: f32,
    pub height: f32,
}

pub fn handle_follow_events(mut rig: ResMut<CameraRig>, mut events: EventReader<FollowAgent>) {
    for FollowAgent(target) in events.read() {
        rig.follow = *target;
    }
}

pub fn handle_view_resized(mut extent: ResMut<ViewExtent>, mut events: EventReader<ViewResized>) {
    for resized in events.read() {
        extent.width = resized.width;
        extent.height = resized.height;
    }
}

fn clamp_axis(center: f32, half_view: f32, world: f32) -> f32 {
    if world <= half_view * 2.0 {
        world * 0.5
    } else {
        center.clamp(half_view, world - half_view)
    }
}

/// Track the follow target (dropping it if it was despawned) and keep the
/// view inside the map bounds.
pub fn update_camera(
    mut rig: ResMut<CameraRig>,
    extent: Res<ViewExtent>,
    grid: Res<TileGrid>,
    positions: Query<&Position>,
) {
    if let Some(target) = rig.follow {
        match positions.get(target) {
            Ok(position) => rig.position = Vec2::new(position.x, position.y),
            Err(_) => rig.follow = None,
        }
    }
    if grid.width == 0 || grid.height == 0 {
        return;
    }
    rig.position.x = clamp_axis(rig.position.x, extent.width * 0.5, grid.world_width());
    rig.position.y = clamp_axis(rig.position.y, extent.height * 0.5, grid.world_height());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderingPlugin;
    use bevy::state::app::StatesPlugin;
    use simulation::agents::{Agent, AgentId, GridPosition, MoveState, Velocity};
    use simulation::lifecycle::BuildMapRequest;
    use simulation::map::MapDescriptor;
    use simulation::SimulationPlugin;

    fn ready_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin, SimulationPlugin, RenderingPlugin));
        app.update();
        let d = MapDescriptor {
            width: 200,
            height: 200,
            tile_width: 16.0,
            tile_height: 16.0,
            ground_layer: vec![1; 40000],
            road_layer: vec![0; 40000],
            zone_layer: vec![0; 40000],
            building_data: Vec::new(),
            decoration_data: Vec::new(),
        };
        app.world_mut().send_event(BuildMapRequest(d));
        for _ in 0..3 {
            app.update();
        }
        app
    }

    fn spawn_agent(app: &mut App, x: f32, y: f32) -> Entity {
        app.world_mut()
            .spawn((
                Agent,
                AgentId(1),
                Position { x, y },
                GridPosition { x: 0, y: 0 },
                Velocity::default(),
                MoveState::Idle,
            ))
            .id()
    }

    #[test]
    fn test_rig_follows_target() {
        let mut app = ready_app();
        let agent = spawn_agent(&mut app, 1000.0, 1500.0);
        app.world_mut().send_event(FollowAgent(Some(agent)));
        app.update();

        let rig = app.world().resource::<CameraRig>();
        assert_eq!(rig.position, Vec2::new(1000.0, 1500.0));

        app.world_mut().entity_mut(agent).get_mut::<Position>().unwrap().x = 1200.0;
        app.update();
        assert_eq!(app.world().resource::<CameraRig>().position.x, 1200.0);
    }

    #[test]
    fn test_stale_follow_target_is_dropped() {
        let mut app = ready_app();
        let agent = spawn_agent(&mut app, 1000.0, 1000.0);
        app.world_mut().send_event(FollowAgent(Some(agent)));
        app.update();

        app.world_mut().despawn(agent);
        app.update();
        assert_eq!(app.world().resource::<CameraRig>().follow, None);
    }

    #[test]
    fn test_view_clamped_to_map_bounds() {
        // 200x200 tiles at 16px: world is 3200x3200; default view 1280x720.
        let mut app = ready_app();
        let agent = spawn_agent(&mut app, 10.0, 3190.0);
        app.world_mut().send_event(FollowAgent(Some(agent)));
        app.update();

        let rig = app.world().resource::<CameraRig>();
        assert_eq!(rig.position, Vec2::new(640.0, 3200.0 - 360.0));
    }

    #[test]
    fn test_small_map_centers_view() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin, SimulationPlugin, RenderingPlugin));
        app.update();
        let d = MapDescriptor {
            width: 10,
            height: 10,
            tile_width: 16.0,
            tile_height: 16.0,
            ground_layer: vec![1; 100],
            road_layer: vec![0; 100],
            zone_layer: vec![0; 100],
            building_data: Vec::new(),
            decoration_data: Vec::new(),
        };
        app.world_mut().send_event(BuildMapRequest(d));
        for _ in 0..3 {
            app.update();
        }
        // World 160x160 is smaller than the view on both axes.
        assert_eq!(
            app.world().resource::<CameraRig>().position,
            Vec2::new(80.0, 80.0)
        );
    }

    #[test]
    fn test_resize_updates_extent() {
        let mut app = ready_app();
        app.world_mut().send_event(ViewResized {
            width: 640.0,
            height: 480.0,
        });
        app.update();
        let extent = app.world().resource::<ViewExtent>();
        assert_eq!((extent.width, extent.height), (640.0, 480.0));
    }
}
