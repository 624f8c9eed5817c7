//! Layer composition: ground, decoration, road, and scene.
//!
//! Tile entities live as children of per-layer root entities and are
//! disposable wholesale; composition runs on entry to `Composing` and
//! rebuilds every layer from the freshly published grid. Scene members
//! (agents, buildings) are not parented under a root because the map
//! lifecycle despawns them directly on rebuild; they carry [`SceneMember`]
//! instead and are depth-keyed individually.

use bevy::prelude::*;

use simulation::map::TileGrid;
use simulation::population::PopulationCounter;

use crate::variants::{TileVariant, VariantRegistry};

pub const GROUND_Z: f32 = 0.0;
pub const DECORATION_Z: f32 = 10.0;
pub const ROAD_Z: f32 = 20.0;
pub const SCENE_Z_BASE: f32 = 30.0;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileLayer {
    Ground,
    Decoration,
    Road,
    Scene,
}

/// A composed ground or road tile.
#[derive(Component, Debug, Clone, Copy)]
pub struct Tile {
    pub cell: (usize, usize),
    pub variant: TileVariant,
}

/// A composed decoration, keyed by its backend kind id.
#[derive(Component, Debug, Clone, Copy)]
pub struct Decoration {
    pub cell: (usize, usize),
    pub kind: u16,
}

/// Marker for entities that participate in scene depth sorting.
#[derive(Component)]
pub struct SceneMember;

#[derive(Resource, Debug, Clone, Copy)]
pub struct LayerRoots {
    pub ground: Entity,
    pub decoration: Entity,
    pub road: Entity,
    pub scene: Entity,
}

pub fn spawn_layer_roots(mut commands: Commands) {
    let mut root = |layer: TileLayer, z: f32| {
        commands.spawn((layer, Transform::from_xyz(0.0, 0.0, z))).id()
    };
    let roots = LayerRoots {
        ground: root(TileLayer::Ground, GROUND_Z),
        decoration: root(TileLayer::Decoration, DECORATION_Z),
        road: root(TileLayer::Road, ROAD_Z),
        scene: root(TileLayer::Scene, SCENE_Z_BASE),
    };
    commands.insert_resource(roots);
}

/// Detach and free every layer's tiles and reset the population counter.
/// Clearing a root that was never populated is a no-op.
pub fn clear_layers(
    commands: &mut Commands,
    roots: &LayerRoots,
    counter: &mut PopulationCounter,
) {
    for root in [roots.ground, roots.decoration, roots.road, roots.scene] {
        if let Some(mut e) = commands.get_entity(root) {
            e.despawn_descendants();
        }
    }
    *counter = PopulationCounter::default();
}

/// Rebuild every layer from the current grid. Runs on entry to `Composing`,
/// after the lifecycle has republished the grid.
pub fn compose_layers(
    mut commands: Commands,
    grid: Res<TileGrid>,
    registry: Res<VariantRegistry>,
    roots: Res<LayerRoots>,
    mut counter: ResMut<PopulationCounter>,
) {
    clear_layers(&mut commands, &roots, &mut counter);

    commands.entity(roots.ground).with_children(|parent| {
        for y in 0..grid.height {
            for x in 0..grid.width {
                let (wx, wy) = grid.grid_to_world(x, y);
                parent.spawn((
                    Tile {
                        cell: (x, y),
                        variant: registry.resolve_ground(grid.ground_id(x, y)),
                    },
                    TileLayer::Ground,
                    Transform::from_xyz(wx, wy, 0.0),
                ));
            }
        }
    });

    commands.entity(roots.road).with_children(|parent| {
        for y in 0..grid.height {
            for x in 0..grid.width {
                let id = grid.road_id(x, y);
                if id == 0 {
                    continue;
                }
                let (wx, wy) = grid.grid_to_world(x, y);
                parent.spawn((
                    Tile {
                        cell: (x, y),
                        variant: registry.resolve_road(id),
                    },
                    TileLayer::Road,
                    Transform::from_xyz(wx, wy, 0.0),
                ));
            }
        }
    });

    commands.entity(roots.decoration).with_children(|parent| {
        for d in &grid.decorations {
            let (wx, wy) = grid.grid_to_world(d.x, d.y);
            parent.spawn((
                Decoration {
                    cell: (d.x, d.y),
                    kind: d.kind,
                },
                TileLayer::Decoration,
                Transform::from_xyz(wx, wy, 0.0),
            ));
        }
    });

    debug!(
        "composed layers for map v{}: {}x{} ground, {} decorations",
        grid.version,
        grid.width,
        grid.height,
        grid.decorations.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderingPlugin;
    use bevy::state::app::StatesPlugin;
    use simulation::lifecycle::BuildMapRequest;
    use simulation::map::{DecorationDescriptor, MapDescriptor};
    use simulation::SimulationPlugin;

    fn descriptor(width: usize, height: usize) -> MapDescriptor {
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

    fn composed_app(d: MapDescriptor) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin, SimulationPlugin, RenderingPlugin));
        app.update();
        app.world_mut().send_event(BuildMapRequest(d));
        for _ in 0..3 {
            app.update();
        }
        app
    }

    fn layer_count(app: &mut App, layer: TileLayer) -> usize {
        let world = app.world_mut();
        let mut query = world.query::<(&TileLayer, &Parent)>();
        query.iter(world).filter(|(l, _)| **l == layer).count()
    }

    #[test]
    fn test_compose_builds_every_layer() {
        let mut d = descriptor(6, 4);
        d.road_layer[7] = 1;
        d.road_layer[8] = 5;
        d.decoration_data.push(DecorationDescriptor { x: 2, y: 2, kind: 3 });

        let mut app = composed_app(d);
        assert_eq!(layer_count(&mut app, TileLayer::Ground), 24);
        assert_eq!(layer_count(&mut app, TileLayer::Road), 2);
        assert_eq!(layer_count(&mut app, TileLayer::Decoration), 1);
    }

    #[test]
    fn test_recompose_replaces_tiles() {
        let mut app = composed_app(descriptor(6, 4));
        assert_eq!(layer_count(&mut app, TileLayer::Ground), 24);

        app.world_mut()
            .send_event(BuildMapRequest(descriptor(3, 3)));
        for _ in 0..3 {
            app.update();
        }
        assert_eq!(layer_count(&mut app, TileLayer::Ground), 9);
        assert_eq!(layer_count(&mut app, TileLayer::Road), 0);
    }

    #[test]
    fn test_tiles_sit_at_cell_centers() {
        let mut app = composed_app(descriptor(2, 2));
        let world = app.world_mut();
        let mut query = world.query::<(&Tile, &Transform)>();
        let mut centers: Vec<(f32, f32)> = query
            .iter(world)
            .map(|(_, t)| (t.translation.x, t.translation.y))
            .collect();
        centers.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(
            centers,
            [(8.0, 8.0), (8.0, 24.0), (24.0, 8.0), (24.0, 24.0)]
        );
    }
}
