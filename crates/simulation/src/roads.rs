use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

/// A road cell, keyed by grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoadNode(pub usize, pub usize);

/// Navigation graph over road cells.
///
/// Built wholesale from the road raster on every map rebuild and published as
/// a resource; it is never patched in place, so consumers can treat it as an
/// immutable snapshot between rebuilds. Movement execution happens outside
/// this engine; the graph is used here only for spawn validation.
#[derive(Resource, Debug, Default)]
pub struct RoadGraph {
    pub edges: HashMap<RoadNode, HashSet<RoadNode>>,
    /// Pairs of adjacent road cells, endpoints in canonical (sorted) order.
    pub segments: HashSet<(RoadNode, RoadNode)>,
}

impl RoadGraph {
    /// Scan the raster and build a fresh graph. Non-zero cells become nodes;
    /// 4-neighbor non-zero pairs become edges. Tile-id variants (straight vs
    /// corner art and the like) are cosmetic: topology depends only on
    /// zero/non-zero membership. Disconnected components are permitted.
    pub fn build(raster: &[u16], width: usize, height: usize) -> Self {
        let mut graph = Self::default();
        for y in 0..height {
            for x in 0..width {
                if raster[y * width + x] == 0 {
                    continue;
                }
                let node = RoadNode(x, y);
                graph.edges.entry(node).or_default();
                // Right and down neighbors; the reverse direction is covered
                // when the neighbor itself is scanned.
                if x + 1 < width && raster[y * width + x + 1] != 0 {
                    graph.connect(node, RoadNode(x + 1, y));
                }
                if y + 1 < height && raster[(y + 1) * width + x] != 0 {
                    graph.connect(node, RoadNode(x, y + 1));
                }
            }
        }
        graph
    }

    fn connect(&mut self, a: RoadNode, b: RoadNode) {
        self.edges.entry(a).or_default().insert(b);
        self.edges.entry(b).or_default().insert(a);
        self.segments.insert(Self::segment(a, b));
    }

    /// Canonical segment key: endpoints in sorted order.
    pub fn segment(a: RoadNode, b: RoadNode) -> (RoadNode, RoadNode) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.edges.contains_key(&RoadNode(x, y))
    }

    pub fn neighbors(&self, node: &RoadNode) -> Vec<RoadNode> {
        self.edges
            .get(node)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn node_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(width: usize, height: usize, roads: &[(usize, usize)]) -> Vec<u16> {
        let mut r = vec![0u16; width * height];
        for &(x, y) in roads {
            r[y * width + x] = 1;
        }
        r
    }

    #[test]
    fn test_straight_road_edges() {
        let r = raster(8, 8, &[(2, 3), (3, 3), (4, 3)]);
        let graph = RoadGraph::build(&r, 8, 8);

        assert_eq!(graph.node_count(), 3);
        let mid = graph.neighbors(&RoadNode(3, 3));
        assert_eq!(mid.len(), 2);
        assert!(mid.contains(&RoadNode(2, 3)));
        assert!(mid.contains(&RoadNode(4, 3)));
        assert_eq!(graph.segments.len(), 2);
    }

    #[test]
    fn test_isolated_cell_is_a_node() {
        let r = raster(4, 4, &[(1, 1)]);
        let graph = RoadGraph::build(&r, 4, 4);
        assert!(graph.contains(1, 1));
        assert!(graph.neighbors(&RoadNode(1, 1)).is_empty());
        assert!(graph.segments.is_empty());
    }

    #[test]
    fn test_diagonal_cells_not_connected() {
        let r = raster(4, 4, &[(1, 1), (2, 2)]);
        let graph = RoadGraph::build(&r, 4, 4);
        assert_eq!(graph.node_count(), 2);
        assert!(graph.segments.is_empty());
    }

    #[test]
    fn test_tile_variants_do_not_affect_topology() {
        // Same layout, different art ids: identical topology.
        let mut a = raster(6, 6, &[(0, 0), (1, 0), (2, 0)]);
        let b = raster(6, 6, &[(0, 0), (1, 0), (2, 0)]);
        a[0] = 7; // corner-art variant
        a[1] = 3; // straight-art variant

        let ga = RoadGraph::build(&a, 6, 6);
        let gb = RoadGraph::build(&b, 6, 6);
        assert_eq!(ga.node_count(), gb.node_count());
        assert_eq!(ga.segments, gb.segments);
    }

    #[test]
    fn test_disconnected_components_permitted() {
        let r = raster(8, 8, &[(0, 0), (1, 0), (6, 6), (6, 7)]);
        let graph = RoadGraph::build(&r, 8, 8);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.segments.len(), 2);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let r = raster(8, 8, &[(2, 3), (3, 3), (3, 4)]);
        let a = RoadGraph::build(&r, 8, 8);
        let b = RoadGraph::build(&r, 8, 8);
        assert_eq!(a.segments, b.segments);
        assert_eq!(a.edges.len(), b.edges.len());
        for (node, adj) in &a.edges {
            assert_eq!(Some(adj), b.edges.get(node));
        }
    }
}
