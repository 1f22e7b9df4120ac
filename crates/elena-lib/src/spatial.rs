//! KD-tree lookup of the road node closest to a coordinate.
//!
//! Distances are plain Euclidean over (longitude, latitude) in degrees.

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;

use crate::geo::{LatLon, NodeId};
use crate::graph::RoadGraph;

const BUCKET_SIZE: usize = 32;

/// Nearest-node index built from a snapshot of a [`RoadGraph`].
pub struct NodeLocator {
    tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32>,
    ids: Vec<NodeId>,
}

impl NodeLocator {
    pub fn build(graph: &RoadGraph) -> Self {
        let mut tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32> = KdTree::new();
        let mut ids = Vec::with_capacity(graph.node_count());
        for (index, (id, coords)) in graph.nodes().enumerate() {
            tree.add(&[coords.x, coords.y], index);
            ids.push(id);
        }
        Self { tree, ids }
    }

    /// Closest node to `point`, or `None` when the index is empty.
    pub fn nearest(&self, point: LatLon) -> Option<NodeId> {
        if self.ids.is_empty() {
            return None;
        }
        let neighbour = self
            .tree
            .nearest_one::<SquaredEuclidean>(&[point.lon, point.lat]);
        self.ids.get(neighbour.item).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
