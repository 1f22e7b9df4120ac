use std::collections::{BTreeMap, HashMap, HashSet};

use crate::geo::{BoundingBox, Coords, NodeId};
use crate::provider::GraphProvider;

/// Directed edge to `target` with its length in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub target: NodeId,
    pub length: f64,
}

/// Node store for a road network fragment.
///
/// Nodes are kept ordered by id so enumeration is deterministic. Adjacency
/// lists keep insertion order and never hold two edges to the same target:
/// parallel edges collapse onto the shortest one.
#[derive(Debug, Clone, Default)]
pub struct RoadGraph {
    nodes: BTreeMap<NodeId, Coords>,
    adjacency: HashMap<NodeId, Vec<Edge>>,
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Existing nodes keep their original coordinates.
    pub fn insert_node(&mut self, id: NodeId, coords: Coords) -> bool {
        if self.nodes.contains_key(&id) {
            return false;
        }
        self.nodes.insert(id, coords);
        true
    }

    /// Insert a directed edge, keeping the shorter length if one already exists.
    pub fn add_edge(&mut self, tail: NodeId, head: NodeId, length: f64) {
        let edges = self.adjacency.entry(tail).or_default();
        match edges.iter_mut().find(|edge| edge.target == head) {
            Some(existing) => {
                if length < existing.length {
                    existing.length = length;
                }
            }
            None => edges.push(Edge {
                target: head,
                length,
            }),
        }
    }

    /// Insert an edge in both directions.
    pub fn add_two_way_edge(&mut self, a: NodeId, b: NodeId, length: f64) {
        self.add_edge(a, b, length);
        self.add_edge(b, a, length);
    }

    /// Union `other` into this graph. Merging the same fragment twice is a no-op.
    pub fn merge(&mut self, other: &RoadGraph) {
        for (&id, coords) in &other.nodes {
            self.insert_node(id, *coords);
        }
        for (&tail, edges) in &other.adjacency {
            for edge in edges {
                self.add_edge(tail, edge.target, edge.length);
            }
        }
    }

    /// Extract every node inside `bbox`, every edge touching one of them, and
    /// the far endpoints of edges that leave the box.
    pub fn within(&self, bbox: &BoundingBox) -> RoadGraph {
        let inside: HashSet<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, coords)| bbox.contains(coords.x, coords.y))
            .map(|(&id, _)| id)
            .collect();

        let mut fragment = RoadGraph::new();
        for &id in self.nodes.keys() {
            for edge in self.neighbours(id) {
                if !inside.contains(&id) && !inside.contains(&edge.target) {
                    continue;
                }
                for endpoint in [id, edge.target] {
                    if let Some(coords) = self.nodes.get(&endpoint) {
                        fragment.insert_node(endpoint, *coords);
                    }
                }
                fragment.add_edge(id, edge.target, edge.length);
            }
        }
        for id in inside {
            if let Some(coords) = self.nodes.get(&id) {
                fragment.insert_node(id, *coords);
            }
        }
        fragment
    }

    pub fn neighbours(&self, node: NodeId) -> &[Edge] {
        self.adjacency
            .get(&node)
            .map(|edges| edges.as_slice())
            .unwrap_or(&[])
    }

    pub fn edge_length(&self, tail: NodeId, head: NodeId) -> Option<f64> {
        self.neighbours(tail)
            .iter()
            .find(|edge| edge.target == head)
            .map(|edge| edge.length)
    }

    pub fn coords(&self, node: NodeId) -> Option<Coords> {
        self.nodes.get(&node).copied()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, Coords)> + '_ {
        self.nodes.iter().map(|(&id, &coords)| (id, coords))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl GraphProvider for RoadGraph {
    fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.neighbours(node).iter().map(|edge| edge.target).collect()
    }

    fn edge_distance(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.edge_length(from, to)
    }

    fn coords(&self, node: NodeId) -> Option<Coords> {
        RoadGraph::coords(self, node)
    }

    fn all_nodes(&self) -> Vec<NodeId> {
        self.node_ids().collect()
    }
}
