use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::debug;

use crate::geo::NodeId;
use crate::provider::GraphProvider;

use super::{climb, QueueEntry, SearchResult};

/// Power applied to each step's climb when ranking under a distance budget.
pub const DIJKSTRA_ELEVATION_EXPONENT: i32 = 1;

/// Shortest-distance tree rooted at one source.
///
/// `ele_diffs` holds the signed elevation change from each node's parent to
/// the node itself (`elevation(node) - elevation(parent)`); the root maps to 0.
#[derive(Debug, Clone, Default)]
pub struct ShortestPathTree {
    pub source: NodeId,
    pub parents: HashMap<NodeId, NodeId>,
    pub distances: HashMap<NodeId, f64>,
    pub ele_diffs: HashMap<NodeId, f64>,
}

impl ShortestPathTree {
    /// Distance from the root, or infinity when `node` was not reached.
    pub fn distance(&self, node: NodeId) -> f64 {
        self.distances.get(&node).copied().unwrap_or(f64::INFINITY)
    }

    pub fn ele_diff(&self, node: NodeId) -> f64 {
        self.ele_diffs.get(&node).copied().unwrap_or(0.0)
    }

    /// Tree path from the root down to `node`, or empty when unreached.
    pub fn path_from_root(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = self.path_to_root(node);
        path.reverse();
        path
    }

    /// Tree path from `node` up to the root, or empty when unreached.
    pub fn path_to_root(&self, node: NodeId) -> Vec<NodeId> {
        if !self.distances.contains_key(&node) {
            return Vec::new();
        }
        let mut path = vec![node];
        let mut current = node;
        while let Some(&parent) = self.parents.get(&current) {
            path.push(parent);
            current = parent;
        }
        path
    }
}

/// Dijkstra searches over a graph provider.
pub struct Dijkstra<'a, G: GraphProvider + ?Sized> {
    graph: &'a G,
}

impl<'a, G: GraphProvider + ?Sized> Dijkstra<'a, G> {
    pub fn new(graph: &'a G) -> Self {
        Self { graph }
    }

    /// Shortest distances from `start` to every reachable node.
    pub fn single_source(&self, start: NodeId) -> ShortestPathTree {
        let mut tree = ShortestPathTree {
            source: start,
            ..ShortestPathTree::default()
        };
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut queue = BinaryHeap::new();

        tree.distances.insert(start, 0.0);
        tree.ele_diffs.insert(start, 0.0);
        queue.push(QueueEntry::new(start, 0.0));

        while let Some(entry) = queue.pop() {
            let current = entry.node;
            if !visited.insert(current) {
                continue;
            }
            let Some(current_ele) = self.graph.elevation(current) else {
                continue;
            };
            let current_distance = entry.cost.0;

            for next in self.graph.neighbors(current) {
                if visited.contains(&next) {
                    continue;
                }
                let Some(length) = self.graph.edge_distance(current, next) else {
                    continue;
                };
                let Some(next_ele) = self.graph.elevation(next) else {
                    continue;
                };

                let next_distance = current_distance + length;
                if next_distance < tree.distance(next) {
                    tree.distances.insert(next, next_distance);
                    tree.parents.insert(next, current);
                    tree.ele_diffs.insert(next, next_ele - current_ele);
                    queue.push(QueueEntry::new(next, next_distance));
                }
            }
        }

        debug!(source = start, reached = visited.len(), "single-source search done");
        tree
    }

    /// Point-to-point search.
    ///
    /// With a finite `max_path_len` nodes are ranked by accumulated climb and
    /// any relaxation longer than the budget is dropped; otherwise nodes are
    /// ranked by distance. With `end_is_source` the search grows from `end`
    /// back towards `start`, scoring each edge in the direction it will be
    /// travelled.
    pub fn search(
        &self,
        start: NodeId,
        end: NodeId,
        max_path_len: f64,
        end_is_source: bool,
    ) -> SearchResult {
        if start == end {
            return SearchResult::trivial(start);
        }

        let (source, target) = if end_is_source {
            (end, start)
        } else {
            (start, end)
        };
        let constrained = max_path_len.is_finite();

        let mut weights: HashMap<NodeId, f64> = HashMap::new();
        let mut distances: HashMap<NodeId, f64> = HashMap::new();
        let mut gains: HashMap<NodeId, f64> = HashMap::new();
        let mut parents: HashMap<NodeId, NodeId> = HashMap::new();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut queue = BinaryHeap::new();

        weights.insert(source, 0.0);
        distances.insert(source, 0.0);
        gains.insert(source, 0.0);
        queue.push(QueueEntry::new(source, 0.0));

        while let Some(entry) = queue.pop() {
            let current = entry.node;
            if !visited.insert(current) {
                continue;
            }
            if current == target {
                let result = finish(&parents, &distances, &gains, source, target, end_is_source);
                debug!(
                    start,
                    end,
                    end_is_source,
                    hops = result.hops(),
                    path_len = result.path_len,
                    ele_gain = result.ele_gain,
                    "dijkstra search done"
                );
                return result;
            }

            let Some(current_ele) = self.graph.elevation(current) else {
                continue;
            };
            let current_weight = entry.cost.0;
            let current_distance = distances.get(&current).copied().unwrap_or(0.0);
            let current_gain = gains.get(&current).copied().unwrap_or(0.0);

            for next in self.graph.neighbors(current) {
                if visited.contains(&next) {
                    continue;
                }
                let Some(length) = self.graph.edge_distance(current, next) else {
                    continue;
                };
                let Some(next_ele) = self.graph.elevation(next) else {
                    continue;
                };

                let next_distance = current_distance + length;
                if next_distance > max_path_len {
                    continue;
                }

                let delta = if end_is_source {
                    current_ele - next_ele
                } else {
                    next_ele - current_ele
                };
                let step = if constrained {
                    climb(delta).powi(DIJKSTRA_ELEVATION_EXPONENT)
                } else {
                    length
                };
                let next_weight = current_weight + step;

                if next_weight < weights.get(&next).copied().unwrap_or(f64::INFINITY) {
                    weights.insert(next, next_weight);
                    distances.insert(next, next_distance);
                    gains.insert(next, current_gain + climb(delta));
                    parents.insert(next, current);
                    queue.push(QueueEntry::new(next, next_weight));
                }
            }
        }

        debug!(start, end, end_is_source, max_path_len, "dijkstra found no path");
        SearchResult::default()
    }
}

fn finish(
    parents: &HashMap<NodeId, NodeId>,
    distances: &HashMap<NodeId, f64>,
    gains: &HashMap<NodeId, f64>,
    source: NodeId,
    target: NodeId,
    end_is_source: bool,
) -> SearchResult {
    let mut path = vec![target];
    let mut current = target;
    while current != source {
        match parents.get(&current) {
            Some(&parent) => {
                path.push(parent);
                current = parent;
            }
            None => return SearchResult::default(),
        }
    }
    // Walking parents from the target yields target..source; that already
    // reads start..end when the search ran from the end.
    if !end_is_source {
        path.reverse();
    }

    SearchResult::new(
        path,
        distances.get(&target).copied().unwrap_or(0.0),
        gains.get(&target).copied().unwrap_or(0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coords;
    use crate::graph::RoadGraph;

    fn line() -> RoadGraph {
        let mut graph = RoadGraph::new();
        graph.insert_node(1, Coords::new(0.0, 0.0, 10.0));
        graph.insert_node(2, Coords::new(1.0, 0.0, 30.0));
        graph.insert_node(3, Coords::new(2.0, 0.0, 20.0));
        graph.insert_node(4, Coords::new(9.0, 9.0, 0.0));
        graph.add_two_way_edge(1, 2, 100.0);
        graph.add_two_way_edge(2, 3, 100.0);
        graph
    }

    #[test]
    fn single_source_records_signed_deltas() {
        let graph = line();
        let tree = Dijkstra::new(&graph).single_source(1);

        assert_eq!(tree.distance(3), 200.0);
        assert_eq!(tree.parents.get(&3), Some(&2));
        assert_eq!(tree.ele_diff(2), 20.0);
        assert_eq!(tree.ele_diff(3), -10.0);
        assert_eq!(tree.distance(4), f64::INFINITY);
        assert_eq!(tree.path_from_root(3), vec![1, 2, 3]);
        assert_eq!(tree.path_to_root(3), vec![3, 2, 1]);
        assert!(tree.path_from_root(4).is_empty());
    }

    #[test]
    fn same_endpoints_yield_single_node() {
        let graph = line();
        let result = Dijkstra::new(&graph).search(2, 2, f64::INFINITY, false);
        assert_eq!(result, SearchResult::trivial(2));
    }

    #[test]
    fn unreachable_target_is_default() {
        let graph = line();
        let result = Dijkstra::new(&graph).search(1, 4, f64::INFINITY, false);
        assert_eq!(result, SearchResult::default());
    }

    #[test]
    fn gain_counts_only_climbs() {
        let graph = line();
        let forward = Dijkstra::new(&graph).search(1, 3, f64::INFINITY, false);
        assert_eq!(forward.path, vec![1, 2, 3]);
        assert_eq!(forward.ele_gain, 20.0);

        let reversed = Dijkstra::new(&graph).search(1, 3, f64::INFINITY, true);
        assert_eq!(reversed.path, vec![1, 2, 3]);
        assert_eq!(reversed.ele_gain, 20.0);
        assert_eq!(reversed.path_len, 200.0);
    }
}
