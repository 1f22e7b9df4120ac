use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, warn};

use crate::geo::NodeId;
use crate::provider::{ExpansionGuard, GraphProvider};

use super::{climb, Dijkstra, SearchResult, ShortestPathTree};

/// Number of midpoints evaluated by default.
pub const DEFAULT_KEEP_N: usize = 10;
/// Hop radius excluded around each chosen midpoint by default.
pub const DEFAULT_PRUNE_DEPTH: usize = 3;

/// Elevation-maximizing search through promising midpoints.
///
/// One shortest-path tree is grown from each endpoint. Every node reachable
/// from both within the budget is a candidate midpoint, ranked by how far it
/// climbs above the start or how much the end climbs above it. The best
/// `keep_n` candidates (skipping anything within `prune_depth` hops of an
/// earlier pick) are turned into start -> midpoint -> end routes and the one
/// with the largest gain wins.
pub struct MidpointMiracle<'a, G: GraphProvider + ?Sized> {
    graph: &'a G,
    keep_n: usize,
    prune_depth: usize,
}

struct Candidate {
    path: Vec<NodeId>,
    path_len: f64,
    ele_gain: f64,
}

impl<'a, G: GraphProvider + ?Sized> MidpointMiracle<'a, G> {
    pub fn new(graph: &'a G) -> Self {
        Self {
            graph,
            keep_n: DEFAULT_KEEP_N,
            prune_depth: DEFAULT_PRUNE_DEPTH,
        }
    }

    pub fn with_keep_n(mut self, keep_n: usize) -> Self {
        self.keep_n = keep_n;
        self
    }

    pub fn with_prune_depth(mut self, prune_depth: usize) -> Self {
        self.prune_depth = prune_depth;
        self
    }

    pub fn search(&self, start: NodeId, end: NodeId, max_path_len: f64) -> SearchResult {
        if let Err(err) = self.graph.ensure_coverage(start, end) {
            warn!(error = %err, start, end, "coverage pass failed; using cached graph");
        }
        let _guard = ExpansionGuard::suspend(self.graph);

        let (Some(start_ele), Some(end_ele)) =
            (self.graph.elevation(start), self.graph.elevation(end))
        else {
            return SearchResult::default();
        };

        let dijkstra = Dijkstra::new(self.graph);
        let from_start = dijkstra.single_source(start);
        let from_end = dijkstra.single_source(end);

        let floor = start_ele.min(end_ele);
        let mut ranked: Vec<(NodeId, f64)> = self
            .graph
            .all_nodes()
            .into_iter()
            .filter(|&node| from_start.distance(node) + from_end.distance(node) <= max_path_len)
            .filter_map(|node| {
                let ele = self.graph.elevation(node)?;
                (ele < floor || ele >= start_ele).then(|| {
                    let score = climb(ele - start_ele).max(climb(end_ele - ele));
                    (node, score)
                })
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut pruned: HashSet<NodeId> = HashSet::new();
        let mut best: Option<Candidate> = None;
        let mut evaluated = 0;

        for (midpoint, _) in ranked {
            if evaluated >= self.keep_n {
                break;
            }
            if pruned.contains(&midpoint) {
                continue;
            }
            evaluated += 1;
            pruned.insert(midpoint);
            if self.prune_depth > 0 {
                pruned.extend(self.within_hops(midpoint, self.prune_depth));
            }

            let Some(candidate) = stitch(&from_start, &from_end, midpoint) else {
                continue;
            };
            if best
                .as_ref()
                .is_none_or(|current| candidate.ele_gain > current.ele_gain)
            {
                best = Some(candidate);
            }
        }

        let Some(best) = best else {
            debug!(start, end, max_path_len, "no midpoint candidates within budget");
            return SearchResult::default();
        };
        debug!(
            start,
            end,
            evaluated,
            path_len = best.path_len,
            ele_gain = best.ele_gain,
            "midpoint search done"
        );
        SearchResult::new(best.path, best.path_len, best.ele_gain)
    }

    /// Nodes reachable from `origin` in at most `depth` hops, excluding it.
    fn within_hops(&self, origin: NodeId, depth: usize) -> HashSet<NodeId> {
        let mut seen: HashSet<NodeId> = HashSet::from([origin]);
        let mut frontier = VecDeque::from([(origin, 0usize)]);
        while let Some((node, hops)) = frontier.pop_front() {
            if hops == depth {
                continue;
            }
            for next in self.graph.neighbors(node) {
                if seen.insert(next) {
                    frontier.push_back((next, hops + 1));
                }
            }
        }
        seen.remove(&origin);
        seen
    }
}

/// Join the start tree's path to `midpoint` with the end tree's path from it.
///
/// Where the two segments share a tail (the end segment doubles back along
/// the start segment) the shared nodes are dropped down to the junction, and
/// each dropped node's climb is removed once from both segments.
fn stitch(
    from_start: &ShortestPathTree,
    from_end: &ShortestPathTree,
    midpoint: NodeId,
) -> Option<Candidate> {
    let mut to_midpoint = from_start.path_from_root(midpoint);
    let to_end = from_end.path_to_root(midpoint);
    if to_midpoint.is_empty() || to_end.is_empty() {
        return None;
    }

    // Climb of the edge arriving at each node on the start segment.
    let start_climb: HashMap<NodeId, f64> = to_midpoint
        .iter()
        .map(|&node| (node, climb(from_start.ele_diff(node))))
        .collect();
    // Climb of the edge arriving at each node on the end segment. The end
    // tree stores `elevation(child) - elevation(parent)` and we travel child
    // to parent, so the climb into the parent is the negated child delta.
    let mut end_climb: HashMap<NodeId, f64> = HashMap::from([(midpoint, 0.0)]);
    for pair in to_end.windows(2) {
        end_climb.insert(pair[1], climb(-from_end.ele_diff(pair[0])));
    }

    let segment_gain = |path: &[NodeId], climbs: &HashMap<NodeId, f64>| -> f64 {
        path.iter()
            .map(|node| climbs.get(node).copied().unwrap_or(0.0))
            .sum()
    };
    let mut gain = segment_gain(&to_midpoint, &start_climb) + segment_gain(&to_end, &end_climb);
    let mut shared = 0;
    while shared < to_end.len() && to_midpoint.last() == Some(&to_end[shared]) {
        let node = to_end[shared];
        to_midpoint.pop();
        gain -= start_climb.get(&node).copied().unwrap_or(0.0);
        gain -= end_climb.get(&node).copied().unwrap_or(0.0);
        shared += 1;
    }
    let junction = to_end[shared - 1];
    to_midpoint.push(junction);
    gain += start_climb.get(&junction).copied().unwrap_or(0.0);

    let path_len = from_start.distance(junction) + from_end.distance(junction);
    to_midpoint.extend_from_slice(&to_end[shared..]);

    Some(Candidate {
        path: to_midpoint,
        path_len,
        ele_gain: gain,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coords;
    use crate::graph::RoadGraph;

    fn spur() -> RoadGraph {
        // 1 - 2 - 3 with a spur 2 - 4 up a hill; 3 is the goal.
        let mut graph = RoadGraph::new();
        graph.insert_node(1, Coords::new(0.0, 0.0, 0.0));
        graph.insert_node(2, Coords::new(1.0, 0.0, 10.0));
        graph.insert_node(3, Coords::new(2.0, 0.0, 10.0));
        graph.insert_node(4, Coords::new(1.0, 1.0, 60.0));
        graph.add_two_way_edge(1, 2, 1.0);
        graph.add_two_way_edge(2, 3, 1.0);
        graph.add_two_way_edge(2, 4, 1.0);
        graph
    }

    #[test]
    fn doubling_back_keeps_path_and_gain_consistent() {
        let graph = spur();
        let result = MidpointMiracle::new(&graph)
            .with_prune_depth(0)
            .search(1, 3, 10.0);

        // Through 4 the route is 1-2-4-2-3; the revisit of 2 is the junction
        // and the detour's climb is not part of the stitched route.
        assert_eq!(result.path, vec![1, 2, 3]);
        assert_eq!(result.ele_gain, 10.0);
        assert_eq!(result.path_len, 2.0);
    }

    #[test]
    fn respects_keep_n() {
        let graph = spur();
        let result = MidpointMiracle::new(&graph)
            .with_keep_n(0)
            .search(1, 3, 10.0);
        assert_eq!(result, SearchResult::default());
    }

    #[test]
    fn budget_below_shortest_has_no_candidates() {
        let graph = spur();
        let result = MidpointMiracle::new(&graph).search(1, 3, 1.5);
        assert!(result.is_empty());
    }

    #[test]
    fn hop_radius_excludes_origin() {
        let graph = spur();
        let miracle = MidpointMiracle::new(&graph);
        let near = miracle.within_hops(1, 1);
        assert_eq!(near, HashSet::from([2]));
        let wider = miracle.within_hops(1, 2);
        assert_eq!(wider, HashSet::from([2, 3, 4]));
    }
}
