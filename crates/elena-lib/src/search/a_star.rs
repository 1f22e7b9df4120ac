use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::debug;

use crate::geo::NodeId;
use crate::provider::GraphProvider;

use super::{climb, QueueEntry, SearchResult};

/// Power applied to each step's climb when ranking under a distance budget.
pub const ASTAR_ELEVATION_EXPONENT: i32 = 3;

#[derive(Debug, Clone, Copy)]
struct Visit {
    parent: Option<NodeId>,
    priority: f64,
    distance: f64,
    gain: f64,
}

/// A* search with an elevation-aware priority.
///
/// Unconstrained searches rank by distance travelled plus the planar distance
/// still to go. Edge lengths are metres while the planar distance is in
/// coordinate degrees, so the estimate is tiny next to the path cost: it stays
/// admissible and mostly breaks ties, leaving the search close to Dijkstra.
/// Under a budget the priority is the climb accumulated so far
/// plus the cube of the next step's climb, so steep single steps are avoided
/// harder than gentle ones; relaxations that would exceed the budget are
/// dropped.
pub struct AStar<'a, G: GraphProvider + ?Sized> {
    graph: &'a G,
}

impl<'a, G: GraphProvider + ?Sized> AStar<'a, G> {
    pub fn new(graph: &'a G) -> Self {
        Self { graph }
    }

    pub fn search(&self, start: NodeId, end: NodeId, max_path_len: f64) -> SearchResult {
        if start == end {
            return SearchResult::trivial(start);
        }
        let Some(goal) = self.graph.coords(end) else {
            return SearchResult::default();
        };
        let constrained = max_path_len.is_finite();

        let mut visits: HashMap<NodeId, Visit> = HashMap::new();
        let mut settled: HashSet<NodeId> = HashSet::new();
        let mut queue = BinaryHeap::new();

        let start_priority = if constrained {
            0.0
        } else {
            self.graph
                .coords(start)
                .map(|coords| coords.planar_distance(&goal))
                .unwrap_or(0.0)
        };
        visits.insert(
            start,
            Visit {
                parent: None,
                priority: start_priority,
                distance: 0.0,
                gain: 0.0,
            },
        );
        queue.push(QueueEntry::new(start, start_priority));

        while let Some(entry) = queue.pop() {
            let current = entry.node;
            let Some(visit) = visits.get(&current).copied() else {
                continue;
            };
            if entry.cost.0 > visit.priority || !settled.insert(current) {
                continue;
            }
            if current == end {
                let result = reconstruct(&visits, end);
                debug!(
                    start,
                    end,
                    hops = result.hops(),
                    path_len = result.path_len,
                    ele_gain = result.ele_gain,
                    "a-star search done"
                );
                return result;
            }

            let Some(here) = self.graph.coords(current) else {
                continue;
            };

            for next in self.graph.neighbors(current) {
                if settled.contains(&next) {
                    continue;
                }
                let Some(length) = self.graph.edge_distance(current, next) else {
                    continue;
                };
                let Some(there) = self.graph.coords(next) else {
                    continue;
                };

                let distance = visit.distance + length;
                if distance > max_path_len {
                    continue;
                }
                let step_climb = climb(there.z - here.z);
                let priority = if constrained {
                    visit.gain + step_climb.powi(ASTAR_ELEVATION_EXPONENT)
                } else {
                    distance + there.planar_distance(&goal)
                };

                let improves = visits
                    .get(&next)
                    .is_none_or(|known| priority < known.priority);
                if improves {
                    visits.insert(
                        next,
                        Visit {
                            parent: Some(current),
                            priority,
                            distance,
                            gain: visit.gain + step_climb,
                        },
                    );
                    queue.push(QueueEntry::new(next, priority));
                }
            }
        }

        debug!(start, end, max_path_len, "a-star found no path");
        SearchResult::default()
    }
}

fn reconstruct(visits: &HashMap<NodeId, Visit>, end: NodeId) -> SearchResult {
    let Some(last) = visits.get(&end) else {
        return SearchResult::default();
    };

    let mut path = vec![end];
    let mut current = last.parent;
    while let Some(node) = current {
        path.push(node);
        current = visits.get(&node).and_then(|visit| visit.parent);
    }
    path.reverse();

    SearchResult::new(path, last.distance, last.gain)
}
