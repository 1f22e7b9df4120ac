//! Search algorithms over a [`GraphProvider`](crate::GraphProvider).
//!
//! [`Dijkstra`] and [`AStar`] answer point-to-point queries, optionally under
//! a distance budget in which case they rank by elevation change instead of
//! distance. [`MidpointMiracle`] maximizes climb by stitching two shortest
//! path trees together at well-chosen midpoints. The [`SearchPlanner`]
//! strategies wrap them for the path finder.

mod a_star;
mod dijkstra;
mod midpoint;
mod planner;
mod result;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::geo::NodeId;

pub use a_star::{AStar, ASTAR_ELEVATION_EXPONENT};
pub use dijkstra::{Dijkstra, ShortestPathTree, DIJKSTRA_ELEVATION_EXPONENT};
pub use midpoint::{MidpointMiracle, DEFAULT_KEEP_N, DEFAULT_PRUNE_DEPTH};
pub use planner::{
    select_elevation_planner, select_shortest_planner, AStarPlanner, DijkstraPlanner,
    MidpointPlanner, SearchPlanner,
};
pub use result::SearchResult;

/// Algorithms available to the path finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchAlgorithm {
    /// Heuristic-guided search (default).
    #[default]
    AStar,
    Dijkstra,
    /// Best-midpoint search for elevation-maximizing routes.
    MidpointMiracle,
}

impl fmt::Display for SearchAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SearchAlgorithm::AStar => "a-star",
            SearchAlgorithm::Dijkstra => "dijkstra",
            SearchAlgorithm::MidpointMiracle => "midpoint-miracle",
        };
        f.write_str(value)
    }
}

impl FromStr for SearchAlgorithm {
    type Err = ValidationError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "a-star" | "astar" => Ok(SearchAlgorithm::AStar),
            "dijkstra" => Ok(SearchAlgorithm::Dijkstra),
            "midpoint-miracle" | "midpoint" => Ok(SearchAlgorithm::MidpointMiracle),
            _ => Err(ValidationError::UnknownAlgorithm {
                value: value.to_string(),
            }),
        }
    }
}

/// Elevation climbed over one step, given the signed change in height.
pub(crate) fn climb(delta: f64) -> f64 {
    delta.max(0.0)
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: NodeId,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: NodeId, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BinaryHeap;

    use super::*;

    #[test]
    fn queue_pops_cheapest_then_smallest_id() {
        let mut heap = BinaryHeap::new();
        heap.push(QueueEntry::new(7, 2.0));
        heap.push(QueueEntry::new(3, 1.0));
        heap.push(QueueEntry::new(2, 2.0));
        heap.push(QueueEntry::new(1, 1.0));

        let order: Vec<NodeId> = std::iter::from_fn(|| heap.pop().map(|e| e.node)).collect();
        assert_eq!(order, vec![1, 3, 2, 7]);
    }

    #[test]
    fn algorithm_names_round_trip_through_display() {
        for algorithm in [
            SearchAlgorithm::AStar,
            SearchAlgorithm::Dijkstra,
            SearchAlgorithm::MidpointMiracle,
        ] {
            assert_eq!(algorithm.to_string().parse::<SearchAlgorithm>(), Ok(algorithm));
        }
        assert!(matches!(
            "bfs".parse::<SearchAlgorithm>(),
            Err(ValidationError::UnknownAlgorithm { .. })
        ));
    }

    #[test]
    fn algorithm_serializes_kebab_case() {
        let json = serde_json::to_string(&SearchAlgorithm::MidpointMiracle).expect("serialize");
        assert_eq!(json, "\"midpoint-miracle\"");
    }
}
