//! Search strategies used by the path finder.
//!
//! Each planner wraps one algorithm behind the [`SearchPlanner`] trait so the
//! path finder can pick one per request without knowing how it searches.

use tracing::warn;

use crate::geo::NodeId;
use crate::path_finder::FinderOptions;
use crate::provider::GraphProvider;
use crate::request::ElevationMode;

use super::{AStar, Dijkstra, MidpointMiracle, SearchAlgorithm, SearchResult};

/// Trait for search strategies.
pub trait SearchPlanner: Send + Sync {
    /// The algorithm identifier for this planner.
    fn algorithm(&self) -> SearchAlgorithm;

    /// Search from `start` to `end`. A finite `max_path_len` turns the search
    /// into an elevation-ranked one bounded by that length.
    fn search(
        &self,
        graph: &dyn GraphProvider,
        start: NodeId,
        end: NodeId,
        max_path_len: f64,
    ) -> SearchResult;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AStarPlanner;

impl SearchPlanner for AStarPlanner {
    fn algorithm(&self) -> SearchAlgorithm {
        SearchAlgorithm::AStar
    }

    fn search(
        &self,
        graph: &dyn GraphProvider,
        start: NodeId,
        end: NodeId,
        max_path_len: f64,
    ) -> SearchResult {
        AStar::new(graph).search(start, end, max_path_len)
    }
}

/// Dijkstra planner.
///
/// Under a budget both search directions are tried and the lower-gain
/// non-empty result is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct DijkstraPlanner;

impl SearchPlanner for DijkstraPlanner {
    fn algorithm(&self) -> SearchAlgorithm {
        SearchAlgorithm::Dijkstra
    }

    fn search(
        &self,
        graph: &dyn GraphProvider,
        start: NodeId,
        end: NodeId,
        max_path_len: f64,
    ) -> SearchResult {
        let dijkstra = Dijkstra::new(graph);
        let forward = dijkstra.search(start, end, max_path_len, false);
        if !max_path_len.is_finite() {
            return forward;
        }

        let reversed = dijkstra.search(start, end, max_path_len, true);
        match (forward.is_empty(), reversed.is_empty()) {
            (true, _) => reversed,
            (false, true) => forward,
            (false, false) if reversed.ele_gain < forward.ele_gain => reversed,
            (false, false) => forward,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MidpointPlanner {
    keep_n: usize,
    prune_depth: usize,
}

impl MidpointPlanner {
    pub fn new(keep_n: usize, prune_depth: usize) -> Self {
        Self {
            keep_n,
            prune_depth,
        }
    }
}

impl SearchPlanner for MidpointPlanner {
    fn algorithm(&self) -> SearchAlgorithm {
        SearchAlgorithm::MidpointMiracle
    }

    fn search(
        &self,
        graph: &dyn GraphProvider,
        start: NodeId,
        end: NodeId,
        max_path_len: f64,
    ) -> SearchResult {
        MidpointMiracle::new(graph)
            .with_keep_n(self.keep_n)
            .with_prune_depth(self.prune_depth)
            .search(start, end, max_path_len)
    }
}

/// Planner for the unconstrained shortest path.
pub fn select_shortest_planner(algorithm: SearchAlgorithm) -> Box<dyn SearchPlanner> {
    match algorithm {
        SearchAlgorithm::AStar => Box::new(AStarPlanner),
        SearchAlgorithm::Dijkstra => Box::new(DijkstraPlanner),
        SearchAlgorithm::MidpointMiracle => {
            warn!("midpoint-miracle cannot compute shortest paths; falling back to a-star");
            Box::new(AStarPlanner)
        }
    }
}

/// Planner for the elevation-aware route, or `None` when the shortest path is
/// the answer.
pub fn select_elevation_planner(
    mode: ElevationMode,
    options: &FinderOptions,
) -> Option<Box<dyn SearchPlanner>> {
    match mode {
        ElevationMode::Shortest => None,
        ElevationMode::Minimal => Some(match options.minimal_algorithm {
            SearchAlgorithm::Dijkstra => Box::new(DijkstraPlanner),
            SearchAlgorithm::AStar => Box::new(AStarPlanner),
            SearchAlgorithm::MidpointMiracle => {
                warn!("midpoint-miracle maximizes climb; using a-star for minimal routes");
                Box::new(AStarPlanner)
            }
        }),
        ElevationMode::Maximal => Some(Box::new(MidpointPlanner::new(
            options.keep_n,
            options.prune_depth,
        ))),
    }
}
