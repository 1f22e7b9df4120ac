//! Orchestration: shortest path first, then the elevation-aware alternative.

use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::NodeId;
use crate::provider::{ChunkCache, GraphProvider, Provider};
use crate::request::{ElevationMode, PathRequest};
use crate::search::{
    select_elevation_planner, select_shortest_planner, SearchAlgorithm, SearchResult,
    DEFAULT_KEEP_N, DEFAULT_PRUNE_DEPTH,
};
use crate::source::GeoSource;

/// Wall-clock limit for one request when the caller does not pick one.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(80);

/// Tuning for a [`PathFinder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinderOptions {
    /// Algorithm computing the unconstrained shortest path.
    pub shortest_algorithm: SearchAlgorithm,
    /// Algorithm computing the least-climb path under a budget.
    pub minimal_algorithm: SearchAlgorithm,
    /// Midpoints evaluated for the most-climb path.
    pub keep_n: usize,
    /// Hop radius pruned around each evaluated midpoint.
    pub prune_depth: usize,
}

impl Default for FinderOptions {
    fn default() -> Self {
        Self {
            shortest_algorithm: SearchAlgorithm::AStar,
            minimal_algorithm: SearchAlgorithm::AStar,
            keep_n: DEFAULT_KEEP_N,
            prune_depth: DEFAULT_PRUNE_DEPTH,
        }
    }
}

/// Rounded figures for one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStats {
    pub path_length: i64,
    pub elevation_gain: i64,
}

impl PathStats {
    fn from_result(result: &SearchResult) -> Self {
        Self {
            path_length: result.path_len.round() as i64,
            elevation_gain: result.ele_gain.round() as i64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStats {
    pub result_path: PathStats,
    pub shortest_path: PathStats,
}

/// The chosen route next to the shortest one.
///
/// Routes are `[lat, lon]` pairs. When no alternative beat the shortest path,
/// `route` equals `short_route`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathComparison {
    pub route: Vec<[f64; 2]>,
    pub short_route: Vec<[f64; 2]>,
    pub stats: RouteStats,
    #[serde(skip)]
    pub result: SearchResult,
    #[serde(skip)]
    pub shortest: SearchResult,
}

/// Runs the searches a [`PathRequest`] asks for.
#[derive(Debug, Clone, Default)]
pub struct PathFinder {
    options: FinderOptions,
}

impl PathFinder {
    pub fn new(options: FinderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FinderOptions {
        &self.options
    }

    /// Plan between the endpoints the provider snapped to.
    pub fn find_path(&self, provider: &Provider, request: &PathRequest) -> Result<PathComparison> {
        self.find_path_between(provider, provider.start(), provider.end(), request)
    }

    /// Plan between two known nodes of `graph`.
    pub fn find_path_between(
        &self,
        graph: &dyn GraphProvider,
        start: NodeId,
        end: NodeId,
        request: &PathRequest,
    ) -> Result<PathComparison> {
        let shortest = select_shortest_planner(self.options.shortest_algorithm).search(
            graph,
            start,
            end,
            f64::INFINITY,
        );
        if shortest.is_empty() {
            return Err(Error::RouteNotFound { start, end });
        }

        let alternative = select_elevation_planner(request.elevation, &self.options)
            .map(|planner| {
                let budget = request.budget_for(shortest.path_len);
                let candidate = planner.search(graph, start, end, budget);
                debug!(
                    algorithm = %planner.algorithm(),
                    budget,
                    found = !candidate.is_empty(),
                    ele_gain = candidate.ele_gain,
                    shortest_gain = shortest.ele_gain,
                    "elevation search finished"
                );
                candidate
            })
            .filter(|candidate| beats_shortest(request.elevation, candidate, &shortest));

        let result = alternative.unwrap_or_else(|| shortest.clone());
        Ok(PathComparison {
            route: lat_lon_path(graph, &result.path),
            short_route: lat_lon_path(graph, &shortest.path),
            stats: RouteStats {
                result_path: PathStats::from_result(&result),
                shortest_path: PathStats::from_result(&shortest),
            },
            result,
            shortest,
        })
    }
}

fn beats_shortest(mode: ElevationMode, candidate: &SearchResult, shortest: &SearchResult) -> bool {
    if candidate.is_empty() {
        return false;
    }
    match mode {
        ElevationMode::Shortest => false,
        ElevationMode::Minimal => candidate.ele_gain < shortest.ele_gain,
        ElevationMode::Maximal => candidate.ele_gain > shortest.ele_gain,
    }
}

fn lat_lon_path(graph: &dyn GraphProvider, path: &[NodeId]) -> Vec<[f64; 2]> {
    path.iter()
        .filter_map(|&node| graph.coords(node))
        .map(|coords| coords.lat_lon())
        .collect()
}

/// Open the provider the request names and plan the route.
pub fn plan_path(
    source: Arc<dyn GeoSource>,
    cache: &Arc<ChunkCache>,
    request: &PathRequest,
    options: &FinderOptions,
) -> Result<PathComparison> {
    let provider = Provider::open(
        request.graph,
        source,
        cache,
        request.origin,
        request.destination,
    )?;
    debug!(
        graph = %provider.kind(),
        start = provider.start(),
        end = provider.end(),
        "provider opened"
    );
    PathFinder::new(*options).find_path(&provider, request)
}

/// [`plan_path`] with a wall-clock limit.
///
/// Planning runs on a worker thread. When `deadline` passes first the call
/// returns [`Error::Timeout`]; the worker finishes in the background and its
/// result is discarded.
pub fn plan_path_with_deadline(
    source: Arc<dyn GeoSource>,
    cache: &Arc<ChunkCache>,
    request: &PathRequest,
    options: &FinderOptions,
    deadline: Duration,
) -> Result<PathComparison> {
    let (sender, receiver) = mpsc::channel();
    let cache = Arc::clone(cache);
    let request = request.clone();
    let options = *options;

    thread::Builder::new()
        .name("elena-path-finder".to_string())
        .spawn(move || {
            let outcome = plan_path(source, &cache, &request, &options);
            // The receiver is gone once the deadline has passed.
            let _ = sender.send(outcome);
        })?;

    match receiver.recv_timeout(deadline) {
        Ok(outcome) => outcome,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(Error::Timeout {
            seconds: deadline.as_secs_f64().ceil() as u64,
        }),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(Error::WorkerFailed),
    }
}
