//! Elena library entry points.
//!
//! This crate exposes the road-graph data model, the two graph providers
//! (eager bounded-box and lazy chunk-streaming), the search algorithms
//! (Dijkstra, A*, MidpointMiracle) and the [`PathFinder`] orchestration that
//! turns a [`PathRequest`] into a shortest/elevation route comparison.
//! Higher-level consumers (CLI, HTTP service) should only depend on the items
//! re-exported here instead of reimplementing behavior.

#![deny(warnings)]

pub mod db;
pub mod error;
pub mod geo;
pub mod graph;
pub mod path_finder;
pub mod provider;
pub mod request;
pub mod search;
pub mod source;
pub mod spatial;

pub use db::SqliteSource;
pub use error::{Error, Result, ValidationError};
pub use geo::{BoundingBox, Coords, LatLon, NodeId};
pub use graph::{Edge, RoadGraph};
pub use path_finder::{
    plan_path, plan_path_with_deadline, FinderOptions, PathComparison, PathFinder, PathStats,
    RouteStats, DEFAULT_DEADLINE,
};
pub use provider::{
    BoundedGraphProvider, ChunkCache, ChunkCoord, ExpansionGuard, GraphProvider,
    LoadingGraphProvider, Provider, ProviderKind, DEFAULT_CHUNK_SIZE,
};
pub use request::{ElevationMode, PathRequest};
pub use search::{
    select_elevation_planner, select_shortest_planner, AStar, Dijkstra, MidpointMiracle,
    SearchAlgorithm, SearchPlanner, SearchResult, ShortestPathTree,
};
pub use source::{GeoSource, Geocoder, MemorySource};
pub use spatial::NodeLocator;
