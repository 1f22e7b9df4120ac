use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::{BoundingBox, Coords, LatLon, NodeId};
use crate::graph::RoadGraph;
use crate::provider::{GraphProvider, DEFAULT_CHUNK_SIZE};
use crate::source::GeoSource;
use crate::spatial::NodeLocator;

/// Provider over a single eagerly fetched bounding box.
///
/// The box around both endpoints is padded on every side by its larger
/// dimension (and by at least one chunk width) and fetched once at
/// construction. The neighbor relation never changes afterwards.
#[derive(Debug)]
pub struct BoundedGraphProvider {
    graph: RoadGraph,
    start: NodeId,
    end: NodeId,
}

impl BoundedGraphProvider {
    pub fn open(source: &dyn GeoSource, origin: LatLon, destination: LatLon) -> Result<Self> {
        let bbox = BoundingBox::around(origin, destination).padded_at_least(DEFAULT_CHUNK_SIZE);
        let graph = source.fetch(&bbox)?;
        let locator = NodeLocator::build(&graph);

        let start = locator.nearest(origin).ok_or(Error::NoNodesNearby {
            lat: origin.lat,
            lon: origin.lon,
        })?;
        let end = locator.nearest(destination).ok_or(Error::NoNodesNearby {
            lat: destination.lat,
            lon: destination.lon,
        })?;

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            start,
            end,
            "bounded provider ready"
        );

        Ok(Self { graph, start, end })
    }

    /// Wrap an already materialized graph with known endpoints.
    pub fn from_graph(graph: RoadGraph, start: NodeId, end: NodeId) -> Self {
        Self { graph, start, end }
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn end(&self) -> NodeId {
        self.end
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }
}

impl GraphProvider for BoundedGraphProvider {
    fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.graph.neighbors(node)
    }

    fn edge_distance(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.graph.edge_length(from, to)
    }

    fn coords(&self, node: NodeId) -> Option<Coords> {
        self.graph.coords(node)
    }

    fn all_nodes(&self) -> Vec<NodeId> {
        self.graph.all_nodes()
    }
}
