use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geo::{BoundingBox, Coords, LatLon, NodeId};
use crate::provider::{ChunkCache, GraphProvider};
use crate::source::GeoSource;
use crate::spatial::NodeLocator;

/// Provider that grows a shared [`ChunkCache`] as searches explore.
///
/// Asking for the neighbors of a node first loads the chunk of any neighbor
/// that is not yet cached, so a search frontier never steps onto unloaded
/// geography. Expansion can be suspended with
/// [`set_expansion`](GraphProvider::set_expansion).
pub struct LoadingGraphProvider {
    source: Arc<dyn GeoSource>,
    cache: Arc<ChunkCache>,
    start: NodeId,
    end: NodeId,
    expanding: AtomicBool,
}

impl std::fmt::Debug for LoadingGraphProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingGraphProvider")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("expanding", &self.expanding.load(Ordering::SeqCst))
            .field("cache", &self.cache)
            .finish()
    }
}

impl LoadingGraphProvider {
    /// Load the 3x3 chunk block around each coordinate and snap both
    /// endpoints to the nearest cached node in that block.
    pub fn open(
        source: Arc<dyn GeoSource>,
        cache: Arc<ChunkCache>,
        origin: LatLon,
        destination: LatLon,
    ) -> Result<Self> {
        cache.load_around(source.as_ref(), origin)?;
        cache.load_around(source.as_ref(), destination)?;

        let start = snap(&cache, origin)?;
        let end = snap(&cache, destination)?;
        debug!(
            start,
            end,
            cached_nodes = cache.node_count(),
            loaded_chunks = cache.loaded_count(),
            "loading provider ready"
        );

        Ok(Self {
            source,
            cache,
            start,
            end,
            expanding: AtomicBool::new(true),
        })
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn end(&self) -> NodeId {
        self.end
    }

    pub fn cache(&self) -> &Arc<ChunkCache> {
        &self.cache
    }

    fn cached_neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.cache.read(|graph| graph.neighbors(node))
    }
}

fn snap(cache: &ChunkCache, point: LatLon) -> Result<NodeId> {
    let (origin, width, height) = cache.window_around(point);
    let window = cache.chunk_bounds(origin, width, height);
    let nearby = cache.read(|graph| graph.within(&window));
    NodeLocator::build(&nearby)
        .nearest(point)
        .ok_or(Error::NoNodesNearby {
            lat: point.lat,
            lon: point.lon,
        })
}

impl GraphProvider for LoadingGraphProvider {
    fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        let neighbors = self.cached_neighbors(node);
        if !self.expanding.load(Ordering::SeqCst) {
            return neighbors;
        }

        let mut expanded = false;
        for &neighbor in &neighbors {
            let Some(coords) = self.cache.read(|graph| graph.coords(neighbor)) else {
                continue;
            };
            let chunk = self.cache.chunk_of(coords.x, coords.y);
            if self.cache.is_loaded(chunk) {
                continue;
            }
            match self.cache.load_range(self.source.as_ref(), chunk, 1, 1) {
                Ok(fetched) => expanded |= fetched,
                Err(err) => warn!(
                    error = %err,
                    chunk_x = chunk.x,
                    chunk_y = chunk.y,
                    "failed to load neighbor chunk"
                ),
            }
        }

        if expanded {
            self.cached_neighbors(node)
        } else {
            neighbors
        }
    }

    fn edge_distance(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.cache.read(|graph| graph.edge_length(from, to))
    }

    fn coords(&self, node: NodeId) -> Option<Coords> {
        self.cache.read(|graph| graph.coords(node))
    }

    fn all_nodes(&self) -> Vec<NodeId> {
        self.cache.read(|graph| graph.node_ids().collect())
    }

    fn set_expansion(&self, enabled: bool) -> bool {
        self.expanding.swap(enabled, Ordering::SeqCst)
    }

    fn ensure_coverage(&self, a: NodeId, b: NodeId) -> Result<()> {
        let (Some(a), Some(b)) = (self.coords(a), self.coords(b)) else {
            return Ok(());
        };
        let bbox = BoundingBox::around(LatLon::new(a.y, a.x), LatLon::new(b.y, b.x))
            .padded_at_least(self.cache.chunk_size());
        let fetched = self.cache.load_bbox(self.source.as_ref(), &bbox)?;
        debug!(fetched, loaded_chunks = self.cache.loaded_count(), "coverage pass done");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RoadGraph;
    use crate::provider::ExpansionGuard;
    use crate::source::MemorySource;

    fn strip() -> Arc<MemorySource> {
        let mut graph = RoadGraph::new();
        graph.insert_node(1, Coords::new(0.005, 0.005, 10.0));
        graph.insert_node(2, Coords::new(0.015, 0.005, 12.0));
        graph.insert_node(3, Coords::new(0.045, 0.005, 30.0));
        graph.insert_node(4, Coords::new(0.085, 0.005, 25.0));
        graph.add_two_way_edge(1, 2, 1100.0);
        graph.add_two_way_edge(2, 3, 3300.0);
        graph.add_two_way_edge(3, 4, 4400.0);
        Arc::new(MemorySource::new(graph))
    }

    fn open(source: &Arc<MemorySource>) -> LoadingGraphProvider {
        let shared: Arc<dyn GeoSource> = source.clone();
        let point = LatLon::new(0.005, 0.005);
        LoadingGraphProvider::open(shared, Arc::new(ChunkCache::default()), point, point)
            .expect("provider opens")
    }

    #[test]
    fn open_loads_one_window_per_distinct_endpoint() {
        let source = strip();
        let provider = open(&source);

        assert_eq!(provider.start(), 1);
        assert_eq!(provider.end(), 1);
        assert_eq!(source.fetch_count(), 1);
        assert_eq!(provider.cache().loaded_count(), 9);
    }

    #[test]
    fn neighbors_pull_in_unloaded_chunks() {
        let source = strip();
        let provider = open(&source);
        assert!(!provider.all_nodes().contains(&4));

        assert_eq!(provider.neighbors(2), vec![1, 3]);
        assert_eq!(source.fetch_count(), 2);
        assert!(provider.all_nodes().contains(&4));
        assert_eq!(provider.neighbors(3), vec![2, 4]);
    }

    #[test]
    fn suspended_expansion_reads_cache_only() {
        let source = strip();
        let provider = open(&source);
        {
            let _guard = ExpansionGuard::suspend(&provider);
            assert_eq!(provider.neighbors(2), vec![1, 3]);
            assert_eq!(source.fetch_count(), 1);
        }
        assert!(provider.set_expansion(true), "guard restores expansion");
    }

    #[test]
    fn coverage_loads_padded_box_between_nodes() {
        let source = strip();
        let provider = open(&source);
        provider.ensure_coverage(1, 3).expect("coverage");

        assert_eq!(source.fetch_count(), 2);
        assert_eq!(provider.edge_distance(3, 4), Some(4400.0));
        assert_eq!(provider.elevation(4), Some(25.0));
    }

    #[test]
    fn unknown_area_is_an_error() {
        let source = strip();
        let shared: Arc<dyn GeoSource> = source.clone();
        let err = LoadingGraphProvider::open(
            shared,
            Arc::new(ChunkCache::default()),
            LatLon::new(40.0, 40.0),
            LatLon::new(40.0, 40.0),
        )
        .expect_err("nothing there");
        assert!(matches!(err, Error::NoNodesNearby { .. }));
    }
}
