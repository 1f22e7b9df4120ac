use std::collections::HashSet;
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::error::Result;
use crate::geo::{BoundingBox, LatLon};
use crate::graph::RoadGraph;
use crate::source::GeoSource;

/// Default chunk edge length in degrees.
pub const DEFAULT_CHUNK_SIZE: f64 = 0.01;

/// Integer coordinates of a chunk cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i64,
    pub y: i64,
}

impl ChunkCoord {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Cell containing longitude `x` and latitude `y`.
    pub fn containing(x: f64, y: f64, size: f64) -> Self {
        Self {
            x: (x / size).floor() as i64,
            y: (y / size).floor() as i64,
        }
    }

    pub fn offset(self, dx: i64, dy: i64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

struct CacheState {
    graph: RoadGraph,
    loaded: HashSet<ChunkCoord>,
}

/// Long-lived road graph assembled chunk by chunk.
///
/// One instance is shared (behind `Arc`) by every loading provider in the
/// process. Loads are serialized by `load_lock`; merging a fetched fragment
/// and marking its chunks loaded happen under a single write lock, so a reader
/// never observes a chunk as loaded before its nodes are present. Nothing is
/// ever removed.
pub struct ChunkCache {
    chunk_size: f64,
    load_lock: Mutex<()>,
    state: RwLock<CacheState>,
}

impl std::fmt::Debug for ChunkCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read_state();
        f.debug_struct("ChunkCache")
            .field("chunk_size", &self.chunk_size)
            .field("loaded_chunks", &state.loaded.len())
            .field("nodes", &state.graph.node_count())
            .finish()
    }
}

impl Default for ChunkCache {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl ChunkCache {
    pub fn new(chunk_size: f64) -> Self {
        Self {
            chunk_size,
            load_lock: Mutex::new(()),
            state: RwLock::new(CacheState {
                graph: RoadGraph::new(),
                loaded: HashSet::new(),
            }),
        }
    }

    pub fn chunk_size(&self) -> f64 {
        self.chunk_size
    }

    pub fn chunk_of(&self, x: f64, y: f64) -> ChunkCoord {
        ChunkCoord::containing(x, y, self.chunk_size)
    }

    pub fn is_loaded(&self, chunk: ChunkCoord) -> bool {
        self.read_state().loaded.contains(&chunk)
    }

    pub fn loaded_count(&self) -> usize {
        self.read_state().loaded.len()
    }

    pub fn node_count(&self) -> usize {
        self.read_state().graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.read_state().graph.edge_count()
    }

    /// Run `f` against the committed graph.
    pub fn read<R>(&self, f: impl FnOnce(&RoadGraph) -> R) -> R {
        f(&self.read_state().graph)
    }

    /// Rectangle covered by the `width` x `height` chunks starting at `origin`.
    pub fn chunk_bounds(&self, origin: ChunkCoord, width: i64, height: i64) -> BoundingBox {
        let size = self.chunk_size;
        BoundingBox::new(
            origin.x as f64 * size,
            origin.y as f64 * size,
            (origin.x + width) as f64 * size,
            (origin.y + height) as f64 * size,
        )
    }

    /// The 3x3 block of chunks centred on `point`.
    pub fn window_around(&self, point: LatLon) -> (ChunkCoord, i64, i64) {
        (self.chunk_of(point.lon, point.lat).offset(-1, -1), 3, 3)
    }

    /// Load the 3x3 block of chunks centred on `point`.
    pub fn load_around(&self, source: &dyn GeoSource, point: LatLon) -> Result<bool> {
        let (origin, width, height) = self.window_around(point);
        self.load_range(source, origin, width, height)
    }

    /// Load every chunk intersecting `bbox`.
    pub fn load_bbox(&self, source: &dyn GeoSource, bbox: &BoundingBox) -> Result<bool> {
        let low = self.chunk_of(bbox.west, bbox.south);
        let high = self.chunk_of(bbox.east, bbox.north);
        self.load_range(source, low, high.x - low.x + 1, high.y - low.y + 1)
    }

    /// Load the chunk range `(origin, width, height)`.
    ///
    /// Returns `Ok(false)` without fetching when every chunk in the range is
    /// already loaded.
    pub fn load_range(
        &self,
        source: &dyn GeoSource,
        origin: ChunkCoord,
        width: i64,
        height: i64,
    ) -> Result<bool> {
        let width = width.max(1);
        let height = height.max(1);
        let cells: Vec<ChunkCoord> = (0..width)
            .flat_map(|dx| (0..height).map(move |dy| origin.offset(dx, dy)))
            .collect();

        if self.all_loaded(&cells) {
            return Ok(false);
        }

        let _load = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Another loader may have committed the range while we waited.
        if self.all_loaded(&cells) {
            return Ok(false);
        }

        let bbox = self.chunk_bounds(origin, width, height);
        let fragment = source.fetch(&bbox)?;

        let mut state = self.write_state();
        state.graph.merge(&fragment);
        state.loaded.extend(cells.iter().copied());
        debug!(
            origin_x = origin.x,
            origin_y = origin.y,
            width,
            height,
            fetched_nodes = fragment.node_count(),
            cached_nodes = state.graph.node_count(),
            "loaded chunk range"
        );
        Ok(true)
    }

    fn all_loaded(&self, cells: &[ChunkCoord]) -> bool {
        let state = self.read_state();
        cells.iter().all(|cell| state.loaded.contains(cell))
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
