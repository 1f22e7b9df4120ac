//! Application state for the HTTP services.
//!
//! Holds the opened road dataset, the chunk cache shared by every
//! loading-mode request, and the tuning the route handler passes to the
//! library.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use elena_lib::{
    ChunkCache, Error as LibError, FinderOptions, GeoSource, Geocoder, SqliteSource,
    DEFAULT_CHUNK_SIZE, DEFAULT_DEADLINE,
};

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Failed to open or inspect the dataset.
    DatasetLoad(LibError),

    DatabaseNotFound(String),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatasetLoad(e) => write!(f, "failed to load road dataset: {}", e),
            Self::DatabaseNotFound(path) => write!(f, "database not found: {}", path),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DatasetLoad(e) => Some(e),
            Self::DatabaseNotFound(_) => None,
        }
    }
}

impl From<LibError> for AppStateError {
    fn from(err: LibError) -> Self {
        Self::DatasetLoad(err)
    }
}

/// Tuning read from the environment at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceConfig {
    /// Deadline for one route request.
    pub route_timeout: Duration,
    /// Edge length of a loading-mode chunk, in degrees.
    pub chunk_size: f64,
    pub finder: FinderOptions,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            route_timeout: DEFAULT_DEADLINE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            finder: FinderOptions::default(),
        }
    }
}

impl ServiceConfig {
    /// - `ROUTE_TIMEOUT_SECS`: route deadline in seconds (default: 80)
    /// - `CHUNK_SIZE_DEGREES`: chunk edge in degrees (default: 0.01)
    ///
    /// Unparsable or non-positive values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let route_timeout = std::env::var("ROUTE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.route_timeout);

        let chunk_size = std::env::var("CHUNK_SIZE_DEGREES")
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|size| size.is_finite() && *size > 0.0)
            .unwrap_or(defaults.chunk_size);

        Self {
            route_timeout,
            chunk_size,
            finder: defaults.finder,
        }
    }
}

/// Shared application state for all axum handlers.
///
/// Cheap to clone; share it through axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    source: Arc<dyn GeoSource>,
    geocoder: Arc<dyn Geocoder>,
    node_count: usize,
    cache: Arc<ChunkCache>,
    config: ServiceConfig,
}

impl AppState {
    /// Open the SQLite dataset at `db_path`.
    pub fn load(db_path: impl AsRef<Path>, config: ServiceConfig) -> Result<Self, AppStateError> {
        let db_path = db_path.as_ref();

        if !db_path.exists() {
            return Err(AppStateError::DatabaseNotFound(
                db_path.display().to_string(),
            ));
        }

        tracing::info!(path = %db_path.display(), "opening road dataset");
        let source = Arc::new(SqliteSource::open(db_path)?);
        let node_count = source.node_count()?;
        tracing::info!(
            node_count,
            has_places = source.has_places(),
            "road dataset opened"
        );

        Ok(Self::from_components(source, node_count, config))
    }

    /// Build state around any source that can also geocode.
    ///
    /// Used by tests with an in-memory source.
    pub fn from_components<S>(source: Arc<S>, node_count: usize, config: ServiceConfig) -> Self
    where
        S: GeoSource + Geocoder + 'static,
    {
        let geocoder: Arc<dyn Geocoder> = source.clone();
        Self {
            inner: Arc::new(AppStateInner {
                source,
                geocoder,
                node_count,
                cache: Arc::new(ChunkCache::new(config.chunk_size)),
                config,
            }),
        }
    }

    pub fn source(&self) -> Arc<dyn GeoSource> {
        Arc::clone(&self.inner.source)
    }

    pub fn geocoder(&self) -> &dyn Geocoder {
        self.inner.geocoder.as_ref()
    }

    /// Chunk cache shared by every loading-mode request.
    pub fn cache(&self) -> &Arc<ChunkCache> {
        &self.inner.cache
    }

    /// Nodes in the dataset, counted at startup.
    pub fn node_count(&self) -> usize {
        self.inner.node_count
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("node_count", &self.inner.node_count)
            .field("chunks_cached", &self.inner.cache.loaded_count())
            .field("config", &self.inner.config)
            .finish()
    }
}
