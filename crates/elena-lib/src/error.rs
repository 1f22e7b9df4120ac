use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the Elena library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A path request failed validation before any search ran.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Dataset could not be located at the resolved path.
    #[error("dataset not found at {path}")]
    DatasetNotFound { path: PathBuf },

    /// Raised when the dataset lacks the `nodes`/`edges` tables.
    #[error("unsupported dataset schema; expected nodes(id, lon, lat, elevation) and edges(tail, head, length) tables")]
    UnsupportedSchema,

    /// Raised when the data source returned no nodes around a coordinate.
    #[error("no road nodes found near ({lat}, {lon})")]
    NoNodesNearby { lat: f64, lon: f64 },

    /// Raised when not even the shortest search could connect the endpoints.
    #[error("no route found between node {start} and node {end}")]
    RouteNotFound { start: i64, end: i64 },

    /// Raised when the path-finding pipeline exceeded its deadline.
    #[error("path finding did not finish within {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Raised when a deadline worker exited without reporting a result.
    #[error("path finding worker stopped unexpectedly")]
    WorkerFailed,

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reasons a [`PathRequest`](crate::PathRequest) may be rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Coordinates were not of the form `(<lat>, <lon>)`.
    #[error("{field} must be of the form '(<lat>, <lon>)', got '{value}'")]
    InvalidCoordinates { field: &'static str, value: String },

    /// Coordinates parsed but do not name a point on Earth.
    #[error("{field} ({lat}, {lon}) is outside the valid latitude/longitude range")]
    CoordinatesOutOfRange {
        field: &'static str,
        lat: f64,
        lon: f64,
    },

    /// Distance percent was not an integer.
    #[error("distance percent must be an integer, got '{value}'")]
    InvalidDistancePercent { value: String },

    /// Distance percent was below the shortest path itself.
    #[error("distance percent must be at least 100, got {value}")]
    DistancePercentTooSmall { value: i64 },

    /// Elevation mode was not one of the supported settings.
    #[error("elevation mode must be one of shortest, minimal, maximal; got '{value}'")]
    UnknownElevationMode { value: String },

    /// Graph mode was not one of the supported providers.
    #[error("graph mode must be one of bounded, loading; got '{value}'")]
    UnknownGraphMode { value: String },

    /// Search algorithm name was not recognised.
    #[error("algorithm must be one of a-star, dijkstra, midpoint-miracle; got '{value}'")]
    UnknownAlgorithm { value: String },
}
