//! Shared infrastructure for the Elena HTTP services.
//!
//! - [`AppState`]: opened road dataset, the shared chunk cache and service tuning
//! - [`health_live`] / [`health_ready`]: probe handlers
//! - [`ProblemDetails`]: RFC 9457 error bodies
//! - [`ServiceResponse`]: success wrapper carrying a content type
//! - [`metrics`]: Prometheus recorder and business metrics
//! - [`logging`]: JSON or text `tracing` setup
//! - [`middleware`]: request IDs and HTTP metrics
//! - request bodies with validation into library types
//!
//! Handlers stay thin: they parse JSON, validate it into an
//! [`elena_lib::PathRequest`], call the library and format the result.
//!
//! The [`test_utils`] module builds an in-memory state for handler tests.
//! Enable the `test-utils` feature to reach it from dependent crates.

#![deny(warnings)]

mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    failure_reason, init_metrics, metrics_handler, record_geocode, record_route_calculated,
    record_route_failed, record_route_shape, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_BAD_COORDS, PROBLEM_INTERNAL_ERROR,
    PROBLEM_ROUTE_NOT_FOUND, PROBLEM_SERVICE_UNAVAILABLE, PROBLEM_TIMEOUT,
};
pub use request::{RouteRequest, SearchRequest, Validate};
pub use response::ServiceResponse;
pub use state::{AppState, AppStateError, ServiceConfig};
