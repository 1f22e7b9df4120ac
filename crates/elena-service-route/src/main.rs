//! Elena route planning HTTP service.
//!
//! # Endpoints
//!
//! - `POST /api/route` - plan a route and compare it with the shortest path
//! - `POST /api/search` - geocode a place name to `[lat, lon]`
//! - `GET /metrics` - Prometheus metrics (path set by `METRICS_PATH`)
//! - `GET /health/live` - liveness probe
//! - `GET /health/ready` - readiness probe
//!
//! # Configuration
//!
//! - `ELENA_DATA_PATH` - road dataset (default: `/data/elena.db`)
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `ROUTE_TIMEOUT_SECS`, `CHUNK_SIZE_DEGREES` - see [`ServiceConfig`]
//! - `METRICS_ENABLED`, `METRICS_PATH` - see [`MetricsConfig`]
//! - `RUST_LOG`, `LOG_FORMAT` - see [`LoggingConfig`]

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

use elena_lib::{plan_path, Error as LibError, Geocoder, PathComparison, PathRequest};
use elena_service_shared::{
    failure_reason, from_lib_error, health_live, health_ready, init_logging, init_metrics,
    metrics_handler, record_geocode, record_route_calculated, record_route_failed,
    record_route_shape, AppState, LoggingConfig, MetricsConfig, MetricsLayer, ProblemDetails,
    RequestId, RouteRequest, SearchRequest, ServiceConfig, ServiceResponse, Validate,
};

const SERVICE: &str = "route";
const DEFAULT_DATA_PATH: &str = "/data/elena.db";

/// Body of a successful `/api/route` call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteResponse {
    request: PathRequest,
    #[serde(flatten)]
    comparison: PathComparison,
}

/// `[lat, lon]`, or empty when the place is unknown.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SearchResponse {
    coords: Vec<f64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LoggingConfig::from_env().with_service(SERVICE));

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let data_path = env::var("ELENA_DATA_PATH").unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());
    let port: u16 = env::var("SERVICE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let config = ServiceConfig::from_env();

    info!(
        data_path = %data_path,
        port,
        timeout_secs = config.route_timeout.as_secs(),
        chunk_size = config.chunk_size,
        "starting route service"
    );

    let state = AppState::load(&data_path, config).map_err(|e| {
        error!(error = %e, path = %data_path, "failed to load application state");
        e
    })?;

    let app = app(state, &metrics_config.path);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn app(state: AppState, metrics_path: &str) -> Router {
    Router::new()
        .route("/api/route", post(route_handler))
        .route("/api/search", post(search_handler))
        .route(metrics_path, get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(CorsLayer::permissive())
        .layer(MetricsLayer)
        .with_state(state)
}

/// Handle `POST /api/route`.
async fn route_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(body): Json<RouteRequest>,
) -> Result<ServiceResponse<RouteResponse>, ProblemDetails> {
    let request = body.to_path_request(request_id.as_str()).map_err(|problem| {
        record_route_failed("validation_error");
        *problem
    })?;

    info!(
        request_id = %request_id,
        elevation = %request.elevation,
        graph = %request.graph,
        distance_percent = request.distance_percent,
        "handling route request"
    );

    let comparison = run_planner(&state, &request).await.map_err(|e| {
        let reason = failure_reason(&e);
        record_route_failed(reason);
        match reason {
            "internal_error" | "dataset_unavailable" => {
                error!(request_id = %request_id, error = %e, "route planning failed")
            }
            _ => warn!(request_id = %request_id, error = %e, reason, "no route produced"),
        }
        from_lib_error(&e, request_id.as_str())
    })?;

    let elevation = request.elevation.to_string();
    let stats = comparison.stats.result_path;
    record_route_calculated(&elevation, &request.graph.to_string());
    record_route_shape(stats.path_length, stats.elevation_gain, &elevation);

    info!(
        request_id = %request_id,
        path_length = stats.path_length,
        elevation_gain = stats.elevation_gain,
        waypoints = comparison.route.len(),
        "route computed"
    );

    Ok(ServiceResponse::new(RouteResponse {
        request,
        comparison,
    }))
}

/// Plan on the blocking pool, giving up after the configured deadline.
///
/// A timed-out task keeps running to completion; its result is dropped.
async fn run_planner(state: &AppState, request: &PathRequest) -> elena_lib::Result<PathComparison> {
    let source = state.source();
    let cache = Arc::clone(state.cache());
    let options = state.config().finder;
    let deadline = state.config().route_timeout;
    let task_request = request.clone();

    let task =
        tokio::task::spawn_blocking(move || plan_path(source, &cache, &task_request, &options));

    match tokio::time::timeout(deadline, task).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(join_error)) => {
            error!(error = %join_error, "route worker did not complete");
            Err(LibError::WorkerFailed)
        }
        Err(_) => Err(LibError::Timeout {
            seconds: deadline.as_secs_f64().ceil() as u64,
        }),
    }
}

/// Handle `POST /api/search`. Failures answer with empty `coords`.
async fn search_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(body): Json<SearchRequest>,
) -> ServiceResponse<SearchResponse> {
    if let Err(problem) = body.validate(request_id.as_str()) {
        record_geocode("invalid");
        debug!(request_id = %request_id, detail = ?problem.detail, "rejected search");
        return ServiceResponse::new(SearchResponse::default());
    }

    let place = body.place;
    let lookup = state.clone();
    let lookup_place = place.clone();
    let found = tokio::task::spawn_blocking(move || lookup.geocoder().geocode(&lookup_place))
        .await
        .unwrap_or_else(|e| {
            warn!(request_id = %request_id, error = %e, "geocode task did not complete");
            None
        });

    let coords = match found {
        Some(position) => {
            record_geocode("found");
            vec![position.lat, position.lon]
        }
        None => {
            record_geocode("not_found");
            Vec::new()
        }
    };
    info!(request_id = %request_id, place = %place, found = !coords.is_empty(), "geocoded");

    ServiceResponse::new(SearchResponse { coords })
}
