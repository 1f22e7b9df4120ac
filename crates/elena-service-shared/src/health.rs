//! Liveness and readiness handlers (`/health/live`, `/health/ready`).

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok" or "not_ready: <reason>".
    pub status: String,

    pub service: String,

    pub version: String,

    /// RFC 3339 time the probe was answered.
    pub timestamp: String,

    /// Nodes in the dataset (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_loaded: Option<usize>,

    /// Chunks held by the loading-mode cache (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks_cached: Option<usize>,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            timestamp: now(),
            nodes_loaded: None,
            chunks_cached: None,
        }
    }

    pub fn ready(service: &str, version: &str, nodes: usize, chunks: usize) -> Self {
        Self {
            nodes_loaded: Some(nodes),
            chunks_cached: Some(chunks),
            ..Self::alive(service, version)
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            ..Self::alive(service, version)
        }
    }
}

/// Always 200 while the process is serving.
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// 200 once the dataset has nodes, 503 otherwise.
///
/// ```text
/// GET /health/ready
/// {"status":"ok","service":"elena-service-shared","version":"0.1.0","timestamp":"...","nodes_loaded":5431,"chunks_cached":12}
/// ```
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    let nodes = state.node_count();
    if nodes == 0 {
        let status = HealthStatus::not_ready(service, version, "dataset has no road nodes");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }

    let status = HealthStatus::ready(service, version, nodes, state.cache().loaded_count());
    (StatusCode::OK, Json(status)).into_response()
}
