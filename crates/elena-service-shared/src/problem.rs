//! RFC 9457 Problem Details for HTTP APIs.
//!
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use elena_lib::Error as LibError;

/// Malformed coordinates, distance, elevation or graph settings.
pub const PROBLEM_BAD_COORDS: &str = "/problems/badcoords";

/// No road near an endpoint, or the endpoints are not connected.
pub const PROBLEM_ROUTE_NOT_FOUND: &str = "/problems/route-not-found";

/// Path finding exceeded the configured deadline.
pub const PROBLEM_TIMEOUT: &str = "/problems/timeout";

pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// Dataset missing or unreadable.
pub const PROBLEM_SERVICE_UNAVAILABLE: &str = "/problems/service-unavailable";

/// RFC 9457 Problem Details response structure.
///
/// ```
/// use elena_service_shared::{ProblemDetails, PROBLEM_BAD_COORDS};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(PROBLEM_BAD_COORDS, "Bad Coordinates", StatusCode::BAD_REQUEST)
///     .with_detail("origin must be of the form '(<lat>, <lon>)', got 'north'")
///     .with_request_id("req-12345");
/// assert_eq!(problem.status, 400);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_uri: String,

    pub title: String,

    pub status: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Request ID of the failing request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Always "application/problem+json".
    pub content_type: String,
}

impl ProblemDetails {
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            content_type: "application/problem+json".to_string(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// 400 for a route request that failed validation.
    pub fn bad_coords(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_BAD_COORDS, "Bad Coordinates", StatusCode::BAD_REQUEST)
            .with_detail(detail)
            .with_request_id(request_id)
    }

    /// 404 when no route could be produced.
    pub fn route_not_found(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_ROUTE_NOT_FOUND,
            "Route Not Found",
            StatusCode::NOT_FOUND,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 504 when path finding ran past its deadline.
    pub fn timeout(seconds: u64, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_TIMEOUT, "Timeout", StatusCode::GATEWAY_TIMEOUT)
            .with_detail(format!(
                "Path finding did not finish within {seconds} seconds"
            ))
            .with_request_id(request_id)
    }

    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    pub fn service_unavailable(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_SERVICE_UNAVAILABLE,
            "Service Unavailable",
            StatusCode::SERVICE_UNAVAILABLE,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.detail.as_deref().unwrap_or(""))
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = Json(&self).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        *response.status_mut() = status;
        response
    }
}

/// Map a library error onto the problem a client should see.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::Validation(reason) => ProblemDetails::bad_coords(reason.to_string(), request_id),
        LibError::NoNodesNearby { .. } | LibError::RouteNotFound { .. } => {
            ProblemDetails::route_not_found(error.to_string(), request_id)
        }
        LibError::Timeout { seconds } => ProblemDetails::timeout(*seconds, request_id),
        LibError::DatasetNotFound { path } => ProblemDetails::service_unavailable(
            format!("Dataset not available at {}", path.display()),
            request_id,
        ),
        LibError::UnsupportedSchema => {
            ProblemDetails::internal_error("Unsupported dataset schema", request_id)
        }
        _ => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elena_lib::ValidationError;

    #[test]
    fn bad_coords_is_a_400_with_instance() {
        let problem = ProblemDetails::bad_coords("origin is malformed", "req-123");
        assert_eq!(problem.status, 400);
        assert_eq!(problem.type_uri, PROBLEM_BAD_COORDS);
        assert_eq!(problem.instance.as_deref(), Some("req-123"));
        assert_eq!(problem.content_type, "application/problem+json");
    }

    #[test]
    fn serializes_type_field_and_skips_missing_detail() {
        let problem = ProblemDetails::new(PROBLEM_TIMEOUT, "Timeout", StatusCode::GATEWAY_TIMEOUT);
        let json = serde_json::to_string(&problem).expect("serialize");

        assert!(json.contains("\"type\":\"/problems/timeout\""));
        assert!(json.contains("\"status\":504"));
        assert!(!json.contains("detail"));
        assert!(!json.contains("instance"));
    }

    #[test]
    fn validation_errors_become_bad_coords() {
        let error = LibError::Validation(ValidationError::DistancePercentTooSmall { value: 90 });
        let problem = from_lib_error(&error, "req-lib");

        assert_eq!(problem.type_uri, PROBLEM_BAD_COORDS);
        assert!(problem
            .detail
            .as_deref()
            .is_some_and(|d| d.contains("at least 100")));
    }

    #[test]
    fn missing_roads_and_unreachable_targets_are_not_found() {
        let nearby = from_lib_error(&LibError::NoNodesNearby { lat: 1.0, lon: 2.0 }, "r");
        let unreachable = from_lib_error(&LibError::RouteNotFound { start: 1, end: 9 }, "r");

        assert_eq!(nearby.status, 404);
        assert_eq!(unreachable.type_uri, PROBLEM_ROUTE_NOT_FOUND);
        assert!(unreachable
            .detail
            .as_deref()
            .is_some_and(|d| d.contains("node 9")));
    }

    #[test]
    fn timeouts_are_gateway_timeouts() {
        let problem = from_lib_error(&LibError::Timeout { seconds: 80 }, "req-slow");
        assert_eq!(problem.status, 504);
        assert!(problem.detail.as_deref().is_some_and(|d| d.contains("80")));
    }

    #[test]
    fn missing_dataset_is_unavailable() {
        let error = LibError::DatasetNotFound {
            path: "/data/none.db".into(),
        };
        let problem = from_lib_error(&error, "req");
        assert_eq!(problem.status, 503);
    }

    #[test]
    fn into_response_sets_problem_content_type() {
        let response = ProblemDetails::route_not_found("nothing", "req").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/problem+json"))
        );
    }
}
