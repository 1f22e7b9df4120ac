//! Request bodies and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};

use elena_lib::PathRequest;

use crate::ProblemDetails;

/// Validation for request bodies.
///
/// Returns a boxed `ProblemDetails` to keep the `Err` variant small; the
/// `request_id` fills its `instance` field.
pub trait Validate {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Body of `POST /api/route`.
///
/// Every field is a string, as the map front end submits them; `distance`,
/// `elevation` and `graph` default to `100`, `shortest` and `bounded`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Start as `"(lat, lon)"`; the parentheses are optional.
    pub origin: String,

    pub destination: String,

    /// Distance budget in percent of the shortest path.
    #[serde(default = "default_distance")]
    pub distance: String,

    #[serde(default = "default_elevation")]
    pub elevation: String,

    #[serde(default = "default_graph")]
    pub graph: String,
}

fn default_distance() -> String {
    "100".to_string()
}

fn default_elevation() -> String {
    "shortest".to_string()
}

fn default_graph() -> String {
    "bounded".to_string()
}

impl RouteRequest {
    /// Parse the body into a validated [`PathRequest`].
    pub fn to_path_request(&self, request_id: &str) -> Result<PathRequest, Box<ProblemDetails>> {
        PathRequest::parse(
            &self.origin,
            &self.destination,
            &self.distance,
            &self.elevation,
            &self.graph,
        )
        .map_err(|reason| Box::new(ProblemDetails::bad_coords(reason.to_string(), request_id)))
    }
}

impl Validate for RouteRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        self.to_path_request(request_id).map(|_| ())
    }
}

/// Body of `POST /api/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Place name or address to look up.
    pub place: String,
}

impl Validate for SearchRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.place.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_coords(
                "The 'place' field is required and cannot be empty",
                request_id,
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elena_lib::{ElevationMode, ProviderKind};

    fn route(origin: &str, distance: &str) -> RouteRequest {
        RouteRequest {
            origin: origin.to_string(),
            destination: "(42.39, -72.519)".to_string(),
            distance: distance.to_string(),
            elevation: "maximal".to_string(),
            graph: "loading".to_string(),
        }
    }

    #[test]
    fn optional_fields_take_defaults() {
        let body: RouteRequest =
            serde_json::from_str(r#"{"origin":"(1, 2)","destination":"3, 4"}"#).expect("json");
        let request = body.to_path_request("req").expect("valid");

        assert_eq!(request.distance_percent, 100);
        assert_eq!(request.elevation, ElevationMode::Shortest);
        assert_eq!(request.graph, ProviderKind::Bounded);
        assert_eq!(request.destination.lon, 4.0);
    }

    #[test]
    fn valid_route_converts() {
        let request = route("(42.39, -72.52)", "150")
            .to_path_request("req")
            .expect("valid");
        assert_eq!(request.distance_percent, 150);
        assert_eq!(request.elevation, ElevationMode::Maximal);
        assert_eq!(request.graph, ProviderKind::Loading);
    }

    #[test]
    fn malformed_origin_is_bad_coords() {
        let problem = route("north", "100").validate("req-1").expect_err("rejected");
        assert_eq!(problem.status, 400);
        assert_eq!(problem.instance.as_deref(), Some("req-1"));
        assert!(problem.detail.as_deref().is_some_and(|d| d.contains("origin")));
    }

    #[test]
    fn short_budget_is_bad_coords() {
        let problem = route("(42.39, -72.52)", "80")
            .validate("req")
            .expect_err("rejected");
        assert!(problem
            .detail
            .as_deref()
            .is_some_and(|d| d.contains("at least 100")));
    }

    #[test]
    fn blank_place_is_rejected() {
        let blank = SearchRequest {
            place: "   ".to_string(),
        };
        assert!(blank.validate("req").is_err());

        let place = SearchRequest {
            place: "Amherst".to_string(),
        };
        assert!(place.validate("req").is_ok());
    }
}
