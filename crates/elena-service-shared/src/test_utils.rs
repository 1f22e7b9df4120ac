//! Fixtures for handler tests: an in-memory hill dataset behind [`AppState`].
//!
//! The dataset has a direct 100 m road from node 1 to node 4 plus two 110 m
//! detours, one through a pit (node 2, climbs 20 m) and one over a peak
//! (node 3, climbs 19 m).

use std::sync::{Arc, OnceLock};

use elena_lib::{Coords, LatLon, MemorySource, RoadGraph};

use crate::middleware::RequestId;
use crate::state::{AppState, ServiceConfig};

/// Coordinates and place names present in the fixture.
pub mod fixture_places {
    /// Node 1, the western end of the direct road.
    pub const ORIGIN: &str = "(42.39, -72.52)";

    /// Node 4, 100 m east of [`ORIGIN`].
    pub const DESTINATION: &str = "(42.39, -72.519)";

    /// Geocodes to node 1.
    pub const AMHERST_COMMON: &str = "Amherst Common";
}

static TEST_STATE: OnceLock<AppState> = OnceLock::new();

pub fn hills_graph() -> RoadGraph {
    let mut graph = RoadGraph::new();
    graph.insert_node(1, Coords::new(-72.5200, 42.3900, 20.0));
    graph.insert_node(2, Coords::new(-72.5195, 42.3895, 0.0));
    graph.insert_node(3, Coords::new(-72.5195, 42.3905, 39.0));
    graph.insert_node(4, Coords::new(-72.5190, 42.3900, 20.0));
    graph.add_two_way_edge(1, 4, 100.0);
    graph.add_two_way_edge(1, 2, 100.0);
    graph.add_two_way_edge(1, 3, 100.0);
    graph.add_two_way_edge(2, 4, 10.0);
    graph.add_two_way_edge(3, 4, 10.0);
    graph
}

pub fn hills_source() -> MemorySource {
    MemorySource::new(hills_graph())
        .with_place(fixture_places::AMHERST_COMMON, LatLon::new(42.3900, -72.5200))
}

/// Fresh state over [`hills_source`] with `config`.
pub fn state_with_config(config: ServiceConfig) -> AppState {
    let source = Arc::new(hills_source());
    let nodes = source.graph().node_count();
    AppState::from_components(source, nodes, config)
}

/// Shared state with default configuration, built once per test binary.
pub fn test_state() -> AppState {
    TEST_STATE
        .get_or_init(|| state_with_config(ServiceConfig::default()))
        .clone()
}

pub fn test_request_id() -> String {
    format!("test-{}", RequestId::generate())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_has_four_nodes() {
        assert_eq!(test_state().node_count(), 4);
    }

    #[test]
    fn fixture_place_geocodes_to_origin() {
        let position = test_state()
            .geocoder()
            .geocode(fixture_places::AMHERST_COMMON)
            .expect("place");
        assert_eq!(position, LatLon::new(42.39, -72.52));
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(test_request_id(), test_request_id());
    }
}
