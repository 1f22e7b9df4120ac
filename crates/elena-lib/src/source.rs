//! Data-source seams: where road fragments and place coordinates come from.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

use crate::error::Result;
use crate::geo::{BoundingBox, LatLon};
use crate::graph::RoadGraph;

/// Minimum Jaro-Winkler similarity for a fuzzy place-name match.
pub const FUZZY_PLACE_THRESHOLD: f64 = 0.85;

/// Supplier of road-network fragments with elevation attached.
///
/// `fetch` returns every node inside `bbox`, every edge with at least one
/// endpoint inside, and the outside endpoints of those edges, so adjacency
/// across the rectangle boundary is complete.
pub trait GeoSource: Send + Sync {
    fn fetch(&self, bbox: &BoundingBox) -> Result<RoadGraph>;
}

/// Place-name to coordinate lookup. Failures are reported as `None`.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, place: &str) -> Option<LatLon>;
}

/// In-memory source over a complete [`RoadGraph`].
#[derive(Debug, Default)]
pub struct MemorySource {
    graph: RoadGraph,
    places: Vec<(String, LatLon)>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new(graph: RoadGraph) -> Self {
        Self {
            graph,
            places: Vec::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_place(mut self, name: impl Into<String>, position: LatLon) -> Self {
        self.places.push((name.into(), position));
        self
    }

    /// Number of `fetch` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }
}

impl GeoSource for MemorySource {
    fn fetch(&self, bbox: &BoundingBox) -> Result<RoadGraph> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let fragment = self.graph.within(bbox);
        debug!(
            nodes = fragment.node_count(),
            edges = fragment.edge_count(),
            "fetched in-memory fragment"
        );
        Ok(fragment)
    }
}

impl Geocoder for MemorySource {
    fn geocode(&self, place: &str) -> Option<LatLon> {
        best_place_match(
            place,
            self.places.iter().map(|(name, pos)| (name.as_str(), *pos)),
        )
    }
}

/// Pick the coordinates of the place best matching `query`.
///
/// A case-insensitive exact match wins; otherwise the highest Jaro-Winkler
/// similarity at or above [`FUZZY_PLACE_THRESHOLD`].
pub(crate) fn best_place_match<'a>(
    query: &str,
    candidates: impl Iterator<Item = (&'a str, LatLon)>,
) -> Option<LatLon> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let mut best: Option<(f64, LatLon)> = None;
    for (name, position) in candidates {
        let candidate = name.to_lowercase();
        if candidate == needle {
            return Some(position);
        }
        let score = strsim::jaro_winkler(&needle, &candidate);
        if score >= FUZZY_PLACE_THRESHOLD && best.is_none_or(|(top, _)| score > top) {
            best = Some((score, position));
        }
    }
    best.map(|(_, position)| position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coords;

    fn places() -> MemorySource {
        let mut graph = RoadGraph::new();
        graph.insert_node(1, Coords::new(-72.52, 42.39, 60.0));
        MemorySource::new(graph)
            .with_place("Amherst", LatLon::new(42.3732, -72.5199))
            .with_place("Northampton", LatLon::new(42.3251, -72.6412))
    }

    #[test]
    fn exact_match_ignores_case() {
        let source = places();
        assert_eq!(
            source.geocode("amherst"),
            Some(LatLon::new(42.3732, -72.5199))
        );
    }

    #[test]
    fn fuzzy_match_tolerates_typos() {
        let source = places();
        assert_eq!(
            source.geocode("Northamptn"),
            Some(LatLon::new(42.3251, -72.6412))
        );
    }

    #[test]
    fn unknown_place_is_none() {
        let source = places();
        assert_eq!(source.geocode("Completely Elsewhere"), None);
        assert_eq!(source.geocode("   "), None);
    }

    #[test]
    fn fetch_counts_calls() {
        let source = places();
        let bbox = BoundingBox::new(-73.0, 42.0, -72.0, 43.0);
        let fragment = source.fetch(&bbox).expect("fetch succeeds");
        assert_eq!(fragment.node_count(), 1);
        assert_eq!(source.fetch_count(), 1);
    }
}
