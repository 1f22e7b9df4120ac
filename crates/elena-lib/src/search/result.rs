use serde::Serialize;

use crate::geo::NodeId;

/// Outcome of a single search.
///
/// The default value is the "no path" result: an empty path with zero length
/// and gain.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Node ids from start to end inclusive.
    pub path: Vec<NodeId>,
    /// Total length in meters.
    pub path_len: f64,
    /// Sum of the positive elevation changes along the path, in meters.
    pub ele_gain: f64,
}

impl SearchResult {
    pub fn new(path: Vec<NodeId>, path_len: f64, ele_gain: f64) -> Self {
        Self {
            path,
            path_len,
            ele_gain,
        }
    }

    /// Single-node result for a trip that starts where it ends.
    pub fn trivial(node: NodeId) -> Self {
        Self::new(vec![node], 0.0, 0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}
