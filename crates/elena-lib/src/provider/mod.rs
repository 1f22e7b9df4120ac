//! Graph providers: the read interface searches run against.
//!
//! Two materialization strategies are available, selected by
//! [`ProviderKind`]:
//!
//! - [`BoundedGraphProvider`] fetches a padded bounding box around both
//!   endpoints once and never grows.
//! - [`LoadingGraphProvider`] streams fixed-size chunks into a shared
//!   [`ChunkCache`] as searches reach unloaded geography.

mod bounded;
mod cache;
mod loading;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::geo::{Coords, LatLon, NodeId};
use crate::source::GeoSource;

pub use bounded::BoundedGraphProvider;
pub use cache::{ChunkCache, ChunkCoord, DEFAULT_CHUNK_SIZE};
pub use loading::LoadingGraphProvider;

/// Read access to a road graph with elevation.
///
/// Every method must answer for any node id the provider itself handed out
/// through [`neighbors`](Self::neighbors) or [`all_nodes`](Self::all_nodes).
pub trait GraphProvider: Send + Sync {
    /// Outgoing adjacency of `node`.
    fn neighbors(&self, node: NodeId) -> Vec<NodeId>;

    /// Length in meters of the directed edge `from -> to`.
    fn edge_distance(&self, from: NodeId, to: NodeId) -> Option<f64>;

    fn coords(&self, node: NodeId) -> Option<Coords>;

    /// Every node materialized so far, in ascending id order.
    fn all_nodes(&self) -> Vec<NodeId>;

    /// Enable or suspend lazy expansion, returning the previous setting.
    ///
    /// Providers that never expand ignore the call and report `false`.
    fn set_expansion(&self, _enabled: bool) -> bool {
        false
    }

    /// Materialize the padded bounding box around `a` and `b`.
    fn ensure_coverage(&self, _a: NodeId, _b: NodeId) -> Result<()> {
        Ok(())
    }

    fn elevation(&self, node: NodeId) -> Option<f64> {
        self.coords(node).map(|coords| coords.z)
    }
}

/// Suspends lazy expansion for its lifetime.
pub struct ExpansionGuard<'a, G: GraphProvider + ?Sized> {
    provider: &'a G,
    previous: bool,
}

impl<'a, G: GraphProvider + ?Sized> ExpansionGuard<'a, G> {
    pub fn suspend(provider: &'a G) -> Self {
        let previous = provider.set_expansion(false);
        Self { provider, previous }
    }
}

impl<G: GraphProvider + ?Sized> Drop for ExpansionGuard<'_, G> {
    fn drop(&mut self) {
        self.provider.set_expansion(self.previous);
    }
}

/// Which provider a request should run against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Bounded,
    Loading,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            ProviderKind::Bounded => "bounded",
            ProviderKind::Loading => "loading",
        };
        f.write_str(value)
    }
}

impl FromStr for ProviderKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "bounded" => Ok(ProviderKind::Bounded),
            "loading" => Ok(ProviderKind::Loading),
            other => Err(ValidationError::UnknownGraphMode {
                value: other.to_string(),
            }),
        }
    }
}

/// A resolved provider together with its snapped endpoints.
pub enum Provider {
    Bounded(BoundedGraphProvider),
    Loading(LoadingGraphProvider),
}

impl Provider {
    /// Build the provider named by `kind` for a trip between two coordinates.
    ///
    /// The bounded provider ignores `cache`; the loading provider shares it.
    pub fn open(
        kind: ProviderKind,
        source: Arc<dyn GeoSource>,
        cache: &Arc<ChunkCache>,
        origin: LatLon,
        destination: LatLon,
    ) -> Result<Self> {
        match kind {
            ProviderKind::Bounded => Ok(Provider::Bounded(BoundedGraphProvider::open(
                source.as_ref(),
                origin,
                destination,
            )?)),
            ProviderKind::Loading => Ok(Provider::Loading(LoadingGraphProvider::open(
                source,
                Arc::clone(cache),
                origin,
                destination,
            )?)),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::Bounded(_) => ProviderKind::Bounded,
            Provider::Loading(_) => ProviderKind::Loading,
        }
    }

    pub fn start(&self) -> NodeId {
        match self {
            Provider::Bounded(provider) => provider.start(),
            Provider::Loading(provider) => provider.start(),
        }
    }

    pub fn end(&self) -> NodeId {
        match self {
            Provider::Bounded(provider) => provider.end(),
            Provider::Loading(provider) => provider.end(),
        }
    }

    fn inner(&self) -> &dyn GraphProvider {
        match self {
            Provider::Bounded(provider) => provider,
            Provider::Loading(provider) => provider,
        }
    }
}

impl GraphProvider for Provider {
    fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.inner().neighbors(node)
    }

    fn edge_distance(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.inner().edge_distance(from, to)
    }

    fn coords(&self, node: NodeId) -> Option<Coords> {
        self.inner().coords(node)
    }

    fn all_nodes(&self) -> Vec<NodeId> {
        self.inner().all_nodes()
    }

    fn set_expansion(&self, enabled: bool) -> bool {
        self.inner().set_expansion(enabled)
    }

    fn ensure_coverage(&self, a: NodeId, b: NodeId) -> Result<()> {
        self.inner().ensure_coverage(a, b)
    }
}
