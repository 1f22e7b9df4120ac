use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::geo::LatLon;
use crate::provider::ProviderKind;

/// Which route the caller wants next to the shortest one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationMode {
    /// Only the shortest path.
    #[default]
    Shortest,
    /// Least climb within the distance budget.
    Minimal,
    /// Most climb within the distance budget.
    Maximal,
}

impl fmt::Display for ElevationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            ElevationMode::Shortest => "shortest",
            ElevationMode::Minimal => "minimal",
            ElevationMode::Maximal => "maximal",
        };
        f.write_str(value)
    }
}

impl FromStr for ElevationMode {
    type Err = ValidationError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "shortest" => Ok(ElevationMode::Shortest),
            "minimal" => Ok(ElevationMode::Minimal),
            "maximal" => Ok(ElevationMode::Maximal),
            other => Err(ValidationError::UnknownElevationMode {
                value: other.to_string(),
            }),
        }
    }
}

/// A validated route request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathRequest {
    pub origin: LatLon,
    pub destination: LatLon,
    /// Distance budget as a percentage of the shortest path length.
    pub distance_percent: u32,
    pub elevation: ElevationMode,
    pub graph: ProviderKind,
}

impl PathRequest {
    /// Lowest accepted distance percentage.
    pub const MIN_DISTANCE_PERCENT: i64 = 100;

    /// Parse the raw string fields of a request.
    ///
    /// Coordinates are `"(lat, lon)"` with the parentheses optional; the
    /// distance percentage must be an integer of at least 100.
    pub fn parse(
        origin: &str,
        destination: &str,
        distance: &str,
        elevation: &str,
        graph: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            origin: parse_lat_lon("origin", origin)?,
            destination: parse_lat_lon("destination", destination)?,
            distance_percent: parse_distance_percent(distance)?,
            elevation: elevation.trim().parse()?,
            graph: graph.trim().parse()?,
        })
    }

    /// Build a request from already typed values, checking ranges.
    pub fn new(
        origin: LatLon,
        destination: LatLon,
        distance_percent: u32,
        elevation: ElevationMode,
        graph: ProviderKind,
    ) -> Result<Self, ValidationError> {
        check_range("origin", origin)?;
        check_range("destination", destination)?;
        if i64::from(distance_percent) < Self::MIN_DISTANCE_PERCENT {
            return Err(ValidationError::DistancePercentTooSmall {
                value: i64::from(distance_percent),
            });
        }
        Ok(Self {
            origin,
            destination,
            distance_percent,
            elevation,
            graph,
        })
    }

    /// Maximum path length allowed for a shortest path of `shortest_len`.
    pub fn budget_for(&self, shortest_len: f64) -> f64 {
        shortest_len * f64::from(self.distance_percent) / 100.0
    }
}

fn parse_lat_lon(field: &'static str, raw: &str) -> Result<LatLon, ValidationError> {
    let invalid = || ValidationError::InvalidCoordinates {
        field,
        value: raw.to_string(),
    };

    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(trimmed);

    let mut parts = inner.split(',');
    let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;

    let position = LatLon::new(lat, lon);
    check_range(field, position)?;
    Ok(position)
}

fn check_range(field: &'static str, position: LatLon) -> Result<(), ValidationError> {
    if position.is_valid() {
        Ok(())
    } else {
        Err(ValidationError::CoordinatesOutOfRange {
            field,
            lat: position.lat,
            lon: position.lon,
        })
    }
}

fn parse_distance_percent(raw: &str) -> Result<u32, ValidationError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidDistancePercent {
            value: raw.to_string(),
        })?;
    if value < PathRequest::MIN_DISTANCE_PERCENT {
        return Err(ValidationError::DistancePercentTooSmall { value });
    }
    u32::try_from(value).map_err(|_| ValidationError::InvalidDistancePercent {
        value: raw.to_string(),
    })
}
