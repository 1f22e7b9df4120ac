//! Geographic value types shared by sources, providers and searches.

use serde::{Deserialize, Serialize};

/// Stable identifier for a road-graph node.
pub type NodeId = i64;

/// Position of a node: longitude `x`, latitude `y`, elevation `z` in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coords {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Straight-line distance in the (x, y) plane, ignoring elevation.
    pub fn planar_distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Convert to the (latitude, longitude) pair used at the request boundary.
    pub fn lat_lon(&self) -> [f64; 2] {
        [self.y, self.x]
    }
}

/// A user-facing coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Axis-aligned rectangle in degrees. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Smallest box containing both points.
    pub fn around(a: LatLon, b: LatLon) -> Self {
        Self {
            west: a.lon.min(b.lon),
            south: a.lat.min(b.lat),
            east: a.lon.max(b.lon),
            north: a.lat.max(b.lat),
        }
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Grow every side by the larger of width and height so routes that
    /// detour off the straight line between the corners stay inside.
    pub fn padded(&self) -> Self {
        self.padded_at_least(0.0)
    }

    /// Like [`padded`](Self::padded) but never pads by less than `min_pad`.
    pub fn padded_at_least(&self, min_pad: f64) -> Self {
        let pad = self.width().max(self.height()).max(min_pad);
        Self {
            west: self.west - pad,
            south: self.south - pad,
            east: self.east + pad,
            north: self.north + pad,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.west && x <= self.east && y >= self.south && y <= self.north
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_uses_larger_side() {
        let bbox = BoundingBox::around(LatLon::new(42.0, -72.0), LatLon::new(42.1, -72.4));
        let padded = bbox.padded();
        assert!((padded.west - (-72.8)).abs() < 1e-9);
        assert!((padded.east - (-71.6)).abs() < 1e-9);
        assert!((padded.south - 41.6).abs() < 1e-9);
        assert!((padded.north - 42.5).abs() < 1e-9);
    }

    #[test]
    fn lat_lon_validity() {
        assert!(LatLon::new(42.39, -72.52).is_valid());
        assert!(!LatLon::new(91.0, 0.0).is_valid());
        assert!(!LatLon::new(0.0, -180.5).is_valid());
        assert!(!LatLon::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn planar_distance_ignores_elevation() {
        let a = Coords::new(0.0, 0.0, 100.0);
        let b = Coords::new(3.0, 4.0, -50.0);
        assert_eq!(a.planar_distance(&b), 5.0);
        assert_eq!(b.lat_lon(), [4.0, 3.0]);
    }
}
