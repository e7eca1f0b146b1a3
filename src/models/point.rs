//! Geographic and building-local point types.

use geo_types::Coord;
use serde::{Deserialize, Serialize};

/// Geographic point (WGS84 degrees, no altitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `(0, 0)` is what location providers report before they have a fix.
    pub fn is_sentinel(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    /// A usable fix: finite on both axes and not the sentinel.
    pub fn is_valid_fix(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite() && !self.is_sentinel()
    }
}

/// Longitude maps to x, latitude to y.
impl From<GeoPoint> for Coord<f64> {
    fn from(p: GeoPoint) -> Self {
        Coord {
            x: p.longitude,
            y: p.latitude,
        }
    }
}

/// Point in a building frame, in meters from the frame origin
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalPoint {
    pub x: f64,
    pub y: f64,
}

impl LocalPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in meters
    pub fn distance_to(&self, other: &LocalPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<LocalPoint> for Coord<f64> {
    fn from(p: LocalPoint) -> Self {
        Coord { x: p.x, y: p.y }
    }
}
