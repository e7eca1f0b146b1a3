//! Indoor positioning data: building frames, zones and points of interest.

use serde::{Deserialize, Serialize};

use super::{GeoPoint, LocalPoint};

/// Local Cartesian frame of a building.
///
/// The origin is the frame's (0, 0) corner. Width runs along local x, height
/// along local y. `azimuth_degrees` is the clockwise rotation of the local y
/// axis from true north.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildingFrame {
    pub origin: GeoPoint,
    pub width_meters: f64,
    pub height_meters: f64,
    #[serde(default)]
    pub azimuth_degrees: f64,
}

/// A named area inside a building frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub polygon: Vec<LocalPoint>,
}

/// A single named point inside a building frame (a desk, a ward, a shop)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: String,
    pub name: String,
    pub position: LocalPoint,
    /// Floor or sublocation the point belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// Everything the indoor-positioning collaborator knows about one place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndoorDetails {
    pub place_id: String,
    pub frame: BuildingFrame,
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub points_of_interest: Vec<PointOfInterest>,
}
