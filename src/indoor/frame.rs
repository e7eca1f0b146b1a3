//! Geographic ↔ building-local coordinate transforms.
//!
//! Uses an equirectangular projection about the frame origin, which is
//! accurate to well under a centimetre over building-sized distances, then a
//! pure rotation by the frame azimuth. Both steps are linear, so the forward
//! transform has an exact inverse.

use crate::geodesy::{deg_to_rad, rad_to_deg, EARTH_RADIUS_METERS};
use crate::models::{BuildingFrame, GeoPoint, LocalPoint};

/// Project a geographic point into the frame's local meters.
pub fn global_to_local(point: GeoPoint, frame: &BuildingFrame) -> LocalPoint {
    let origin = frame.origin;
    let east = deg_to_rad(point.longitude - origin.longitude)
        * EARTH_RADIUS_METERS
        * deg_to_rad(origin.latitude).cos();
    let north = deg_to_rad(point.latitude - origin.latitude) * EARTH_RADIUS_METERS;

    // Rotate by -azimuth: the frame's y axis points azimuth degrees
    // clockwise from north.
    let (sin, cos) = deg_to_rad(frame.azimuth_degrees).sin_cos();
    LocalPoint {
        x: east * cos - north * sin,
        y: east * sin + north * cos,
    }
}

/// Inverse of [`global_to_local`].
pub fn local_to_global(local: LocalPoint, frame: &BuildingFrame) -> GeoPoint {
    let origin = frame.origin;
    let (sin, cos) = deg_to_rad(frame.azimuth_degrees).sin_cos();
    let east = local.x * cos + local.y * sin;
    let north = -local.x * sin + local.y * cos;

    GeoPoint {
        latitude: origin.latitude + rad_to_deg(north / EARTH_RADIUS_METERS),
        longitude: origin.longitude
            + rad_to_deg(east / (EARTH_RADIUS_METERS * deg_to_rad(origin.latitude).cos())),
    }
}

/// `0 ≤ x ≤ width` and `0 ≤ y ≤ height`, edges included
pub fn is_within_bounds(local: LocalPoint, frame: &BuildingFrame) -> bool {
    (0.0..=frame.width_meters).contains(&local.x) && (0.0..=frame.height_meters).contains(&local.y)
}

impl BuildingFrame {
    pub fn to_local(&self, point: GeoPoint) -> LocalPoint {
        global_to_local(point, self)
    }

    pub fn contains_local(&self, local: LocalPoint) -> bool {
        is_within_bounds(local, self)
    }

    /// Length of the frame diagonal in meters
    pub fn diagonal_meters(&self) -> f64 {
        self.width_meters.hypot(self.height_meters)
    }
}
