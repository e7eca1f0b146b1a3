//! Great-circle distance and angle helpers.

use crate::models::GeoPoint;

/// Mean Earth radius used for every distance in the engine
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

pub fn rad_to_deg(radians: f64) -> f64 {
    radians * 180.0 / std::f64::consts::PI
}

/// Haversine distance between two points in meters.
pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = deg_to_rad(a.latitude);
    let lat2 = deg_to_rad(b.latitude);
    let dlat = deg_to_rad(b.latitude - a.latitude);
    let dlon = deg_to_rad(b.longitude - a.longitude);

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_distance_zero() {
        let p = GeoPoint::new(28.6139, 77.2090);
        assert_eq!(haversine_meters(p, p), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let a = GeoPoint::new(0.0, 10.0);
        let b = GeoPoint::new(1.0, 10.0);
        let expected = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;
        assert_relative_eq!(haversine_meters(a, b), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_known_city_pair() {
        // Delhi to Mumbai is roughly 1150 km
        let delhi = GeoPoint::new(28.6139, 77.2090);
        let mumbai = GeoPoint::new(19.0760, 72.8777);
        let d = haversine_meters(delhi, mumbai);
        assert!((1_140_000.0..1_160_000.0).contains(&d), "got {}", d);
    }

    #[test]
    fn test_antipodes() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 180.0);
        assert_relative_eq!(
            haversine_meters(a, b),
            EARTH_RADIUS_METERS * std::f64::consts::PI,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_angle_conversion() {
        assert_relative_eq!(deg_to_rad(180.0), std::f64::consts::PI);
        assert_relative_eq!(rad_to_deg(std::f64::consts::FRAC_PI_2), 90.0);
        assert_relative_eq!(rad_to_deg(deg_to_rad(33.3)), 33.3, max_relative = 1e-15);
    }

    fn any_point() -> impl Strategy<Value = GeoPoint> {
        (-89.0f64..89.0, -179.0f64..179.0).prop_map(|(lat, lon)| GeoPoint::new(lat, lon))
    }

    proptest! {
        #[test]
        fn prop_identity(p in any_point()) {
            prop_assert_eq!(haversine_meters(p, p), 0.0);
        }

        #[test]
        fn prop_symmetric(a in any_point(), b in any_point()) {
            let ab = haversine_meters(a, b);
            let ba = haversine_meters(b, a);
            prop_assert!((ab - ba).abs() <= 1e-6);
            prop_assert!(ab >= 0.0);
        }

        #[test]
        fn prop_triangle_inequality(a in any_point(), b in any_point(), c in any_point()) {
            let direct = haversine_meters(a, c);
            let via = haversine_meters(a, b) + haversine_meters(b, c);
            prop_assert!(direct <= via + 1e-6);
        }
    }
}
