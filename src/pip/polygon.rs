//! Ray-casting containment over ordered vertex rings.
//!
//! Longitude is treated as x and latitude as y. This is a planar
//! approximation that holds for building- and campus-sized rings; it is not
//! geodesically exact and does not handle rings crossing the antimeridian.
//!
//! Edge rule: an edge counts as crossed when its endpoints straddle the ray
//! under the half-open test `(yi > py) != (yj > py)` and the point lies
//! strictly left of the crossing. For an axis-aligned rectangle this puts the
//! left and bottom edges inside and the right and top edges outside.

use geo_types::Coord;

use crate::models::GeoPoint;

/// Test whether `point` lies inside `ring`.
///
/// Works for any vertex type convertible to a planar coordinate, so the
/// same rule applies to geographic boundaries and local-frame zones. Rings
/// with fewer than three vertices contain nothing. A repeated closing vertex
/// is harmless.
pub fn ring_contains<T>(point: T, ring: &[T]) -> bool
where
    T: Copy + Into<Coord<f64>>,
{
    if ring.len() < 3 {
        return false;
    }

    let p: Coord<f64> = point.into();
    let mut inside = false;
    let mut j = ring.len() - 1;

    for i in 0..ring.len() {
        let a: Coord<f64> = ring[i].into();
        let b: Coord<f64> = ring[j].into();

        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Geographic containment test for boundary polygons
pub fn contains(point: GeoPoint, polygon: &[GeoPoint]) -> bool {
    ring_contains(point, polygon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LocalPoint;
    use proptest::prelude::*;

    /// (lon, lat) pairs, matching how boundary files list them
    fn ring(pairs: &[(f64, f64)]) -> Vec<GeoPoint> {
        pairs
            .iter()
            .map(|&(lon, lat)| GeoPoint::new(lat, lon))
            .collect()
    }

    fn unit_square() -> Vec<GeoPoint> {
        ring(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)])
    }

    #[test]
    fn test_inside_and_outside() {
        let square = unit_square();
        assert!(contains(GeoPoint::new(0.5, 0.5), &square));
        assert!(!contains(GeoPoint::new(2.0, 2.0), &square));
        assert!(!contains(GeoPoint::new(0.5, -0.5), &square));
    }

    #[test]
    fn test_degenerate_rings_contain_nothing() {
        assert!(!contains(GeoPoint::new(0.5, 0.5), &[]));
        assert!(!contains(
            GeoPoint::new(0.5, 0.5),
            &ring(&[(0.0, 0.0), (1.0, 1.0)])
        ));
    }

    #[test]
    fn test_edge_rule_left_and_bottom_inside() {
        let square = unit_square();
        // left edge (lon = 0)
        assert!(contains(GeoPoint::new(0.5, 0.0), &square));
        // bottom edge (lat = 0)
        assert!(contains(GeoPoint::new(0.0, 0.5), &square));
    }

    #[test]
    fn test_edge_rule_right_and_top_outside() {
        let square = unit_square();
        // right edge (lon = 1)
        assert!(!contains(GeoPoint::new(0.5, 1.0), &square));
        // top edge (lat = 1)
        assert!(!contains(GeoPoint::new(1.0, 0.5), &square));
    }

    #[test]
    fn test_edge_rule_is_deterministic() {
        let square = unit_square();
        let on_edge = GeoPoint::new(0.25, 0.0);
        let first = contains(on_edge, &square);
        for _ in 0..10 {
            assert_eq!(contains(on_edge, &square), first);
        }
    }

    #[test]
    fn test_closing_vertex_is_ignored() {
        let open = unit_square();
        let mut closed = open.clone();
        closed.push(open[0]);
        for p in [
            GeoPoint::new(0.5, 0.5),
            GeoPoint::new(0.0, 0.5),
            GeoPoint::new(1.5, 0.5),
        ] {
            assert_eq!(contains(p, &open), contains(p, &closed));
        }
    }

    #[test]
    fn test_concave_ring() {
        // U shape opening to the north
        let u = ring(&[
            (0.0, 0.0),
            (3.0, 0.0),
            (3.0, 3.0),
            (2.0, 3.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 3.0),
            (0.0, 3.0),
        ]);
        assert!(contains(GeoPoint::new(2.0, 0.5), &u));
        assert!(!contains(GeoPoint::new(2.0, 1.5), &u));
        assert!(contains(GeoPoint::new(2.0, 2.5), &u));
    }

    #[test]
    fn test_local_ring() {
        let room = vec![
            LocalPoint::new(0.0, 0.0),
            LocalPoint::new(4.0, 0.0),
            LocalPoint::new(4.0, 3.0),
            LocalPoint::new(0.0, 3.0),
        ];
        assert!(ring_contains(LocalPoint::new(2.0, 1.0), &room));
        assert!(!ring_contains(LocalPoint::new(5.0, 1.0), &room));
    }

    /// Regular n-gon around (lat, lon), radius in degrees
    fn regular_polygon(lat: f64, lon: f64, radius: f64, n: usize, phase: f64) -> Vec<GeoPoint> {
        (0..n)
            .map(|k| {
                let angle = phase + 2.0 * std::f64::consts::PI * k as f64 / n as f64;
                GeoPoint::new(lat + radius * angle.sin(), lon + radius * angle.cos())
            })
            .collect()
    }

    proptest! {
        #[test]
        fn prop_convex_polygon_contains_centroid(
            lat in -60.0f64..60.0,
            lon in -170.0f64..170.0,
            radius in 0.0005f64..0.5,
            n in 3usize..12,
            phase in 0.0f64..6.28,
        ) {
            let poly = regular_polygon(lat, lon, radius, n, phase);
            let count = poly.len() as f64;
            let centroid = GeoPoint::new(
                poly.iter().map(|p| p.latitude).sum::<f64>() / count,
                poly.iter().map(|p| p.longitude).sum::<f64>() / count,
            );
            prop_assert!(contains(centroid, &poly));
        }

        #[test]
        fn prop_outside_hull_not_contained(
            lat in -60.0f64..60.0,
            lon in -170.0f64..170.0,
            radius in 0.0005f64..0.5,
            n in 3usize..12,
            phase in 0.0f64..6.28,
            direction in 0.0f64..6.28,
            factor in 1.01f64..10.0,
        ) {
            let poly = regular_polygon(lat, lon, radius, n, phase);
            let outside = GeoPoint::new(
                lat + radius * factor * direction.sin(),
                lon + radius * factor * direction.cos(),
            );
            prop_assert!(!contains(outside, &poly));
        }
    }
}
