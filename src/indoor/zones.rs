//! Zone containment and point-of-interest lookups in a building frame.

use crate::models::{LocalPoint, PointOfInterest, Zone};
use crate::pip::ring_contains;

/// First zone, in list order, whose polygon contains the point
pub fn find_zone(local: LocalPoint, zones: &[Zone]) -> Option<&Zone> {
    zones.iter().find(|zone| ring_contains(local, &zone.polygon))
}

/// Closest point of interest and its distance in meters
pub fn nearest_poi(local: LocalPoint, pois: &[PointOfInterest]) -> Option<(&PointOfInterest, f64)> {
    pois.iter()
        .map(|poi| (poi, local.distance_to(&poi.position)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Distance to the closest point of interest; `+inf` when there are none.
pub fn nearest_poi_distance(local: LocalPoint, pois: &[PointOfInterest]) -> f64 {
    nearest_poi(local, pois)
        .map(|(_, d)| d)
        .unwrap_or(f64::INFINITY)
}

/// Points of interest whose name contains `query`, ignoring case.
/// A blank query returns everything.
pub fn search_pois<'a>(pois: &'a [PointOfInterest], query: &str) -> Vec<&'a PointOfInterest> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return pois.iter().collect();
    }
    pois.iter()
        .filter(|poi| poi.name.to_lowercase().contains(&query))
        .collect()
}
