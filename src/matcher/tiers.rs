//! Individual matching strategies, tried from most to least specific.
//!
//! Each tier looks at the whole boundary list before the next tier runs, so
//! an exact hit on a later boundary still beats a proximity hit on an
//! earlier one.

use tracing::debug;

use super::MatchQuery;
use crate::geodesy::haversine_meters;
use crate::indoor::{find_zone, nearest_poi_distance, IndoorSnapshot};
use crate::models::{Boundary, GeoPoint, IndoorDetails, LocalPoint, MatchResult, MatchTier};
use crate::pip::{first_containing, BoundaryIndex};

/// Everything a tier may consult for one query
pub struct MatchContext<'a> {
    /// Boundaries in load order
    pub boundaries: &'a [Boundary],
    /// Optional R-tree over `boundaries`; a linear scan is used without it
    pub index: Option<&'a BoundaryIndex>,
    pub indoor: &'a IndoorSnapshot,
    pub proximity_margin_meters: f64,
}

impl<'a> MatchContext<'a> {
    /// Matchable boundaries that have indoor details, with the point in
    /// their frame
    fn framed(
        &self,
        point: GeoPoint,
    ) -> impl Iterator<Item = (&'a Boundary, &'a IndoorDetails, LocalPoint)> + '_ {
        self.matchable().filter_map(move |boundary| {
            let details = self.indoor.get(&boundary.id)?;
            Some((boundary, details.as_ref(), details.frame.to_local(point)))
        })
    }

    /// Boundaries with fewer than three vertices never match
    fn matchable(&self) -> impl Iterator<Item = &'a Boundary> + '_ {
        self.boundaries.iter().filter(|b| b.is_containable())
    }
}

pub type Tier = fn(&MatchQuery, &MatchContext<'_>) -> Option<MatchResult>;

/// Tiers in evaluation order
pub const TIERS: [(MatchTier, Tier); 5] = [
    (MatchTier::Exact, exact),
    (MatchTier::Zone, zone),
    (MatchTier::BuildingBounds, building_bounds),
    (MatchTier::Proximity, proximity),
    (MatchTier::NameFallback, name_fallback),
];

/// First boundary, in load order, whose outdoor polygon contains the point
pub fn exact(query: &MatchQuery, ctx: &MatchContext<'_>) -> Option<MatchResult> {
    let position = match ctx.index {
        Some(index) => index.first_containing(ctx.boundaries, query.point),
        None => first_containing(ctx.boundaries, query.point),
    }?;
    Some(MatchResult::matched(
        MatchTier::Exact,
        ctx.boundaries[position].id.clone(),
    ))
}

/// Point inside one of a building's zones
pub fn zone(query: &MatchQuery, ctx: &MatchContext<'_>) -> Option<MatchResult> {
    ctx.framed(query.point).find_map(|(boundary, details, local)| {
        let zone = find_zone(local, &details.zones)?;
        Some(MatchResult::matched(MatchTier::Zone, boundary.id.clone()).with_zone(zone.id.clone()))
    })
}

/// Point inside a building frame rectangle
pub fn building_bounds(query: &MatchQuery, ctx: &MatchContext<'_>) -> Option<MatchResult> {
    ctx.framed(query.point)
        .find(|(_, details, local)| details.frame.contains_local(*local))
        .map(|(boundary, _, _)| MatchResult::matched(MatchTier::BuildingBounds, boundary.id.clone()))
}

/// Point within the frame diagonal plus margin of the origin, or within
/// margin of a point of interest
pub fn proximity(query: &MatchQuery, ctx: &MatchContext<'_>) -> Option<MatchResult> {
    let margin = ctx.proximity_margin_meters;
    ctx.framed(query.point)
        .find(|(boundary, details, local)| {
            let to_origin = haversine_meters(query.point, details.frame.origin);
            let reach = details.frame.diagonal_meters() + margin;
            let to_poi = nearest_poi_distance(*local, &details.points_of_interest);
            debug!(
                "Proximity to {}: origin {:.1} m (reach {:.1} m), nearest poi {:.1} m",
                boundary.id, to_origin, reach, to_poi
            );
            to_origin <= reach || to_poi <= margin
        })
        .map(|(boundary, _, _)| MatchResult::matched(MatchTier::Proximity, boundary.id.clone()))
}

/// Caller's reverse-geocoded place name shares a substring with a boundary
/// name, in either direction, ignoring case
pub fn name_fallback(query: &MatchQuery, ctx: &MatchContext<'_>) -> Option<MatchResult> {
    let place = query.place_name.as_deref()?.trim().to_lowercase();
    if place.is_empty() {
        return None;
    }
    ctx.matchable()
        .find(|boundary| {
            let name = boundary.name.to_lowercase();
            !name.is_empty() && (name.contains(&place) || place.contains(&name))
        })
        .map(|boundary| MatchResult::matched(MatchTier::NameFallback, boundary.id.clone()))
}

/// Distance to the nearest boundary edge, approximated per edge by the
/// nearer of its two endpoints. `None` when no boundary has an edge.
pub fn nearest_boundary_distance(point: GeoPoint, boundaries: &[Boundary]) -> Option<f64> {
    boundaries
        .iter()
        .filter(|b| b.has_edges())
        .flat_map(|b| b.edges())
        .map(|(start, end)| haversine_meters(point, start).min(haversine_meters(point, end)))
        .min_by(|a, b| a.total_cmp(b))
}

/// Run the tiers in order; fall back to an unmatched result with the
/// nearest boundary distance.
pub fn evaluate(query: &MatchQuery, ctx: &MatchContext<'_>) -> MatchResult {
    if !query.point.is_valid_fix() {
        debug!("No valid fix ({:?}), skipping match", query.point);
        return MatchResult::no_fix();
    }

    for (tier, strategy) in TIERS {
        if let Some(result) = strategy(query, ctx) {
            debug!(
                "Matched {:?} via {} tier: {:?}",
                query.point, tier, result.boundary_id
            );
            return result;
        }
    }

    let distance = nearest_boundary_distance(query.point, ctx.boundaries);
    debug!(
        "No boundary matched {:?}; nearest boundary {:?} m",
        query.point, distance
    );
    MatchResult::unmatched(distance)
}
