//! Match outcome returned to presentation collaborators.

use serde::{Deserialize, Serialize};

/// Matching strategy that produced a result, most specific first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Point lies inside an outdoor boundary polygon
    Exact,
    /// Point lies inside an indoor zone
    Zone,
    /// Point lies inside a building frame rectangle
    BuildingBounds,
    /// Point is close to a building or one of its points of interest
    Proximity,
    /// Reverse-geocoded place name resembles a boundary name
    NameFallback,
    /// No boundary matched
    None,
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchTier::Exact => write!(f, "exact"),
            MatchTier::Zone => write!(f, "zone"),
            MatchTier::BuildingBounds => write!(f, "building_bounds"),
            MatchTier::Proximity => write!(f, "proximity"),
            MatchTier::NameFallback => write!(f, "name_fallback"),
            MatchTier::None => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary_id: Option<String>,

    pub tier: MatchTier,

    /// Only set for unmatched valid fixes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_distance_meters: Option<f64>,

    /// Only set for `MatchTier::Zone`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
}

impl MatchResult {
    /// Result for a query without a usable fix
    pub fn no_fix() -> Self {
        Self::unmatched(None)
    }

    pub fn matched(tier: MatchTier, boundary_id: impl Into<String>) -> Self {
        Self {
            boundary_id: Some(boundary_id.into()),
            tier,
            nearest_distance_meters: None,
            zone_id: None,
        }
    }

    pub fn unmatched(nearest_distance_meters: Option<f64>) -> Self {
        Self {
            boundary_id: None,
            tier: MatchTier::None,
            nearest_distance_meters,
            zone_id: None,
        }
    }

    pub fn with_zone(mut self, zone_id: impl Into<String>) -> Self {
        self.zone_id = Some(zone_id.into());
        self
    }

    pub fn is_match(&self) -> bool {
        self.tier != MatchTier::None
    }
}
