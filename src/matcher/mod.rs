//! Location matcher: decides which known place a coordinate belongs to.
//!
//! The policy is stateless. Every call takes the current boundary and indoor
//! snapshots, runs the tiers in order and returns a fresh [`MatchResult`].

pub mod tiers;

use std::sync::Arc;

use tracing::debug;

use crate::indoor::{IndoorFrameCache, IndoorSnapshot};
use crate::models::{Boundary, GeoPoint, IndoorDetails, MatchResult};
use crate::store::BoundaryStore;

pub use tiers::{nearest_boundary_distance, MatchContext, Tier, TIERS};

pub const DEFAULT_PROXIMITY_MARGIN_METERS: f64 = 50.0;

/// One coordinate sample plus whatever the caller knows about it
#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
    pub point: GeoPoint,
    /// Last reverse-geocoded place name, if any
    pub place_name: Option<String>,
}

impl MatchQuery {
    pub fn new(point: GeoPoint) -> Self {
        Self {
            point,
            place_name: None,
        }
    }

    pub fn with_place_name(mut self, place_name: impl Into<String>) -> Self {
        self.place_name = Some(place_name.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchSettings {
    pub proximity_margin_meters: f64,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            proximity_margin_meters: DEFAULT_PROXIMITY_MARGIN_METERS,
        }
    }
}

/// Match a query against explicit boundaries and indoor details.
pub fn match_point(
    query: &MatchQuery,
    boundaries: &[Boundary],
    indoor: &IndoorSnapshot,
    proximity_margin_meters: f64,
) -> MatchResult {
    let ctx = MatchContext {
        boundaries,
        index: None,
        indoor,
        proximity_margin_meters,
    };
    tiers::evaluate(query, &ctx)
}

/// Matcher wired to a boundary store and an indoor cache
pub struct LocationMatcher {
    store: Arc<BoundaryStore>,
    indoor: Arc<IndoorFrameCache>,
    settings: MatchSettings,
}

impl LocationMatcher {
    pub fn new(
        store: Arc<BoundaryStore>,
        indoor: Arc<IndoorFrameCache>,
        settings: MatchSettings,
    ) -> Self {
        Self {
            store,
            indoor,
            settings,
        }
    }

    pub fn settings(&self) -> MatchSettings {
        self.settings
    }

    /// Match against the current snapshots
    pub fn locate(&self, query: &MatchQuery) -> MatchResult {
        let boundaries = self.store.snapshot();
        let indoor = self.indoor.snapshot();
        let ctx = MatchContext {
            boundaries: boundaries.all(),
            index: Some(boundaries.index()),
            indoor: &indoor,
            proximity_margin_meters: self.settings.proximity_margin_meters,
        };
        tiers::evaluate(query, &ctx)
    }

    /// Match, then make sure indoor details are loaded for the matched
    /// place if it is connected. Details that cannot be fetched are logged
    /// and reported as `None`.
    pub async fn locate_with_details(
        &self,
        query: &MatchQuery,
    ) -> (MatchResult, Option<Arc<IndoorDetails>>) {
        let result = self.locate(query);

        let boundary = result
            .boundary_id
            .as_deref()
            .and_then(|id| self.store.snapshot().get(id).cloned());
        let details = match boundary {
            Some(b) if b.connected => match self.indoor.fetch(&b.id).await {
                Ok(details) => Some(details),
                Err(e) => {
                    debug!("Matched {} but indoor details are unavailable: {}", b.id, e);
                    None
                }
            },
            _ => None,
        };

        (result, details)
    }
}
