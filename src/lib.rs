//! Placematch - decides which known place a device is at
//!
//! Boundaries are loaded from KML or JSON, matched against GPS fixes by
//! ray-casting, and refined with indoor building frames for connected places.

pub mod config;
pub mod error;
pub mod geodesy;
pub mod indoor;
pub mod matcher;
pub mod models;
pub mod pip;
pub mod store;

pub use matcher::{match_point, LocationMatcher, MatchQuery, MatchSettings};
pub use models::{Boundary, GeoPoint, LocalPoint, MatchResult, MatchTier};
pub use store::BoundaryStore;
