//! Core data models for the location-matching engine.

pub mod boundary;
pub mod indoor;
pub mod point;
pub mod result;

pub use boundary::Boundary;
pub use indoor::{BuildingFrame, IndoorDetails, PointOfInterest, Zone};
pub use point::{GeoPoint, LocalPoint};
pub use result::{MatchResult, MatchTier};
