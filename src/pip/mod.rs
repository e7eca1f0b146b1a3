//! Point-in-Polygon (PIP) containment.
//!
//! Ray-casting over boundary rings, with an R-tree of bounding boxes to
//! narrow the candidates for larger boundary sets.

mod index;
mod polygon;

pub use index::{first_containing, BoundaryIndex, IndexedBoundary};
pub use polygon::{contains, ring_contains};
