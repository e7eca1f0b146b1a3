//! Spatial index for fast boundary lookups.

use rstar::{RTree, RTreeObject, AABB};
use tracing::debug;

use super::polygon::contains;
use crate::models::{Boundary, GeoPoint};

/// R-tree entry: a boundary's bounding box and its load-order position
#[derive(Debug, Clone)]
pub struct IndexedBoundary {
    pub position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedBoundary {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedBoundary {
    pub fn new(position: usize, boundary: &Boundary) -> Option<Self> {
        if !boundary.is_containable() {
            return None;
        }
        let (min_x, min_y, max_x, max_y) = boundary.bbox()?;
        Some(Self {
            position,
            envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
        })
    }
}

/// Bounding-box index over a boundary list.
///
/// Only prefilters; the ray-casting test still decides containment, and
/// the lowest load-order position wins among containing boundaries.
#[derive(Debug, Default)]
pub struct BoundaryIndex {
    tree: RTree<IndexedBoundary>,
}

impl BoundaryIndex {
    /// Build spatial index from boundaries, keyed by slice position
    pub fn build(boundaries: &[Boundary]) -> Self {
        let indexed: Vec<IndexedBoundary> = boundaries
            .iter()
            .enumerate()
            .filter_map(|(i, b)| IndexedBoundary::new(i, b))
            .collect();

        let tree = RTree::bulk_load(indexed);
        debug!("Boundary index built with {} entries", tree.size());

        Self { tree }
    }

    /// Positions of every boundary containing the point, in load order
    pub fn lookup(&self, boundaries: &[Boundary], point: GeoPoint) -> Vec<usize> {
        let query_envelope = AABB::from_point([point.longitude, point.latitude]);

        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query_envelope)
            .filter(|ib| {
                boundaries
                    .get(ib.position)
                    .is_some_and(|b| contains(point, &b.vertices))
            })
            .map(|ib| ib.position)
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Position of the first boundary (in load order) containing the point
    pub fn first_containing(&self, boundaries: &[Boundary], point: GeoPoint) -> Option<usize> {
        self.lookup(boundaries, point).into_iter().next()
    }

    /// Get total number of indexed boundaries
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

/// Linear scan equivalent of [`BoundaryIndex::first_containing`]
pub fn first_containing(boundaries: &[Boundary], point: GeoPoint) -> Option<usize> {
    boundaries
        .iter()
        .position(|b| contains(point, &b.vertices))
}
