//! Named outdoor boundary polygons.

use geo::{BoundingRect, LineString};
use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// A named place boundary as loaded from a boundary source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    /// Stable identifier, also the key for indoor details
    pub id: String,

    pub name: String,

    /// Category tag from the source (e.g. a KML style URL)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Ordered ring, longitude/latitude degrees
    pub vertices: Vec<GeoPoint>,

    /// Whether indoor positioning is available for this place
    pub connected: bool,
}

impl Boundary {
    /// Boundaries with fewer than three vertices never contain anything.
    pub fn is_containable(&self) -> bool {
        self.vertices.len() >= 3
    }

    /// Boundaries need at least one edge to take part in distance checks.
    pub fn has_edges(&self) -> bool {
        self.vertices.len() >= 2
    }

    /// Iterate the ring edges, including the closing edge back to the first vertex
    pub fn edges(&self) -> impl Iterator<Item = (GeoPoint, GeoPoint)> + '_ {
        let n = self.vertices.len();
        let count = if n >= 2 { n } else { 0 };
        (0..count).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Get the bounding box of this boundary as (min_lon, min_lat, max_lon, max_lat)
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        let line: LineString<f64> = self.vertices.iter().copied().collect();
        line.bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary(vertices: Vec<GeoPoint>) -> Boundary {
        Boundary {
            id: "b".into(),
            name: "B".into(),
            category: None,
            vertices,
            connected: false,
        }
    }

    #[test]
    fn test_edges_close_the_ring() {
        let b = boundary(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 0.0),
            GeoPoint::new(1.0, 1.0),
        ]);
        let edges: Vec<_> = b.edges().collect();
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[2], (GeoPoint::new(1.0, 1.0), GeoPoint::new(0.0, 0.0)));
    }

    #[test]
    fn test_single_vertex_has_no_edges() {
        let b = boundary(vec![GeoPoint::new(1.0, 1.0)]);
        assert_eq!(b.edges().count(), 0);
        assert!(!b.has_edges());
        assert!(!b.is_containable());
    }

    #[test]
    fn test_bbox() {
        let b = boundary(vec![
            GeoPoint::new(10.0, 20.0),
            GeoPoint::new(12.0, 21.0),
            GeoPoint::new(11.0, 19.0),
        ]);
        assert_eq!(b.bbox(), Some((19.0, 10.0, 21.0, 12.0)));
        assert_eq!(boundary(vec![]).bbox(), None);
    }
}
