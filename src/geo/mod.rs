//! Geo primitives (C1): haversine distance, point-in-polygon, polyline codec.

pub mod polyline_codec;

use geo::HaversineDistance;
use geo::Contains;
use geo_types::{Coord, LineString, Point as GeoPoint, Polygon};

/// Great-circle distance between two `(lat, lng)` points, in kilometers.
pub fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let p1 = GeoPoint::new(a.1, a.0);
    let p2 = GeoPoint::new(b.1, b.0);
    p1.haversine_distance(&p2) / 1000.0
}

/// Ray-casting point-in-polygon over an outer ring of `(lng, lat)` vertices
/// (§4.1). `point` is `(lat, lng)`.
pub fn point_in_polygon(point: (f64, f64), outer_ring: &[(f64, f64)]) -> bool {
    if outer_ring.len() < 3 {
        return false;
    }
    let coords: Vec<Coord<f64>> = outer_ring.iter().map(|(lng, lat)| Coord { x: *lng, y: *lat }).collect();
    let polygon = Polygon::new(LineString::new(coords), vec![]);
    polygon.contains(&GeoPoint::new(point.1, point.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_zero_for_identical_points() {
        assert!(haversine_km((12.9, 77.6), (12.9, 77.6)) < 1e-9);
    }

    #[test]
    fn haversine_known_distance_bangalore_to_chennai_roughly() {
        // Bangalore to Chennai is ~290km straight-line.
        let d = haversine_km((12.9716, 77.5946), (13.0827, 80.2707));
        assert!(d > 250.0 && d < 320.0, "got {d}");
    }

    #[test]
    fn point_in_square_polygon() {
        let square = vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)];
        assert!(point_in_polygon((0.5, 0.5), &square));
        assert!(!point_in_polygon((2.0, 2.0), &square));
    }

    #[test]
    fn degenerate_polygon_never_contains() {
        assert!(!point_in_polygon((0.5, 0.5), &[(0.0, 0.0), (1.0, 1.0)]));
    }
}
