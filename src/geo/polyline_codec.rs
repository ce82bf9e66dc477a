//! Thin wrapper around the Google encoded-polyline algorithm, as returned by
//! the road service's `geometry` field (§4.2).

use geo_types::{Coord, LineString};

const PRECISION: u32 = 5;

/// Encode an ordered `(lat, lng)` coordinate list.
pub fn encode(coords: &[(f64, f64)]) -> Result<String, String> {
    let line: Vec<Coord<f64>> = coords.iter().map(|(lat, lng)| Coord { x: *lng, y: *lat }).collect();
    polyline::encode_coordinates(line, PRECISION)
}

/// Decode an encoded polyline back into `(lat, lng)` pairs.
pub fn decode(encoded: &str) -> Result<Vec<(f64, f64)>, String> {
    let line: LineString<f64> = polyline::decode_polyline(encoded, PRECISION)?;
    Ok(line.into_iter().map(|c| (c.y, c.x)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_within_tolerance() {
        let coords = vec![(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)];
        let encoded = encode(&coords).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.len(), coords.len());
        for (a, b) in coords.iter().zip(decoded.iter()) {
            assert!((a.0 - b.0).abs() < 1e-5);
            assert!((a.1 - b.1).abs() < 1e-5);
        }
    }

    #[test]
    fn empty_input_round_trips() {
        let encoded = encode(&[]).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert!(decoded.is_empty());
    }
}
