use shuttle_router::geo::polyline_codec::{decode, encode};
use shuttle_router::geo::{haversine_km, point_in_polygon};

#[test]
fn polyline_round_trips_within_precision() {
    let coords = vec![(12.9716, 77.5946), (13.0827, 80.2707), (19.0760, 72.8777)];
    let encoded = encode(&coords).unwrap();
    let decoded = decode(&encoded).unwrap();
    assert_eq!(decoded.len(), coords.len());
    for (a, b) in coords.iter().zip(decoded.iter()) {
        assert!((a.0 - b.0).abs() < 1e-4);
        assert!((a.1 - b.1).abs() < 1e-4);
    }
}

#[test]
fn haversine_and_point_in_polygon_agree_on_a_city_block() {
    let block = vec![(77.59, 12.97), (77.59, 12.98), (77.60, 12.98), (77.60, 12.97), (77.59, 12.97)];
    let inside = (12.975, 77.595);
    let outside = (13.5, 77.595);

    assert!(point_in_polygon(inside, &block));
    assert!(!point_in_polygon(outside, &block));
    assert!(haversine_km(inside, outside) > haversine_km(inside, inside));
}
