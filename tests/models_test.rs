use shuttle_router::models::{Employee, Gender, RequestEmployee, RouteRequest, Zone, ZoneFeatureCollection};

#[test]
fn request_employee_converts_lng_lat_correctly() {
    let raw = RequestEmployee {
        emp_code: "E100".to_string(),
        geo_x: 77.5946,
        geo_y: 12.9716,
        gender: Gender::F,
        is_medical: false,
        is_pwd: false,
        is_nmt: false,
        is_oob: false,
    };

    let employee: Employee = raw.into();
    assert_eq!(employee.lat, 12.9716);
    assert_eq!(employee.lng, 77.5946);
    assert!(employee.is_female());
    assert!(!employee.is_special_needs());
}

#[test]
fn zone_feature_collection_extracts_outer_ring_in_lng_lat_order() {
    let geojson = r#"{
        "features": [
            {
                "properties": { "Name": "North" },
                "geometry": { "coordinates": [[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.0, 0.0]]] }
            }
        ]
    }"#;
    let collection: ZoneFeatureCollection = serde_json::from_str(geojson).unwrap();
    let zones: Vec<Zone> = collection.into();
    assert_eq!(zones.len(), 1);
    assert_eq!(zones[0].name, "North");
    assert_eq!(zones[0].outer_ring[1], (0.0, 1.0));
}

#[test]
fn route_request_deserializes_from_the_documented_shape() {
    let body = r#"{
        "uuid": "req-1",
        "date": "2026-07-28",
        "shift_time": "0930",
        "trip_type": "PICKUP",
        "employees": [
            {"emp_code": "E1", "geo_x": 77.5, "geo_y": 12.9, "gender": "F"}
        ],
        "facility": {"geo_x": 77.6, "geo_y": 13.0},
        "profile": {"name": "blr", "facility_type": "TECH_PARK"}
    }"#;

    let request: RouteRequest = serde_json::from_str(body).unwrap();
    assert_eq!(request.employees.len(), 1);
    assert_eq!(request.pickup_time_per_employee, 180);
    assert!(!request.guard);
    assert_eq!(request.profile.name, "blr");
}
