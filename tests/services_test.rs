use shuttle_router::models::route::TripType;
use shuttle_router::services::osrm::OsrmConfig;
use shuttle_router::services::vrp_solver::VrpProblem;

#[test]
fn osrm_config_has_sane_defaults() {
    let config = OsrmConfig::default();
    assert_eq!(config.base_url, "http://localhost:5000");
    assert_eq!(config.route_timeout_seconds, 15);
    assert_eq!(config.table_timeout_seconds, 8);
}

#[test]
fn zone_solve_problem_marks_depot_demand_zero() {
    let problem = VrpProblem::zone_solve(
        vec![vec![0.0, 10.0], vec![10.0, 0.0]],
        vec![vec![0.0, 60.0], vec![60.0, 0.0]],
        1,
        4,
        vec![0, 120],
        7200,
        (12.9, 77.6),
        TripType::Pickup,
        2.0,
        1_000_000.0,
    );
    assert_eq!(problem.demands[0], 0);
    assert_eq!(problem.demands[1], 1);
    assert!(problem.allow_dropping_visits);
    assert_eq!(problem.num_vehicles, 1);
}

#[test]
fn reoptimize_problem_pins_start_for_pickup_and_end_for_dropoff() {
    let matrix = vec![vec![0.0, 1.0, 2.0], vec![1.0, 0.0, 1.0], vec![2.0, 1.0, 0.0]];
    let pickup = VrpProblem::reoptimize(
        matrix.clone(),
        matrix.clone(),
        4,
        vec![0, 60, 60],
        7200,
        (12.9, 77.6),
        TripType::Pickup,
        0.5,
        Some(1),
    );
    assert_eq!(pickup.fixed_start_node_index_in_matrix, Some(1));
    assert_eq!(pickup.fixed_end_node_index_in_matrix, None);
    assert!(!pickup.allow_dropping_visits);

    let dropoff = VrpProblem::reoptimize(matrix.clone(), matrix, 4, vec![0, 60, 60], 7200, (12.9, 77.6), TripType::Dropoff, 0.5, Some(2));
    assert_eq!(dropoff.fixed_start_node_index_in_matrix, None);
    assert_eq!(dropoff.fixed_end_node_index_in_matrix, Some(2));
}

#[test]
fn vrp_problem_round_trips_through_json() {
    let problem = VrpProblem::zone_solve(
        vec![vec![0.0]],
        vec![vec![0.0]],
        0,
        4,
        vec![0],
        7200,
        (0.0, 0.0),
        TripType::Dropoff,
        2.0,
        1_000_000.0,
    );
    let json = serde_json::to_string(&problem).unwrap();
    assert!(json.contains("\"trip_type\":\"DROPOFF\""));
}
