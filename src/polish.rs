//! Route polisher (C7, §4.6): re-sequences a formed group through the VRP
//! solver in single-vehicle mode, recovers any dropped node to the unrouted
//! pool, and fetches the final route geometry.

use crate::models::{Employee, Facility, Route, RoutedEmployee, TripType};
use crate::services::osrm::RoadService;
use crate::services::vrp_solver::{VrpProblem, VrpSolver};
use crate::validate::{coordinate_sequence, route_details_from_result};

#[derive(Debug, thiserror::Error)]
pub enum PolishError {
    #[error("solver error: {0}")]
    Solver(#[from] crate::services::vrp_solver::SolverError),
    #[error("road service error: {0}")]
    RoadService(#[from] crate::services::osrm::RoadServiceError),
}

/// A re-sequenced group, with any employees the solver dropped split out.
pub struct PolishedGroup {
    pub ordered: Vec<Employee>,
    pub dropped: Vec<Employee>,
}

/// Requests a matrix from the road service for `employees` plus the facility
/// (node 0), in the order the VRP solver's depot-indexed matrix expects.
async fn build_matrices(
    employees: &[Employee],
    facility: &Facility,
    road: &dyn RoadService,
) -> Result<(Vec<Vec<f64>>, Vec<Vec<f64>>), PolishError> {
    let mut points = vec![facility.point()];
    points.extend(employees.iter().map(|e| (e.lat, e.lng)));

    let table = road.table(&facility.profile.name, &points, &points, true).await?;
    let distances = table.distances.unwrap_or_else(|| table.durations.clone());
    Ok((distances, table.durations))
}

/// Re-sequences `group` through the single-vehicle solver (§4.6). The solver
/// may drop employees it cannot fit within `max_duration`; those are returned
/// separately for the unrouted recycler (§4.10).
pub async fn polish_group(
    group: Vec<Employee>,
    facility: &Facility,
    road: &dyn RoadService,
    solver: &dyn VrpSolver,
    trip_type: TripType,
) -> Result<PolishedGroup, PolishError> {
    let (distance_matrix, duration_matrix) = build_matrices(&group, facility, road).await?;
    let service_times = std::iter::once(0).chain(group.iter().map(|_| 0)).collect();

    let problem = VrpProblem::reoptimize(
        distance_matrix,
        duration_matrix,
        group.len() as u32,
        service_times,
        facility.profile.max_duration,
        facility.point(),
        trip_type,
        facility.profile.direction_penalty_weight_solve,
        None,
    );

    let solution = solver.solve(&problem).await?;
    let sequence = solution.routes.into_iter().next().unwrap_or_default();

    let ordered: Vec<Employee> = sequence
        .into_iter()
        .filter(|&idx| idx != 0)
        .filter_map(|idx| group.get(idx - 1).cloned())
        .collect();

    let ordered_codes: std::collections::HashSet<&str> = ordered.iter().map(|e| e.emp_code.as_str()).collect();
    let dropped: Vec<Employee> = group.into_iter().filter(|e| !ordered_codes.contains(e.emp_code.as_str())).collect();

    Ok(PolishedGroup { ordered, dropped })
}

/// Builds the final [`Route`] shell for a polished, ordered employee list:
/// fetches route geometry from the road service and fills `route_details`.
pub async fn build_route(
    unique_key: String,
    zone: String,
    ordered: Vec<Employee>,
    facility: &Facility,
    road: &dyn RoadService,
    trip_type: TripType,
    shift_decimal_hour: f64,
) -> Result<Route, crate::services::osrm::RoadServiceError> {
    let mut route = Route::new(unique_key, zone, trip_type);
    route.employees = ordered
        .into_iter()
        .enumerate()
        .map(|(i, e)| RoutedEmployee::new(e, (i + 1) as u32))
        .collect();

    let employees: Vec<Employee> = route.employees.iter().map(|re| re.employee.clone()).collect();
    let coords = coordinate_sequence(&employees, facility, trip_type);
    let result = road.route(&facility.profile.name, &coords, shift_decimal_hour, &facility.profile.tunables).await?;
    route.route_details = route_details_from_result(&result);

    Ok(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Profile, RequestFacility};
    use crate::services::osrm::{Leg as OsrmLeg, RoadServiceError, RouteResult, TableResult};
    use crate::services::vrp_solver::{SolverError, VrpSolution};
    use async_trait::async_trait;

    fn employee(code: &str) -> Employee {
        Employee {
            emp_code: code.to_string(),
            lat: 1.0,
            lng: 1.0,
            gender: Gender::M,
            is_medical: false,
            is_pwd: false,
            is_nmt: false,
            is_oob: false,
            zone: "Z".into(),
            dist_to_facility_km: 1.0,
        }
    }

    struct FakeRoad;

    #[async_trait]
    impl RoadService for FakeRoad {
        async fn route(
            &self,
            _city: &str,
            coords: &[(f64, f64)],
            _shift_decimal_hour: f64,
            _tunables: &crate::models::profile::Tunables,
        ) -> Result<RouteResult, RoadServiceError> {
            let legs = (0..coords.len().saturating_sub(1)).map(|_| OsrmLeg { distance_m: 500.0, duration_s: 60.0 }).collect();
            Ok(RouteResult { distance_m: 500.0, duration_s: 60.0, legs, encoded_polyline: String::new(), geometry: vec![] })
        }

        async fn table(
            &self,
            _city: &str,
            sources: &[(f64, f64)],
            destinations: &[(f64, f64)],
            _include_distances: bool,
        ) -> Result<TableResult, RoadServiceError> {
            Ok(TableResult { durations: vec![vec![60.0; destinations.len()]; sources.len()], distances: None })
        }
    }

    struct ReversingSolver;

    #[async_trait]
    impl VrpSolver for ReversingSolver {
        async fn solve(&self, problem: &VrpProblem) -> Result<VrpSolution, SolverError> {
            let n = problem.distance_matrix.len().saturating_sub(1);
            let route: Vec<usize> = (1..=n).rev().collect();
            Ok(VrpSolution { routes: vec![route], dropped_node_indices: vec![], error: None })
        }
    }

    struct DroppingSolver;

    #[async_trait]
    impl VrpSolver for DroppingSolver {
        async fn solve(&self, _problem: &VrpProblem) -> Result<VrpSolution, SolverError> {
            Ok(VrpSolution { routes: vec![vec![1]], dropped_node_indices: vec![2], error: None })
        }
    }

    fn facility() -> Facility {
        Facility::new(RequestFacility { geo_x: 0.0, geo_y: 0.0 }, Profile::default())
    }

    #[tokio::test]
    async fn reorders_group_per_solver_sequence() {
        let group = vec![employee("a"), employee("b"), employee("c")];
        let facility = facility();
        let result = polish_group(group, &facility, &FakeRoad, &ReversingSolver, TripType::Pickup).await.unwrap();
        assert_eq!(result.ordered.iter().map(|e| e.emp_code.as_str()).collect::<Vec<_>>(), vec!["c", "b", "a"]);
        assert!(result.dropped.is_empty());
    }

    #[tokio::test]
    async fn recovers_dropped_node_into_unrouted_set() {
        let group = vec![employee("a"), employee("b")];
        let facility = facility();
        let result = polish_group(group, &facility, &FakeRoad, &DroppingSolver, TripType::Pickup).await.unwrap();
        assert_eq!(result.ordered.len(), 1);
        assert_eq!(result.dropped.len(), 1);
        assert_eq!(result.dropped[0].emp_code, "b");
    }
}
