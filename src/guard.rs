//! Guard resolver (C8, §4.8): when a route needs a guard because the
//! critical-seat employee is female, attempts an experiential swap with a
//! same-route male employee to avoid consuming a guard seat, then
//! re-optimizes the route around the new critical seat.

use crate::models::route::SwappedPairInfo;
use crate::models::{Facility, Route, RoutedEmployee, TripType};
use crate::polish::build_route;
use crate::services::osrm::RoadService;
use crate::services::vrp_solver::{VrpProblem, VrpSolver};

#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("road service error: {0}")]
    RoadService(#[from] crate::services::osrm::RoadServiceError),
    #[error("solver error: {0}")]
    Solver(#[from] crate::services::vrp_solver::SolverError),
}

fn critical_seat_index(route: &Route) -> Option<usize> {
    route.critical_seat_index()
}

/// Candidate swap partner: any male employee not already in the critical
/// seat, nearest (haversine) to the critical seat, within `max_swap_distance_km`.
fn find_swap_candidate(route: &Route, critical_idx: usize) -> Option<usize> {
    let critical = &route.employees[critical_idx];

    route
        .employees
        .iter()
        .enumerate()
        .filter(|(i, re)| *i != critical_idx && re.employee.is_male())
        .min_by(|(_, a), (_, b)| {
            let da = crate::geo::haversine_km((critical.employee.lat, critical.employee.lng), (a.employee.lat, a.employee.lng));
            let db = crate::geo::haversine_km((critical.employee.lat, critical.employee.lng), (b.employee.lat, b.employee.lng));
            da.partial_cmp(&db).unwrap()
        })
        .map(|(i, _)| i)
}

/// Re-optimizes `route`'s employee ordering with `pinned_emp_code` forced
/// onto the critical seat, using the single-vehicle solver (§4.6, §4.8).
async fn reoptimize_with_pin(
    route: &Route,
    facility: &Facility,
    road: &dyn RoadService,
    solver: &dyn VrpSolver,
    pinned_index_in_employees: usize,
) -> Result<Vec<RoutedEmployee>, GuardError> {
    let mut points = vec![facility.point()];
    points.extend(route.employees.iter().map(|re| (re.employee.lat, re.employee.lng)));
    let table = road.table(&facility.profile.name, &points, &points, true).await?;
    let distances = table.distances.clone().unwrap_or_else(|| table.durations.clone());

    let service_times = std::iter::once(0).chain(route.employees.iter().map(|_| 0)).collect();
    let problem = VrpProblem::reoptimize(
        distances,
        table.durations,
        route.employees.len() as u32,
        service_times,
        facility.profile.max_duration,
        facility.point(),
        route.trip_type,
        facility.profile.direction_penalty_weight_reopt,
        Some(pinned_index_in_employees + 1),
    );

    let solution = solver.solve(&problem).await?;
    let sequence = solution.routes.into_iter().next().unwrap_or_default();

    let reordered: Vec<RoutedEmployee> = sequence
        .into_iter()
        .filter(|&idx| idx != 0)
        .filter_map(|idx| route.employees.get(idx - 1).cloned())
        .collect();

    Ok(reordered)
}

/// Attempts the guard-avoidance swap (§4.8). Returns `true` if a swap was
/// committed, mutating `route` in place; `false` leaves the route untouched
/// (caller falls back to assigning a guard seat).
pub async fn attempt_guard_swap(
    route: &mut Route,
    facility: &Facility,
    road: &dyn RoadService,
    solver: &dyn VrpSolver,
    shift_decimal_hour: f64,
) -> Result<bool, GuardError> {
    let critical_idx = match critical_seat_index(route) {
        Some(i) => i,
        None => return Ok(false),
    };

    if !route.employees[critical_idx].employee.is_female() {
        return Ok(false);
    }

    let swap_idx = match find_swap_candidate(route, critical_idx) {
        Some(i) => i,
        None => return Ok(false),
    };

    let distance = crate::geo::haversine_km(
        (route.employees[critical_idx].employee.lat, route.employees[critical_idx].employee.lng),
        (route.employees[swap_idx].employee.lat, route.employees[swap_idx].employee.lng),
    );
    if distance > facility.profile.tunables.max_swap_distance_km {
        return Ok(false);
    }

    let original_duration = route.route_details.total_duration_s;

    let reordered = reoptimize_with_pin(route, facility, road, solver, swap_idx).await?;
    if reordered.len() != route.employees.len() {
        return Ok(false);
    }

    let employees_only: Vec<_> = reordered.iter().map(|re| re.employee.clone()).collect();
    let candidate_route = build_route(
        route.unique_key.clone(),
        route.zone.clone(),
        employees_only,
        facility,
        road,
        route.trip_type,
        shift_decimal_hour,
    )
    .await?;

    let regression = (candidate_route.route_details.total_duration_s - original_duration) / original_duration.max(1.0);
    if regression > facility.profile.tunables.guard_duration_regression_pct {
        return Ok(false);
    }

    let moved_off = route.employees[critical_idx].employee.emp_code.clone();
    let moved_onto = route.employees[swap_idx].employee.emp_code.clone();

    route.employees = candidate_route.employees;
    route.route_details = candidate_route.route_details;
    route.swapped = true;
    route.swapped_pair_info = Some(SwappedPairInfo { moved_off_critical_seat: moved_off, moved_onto_critical_seat: moved_onto });
    route.guard_needed = recompute_guard_needed(route);
    crate::models::employee::renumber(&mut route.employees);

    Ok(true)
}

/// Guard truthfulness invariant (§3, §8): `guardNeeded` is recomputed at
/// commit time from the (possibly swapped) critical seat, never carried
/// forward from an earlier assignment.
pub fn recompute_guard_needed(route: &Route) -> bool {
    match critical_seat_index(route) {
        Some(i) => route.employees[i].employee.is_female(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, Gender, Profile, RequestFacility};

    fn employee(code: &str, gender: Gender, lat: f64, lng: f64) -> Employee {
        Employee {
            emp_code: code.to_string(),
            lat,
            lng,
            gender,
            is_medical: false,
            is_pwd: false,
            is_nmt: false,
            is_oob: false,
            zone: "Z".into(),
            dist_to_facility_km: 1.0,
        }
    }

    fn route_with(employees: Vec<Employee>, trip_type: TripType) -> Route {
        let mut route = Route::new("k".into(), "Z".into(), trip_type);
        route.employees = employees.into_iter().enumerate().map(|(i, e)| RoutedEmployee::new(e, i as u32 + 1)).collect();
        route
    }

    #[test]
    fn no_swap_candidate_when_all_female() {
        let route = route_with(
            vec![employee("a", Gender::F, 0.0, 0.0), employee("b", Gender::F, 0.0, 0.01)],
            TripType::Pickup,
        );
        assert!(find_swap_candidate(&route, 0).is_none());
    }

    #[test]
    fn finds_nearest_male_candidate() {
        let route = route_with(
            vec![
                employee("a", Gender::F, 0.0, 0.0),
                employee("far", Gender::M, 1.0, 1.0),
                employee("near", Gender::M, 0.0, 0.001),
            ],
            TripType::Pickup,
        );
        let idx = find_swap_candidate(&route, 0).unwrap();
        assert_eq!(route.employees[idx].employee.emp_code, "near");
    }

    #[test]
    fn recompute_guard_needed_reflects_current_critical_seat() {
        let mut route = route_with(
            vec![employee("a", Gender::M, 0.0, 0.0), employee("b", Gender::F, 0.0, 0.01)],
            TripType::Dropoff,
        );
        assert!(recompute_guard_needed(&route));
        route.employees.swap(0, 1);
        assert!(!recompute_guard_needed(&route));
    }
}
