//! Unrouted recycler (C10, §4.10): repeatedly re-groups employees left
//! without a route — dropped by the solver, rejected at seeding, or trimmed
//! for capacity — using looser, distance-bounded grouping and a tightened
//! deviation tolerance, bounded to a fixed number of passes.

use crate::geo::haversine_km;
use crate::models::{Employee, Facility, Route, TripType};
use crate::polish::{build_route, polish_group};
use crate::services::osrm::RoadService;
use crate::services::vrp_solver::VrpSolver;
use crate::validate::{check_deviation, check_duration, coordinate_sequence, route_details_from_result};
use log::warn;

pub struct RecycleOutcome {
    pub routes: Vec<Route>,
    /// Employees that survived every attempt and remain unrouted.
    pub still_unrouted: Vec<Employee>,
}

/// Employees beyond `impossible_distance_km` are dropped outright — no
/// feasible route can reach them (§4.10).
fn filter_impossible(employees: Vec<Employee>, facility: &Facility, impossible_km: f64) -> (Vec<Employee>, Vec<Employee>) {
    employees.into_iter().partition(|e| e.dist_to_facility_km <= impossible_km)
}

/// Groups candidates within `unrouted_group_span_km` of each other and no
/// more than `unrouted_consecutive_distance_km` apart consecutively (§4.10),
/// capped at `unrouted_max_group_distance_km` from the group's anchor and at
/// `unrouted_initial_group_size` members. A group whose average distance to
/// the facility exceeds `unrouted_avg_distance_reduce_km` is reduced back to
/// just its anchor — the far members are cheaper to re-anchor individually
/// than to risk as a joint detour.
fn cluster(employees: Vec<Employee>, tunables: &crate::models::profile::Tunables) -> Vec<Vec<Employee>> {
    let mut pool = employees;
    pool.sort_by(|a, b| a.dist_to_facility_km.partial_cmp(&b.dist_to_facility_km).unwrap());

    let mut clusters = Vec::new();
    while !pool.is_empty() {
        let anchor = pool.remove(0);
        let mut group = vec![anchor.clone()];

        loop {
            if group.len() >= tunables.unrouted_initial_group_size {
                break;
            }

            let tail = group.last().unwrap();
            let next_idx = pool.iter().position(|c| {
                let consecutive = haversine_km((tail.lat, tail.lng), (c.lat, c.lng));
                let from_anchor = haversine_km((anchor.lat, anchor.lng), (c.lat, c.lng));
                consecutive <= tunables.unrouted_consecutive_distance_km
                    && from_anchor <= tunables.unrouted_max_group_distance_km
                    && span_within(&group, c, tunables.unrouted_group_span_km)
            });

            match next_idx {
                Some(idx) => group.push(pool.remove(idx)),
                None => break,
            }
        }

        let avg_distance = group.iter().map(|e| e.dist_to_facility_km).sum::<f64>() / group.len() as f64;
        if group.len() > 1 && avg_distance > tunables.unrouted_avg_distance_reduce_km {
            let rest = group.split_off(1);
            pool.extend(rest);
            pool.sort_by(|a, b| a.dist_to_facility_km.partial_cmp(&b.dist_to_facility_km).unwrap());
        }

        clusters.push(group);
    }
    clusters
}

fn span_within(group: &[Employee], candidate: &Employee, max_span_km: f64) -> bool {
    group.iter().all(|e| haversine_km((e.lat, e.lng), (candidate.lat, candidate.lng)) <= max_span_km)
}

/// Validates a candidate group end-to-end (deviation with the recycler's
/// tightened tolerance, plus duration) and trims from the far end on failure,
/// bounded to `max_trim_attempts_per_group` (§4.10). A road-service failure
/// is component-local (§7 propagation policy): it fails this group for the
/// current pass rather than the whole recycling run, so the whole group is
/// handed back as "dropped" for the next pass to retry.
async fn validate_and_trim(
    mut group: Vec<Employee>,
    facility: &Facility,
    road: &dyn RoadService,
    trip_type: TripType,
    shift_decimal_hour: f64,
) -> (Vec<Employee>, Vec<Employee>) {
    let mut trimmed = Vec::new();
    let max_attempts = facility.profile.tunables.max_trim_attempts_per_group;

    for _ in 0..=max_attempts {
        if group.is_empty() {
            return (group, trimmed);
        }

        let coords = coordinate_sequence(&group, facility, trip_type);
        let result = match road.route(&facility.profile.name, &coords, shift_decimal_hour, &facility.profile.tunables).await {
            Ok(r) => r,
            Err(e) => {
                warn!("recycler route validation failed, returning group to the pool: {}", e);
                return (Vec::new(), group.into_iter().chain(trimmed).collect());
            }
        };
        let details = route_details_from_result(&result);

        let duration_ok = check_duration(details.total_duration_s, facility.profile.max_duration);
        let deviation = match check_deviation(&group, details.total_distance_m, facility, road, trip_type, shift_decimal_hour, true).await {
            Ok(d) => d,
            Err(e) => {
                warn!("recycler deviation check failed, returning group to the pool: {}", e);
                return (Vec::new(), group.into_iter().chain(trimmed).collect());
            }
        };

        if duration_ok && deviation.passed {
            return (group, trimmed);
        }

        let removed = match trip_type {
            TripType::Dropoff => group.remove(0),
            TripType::Pickup => group.pop().unwrap(),
        };
        trimmed.push(removed);
    }

    (Vec::new(), group.into_iter().chain(trimmed).collect())
}

/// Runs up to `max_unrouted_processing_attempts` recycling passes over the
/// unrouted pool (§4.10). Polish/route-build failures for one group are
/// component-local: that group's employees go back into `next_round` for
/// the next pass instead of aborting the whole recycling run.
pub async fn recycle_unrouted(
    unrouted: Vec<Employee>,
    facility: &Facility,
    road: &dyn RoadService,
    solver: &dyn VrpSolver,
    trip_type: TripType,
    shift_decimal_hour: f64,
    zone_prefix: &str,
) -> RecycleOutcome {
    let tunables = &facility.profile.tunables;
    let (mut pool, mut impossible) = filter_impossible(unrouted, facility, tunables.impossible_distance_km);

    let mut routes = Vec::new();
    let max_passes = facility.profile.tunables.max_unrouted_processing_attempts;

    for attempt in 0..max_passes {
        if pool.is_empty() {
            break;
        }

        let (forced, rest) = pool
            .into_iter()
            .partition(|e: &Employee| e.dist_to_facility_km >= facility.profile.tunables.force_singleton_distance_km);
        pool = rest;

        let mut next_round = Vec::new();

        for singleton in forced {
            let group = vec![singleton];
            let (kept, dropped) = validate_and_trim(group, facility, road, trip_type, shift_decimal_hour).await;
            next_round.extend(dropped);
            if kept.is_empty() {
                continue;
            }
            let unique_key = format!("{zone_prefix}-unrouted-singleton-{attempt}-{}", routes.len());
            let kept_backup = kept.clone();
            match build_route(unique_key, zone_prefix.to_string(), kept, facility, road, trip_type, shift_decimal_hour).await {
                Ok(route) => routes.push(route),
                Err(e) => {
                    warn!("recycler route build failed for a singleton, returning to the pool: {}", e);
                    next_round.extend(kept_backup);
                }
            }
        }

        for cluster_group in cluster(pool, tunables) {
            let (kept, dropped) = validate_and_trim(cluster_group, facility, road, trip_type, shift_decimal_hour).await;
            next_round.extend(dropped);
            if kept.is_empty() {
                continue;
            }

            let kept_backup = kept.clone();
            let polished = match polish_group(kept, facility, road, solver, trip_type).await {
                Ok(p) => p,
                Err(e) => {
                    warn!("recycler polish failed for a group, returning to the pool: {}", e);
                    next_round.extend(kept_backup);
                    continue;
                }
            };
            next_round.extend(polished.dropped);

            if polished.ordered.is_empty() {
                continue;
            }

            let unique_key = format!("{zone_prefix}-unrouted-{attempt}-{}", routes.len());
            let ordered_backup = polished.ordered.clone();
            match build_route(unique_key, zone_prefix.to_string(), polished.ordered, facility, road, trip_type, shift_decimal_hour).await {
                Ok(route) => routes.push(route),
                Err(e) => {
                    warn!("recycler route build failed for a group, returning to the pool: {}", e);
                    next_round.extend(ordered_backup);
                }
            }
        }

        pool = next_round;
    }

    impossible.extend(pool);
    RecycleOutcome { routes, still_unrouted: impossible }
}
