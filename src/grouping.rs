//! Heuristic grouper (C6, §4.5): forms zone-local employee groups by
//! farthest-first seeding and scored nearest-neighbor extension, validating
//! each tentative addition against the road service before committing it.

use crate::geo::haversine_km;
use crate::models::{Employee, Facility, Profile, TripType};
use crate::services::osrm::{RoadService, RoadServiceError};
use crate::validate::{check_deviation, check_duration, coordinate_sequence, route_details_from_result};
use log::warn;

/// One seeded, extended, and road-validated group, ready for C7 re-sequencing.
#[derive(Debug, Clone)]
pub struct FormedGroup {
    pub employees: Vec<Employee>,
}

/// Employees a seed or candidate rejection leaves behind; the orchestrator
/// folds these into the unrouted pool (§4.10).
#[derive(Debug, Default)]
pub struct GroupingOutcome {
    pub groups: Vec<FormedGroup>,
    pub deferred: Vec<Employee>,
}

/// Sorts zone employees by facility distance: farthest-first for pickup
/// (the critical seat boards first and rides alone longest), nearest-first
/// for dropoff.
fn seed_order(mut employees: Vec<Employee>, trip_type: TripType) -> Vec<Employee> {
    employees.sort_by(|a, b| match trip_type {
        TripType::Pickup => b.dist_to_facility_km.partial_cmp(&a.dist_to_facility_km).unwrap(),
        TripType::Dropoff => a.dist_to_facility_km.partial_cmp(&b.dist_to_facility_km).unwrap(),
    });
    employees
}

/// Validates a tentative employee sequence against the road service: total
/// distance/duration must clear the deviation and duration checks.
async fn validate_sequence(
    employees: &[Employee],
    facility: &Facility,
    road: &dyn RoadService,
    trip_type: TripType,
    shift_decimal_hour: f64,
) -> Result<bool, RoadServiceError> {
    let coords = coordinate_sequence(employees, facility, trip_type);
    let result = road.route(&facility.profile.name, &coords, shift_decimal_hour, &facility.profile.tunables).await?;
    let details = route_details_from_result(&result);

    if !check_duration(details.total_duration_s, facility.profile.max_duration) {
        return Ok(false);
    }
    let deviation = check_deviation(employees, details.total_distance_m, facility, road, trip_type, shift_decimal_hour, false).await?;
    Ok(deviation.passed)
}

/// goodProgress: whether extending from `tail` to `candidate` moves the group
/// in the expected facility-relative direction, within the configured
/// acceptance factor (§4.5, §9 Open Question — exact formula undocumented
/// upstream; this mirrors the pickup/dropoff asymmetry the spec describes).
fn good_progress(tail: &Employee, candidate: &Employee, profile: &Profile, trip_type: TripType) -> bool {
    match trip_type {
        TripType::Pickup => candidate.dist_to_facility_km <= tail.dist_to_facility_km * profile.tunables.pickup_accept_factor,
        TripType::Dropoff => candidate.dist_to_facility_km >= tail.dist_to_facility_km * profile.tunables.dropoff_accept_factor,
    }
}

fn score_candidate(tail: &Employee, candidate: &Employee, profile: &Profile, trip_type: TripType) -> f64 {
    let delta = (candidate.dist_to_facility_km - tail.dist_to_facility_km).abs();
    let progress_term = 1.0 / (1.0 + delta);
    let hav = haversine_km((tail.lat, tail.lng), (candidate.lat, candidate.lng));

    let progress = progress_term
        * profile.tunables.progress_weight
        * if good_progress(tail, candidate, profile, trip_type) { 1.0 } else { profile.tunables.penalty_scalar };
    let proximity = (1.0 / (1.0 + hav)) * profile.tunables.distance_weight * profile.tunables.distance_scalar;
    progress + proximity
}

/// Forms groups out of one zone's employee pool (§4.5). `employees` must
/// already carry `dist_to_facility_km` and `zone`.
///
/// Road-service failures while validating a seed or a candidate extension
/// are component-local (§7 propagation policy): they fail just that
/// seed/candidate rather than aborting the whole zone, so a flaky backend
/// degrades into deferred employees instead of a fatal request error.
pub async fn form_groups(
    zone_name: &str,
    employees: Vec<Employee>,
    facility: &Facility,
    road: &dyn RoadService,
    trip_type: TripType,
    shift_decimal_hour: f64,
) -> GroupingOutcome {
    let target_size = facility.profile.zone_target_size(zone_name) as usize;
    let mut pool = seed_order(employees, trip_type);
    let mut outcome = GroupingOutcome::default();

    while !pool.is_empty() {
        let seed = pool.remove(0);

        let seed_valid = match validate_sequence(std::slice::from_ref(&seed), facility, road, trip_type, shift_decimal_hour).await {
            Ok(valid) => valid,
            Err(e) => {
                warn!("seed validation failed for {}, deferring: {}", seed.emp_code, e);
                false
            }
        };
        if !seed_valid {
            outcome.deferred.push(seed);
            continue;
        }

        let special_needs_seed = seed.is_special_needs();
        let cap = if special_needs_seed { target_size.min(2) } else { target_size };
        let max_swap_km = facility.profile.tunables.max_swap_distance_km;
        let mut group = vec![seed.clone()];

        loop {
            if group.len() >= cap {
                break;
            }

            let tail = group.last().unwrap().clone();
            let eligible: Vec<usize> = pool
                .iter()
                .enumerate()
                .filter(|(_, c)| {
                    special_needs_seed == c.is_special_needs()
                        && haversine_km((seed.lat, seed.lng), (c.lat, c.lng)) <= 2.0 * max_swap_km
                })
                .map(|(i, _)| i)
                .collect();

            if eligible.is_empty() {
                break;
            }

            let mut ranked: Vec<(usize, f64)> = eligible
                .into_iter()
                .map(|i| (i, score_candidate(&tail, &pool[i], &facility.profile, trip_type)))
                .collect();
            ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

            let mut accepted = false;
            for (idx, _) in ranked {
                let mut candidate_group = group.clone();
                candidate_group.push(pool[idx].clone());
                let validated = match validate_sequence(&candidate_group, facility, road, trip_type, shift_decimal_hour).await {
                    Ok(valid) => valid,
                    Err(e) => {
                        warn!("candidate validation failed for {}, skipping: {}", pool[idx].emp_code, e);
                        false
                    }
                };
                if validated {
                    group = candidate_group;
                    pool.remove(idx);
                    accepted = true;
                    break;
                }
            }

            if !accepted {
                break;
            }
        }

        outcome.groups.push(FormedGroup { employees: group });
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, RequestFacility};
    use async_trait::async_trait;
    use crate::services::osrm::{Leg as OsrmLeg, RouteResult, TableResult};

    fn employee(code: &str, lat: f64, lng: f64, dist: f64) -> Employee {
        Employee {
            emp_code: code.to_string(),
            lat,
            lng,
            gender: Gender::M,
            is_medical: false,
            is_pwd: false,
            is_nmt: false,
            is_oob: false,
            zone: "Z".to_string(),
            dist_to_facility_km: dist,
        }
    }

    struct AlwaysValidRoad;

    #[async_trait]
    impl RoadService for AlwaysValidRoad {
        async fn route(
            &self,
            _city: &str,
            coords: &[(f64, f64)],
            _shift_decimal_hour: f64,
            _tunables: &crate::models::profile::Tunables,
        ) -> Result<RouteResult, RoadServiceError> {
            let legs = (0..coords.len().saturating_sub(1)).map(|_| OsrmLeg { distance_m: 1000.0, duration_s: 120.0 }).collect();
            Ok(RouteResult { distance_m: 1000.0 * coords.len() as f64, duration_s: 120.0 * coords.len() as f64, legs, encoded_polyline: String::new(), geometry: vec![] })
        }

        async fn table(
            &self,
            _city: &str,
            sources: &[(f64, f64)],
            destinations: &[(f64, f64)],
            _include_distances: bool,
        ) -> Result<TableResult, RoadServiceError> {
            Ok(TableResult {
                durations: vec![vec![120.0; destinations.len()]; sources.len()],
                distances: None,
            })
        }
    }

    fn facility() -> Facility {
        Facility::new(RequestFacility { geo_x: 0.0, geo_y: 0.0 }, Profile::default())
    }

    #[tokio::test]
    async fn forms_one_group_when_all_candidates_validate() {
        let employees = vec![
            employee("a", 0.005, 0.005, 3.0),
            employee("b", 0.010, 0.010, 2.0),
            employee("c", 0.015, 0.015, 1.0),
        ];
        let road = AlwaysValidRoad;
        let facility = facility();
        let outcome = form_groups("Z", employees, &facility, &road, TripType::Pickup, 9.0).await;
        assert_eq!(outcome.groups.len(), 1);
        assert_eq!(outcome.groups[0].employees.len(), 3);
        assert!(outcome.deferred.is_empty());
    }

    #[tokio::test]
    async fn special_needs_seed_only_pulls_special_needs_candidates() {
        let mut special = employee("s0", 0.01, 0.01, 3.0);
        special.is_medical = true;
        let mut special2 = employee("s1", 0.02, 0.02, 2.5);
        special2.is_medical = true;
        let regular = employee("r0", 0.03, 0.03, 2.0);

        let employees = vec![special, special2, regular];
        let road = AlwaysValidRoad;
        let facility = facility();
        let outcome = form_groups("Z", employees, &facility, &road, TripType::Pickup, 9.0).await;

        let special_group = outcome.groups.iter().find(|g| g.employees.iter().any(|e| e.is_medical)).unwrap();
        assert!(special_group.employees.iter().all(|e| e.is_special_needs()));
    }
}
