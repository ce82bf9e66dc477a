//! Deviation validator and ETA synthesizer (C9, §4.7, §4.9).

use crate::models::profile::{DeviationRule, Tunables};
use crate::models::route::{Leg, Route, RouteDetails};
use crate::models::{Employee, Facility, RoutedEmployee, TripType};
use crate::services::osrm::{RoadService, RoadServiceError, RouteResult};
use crate::time::buffered_duration;

/// Converts a road-service result into the canonical route-geometry record
/// (§9), used by the grouper, polisher, and guard resolver alike.
pub fn route_details_from_result(result: &RouteResult) -> RouteDetails {
    RouteDetails {
        total_distance_m: result.distance_m,
        total_duration_s: result.duration_s,
        legs: result.legs.iter().map(|l| Leg { distance_m: l.distance_m, duration_s: l.duration_s }).collect(),
        encoded_polyline: result.encoded_polyline.clone(),
        geometry: result.geometry.clone(),
    }
}

/// Builds the coordinate sequence the road service expects for `employees`,
/// in the facility-relative order appropriate to `trip_type` (§4.5 step 4,
/// §4.6): pickup ends at the facility, dropoff starts from it.
pub fn coordinate_sequence(employees: &[Employee], facility: &Facility, trip_type: TripType) -> Vec<(f64, f64)> {
    let mut coords: Vec<(f64, f64)> = employees.iter().map(|e| (e.lat, e.lng)).collect();
    match trip_type {
        TripType::Pickup => coords.push(facility.point()),
        TripType::Dropoff => coords.insert(0, facility.point()),
    }
    coords
}

/// The farthest employee by haversine distance, whose *road* distance to the
/// facility then drives deviation-rule selection (§4.7).
pub async fn farthest_employee_road_distance_km(
    employees: &[Employee],
    facility: &Facility,
    road: &dyn RoadService,
    trip_type: TripType,
    shift_decimal_hour: f64,
) -> Result<f64, RoadServiceError> {
    let farthest = employees
        .iter()
        .max_by(|a, b| a.dist_to_facility_km.partial_cmp(&b.dist_to_facility_km).unwrap())
        .expect("empty employee list");

    let coords = match trip_type {
        TripType::Pickup => vec![(farthest.lat, farthest.lng), facility.point()],
        TripType::Dropoff => vec![facility.point(), (farthest.lat, farthest.lng)],
    };

    let result = road
        .route(&facility.profile.name, &coords, shift_decimal_hour, &facility.profile.tunables)
        .await?;
    Ok(result.distance_m / 1000.0)
}

const EPSILON_KM: f64 = 1e-6;

/// Picks the applicable rule by containment, falling back to the highest band
/// when beyond all rules or the closest band when below all (§4.7).
pub fn pick_deviation_rule(rules: &[DeviationRule], distance_km: f64) -> Option<&DeviationRule> {
    if rules.is_empty() {
        return None;
    }
    if let Some(rule) = rules
        .iter()
        .find(|r| distance_km >= r.min_dist_km - EPSILON_KM && distance_km <= r.max_dist_km + EPSILON_KM)
    {
        return Some(rule);
    }
    let max_band = rules.iter().max_by(|a, b| a.max_dist_km.partial_cmp(&b.max_dist_km).unwrap());
    let min_band = rules.iter().min_by(|a, b| a.min_dist_km.partial_cmp(&b.min_dist_km).unwrap());
    match (max_band, min_band) {
        (Some(max_rule), Some(min_rule)) if distance_km > max_rule.max_dist_km => Some(max_rule),
        (Some(_), Some(min_rule)) => Some(min_rule),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct DeviationCheck {
    pub passed: bool,
    pub farthest_distance_km: f64,
    pub limit_km: Option<f64>,
}

/// §4.7. `allow_recycler_tolerance` applies the unrouted pass's tightened-but-
/// forgiving tolerance band (`exceedanceKm ≤ min(0.05 × limit, 2.0 km)`, §4.10).
pub async fn check_deviation(
    employees: &[Employee],
    total_distance_m: f64,
    facility: &Facility,
    road: &dyn RoadService,
    trip_type: TripType,
    shift_decimal_hour: f64,
    allow_recycler_tolerance: bool,
) -> Result<DeviationCheck, RoadServiceError> {
    if facility.profile.bypass_deviation_check {
        return Ok(DeviationCheck { passed: true, farthest_distance_km: 0.0, limit_km: None });
    }

    let rules = facility.profile.deviation_rules();
    if rules.is_empty() {
        return Ok(DeviationCheck { passed: true, farthest_distance_km: 0.0, limit_km: None });
    }

    let farthest_km = farthest_employee_road_distance_km(employees, facility, road, trip_type, shift_decimal_hour).await?;
    let rule = pick_deviation_rule(rules, farthest_km);
    let limit_km = rule.map(|r| r.max_total_one_way_km);
    let total_km = total_distance_m / 1000.0;

    let passed = match limit_km {
        None => true,
        Some(limit) => {
            if total_km <= limit {
                true
            } else if allow_recycler_tolerance {
                let tolerance = (0.05 * limit).min(2.0);
                (total_km - limit) <= tolerance
            } else {
                false
            }
        }
    };

    Ok(DeviationCheck { passed, farthest_distance_km: farthest_km, limit_km })
}

pub fn check_duration(total_duration_s: f64, max_duration_s: u64) -> bool {
    total_duration_s <= max_duration_s as f64
}

/// Walks the final legs assigning `pickupTime`/`dropoffTime` per employee
/// (§4.9). `reporting_time_s` only applies to pickup (§9 Open Question).
pub fn synthesize_eta(
    route: &mut Route,
    shift_seconds: i64,
    reporting_time_s: i64,
    pickup_time_per_employee_s: i64,
    shift_decimal_hour: f64,
    tunables: &Tunables,
) {
    let legs = &route.route_details.legs;
    let n = route.employees.len();
    if legs.len() != n {
        return;
    }

    match route.trip_type {
        TripType::Pickup => {
            let mut current = shift_seconds - reporting_time_s;
            for i in (0..n).rev() {
                current -= buffered_leg(&legs[i], shift_decimal_hour, tunables);
                current -= pickup_time_per_employee_s;
                route.employees[i].eta_seconds = Some(current);
            }
        }
        TripType::Dropoff => {
            let mut current = shift_seconds;
            for leg in legs.iter().enumerate().map(|(i, l)| (i, l)) {
                let (i, leg) = leg;
                current += buffered_leg(leg, shift_decimal_hour, tunables);
                route.employees[i].eta_seconds = Some(current);
                current += pickup_time_per_employee_s;
            }
        }
    }
}

fn buffered_leg(leg: &Leg, shift_decimal_hour: f64, tunables: &Tunables) -> i64 {
    buffered_duration(leg.duration_s, shift_decimal_hour, tunables, Some(tunables.eta_buffer_cap)).round() as i64
}

/// Employee "order" renumbering plus a convenience re-export for callers that
/// only need the mutable wrapper (kept here since ETA synthesis is the most
/// frequent caller of renumbered sequences).
pub fn renumbered(employees: Vec<RoutedEmployee>) -> Vec<RoutedEmployee> {
    let mut employees = employees;
    crate::models::employee::renumber(&mut employees);
    employees
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(min: f64, max: f64, limit: f64) -> DeviationRule {
        DeviationRule { min_dist_km: min, max_dist_km: max, max_total_one_way_km: limit }
    }

    #[test]
    fn picks_containing_band() {
        let rules = vec![rule(0.0, 10.0, 15.0), rule(10.0, 20.0, 25.0)];
        let picked = pick_deviation_rule(&rules, 12.0).unwrap();
        assert_eq!(picked.max_total_one_way_km, 25.0);
    }

    #[test]
    fn falls_back_to_highest_band_beyond_all() {
        let rules = vec![rule(0.0, 10.0, 15.0), rule(10.0, 20.0, 25.0)];
        let picked = pick_deviation_rule(&rules, 50.0).unwrap();
        assert_eq!(picked.max_total_one_way_km, 25.0);
    }

    #[test]
    fn falls_back_to_closest_band_below_all() {
        let rules = vec![rule(5.0, 10.0, 15.0), rule(10.0, 20.0, 25.0)];
        let picked = pick_deviation_rule(&rules, 1.0).unwrap();
        assert_eq!(picked.max_total_one_way_km, 15.0);
    }

    #[test]
    fn recycler_tolerance_accepts_small_exceedance_only() {
        let limit = 20.0;
        let tolerance = (0.05 * limit).min(2.0);
        assert!((20.5 - limit) <= tolerance);
        assert!((22.0 - limit) > tolerance);
    }
}
