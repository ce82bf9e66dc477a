//! Zone assigner (C2): partitions employees into named zones by polygon
//! containment (§4.1).

use std::collections::HashMap;

use crate::geo::point_in_polygon;
use crate::models::employee::DEFAULT_ZONE;
use crate::models::{Employee, Zone};

/// Assigns each employee with valid coordinates to the first zone whose
/// polygon contains it, or to [`DEFAULT_ZONE`] if none match. Employees with
/// unusable coordinates are silently dropped here (§4.1) — the orchestrator
/// recovers them later via the input/output employee-set diff.
pub fn assign_zones(employees: &[Employee], zones: &[Zone]) -> HashMap<String, Vec<Employee>> {
    let mut by_zone: HashMap<String, Vec<Employee>> = HashMap::new();

    for employee in employees {
        if !employee.has_valid_coordinates() {
            continue;
        }

        let matched_zone = zones
            .iter()
            .find(|zone| point_in_polygon((employee.lat, employee.lng), &zone.outer_ring))
            .map(|zone| zone.name.clone());

        let mut zoned = employee.clone();
        zoned.zone = matched_zone.clone().unwrap_or_else(|| DEFAULT_ZONE.to_string());
        by_zone.entry(zoned.zone.clone()).or_default().push(zoned);
    }

    by_zone
}
