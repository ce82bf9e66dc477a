//! Fleet allocator (C5): chooses the smallest vehicle whose capacity covers
//! the required occupancy, falling back to a medium tier on exhaustion, and
//! trims passengers from the far end until the vehicle fits (§4.4).

use std::collections::HashMap;

use crate::models::employee::renumber;
use crate::models::{FleetClass, Profile, RoutedEmployee, TripType};

const MEDIUM_FALLBACK_TYPE: &str = "m";

#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    #[error("no vehicle of sufficient capacity remains and no medium-tier fallback is configured")]
    CapacityImpossible,
}

pub struct FleetInventory {
    /// Ascending by capacity, per §4.4 step 3.
    classes: Vec<FleetClass>,
    remaining: HashMap<String, u32>,
}

impl FleetInventory {
    pub fn new(profile: &Profile) -> Self {
        let mut classes = profile.fleet.clone();
        classes.sort_by_key(|c| c.capacity);
        let remaining = classes.iter().map(|c| (c.vehicle_type.clone(), c.count)).collect();
        FleetInventory { classes, remaining }
    }

    fn medium_capacity(&self) -> Option<u32> {
        self.classes.iter().find(|c| c.vehicle_type == MEDIUM_FALLBACK_TYPE).map(|c| c.capacity)
    }
}

#[derive(Debug, Clone)]
pub struct FleetAssignment {
    pub vehicle_type: String,
    pub vehicle_capacity: u32,
    pub guard_needed: bool,
    pub after_fleet_exhaustion: bool,
    pub is_special_needs_route: bool,
    pub trimmed: Vec<RoutedEmployee>,
}

fn critical_seat_is_female(employees: &[RoutedEmployee], trip_type: TripType) -> bool {
    let seat = match trip_type {
        TripType::Pickup => employees.first(),
        TripType::Dropoff => employees.last(),
    };
    seat.map(|re| re.employee.is_female()).unwrap_or(false)
}

/// Removes one employee from the "far end" — the head for dropoff, the tail
/// for pickup (§4.4 step 6) — and returns it.
fn trim_far_end(employees: &mut Vec<RoutedEmployee>, trip_type: TripType) -> Option<RoutedEmployee> {
    match trip_type {
        TripType::Dropoff => {
            if employees.is_empty() {
                None
            } else {
                Some(employees.remove(0))
            }
        }
        TripType::Pickup => employees.pop(),
    }
}

impl FleetInventory {
    /// Fills a route shell: picks a vehicle, computes `guardNeeded`, and trims
    /// passengers until the occupancy fits the chosen capacity.
    pub fn allocate(
        &mut self,
        employees: &mut Vec<RoutedEmployee>,
        trip_type: TripType,
        guard_active: bool,
    ) -> Result<FleetAssignment, FleetError> {
        let is_special_needs_route = !employees.is_empty() && employees.iter().all(|re| re.employee.is_special_needs());

        let guard_needed_prelim = guard_active && critical_seat_is_female(employees, trip_type);
        let required = employees.len() as u32 + if guard_needed_prelim { 1 } else { 0 };

        let mut after_fleet_exhaustion = false;
        let chosen = self
            .classes
            .iter()
            .find(|c| c.capacity >= required && *self.remaining.get(&c.vehicle_type).unwrap_or(&0) > 0)
            .cloned();

        let (vehicle_type, vehicle_capacity) = match chosen {
            Some(c) => (c.vehicle_type, c.capacity),
            None => {
                after_fleet_exhaustion = true;
                match self.medium_capacity() {
                    Some(capacity) => (MEDIUM_FALLBACK_TYPE.to_string(), capacity),
                    None => return Err(FleetError::CapacityImpossible),
                }
            }
        };

        if let Some(count) = self.remaining.get_mut(&vehicle_type) {
            *count = count.saturating_sub(1);
        }

        let mut trimmed = Vec::new();
        let mut guard_needed = guard_active && critical_seat_is_female(employees, trip_type);

        let max_iterations = employees.len() as u32 + 3;
        for _ in 0..max_iterations {
            let mut passenger_cap = vehicle_capacity.saturating_sub(if guard_needed { 1 } else { 0 });
            if is_special_needs_route {
                let special_cap = if guard_needed { 1 } else { 2 };
                passenger_cap = passenger_cap.min(special_cap);
            }

            if (employees.len() as u32) <= passenger_cap {
                break;
            }

            if let Some(dropped) = trim_far_end(employees, trip_type) {
                trimmed.push(dropped);
            } else {
                break;
            }
            guard_needed = guard_active && critical_seat_is_female(employees, trip_type);
        }

        renumber(employees);

        Ok(FleetAssignment {
            vehicle_type,
            vehicle_capacity,
            guard_needed,
            after_fleet_exhaustion,
            is_special_needs_route,
            trimmed,
        })
    }
}
