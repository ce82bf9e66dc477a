use serde::{Deserialize, Serialize};

use super::employee::RoutedEmployee;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripType {
    #[serde(rename = "PICKUP")]
    Pickup,
    #[serde(rename = "DROPOFF")]
    Dropoff,
}

impl TripType {
    pub fn short_code(&self) -> &'static str {
        match self {
            TripType::Pickup => "P",
            TripType::Dropoff => "D",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::Pickup => "PICKUP",
            TripType::Dropoff => "DROPOFF",
        }
    }
}

/// One leg of a route's road-service geometry: employee-to-next, or the
/// facility-bound leg (§3 invariant: `len(legs) == len(employees)`).
#[derive(Debug, Clone)]
pub struct Leg {
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Canonical route-geometry record (§9: replaces the shape-drifting
/// `duration`/`totalDuration`/`distance`/`totalDistance` naming seen upstream).
#[derive(Debug, Clone, Default)]
pub struct RouteDetails {
    pub total_distance_m: f64,
    /// Buffered (traffic-adjusted) total duration, in seconds.
    pub total_duration_s: f64,
    pub legs: Vec<Leg>,
    pub encoded_polyline: String,
    pub geometry: Vec<(f64, f64)>,
}

/// Records which employee was moved off the critical seat and who replaced
/// them, once the guard resolver (§4.8) performs an experiential swap.
#[derive(Debug, Clone)]
pub struct SwappedPairInfo {
    pub moved_off_critical_seat: String,
    pub moved_onto_critical_seat: String,
}

#[derive(Debug, Clone)]
pub struct Route {
    pub unique_key: String,
    pub employees: Vec<RoutedEmployee>,
    pub zone: String,
    pub trip_type: TripType,
    pub assigned_vehicle_type: String,
    pub vehicle_capacity: u32,
    pub after_fleet_exhaustion: bool,
    pub guard_needed: bool,
    pub is_special_needs_route: bool,
    pub swapped: bool,
    pub duration_exceeded: bool,
    pub error: Option<String>,
    pub route_details: RouteDetails,
    pub swapped_pair_info: Option<SwappedPairInfo>,
    /// Farthest employee's road distance to the facility, computed during
    /// deviation validation (§4.7); cached here for response synthesis.
    pub farthest_employee_distance_km: f64,
}

impl Route {
    pub fn new(unique_key: String, zone: String, trip_type: TripType) -> Self {
        Route {
            unique_key,
            employees: Vec::new(),
            zone,
            trip_type,
            assigned_vehicle_type: String::new(),
            vehicle_capacity: 0,
            after_fleet_exhaustion: false,
            guard_needed: false,
            is_special_needs_route: false,
            swapped: false,
            duration_exceeded: false,
            error: None,
            route_details: RouteDetails::default(),
            swapped_pair_info: None,
            farthest_employee_distance_km: 0.0,
        }
    }

    /// The last stop for a dropoff route, the first stop for a pickup route —
    /// the position left alone with the driver (GLOSSARY).
    pub fn critical_seat_index(&self) -> Option<usize> {
        if self.employees.is_empty() {
            return None;
        }
        match self.trip_type {
            TripType::Pickup => Some(0),
            TripType::Dropoff => Some(self.employees.len() - 1),
        }
    }

    pub fn critical_seat(&self) -> Option<&RoutedEmployee> {
        self.critical_seat_index().map(|i| &self.employees[i])
    }

    pub fn occupancy(&self) -> u32 {
        self.employees.len() as u32 + if self.guard_needed { 1 } else { 0 }
    }

    pub fn is_medical_route(&self) -> bool {
        self.employees.iter().any(|e| e.employee.is_medical)
    }

    pub fn is_pwd_route(&self) -> bool {
        self.employees.iter().any(|e| e.employee.is_pwd)
    }

    pub fn is_nmt_route(&self) -> bool {
        self.employees.iter().any(|e| e.employee.is_nmt)
    }

    pub fn is_oob_route(&self) -> bool {
        self.employees.iter().any(|e| e.employee.is_oob)
    }
}
