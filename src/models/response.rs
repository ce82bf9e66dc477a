use serde::Serialize;

use super::employee::{Gender, RoutedEmployee};
use super::route::{Route, SwappedPairInfo};

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeOut {
    pub emp_code: String,
    pub gender: Gender,
    pub is_medical: bool,
    pub is_pwd: bool,
    pub is_nmt: bool,
    pub is_oob: bool,
    /// HH:MM, whichever of pickupTime/dropoffTime applies (§4.9).
    pub eta: Option<String>,
    pub order: u32,
    pub geo_x: f64,
    pub geo_y: f64,
}

impl From<&RoutedEmployee> for EmployeeOut {
    fn from(re: &RoutedEmployee) -> Self {
        EmployeeOut {
            emp_code: re.employee.emp_code.clone(),
            gender: re.employee.gender,
            is_medical: re.employee.is_medical,
            is_pwd: re.employee.is_pwd,
            is_nmt: re.employee.is_nmt,
            is_oob: re.employee.is_oob,
            eta: re.eta_seconds.map(seconds_to_hhmm),
            order: re.order,
            geo_x: re.employee.lng,
            geo_y: re.employee.lat,
        }
    }
}

fn seconds_to_hhmm(total_seconds: i64) -> String {
    let normalized = total_seconds.rem_euclid(24 * 3600);
    format!("{:02}:{:02}", normalized / 3600, (normalized % 3600) / 60)
}

#[derive(Debug, Clone, Serialize)]
pub struct SwappedPairInfoOut {
    pub moved_off_critical_seat: String,
    pub moved_onto_critical_seat: String,
}

impl From<&SwappedPairInfo> for SwappedPairInfoOut {
    fn from(info: &SwappedPairInfo) -> Self {
        SwappedPairInfoOut {
            moved_off_critical_seat: info.moved_off_critical_seat.clone(),
            moved_onto_critical_seat: info.moved_onto_critical_seat.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub route_number: u32,
    pub zone: String,
    pub vehicle_capacity: u32,
    pub vehicle_type: String,
    pub guard: bool,
    pub swapped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swapped_pair_info: Option<SwappedPairInfoOut>,
    pub duration_exceeded: bool,
    pub unique_key: String,
    pub is_special_needs_route: bool,
    pub after_fleet_exhaustion: bool,
    /// km
    pub distance: f64,
    /// seconds
    pub duration: f64,
    pub occupancy: u32,
    /// km
    pub farthest_employee_distance: f64,
    pub is_medical_route: bool,
    pub is_pwd_route: bool,
    pub is_nmt_route: bool,
    pub is_oob_route: bool,
    pub encoded_polyline: String,
    pub employees: Vec<EmployeeOut>,
}

impl RouteSummary {
    pub fn from_route(route: &Route, route_number: u32) -> Self {
        RouteSummary {
            route_number,
            zone: route.zone.clone(),
            vehicle_capacity: route.vehicle_capacity,
            vehicle_type: route.assigned_vehicle_type.clone(),
            guard: route.guard_needed,
            swapped: route.swapped,
            swapped_pair_info: route.swapped_pair_info.as_ref().map(SwappedPairInfoOut::from),
            duration_exceeded: route.duration_exceeded,
            unique_key: route.unique_key.clone(),
            is_special_needs_route: route.is_special_needs_route,
            after_fleet_exhaustion: route.after_fleet_exhaustion,
            distance: route.route_details.total_distance_m / 1000.0,
            duration: route.route_details.total_duration_s,
            occupancy: route.occupancy(),
            farthest_employee_distance: route.farthest_employee_distance_km,
            is_medical_route: route.is_medical_route(),
            is_pwd_route: route.is_pwd_route(),
            is_nmt_route: route.is_nmt_route(),
            is_oob_route: route.is_oob_route(),
            encoded_polyline: route.route_details.encoded_polyline.clone(),
            employees: route.employees.iter().map(EmployeeOut::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UnroutedEmployeeOut {
    pub emp_code: String,
    pub gender: Gender,
    pub is_medical: bool,
    pub is_pwd: bool,
    pub is_nmt: bool,
    pub is_oob: bool,
    pub geo_x: f64,
    pub geo_y: f64,
    /// Diagnostic, not part of the normative response shape: why the
    /// recycler (C10) gave up on this employee.
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct OverallRouteDetails {
    /// km
    pub total_distance: f64,
    /// seconds
    pub total_duration: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteResponse {
    pub uuid: String,
    pub date: String,
    pub shift: String,
    pub trip_type: String,
    pub total_employees: u32,
    pub total_routed_employees: u32,
    pub total_routes: u32,
    pub total_guarded_routes: u32,
    pub average_occupancy: f64,
    pub overall_route_details: OverallRouteDetails,
    pub total_swapped_routes: u32,
    pub routes: Vec<RouteSummary>,
    pub unrouted_employees: Vec<UnroutedEmployeeOut>,
}
