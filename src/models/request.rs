use serde::Deserialize;

use super::employee::RequestEmployee;
use super::facility::RequestFacility;
use super::profile::Profile;
use super::route::TripType;
use super::zone::ZoneFeature;

fn default_pickup_time_per_employee() -> u32 {
    180
}

/// A shift's shuttle-routing request (§6).
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRequest {
    pub uuid: String,
    pub date: String,
    /// HHMM
    pub shift_time: String,
    pub trip_type: TripType,
    pub employees: Vec<RequestEmployee>,
    pub facility: RequestFacility,
    pub profile: Profile,
    /// Overrides the configured zone file for this request, if present.
    #[serde(default)]
    pub zones: Option<Vec<ZoneFeature>>,
    #[serde(default)]
    pub guard: bool,
    #[serde(default = "default_pickup_time_per_employee")]
    pub pickup_time_per_employee: u32,
    #[serde(default)]
    pub reporting_time: u32,
}
