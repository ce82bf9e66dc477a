use serde::Deserialize;
use std::collections::HashMap;

/// One vehicle class in the fleet, e.g. `{type: "s", capacity: 4, count: 10}`.
#[derive(Debug, Clone, Deserialize)]
pub struct FleetClass {
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub capacity: u32,
    pub count: u32,
}

/// A deviation band: bounds a route's total one-way distance as a function of
/// its farthest-employee road distance from the facility (§4.7, GLOSSARY).
#[derive(Debug, Clone, Deserialize)]
pub struct DeviationRule {
    pub min_dist_km: f64,
    pub max_dist_km: f64,
    pub max_total_one_way_km: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NightShiftWindow {
    /// HHMM
    pub start: String,
    /// HHMM
    pub end: String,
}

/// A band of the piecewise time-of-day traffic buffer (§4.2).
#[derive(Debug, Clone, Deserialize)]
pub struct TrafficBufferBand {
    pub start_hour: f64,
    pub end_hour: f64,
    pub buffer: f64,
}

fn default_traffic_bands() -> Vec<TrafficBufferBand> {
    vec![
        TrafficBufferBand { start_hour: 7.0, end_hour: 10.0, buffer: 0.60 },
        TrafficBufferBand { start_hour: 10.0, end_hour: 16.0, buffer: 0.40 },
        TrafficBufferBand { start_hour: 16.0, end_hour: 20.0, buffer: 0.60 },
    ]
}

/// Tunables the spec explicitly refuses to pin down (§9 Open Questions):
/// progress-penalty constants, traffic-buffer bands, and distance thresholds
/// all vary across legacy source variants, so they are profile-overridable
/// rather than hard-coded.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Tunables {
    pub traffic_buffer_bands: Vec<TrafficBufferBand>,
    pub traffic_buffer_default: f64,
    pub eta_buffer_cap: f64,
    pub progress_weight: f64,
    pub distance_weight: f64,
    pub penalty_scalar: f64,
    pub distance_scalar: f64,
    pub pickup_accept_factor: f64,
    pub dropoff_accept_factor: f64,
    pub max_swap_distance_km: f64,
    pub guard_duration_regression_pct: f64,
    pub score_tie_tolerance: f64,
    pub impossible_distance_km: f64,
    pub force_singleton_distance_km: f64,
    pub unrouted_max_group_distance_km: f64,
    pub unrouted_consecutive_distance_km: f64,
    pub unrouted_group_span_km: f64,
    pub unrouted_avg_distance_reduce_km: f64,
    pub unrouted_initial_group_size: usize,
    pub max_unrouted_processing_attempts: u32,
    pub max_trim_attempts_per_group: u32,
    pub unrouted_deviation_tolerance_pct: f64,
    pub unrouted_deviation_tolerance_cap_km: f64,
}

impl Default for Tunables {
    fn default() -> Self {
        Tunables {
            traffic_buffer_bands: default_traffic_bands(),
            traffic_buffer_default: 0.40,
            eta_buffer_cap: 0.40,
            progress_weight: 1.0,
            distance_weight: 1.0,
            penalty_scalar: 0.3,
            distance_scalar: 1.0,
            pickup_accept_factor: 2.5,
            dropoff_accept_factor: 0.95,
            max_swap_distance_km: 1.5,
            guard_duration_regression_pct: 0.25,
            score_tie_tolerance: 1e-6,
            impossible_distance_km: 50.0,
            force_singleton_distance_km: 40.0,
            unrouted_max_group_distance_km: 5.0,
            unrouted_consecutive_distance_km: 5.0,
            unrouted_group_span_km: 12.0,
            unrouted_avg_distance_reduce_km: 15.0,
            unrouted_initial_group_size: 2,
            max_unrouted_processing_attempts: 3,
            max_trim_attempts_per_group: 3,
            unrouted_deviation_tolerance_pct: 0.05,
            unrouted_deviation_tolerance_cap_km: 2.0,
        }
    }
}

fn default_zone_capacity() -> u32 {
    6
}

fn default_max_duration() -> u64 {
    7200
}

fn default_direction_penalty_solve() -> f64 {
    2.0
}

fn default_direction_penalty_reopt() -> f64 {
    0.5
}

/// Per-request routing configuration (§3 "Profile"). Loaded once per request,
/// never mutated, and never a process-level singleton (§9).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub fleet: Vec<FleetClass>,
    pub zone_based_routing: bool,
    pub zone_clubbing: bool,
    pub zone_pairing_matrix: HashMap<String, Vec<String>>,
    pub large_capacity_zones: HashMap<String, u32>,
    pub medium_capacity_zones: HashMap<String, u32>,
    pub small_capacity_zones: HashMap<String, u32>,
    pub route_deviation_rules: HashMap<String, Vec<DeviationRule>>,
    pub max_duration: u64,
    pub direction_penalty_weight_solve: f64,
    pub direction_penalty_weight_reopt: f64,
    pub drop_penalty: f64,
    pub allow_dropping_visits_for_problematic_zones: bool,
    pub night_shift_guard_timings: HashMap<String, NightShiftWindow>,
    /// City key selecting the road-service backend.
    pub name: String,
    /// Facility type, used to key `route_deviation_rules`.
    pub facility_type: String,
    /// A global bypass for the deviation check (§4.7).
    pub bypass_deviation_check: bool,
    pub tunables: Tunables,
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            fleet: Vec::new(),
            zone_based_routing: true,
            zone_clubbing: false,
            zone_pairing_matrix: HashMap::new(),
            large_capacity_zones: HashMap::new(),
            medium_capacity_zones: HashMap::new(),
            small_capacity_zones: HashMap::new(),
            route_deviation_rules: HashMap::new(),
            max_duration: default_max_duration(),
            direction_penalty_weight_solve: default_direction_penalty_solve(),
            direction_penalty_weight_reopt: default_direction_penalty_reopt(),
            drop_penalty: 1_000_000.0,
            allow_dropping_visits_for_problematic_zones: true,
            night_shift_guard_timings: HashMap::new(),
            name: String::from("default"),
            facility_type: String::from("DEFAULT"),
            bypass_deviation_check: false,
            tunables: Tunables::default(),
        }
    }
}

impl Profile {
    /// Heuristic target group size for `zone` (§4.5): looks up the Large/Medium/
    /// Small capacity maps, falling back to the documented default of 6.
    pub fn zone_target_size(&self, zone: &str) -> u32 {
        if let Some(v) = self.large_capacity_zones.get(zone) {
            return *v;
        }
        if let Some(v) = self.medium_capacity_zones.get(zone) {
            return *v;
        }
        if let Some(v) = self.small_capacity_zones.get(zone) {
            return *v;
        }
        default_zone_capacity()
    }

    pub fn deviation_rules(&self) -> &[DeviationRule] {
        self.route_deviation_rules
            .get(&self.facility_type)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

