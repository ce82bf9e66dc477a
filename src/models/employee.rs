use serde::{Deserialize, Serialize};

/// Gender as carried on an employee record. Used for the guard-swap rule (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    M,
    F,
}

/// Raw employee shape as it arrives in the request body.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestEmployee {
    pub emp_code: String,
    /// longitude
    pub geo_x: f64,
    /// latitude
    pub geo_y: f64,
    pub gender: Gender,
    #[serde(default)]
    pub is_medical: bool,
    #[serde(default)]
    pub is_pwd: bool,
    #[serde(default)]
    pub is_nmt: bool,
    #[serde(default)]
    pub is_oob: bool,
}

/// Synthetic zone name employees without a polygon match are grouped under.
pub const DEFAULT_ZONE: &str = "DEFAULT_ZONE";

/// An employee as it flows through the pipeline. Immutable after ingestion except
/// for `zone` and `dist_to_facility_km`, which are derived once during zoning
/// (§3). Routes never mutate this record further — see [`RoutedEmployee`].
#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    pub emp_code: String,
    pub lat: f64,
    pub lng: f64,
    pub gender: Gender,
    pub is_medical: bool,
    pub is_pwd: bool,
    pub is_nmt: bool,
    pub is_oob: bool,
    pub zone: String,
    pub dist_to_facility_km: f64,
}

impl Employee {
    /// A route restricted to `isMedical ∨ isPWD` passengers (§3).
    pub fn is_special_needs(&self) -> bool {
        self.is_medical || self.is_pwd
    }

    pub fn is_female(&self) -> bool {
        self.gender == Gender::F
    }

    pub fn is_male(&self) -> bool {
        self.gender == Gender::M
    }

    /// `true` when the raw coordinates are unusable; such employees are dropped
    /// at zone-assignment time and reappear as unrouted in the final diff (§4.1).
    pub fn has_valid_coordinates(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite() && !(self.lat == 0.0 && self.lng == 0.0)
    }
}

impl From<RequestEmployee> for Employee {
    fn from(raw: RequestEmployee) -> Self {
        Employee {
            emp_code: raw.emp_code,
            lat: raw.geo_y,
            lng: raw.geo_x,
            gender: raw.gender,
            is_medical: raw.is_medical,
            is_pwd: raw.is_pwd,
            is_nmt: raw.is_nmt,
            is_oob: raw.is_oob,
            zone: String::new(),
            dist_to_facility_km: 0.0,
        }
    }
}

/// An employee once placed into a route: the base record plus the two fields
/// that are only meaningful in the context of a specific route (§9, "ad-hoc
/// object mutation" mapping).
#[derive(Debug, Clone)]
pub struct RoutedEmployee {
    pub employee: Employee,
    pub order: u32,
    /// Seconds-since-midnight ETA, once computed by the ETA synthesizer (§4.9).
    pub eta_seconds: Option<i64>,
}

impl RoutedEmployee {
    pub fn new(employee: Employee, order: u32) -> Self {
        RoutedEmployee {
            employee,
            order,
            eta_seconds: None,
        }
    }
}

/// Renumbers `order` fields to `1..=len`, restoring the order-monotonicity
/// invariant (§8) after any insertion, trim, or swap.
pub fn renumber(employees: &mut [RoutedEmployee]) {
    for (i, re) in employees.iter_mut().enumerate() {
        re.order = (i + 1) as u32;
    }
}
