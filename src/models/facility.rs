use serde::Deserialize;

use super::profile::Profile;

/// Raw facility shape as it arrives in the request body.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestFacility {
    /// longitude
    pub geo_x: f64,
    /// latitude
    pub geo_y: f64,
}

/// The facility a shift routes to/from, plus its resolved profile (§3).
#[derive(Debug, Clone)]
pub struct Facility {
    pub lat: f64,
    pub lng: f64,
    pub profile: Profile,
}

impl Facility {
    pub fn new(raw: RequestFacility, profile: Profile) -> Self {
        Facility { lat: raw.geo_y, lng: raw.geo_x, profile }
    }

    pub fn point(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}
