pub mod employee;
pub mod facility;
pub mod profile;
pub mod request;
pub mod response;
pub mod route;
pub mod zone;

pub use employee::{Employee, Gender, RequestEmployee, RoutedEmployee, DEFAULT_ZONE};
pub use facility::{Facility, RequestFacility};
pub use profile::{DeviationRule, FleetClass, Profile, Tunables};
pub use request::RouteRequest;
pub use response::RouteResponse;
pub use route::{Leg, Route, RouteDetails, SwappedPairInfo, TripType};
pub use zone::{Zone, ZoneFeature, ZoneFeatureCollection};
