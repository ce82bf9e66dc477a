//! Road service client (C3): wraps an OSRM-compatible `/route` and `/table`
//! backend, keyed per city, with timeouts and polyline decoding (§4.2).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::geo::polyline_codec;
use crate::models::profile::Tunables;
use crate::time::buffered_duration;

#[derive(Debug, thiserror::Error)]
pub enum RoadServiceError {
    #[error("no road-service backend configured for city {0}")]
    UnknownCity(String),
    #[error("road-service request timed out")]
    Timeout,
    #[error("road-service returned HTTP {0}")]
    HttpStatus(u16),
    #[error("road-service returned non-Ok code: {0}")]
    ServiceCode(String),
    #[error("failed to parse road-service response: {0}")]
    Parse(String),
}

/// Per-city OSRM backend configuration, loaded once per process (§5: shared
/// read-only state).
#[derive(Debug, Clone, Deserialize)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub route_timeout_seconds: u64,
    pub table_timeout_seconds: u64,
    /// Added per coordinate point for `/table` calls (§5).
    pub table_timeout_per_point_ms: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        OsrmConfig {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            route_timeout_seconds: 15,
            table_timeout_seconds: 8,
            table_timeout_per_point_ms: 50,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Leg {
    pub distance_m: f64,
    pub duration_s: f64,
}

#[derive(Debug, Clone)]
pub struct RouteResult {
    pub distance_m: f64,
    /// Total duration after the time-of-day traffic buffer is applied.
    pub duration_s: f64,
    /// Per-leg durations, unbuffered (callers apply their own buffer/cap, e.g. §4.9).
    pub legs: Vec<Leg>,
    pub encoded_polyline: String,
    pub geometry: Vec<(f64, f64)>,
}

#[derive(Debug, Clone)]
pub struct TableResult {
    pub durations: Vec<Vec<f64>>,
    pub distances: Option<Vec<Vec<f64>>>,
}

/// Abstraction over the external road-network service, so the pipeline can be
/// tested against a fake without a live OSRM instance (§1, §10.5).
#[async_trait]
pub trait RoadService: Send + Sync {
    async fn route(
        &self,
        city: &str,
        coords: &[(f64, f64)],
        shift_decimal_hour: f64,
        tunables: &Tunables,
    ) -> Result<RouteResult, RoadServiceError>;

    async fn table(
        &self,
        city: &str,
        sources: &[(f64, f64)],
        destinations: &[(f64, f64)],
        include_distances: bool,
    ) -> Result<TableResult, RoadServiceError>;
}

pub struct HttpRoadService {
    client: Client,
    backends: HashMap<String, OsrmConfig>,
}

impl HttpRoadService {
    pub fn new(backends: HashMap<String, OsrmConfig>) -> Self {
        HttpRoadService {
            client: Client::new(),
            backends,
        }
    }

    fn backend(&self, city: &str) -> Result<&OsrmConfig, RoadServiceError> {
        self.backends.get(city).ok_or_else(|| RoadServiceError::UnknownCity(city.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct RawRoute {
    code: String,
    routes: Vec<RawRouteLeg>,
}

#[derive(Debug, Deserialize)]
struct RawRouteLeg {
    distance: f64,
    duration: f64,
    geometry: Option<String>,
    legs: Vec<RawLeg>,
}

#[derive(Debug, Deserialize)]
struct RawLeg {
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct RawTable {
    code: String,
    durations: Vec<Vec<f64>>,
    #[serde(default)]
    distances: Option<Vec<Vec<f64>>>,
}

fn coords_param(coords: &[(f64, f64)]) -> String {
    coords
        .iter()
        .map(|(lat, lng)| format!("{},{}", lng, lat))
        .collect::<Vec<_>>()
        .join(";")
}

#[async_trait]
impl RoadService for HttpRoadService {
    async fn route(
        &self,
        city: &str,
        coords: &[(f64, f64)],
        shift_decimal_hour: f64,
        tunables: &Tunables,
    ) -> Result<RouteResult, RoadServiceError> {
        let backend = self.backend(city)?;
        let url = format!(
            "{}/route/v1/{}/{}?overview=full&geometries=polyline&steps=false",
            backend.base_url,
            backend.profile,
            coords_param(coords)
        );
        debug!("road-service route request: {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(backend.route_timeout_seconds))
            .send()
            .await
            .map_err(|e| if e.is_timeout() { RoadServiceError::Timeout } else { RoadServiceError::Parse(e.to_string()) })?;

        let status = response.status();
        if !status.is_success() {
            warn!("road-service route call failed with status {}", status);
            return Err(RoadServiceError::HttpStatus(status.as_u16()));
        }

        let parsed: RawRoute = response.json().await.map_err(|e| RoadServiceError::Parse(e.to_string()))?;
        if parsed.code != "Ok" {
            return Err(RoadServiceError::ServiceCode(parsed.code));
        }
        let route = parsed.routes.into_iter().next().ok_or_else(|| RoadServiceError::Parse("no routes in response".into()))?;

        let encoded = route.geometry.unwrap_or_default();
        let geometry = polyline_codec::decode(&encoded).unwrap_or_default();
        let legs = route
            .legs
            .iter()
            .map(|l| Leg { distance_m: l.distance, duration_s: l.duration })
            .collect();

        let duration_s = buffered_duration(route.duration, shift_decimal_hour, tunables, None);

        Ok(RouteResult {
            distance_m: route.distance,
            duration_s,
            legs,
            encoded_polyline: encoded,
            geometry,
        })
    }

    async fn table(
        &self,
        city: &str,
        sources: &[(f64, f64)],
        destinations: &[(f64, f64)],
        include_distances: bool,
    ) -> Result<TableResult, RoadServiceError> {
        let backend = self.backend(city)?;

        let mut all_coords = Vec::with_capacity(sources.len() + destinations.len());
        all_coords.extend_from_slice(sources);
        all_coords.extend_from_slice(destinations);
        let source_idx: Vec<usize> = (0..sources.len()).collect();
        let dest_idx: Vec<usize> = (sources.len()..sources.len() + destinations.len()).collect();

        let annotations = if include_distances { "duration,distance" } else { "duration" };
        let url = format!(
            "{}/table/v1/{}/{}?sources={}&destinations={}&annotations={}",
            backend.base_url,
            backend.profile,
            coords_param(&all_coords),
            source_idx.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(";"),
            dest_idx.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(";"),
            annotations,
        );
        debug!("road-service table request: {}", url);

        let timeout_ms = backend.table_timeout_seconds * 1000
            + backend.table_timeout_per_point_ms * all_coords.len() as u64;

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await
            .map_err(|e| if e.is_timeout() { RoadServiceError::Timeout } else { RoadServiceError::Parse(e.to_string()) })?;

        let status = response.status();
        if !status.is_success() {
            warn!("road-service table call failed with status {}", status);
            return Err(RoadServiceError::HttpStatus(status.as_u16()));
        }

        let parsed: RawTable = response.json().await.map_err(|e| RoadServiceError::Parse(e.to_string()))?;
        if parsed.code != "Ok" {
            return Err(RoadServiceError::ServiceCode(parsed.code));
        }

        Ok(TableResult { durations: parsed.durations, distances: parsed.distances })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_param_orders_lng_lat() {
        assert_eq!(coords_param(&[(12.9, 77.6)]), "77.6,12.9");
    }
}
