//! VRP solver client (C4): marshals a problem to a solver subprocess over
//! stdin, parses the last well-formed JSON object on stdout (§4.3).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::models::route::TripType;

#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("failed to spawn solver process: {0}")]
    Spawn(String),
    #[error("solver exited with non-zero status: {0}")]
    NonZeroExit(i32),
    #[error("solver process timed out")]
    Timeout,
    #[error("no well-formed JSON object found in solver output")]
    NoJsonObject,
    #[error("solver reported an error: {0}")]
    SolverReportedError(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct VrpProblem {
    pub distance_matrix: Vec<Vec<f64>>,
    pub duration_matrix: Vec<Vec<f64>>,
    pub num_vehicles: usize,
    pub vehicle_capacities: Vec<u32>,
    pub demands: Vec<u32>,
    pub depot_index: usize,
    pub max_route_duration: u64,
    pub service_times: Vec<u64>,
    pub allow_dropping_visits: bool,
    pub drop_visit_penalty: f64,
    pub facility_coords: (f64, f64),
    pub trip_type: TripType,
    pub direction_penalty_weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_start_node_index_in_matrix: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_end_node_index_in_matrix: Option<usize>,
}

impl VrpProblem {
    /// Zone solve mode (§4.3): one vehicle per customer, dropping allowed.
    pub fn zone_solve(
        distance_matrix: Vec<Vec<f64>>,
        duration_matrix: Vec<Vec<f64>>,
        num_customers: usize,
        vehicle_capacity: u32,
        service_times: Vec<u64>,
        max_route_duration: u64,
        facility_coords: (f64, f64),
        trip_type: TripType,
        direction_penalty_weight: f64,
        drop_visit_penalty: f64,
    ) -> Self {
        VrpProblem {
            distance_matrix,
            duration_matrix,
            num_vehicles: num_customers,
            vehicle_capacities: vec![vehicle_capacity; num_customers],
            demands: (0..=num_customers).map(|i| if i == 0 { 0 } else { 1 }).collect(),
            depot_index: 0,
            max_route_duration,
            service_times,
            allow_dropping_visits: true,
            drop_visit_penalty,
            facility_coords,
            trip_type,
            direction_penalty_weight,
            fixed_start_node_index_in_matrix: None,
            fixed_end_node_index_in_matrix: None,
        }
    }

    /// Re-optimize mode (§4.3, §4.6, §4.8): single vehicle, dropping disallowed,
    /// one endpoint pinned.
    pub fn reoptimize(
        distance_matrix: Vec<Vec<f64>>,
        duration_matrix: Vec<Vec<f64>>,
        vehicle_capacity: u32,
        service_times: Vec<u64>,
        max_route_duration: u64,
        facility_coords: (f64, f64),
        trip_type: TripType,
        direction_penalty_weight: f64,
        pinned_node_index: Option<usize>,
    ) -> Self {
        let num_customers = distance_matrix.len().saturating_sub(1);
        let (fixed_start, fixed_end) = match (trip_type, pinned_node_index) {
            (TripType::Pickup, Some(idx)) => (Some(idx), None),
            (TripType::Dropoff, Some(idx)) => (None, Some(idx)),
            _ => (None, None),
        };
        VrpProblem {
            distance_matrix,
            duration_matrix,
            num_vehicles: 1,
            vehicle_capacities: vec![vehicle_capacity],
            demands: (0..=num_customers).map(|i| if i == 0 { 0 } else { 1 }).collect(),
            depot_index: 0,
            max_route_duration,
            service_times,
            allow_dropping_visits: false,
            drop_visit_penalty: 0.0,
            facility_coords,
            trip_type,
            direction_penalty_weight,
            fixed_start_node_index_in_matrix: fixed_start,
            fixed_end_node_index_in_matrix: fixed_end,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct VrpSolution {
    #[serde(default)]
    pub routes: Vec<Vec<usize>>,
    #[serde(default)]
    pub dropped_node_indices: Vec<usize>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Abstraction over the external VRP solver subprocess (§1, §10.5).
#[async_trait]
pub trait VrpSolver: Send + Sync {
    async fn solve(&self, problem: &VrpProblem) -> Result<VrpSolution, SolverError>;
}

pub struct SubprocessVrpSolver {
    executable: String,
    args: Vec<String>,
    spawn_timeout: Duration,
}

impl SubprocessVrpSolver {
    pub fn new(executable: String, args: Vec<String>, spawn_timeout: Duration) -> Self {
        SubprocessVrpSolver { executable, args, spawn_timeout }
    }
}

/// Scans stdout for the last top-level, well-formed JSON object, per §4.3
/// ("parse the *last* well-formed top-level JSON object from stdout").
fn last_json_object(stdout: &str) -> Option<Value> {
    let mut depth = 0i32;
    let mut start: Option<usize> = None;
    let mut candidates = Vec::new();
    for (i, ch) in stdout.char_indices() {
        match ch {
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start {
                        candidates.push(&stdout[s..=i]);
                    }
                    start = None;
                }
            }
            _ => {}
        }
    }
    candidates.into_iter().rev().find_map(|c| serde_json::from_str(c).ok())
}

#[async_trait]
impl VrpSolver for SubprocessVrpSolver {
    async fn solve(&self, problem: &VrpProblem) -> Result<VrpSolution, SolverError> {
        let payload = serde_json::to_vec(problem).map_err(|e| SolverError::Spawn(e.to_string()))?;

        let mut child = Command::new(&self.executable)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SolverError::Spawn(e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&payload).await.map_err(|e| SolverError::Spawn(e.to_string()))?;
        }

        let output = tokio::time::timeout(self.spawn_timeout, child.wait_with_output())
            .await
            .map_err(|_| SolverError::Timeout)?
            .map_err(|e| SolverError::Spawn(e.to_string()))?;

        if !output.status.success() {
            return Err(SolverError::NonZeroExit(output.status.code().unwrap_or(-1)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let solution: VrpSolution = last_json_object(&stdout)
            .and_then(|v| serde_json::from_value(v).ok())
            .ok_or(SolverError::NoJsonObject)?;

        if let Some(err) = &solution.error {
            return Err(SolverError::SolverReportedError(err.clone()));
        }

        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_last_json_object_amid_log_noise() {
        let stdout = "starting solver...\n{\"routes\": [[1]], \"dropped_node_indices\": []}\nsome trailing log {not json}\n{\"routes\": [[2,3]], \"dropped_node_indices\": [4]}";
        let value = last_json_object(stdout).unwrap();
        let solution: VrpSolution = serde_json::from_value(value).unwrap();
        assert_eq!(solution.routes, vec![vec![2, 3]]);
        assert_eq!(solution.dropped_node_indices, vec![4]);
    }

    #[test]
    fn returns_none_when_no_object_present() {
        assert!(last_json_object("just some text, no braces here").is_none());
    }
}
