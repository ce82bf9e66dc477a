use std::sync::Arc;

use actix_web::{test, web, App};
use async_trait::async_trait;
use shuttle_router::models::profile::Tunables;
use shuttle_router::services::osrm::{Leg, RoadService, RoadServiceError, RouteResult, TableResult};
use shuttle_router::services::vrp_solver::{SolverError, VrpProblem, VrpSolution, VrpSolver};
use shuttle_router::Orchestrator;

struct ConstantRoad;

#[async_trait]
impl RoadService for ConstantRoad {
    async fn route(&self, _city: &str, coords: &[(f64, f64)], _shift_decimal_hour: f64, _tunables: &Tunables) -> Result<RouteResult, RoadServiceError> {
        let legs = (0..coords.len().saturating_sub(1)).map(|_| Leg { distance_m: 1000.0, duration_s: 120.0 }).collect();
        Ok(RouteResult {
            distance_m: 1000.0 * coords.len().saturating_sub(1) as f64,
            duration_s: 120.0 * coords.len().saturating_sub(1) as f64,
            legs,
            encoded_polyline: String::new(),
            geometry: vec![],
        })
    }

    async fn table(&self, _city: &str, sources: &[(f64, f64)], destinations: &[(f64, f64)], _include_distances: bool) -> Result<TableResult, RoadServiceError> {
        Ok(TableResult { durations: vec![vec![120.0; destinations.len()]; sources.len()], distances: None })
    }
}

struct IdentitySolver;

#[async_trait]
impl VrpSolver for IdentitySolver {
    async fn solve(&self, problem: &VrpProblem) -> Result<VrpSolution, SolverError> {
        let n = problem.distance_matrix.len().saturating_sub(1);
        Ok(VrpSolution { routes: vec![(1..=n).collect()], dropped_node_indices: vec![], error: None })
    }
}

fn orchestrator() -> Arc<Orchestrator> {
    Arc::new(Orchestrator::new(Arc::new(ConstantRoad), Arc::new(IdentitySolver)))
}

#[actix_web::test]
async fn health_check_reports_ok() {
    let app = test::init_service(App::new().configure(shuttle_router::api::configure_routes)).await;
    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body = test::read_body(resp).await;
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["status"], "ok");
}

#[actix_web::test]
async fn route_endpoint_forms_routes_for_a_small_request() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(orchestrator()))
            .configure(shuttle_router::api::configure_routes),
    )
    .await;

    let body = serde_json::json!({
        "uuid": "req-1",
        "date": "2026-07-28",
        "shift_time": "0930",
        "trip_type": "PICKUP",
        "employees": [
            {"emp_code": "E1", "geo_x": 77.50, "geo_y": 12.90, "gender": "M"},
            {"emp_code": "E2", "geo_x": 77.51, "geo_y": 12.91, "gender": "F"}
        ],
        "facility": {"geo_x": 77.60, "geo_y": 13.00},
        "profile": {
            "name": "blr",
            "facility_type": "TECH_PARK",
            "bypass_deviation_check": true,
            "fleet": [{"type": "s", "capacity": 6, "count": 2}]
        }
    });

    let req = test::TestRequest::post().uri("/api/route").set_json(&body).to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success(), "status: {:?}", resp.status());

    let response: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(response["total_employees"], 2);
    assert!(response["total_routes"].as_u64().unwrap() >= 1);
}
