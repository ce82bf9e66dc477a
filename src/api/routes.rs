use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use log::{error, info};

use crate::models::RouteRequest;
use crate::orchestrator::Orchestrator;
use crate::utils::error::AppError;

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn create_route(
    request: web::Json<RouteRequest>,
    orchestrator: web::Data<Arc<Orchestrator>>,
) -> Result<impl Responder, AppError> {
    info!("received {:?} route request for {} employees", request.trip_type, request.employees.len());

    let response = orchestrator.process(request.into_inner()).await.map_err(|e| {
        error!("route formation failed: {}", e);
        e
    })?;

    Ok(HttpResponse::Ok().json(response))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health_check))
            .route("/route", web::post().to(create_route)),
    );
}
