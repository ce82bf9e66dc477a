use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::error::PipelineError;

/// HTTP-boundary error wrapper: translates [`PipelineError`] and
/// configuration/IO failures into response bodies (§10.4). Kept separate
/// from `PipelineError` so the core library stays actix-free.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Pipeline(PipelineError::InvalidInput(msg)) => HttpResponse::BadRequest().json(json!({
                "error": "Invalid Input",
                "message": msg,
            })),
            AppError::Pipeline(PipelineError::ConstraintViolated(msg)) => HttpResponse::UnprocessableEntity().json(json!({
                "error": "Constraint Violated",
                "message": msg,
            })),
            AppError::Pipeline(PipelineError::RoadServiceUnavailable(_)) => HttpResponse::ServiceUnavailable().json(json!({
                "error": "Road Service Unavailable",
                "message": self.to_string(),
            })),
            AppError::Pipeline(PipelineError::CapacityImpossible(_)) => HttpResponse::UnprocessableEntity().json(json!({
                "error": "Capacity Impossible",
                "message": self.to_string(),
            })),
            _ => HttpResponse::InternalServerError().json(json!({
                "error": "Internal Server Error",
                "message": self.to_string(),
            })),
        }
    }
}
