//! Core pipeline error type (§10.4). Kept separate from the HTTP-boundary
//! `AppError` in `utils::error` so library consumers never depend on actix.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("road service unavailable: {0}")]
    RoadServiceUnavailable(String),
    #[error("constraint violated: {0}")]
    ConstraintViolated(String),
    #[error("capacity impossible: {0}")]
    CapacityImpossible(#[from] crate::fleet::FleetError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<crate::time::TimeError> for PipelineError {
    fn from(e: crate::time::TimeError) -> Self {
        PipelineError::InvalidInput(e.to_string())
    }
}
