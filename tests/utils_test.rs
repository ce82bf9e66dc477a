use actix_web::{http::StatusCode, ResponseError};
use shuttle_router::error::PipelineError;
use shuttle_router::fleet::FleetError;
use shuttle_router::utils::error::AppError;

#[test]
fn invalid_input_maps_to_bad_request() {
    let error = AppError::Pipeline(PipelineError::InvalidInput("malformed shift_time".to_string()));
    assert_eq!(error.error_response().status(), StatusCode::BAD_REQUEST);
}

#[test]
fn constraint_violated_maps_to_unprocessable_entity() {
    let error = AppError::Pipeline(PipelineError::ConstraintViolated("deviation exceeded".to_string()));
    assert_eq!(error.error_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[test]
fn capacity_impossible_maps_to_unprocessable_entity() {
    let error = AppError::Pipeline(PipelineError::CapacityImpossible(FleetError::CapacityImpossible));
    assert_eq!(error.error_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[test]
fn internal_error_maps_to_internal_server_error() {
    let error = AppError::Internal(anyhow::anyhow!("unexpected"));
    assert_eq!(error.error_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
}
