use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::{SharedStore, StoreError};
use shared_models::error::AppError;

use crate::models::BookAppointmentRequest;
use crate::services::AppointmentBookingService;

fn store_error(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound(_) => AppError::NotFound("appointment not found".to_string()),
        other => AppError::ServiceUnavailable(other.to_string()),
    }
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(store): State<SharedStore>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = AppointmentBookingService::new(store);

    let appointment = service.book_appointment(request).await?;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(store): State<SharedStore>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(store);

    let appointment = service.get_appointment(appointment_id)
        .await
        .map_err(store_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn get_appointment_notifications(
    State(store): State<SharedStore>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(store);

    let notifications = service.get_appointment_notifications(appointment_id)
        .await
        .map_err(store_error)?;

    Ok(Json(json!({
        "notifications": notifications,
        "total": notifications.len()
    })))
}
