use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::SharedStore;
use shared_models::error::AppError;

use crate::models::{CreateDoctorRequest, ScheduleQuery};
use crate::services::DoctorService;

#[axum::debug_handler]
pub async fn create_doctor(
    State(store): State<SharedStore>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = DoctorService::new(store);

    let doctor = service.create_doctor(request).await?;

    Ok((StatusCode::CREATED, Json(json!(doctor))))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(store): State<SharedStore>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(store);

    let doctor = service.get_doctor(doctor_id).await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn get_specialty_schedule(
    State(store): State<SharedStore>,
    Path(specialty): Path<String>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(store);

    let schedule = service.get_schedule(&specialty, &query).await?;

    Ok(Json(json!({
        "specialty": specialty,
        "schedule": schedule,
        "total": schedule.len()
    })))
}
