use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::SharedStore;
use shared_models::error::AppError;

use crate::models::{CreatePatientRequest, PatientAppointmentsQuery};
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn create_patient(
    State(store): State<SharedStore>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = PatientService::new(store);

    let patient = service.create_patient(request).await?;

    Ok((StatusCode::CREATED, Json(json!(patient))))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(store): State<SharedStore>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(store);

    let patient = service.get_patient(patient_id).await?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(store): State<SharedStore>,
    Path(patient_id): Path<Uuid>,
    Query(query): Query<PatientAppointmentsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(store);

    let appointments = service.get_patient_appointments(patient_id, &query).await?;

    Ok(Json(json!(appointments)))
}
