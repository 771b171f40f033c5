use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use shared_models::{AppError, Appointment};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    /// RFC 3339 instant.
    pub time_slot: DateTime<Utc>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Patient {0} not found")]
    PatientNotFound(Uuid),

    #[error("Doctor {0} not found")]
    DoctorNotFound(Uuid),

    #[error("Doctor {doctor_id} already has an appointment at {time_slot}")]
    Conflict {
        doctor_id: Uuid,
        time_slot: DateTime<Utc>,
    },

    /// The appointment is committed but its reminders may be missing.
    #[error("Appointment {} created but failed to enqueue notifications: {reason}", appointment.id)]
    PartialFailure {
        appointment: Box<Appointment>,
        reason: String,
    },

    #[error("Dependency failure: {0}")]
    TransientDependency(String),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::InvalidInput(msg) => AppError::BadRequest(msg),
            BookingError::PatientNotFound(_) => AppError::NotFound("patient not found".to_string()),
            BookingError::DoctorNotFound(_) => AppError::NotFound("doctor not found".to_string()),
            BookingError::Conflict { .. } => AppError::Conflict(
                "doctor already has an appointment at that time_slot".to_string(),
            ),
            BookingError::PartialFailure { appointment, reason } => AppError::PartialFailure {
                message: format!(
                    "appointment created but failed to enqueue notifications: {}",
                    reason
                ),
                detail: json!(appointment),
            },
            BookingError::TransientDependency(msg) => AppError::ServiceUnavailable(msg),
        }
    }
}
