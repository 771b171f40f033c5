use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::{parse_time_bound, AppError, AppointmentFilter};

const DEFAULT_PAGE_LIMIT: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub medical_id: String,
}

/// Raw query string for `GET /patients/{id}/appointments`.
///
/// Every field is kept as text so that a malformed value degrades to
/// "no filter" instead of rejecting the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientAppointmentsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub status: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl PatientAppointmentsQuery {
    pub fn to_filter(&self) -> AppointmentFilter {
        AppointmentFilter {
            from: parse_time_bound(self.from.as_deref()),
            to: parse_time_bound(self.to.as_deref()),
            status: self
                .status
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            limit: self
                .limit
                .as_deref()
                .and_then(|l| l.trim().parse().ok())
                .unwrap_or(DEFAULT_PAGE_LIMIT),
            offset: self
                .offset
                .as_deref()
                .and_then(|o| o.trim().parse().ok())
                .unwrap_or(0),
        }
    }
}

#[derive(Debug, Error)]
pub enum PatientError {
    #[error("Patient {0} not found")]
    NotFound(Uuid),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] StoreError),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound(_) => AppError::NotFound("patient not found".to_string()),
            PatientError::ValidationError(msg) => AppError::ValidationError(msg),
            PatientError::DatabaseError(e) => AppError::ServiceUnavailable(e.to_string()),
        }
    }
}
