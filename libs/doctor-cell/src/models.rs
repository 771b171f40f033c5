use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::{parse_time_bound, AppError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub specialty: String,
    #[serde(default)]
    pub contact: String,
}

/// Optional time window for a specialty schedule. Unparseable bounds are dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl ScheduleQuery {
    pub fn window(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        (parse_time_bound(self.from.as_deref()), parse_time_bound(self.to.as_deref()))
    }
}

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Doctor {0} not found")]
    NotFound(Uuid),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] StoreError),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound(_) => AppError::NotFound("doctor not found".to_string()),
            DoctorError::ValidationError(msg) => AppError::ValidationError(msg),
            DoctorError::DatabaseError(e) => AppError::ServiceUnavailable(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_schedule_window_parsing() {
        let query = ScheduleQuery {
            from: Some("2030-02-01T00:00:00Z".to_string()),
            to: Some("next week".to_string()),
        };

        let (from, to) = query.window();
        assert_eq!(from, Some(Utc.with_ymd_and_hms(2030, 2, 1, 0, 0, 0).unwrap()));
        assert!(to.is_none());
    }

    #[test]
    fn test_not_found_maps_to_404_message() {
        let err: AppError = DoctorError::NotFound(Uuid::new_v4()).into();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }
}
