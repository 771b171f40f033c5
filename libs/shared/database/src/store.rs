use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use shared_models::{
    Appointment, AppointmentFilter, Doctor, NewAppointment, NewDoctor, NotificationDraft,
    NewPatient, Notification, Patient, ScheduleEntry,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A storage-level uniqueness constraint rejected the write.
    #[error("Uniqueness violation: {0}")]
    UniquenessViolation(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to decode store response: {0}")]
    Decode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable storage for the clinic entities.
///
/// `insert_appointment` must enforce that no two appointments share the same
/// `(doctor_id, time_slot)` atomically, reporting losers with
/// [`StoreError::UniquenessViolation`]. The notification transitions only apply
/// to rows that are still `pending`; they return `Ok(false)` otherwise.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn insert_patient(&self, patient: NewPatient) -> StoreResult<Patient>;

    async fn get_patient(&self, id: Uuid) -> StoreResult<Patient>;

    async fn insert_doctor(&self, doctor: NewDoctor) -> StoreResult<Doctor>;

    async fn get_doctor(&self, id: Uuid) -> StoreResult<Doctor>;

    async fn insert_appointment(&self, appointment: NewAppointment) -> StoreResult<Appointment>;

    async fn get_appointment(&self, id: Uuid) -> StoreResult<Appointment>;

    async fn list_patient_appointments(
        &self,
        patient_id: Uuid,
        filter: &AppointmentFilter,
    ) -> StoreResult<Vec<Appointment>>;

    async fn doctor_schedule(
        &self,
        specialty: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> StoreResult<Vec<ScheduleEntry>>;

    async fn insert_notification(&self, notification: NotificationDraft) -> StoreResult<Notification>;

    /// Pending notifications with `send_at <= now`, oldest `send_at` first.
    async fn list_due_notifications(&self, now: DateTime<Utc>) -> StoreResult<Vec<Notification>>;

    async fn list_appointment_notifications(
        &self,
        appointment_id: Uuid,
    ) -> StoreResult<Vec<Notification>>;

    async fn mark_notification_sent(&self, id: Uuid) -> StoreResult<bool>;

    async fn mark_notification_failed(&self, id: Uuid, error: &str) -> StoreResult<bool>;
}

pub type SharedStore = Arc<dyn EntityStore>;
