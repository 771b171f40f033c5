use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{
    Appointment, AppointmentFilter, Doctor, NewAppointment, NewDoctor, NotificationDraft,
    NewPatient, Notification, NotificationStatus, Patient, ScheduleEntry,
};

use crate::store::{EntityStore, StoreError, StoreResult};
use crate::supabase::{SupabaseClient, SupabaseError};

impl From<SupabaseError> for StoreError {
    fn from(err: SupabaseError) -> Self {
        if err.is_unique_violation() {
            return StoreError::UniquenessViolation(err.to_string());
        }
        match err {
            SupabaseError::Transport(e) if e.is_decode() => StoreError::Decode(e.to_string()),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Entity store backed by Supabase's PostgREST API.
pub struct SupabaseEntityStore {
    supabase: SupabaseClient,
}

#[derive(Debug, Deserialize)]
struct ScheduleRow {
    id: Uuid,
    patient_id: Uuid,
    doctor_id: Uuid,
    time_slot: DateTime<Utc>,
    status: String,
    doctors: DoctorSummary,
}

#[derive(Debug, Deserialize)]
struct DoctorSummary {
    name: String,
    specialty: String,
}

fn encode_ts(ts: DateTime<Utc>) -> String {
    urlencoding::encode(&ts.to_rfc3339_opts(SecondsFormat::Micros, true)).into_owned()
}

fn time_window(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> String {
    let mut query = String::new();
    if let Some(from) = from {
        query.push_str(&format!("&time_slot=gte.{}", encode_ts(from)));
    }
    if let Some(to) = to {
        query.push_str(&format!("&time_slot=lte.{}", encode_ts(to)));
    }
    query
}

impl SupabaseEntityStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    async fn insert_returning<T>(&self, table: &str, body: Value) -> StoreResult<T>
    where T: DeserializeOwned {
        let rows: Vec<T> = self.supabase.request_with_headers(
            Method::POST,
            &format!("/rest/v1/{}", table),
            Some(body),
            Some(SupabaseClient::return_representation()),
        ).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode(format!("insert into {} returned no rows", table)))
    }

    async fn fetch_one<T>(&self, table: &str, id: Uuid) -> StoreResult<T>
    where T: DeserializeOwned {
        let path = format!("/rest/v1/{}?id=eq.{}&limit=1", table, id);
        let rows: Vec<T> = self.supabase.request(Method::GET, &path, None).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("{} {}", table.trim_end_matches('s'), id)))
    }

    async fn transition(&self, id: Uuid, body: Value) -> StoreResult<bool> {
        let path = format!(
            "/rest/v1/notifications?id=eq.{}&status=eq.{}",
            id,
            NotificationStatus::Pending
        );
        let rows: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(body),
            Some(SupabaseClient::return_representation()),
        ).await?;

        if rows.is_empty() {
            warn!("Notification {} was not pending - transition skipped", id);
        }
        Ok(!rows.is_empty())
    }
}

#[async_trait]
impl EntityStore for SupabaseEntityStore {
    async fn insert_patient(&self, patient: NewPatient) -> StoreResult<Patient> {
        debug!("Creating patient {}", patient.name);
        self.insert_returning("patients", json!(patient)).await
    }

    async fn get_patient(&self, id: Uuid) -> StoreResult<Patient> {
        self.fetch_one("patients", id).await
    }

    async fn insert_doctor(&self, doctor: NewDoctor) -> StoreResult<Doctor> {
        debug!("Creating doctor {} ({})", doctor.name, doctor.specialty);
        self.insert_returning("doctors", json!(doctor)).await
    }

    async fn get_doctor(&self, id: Uuid) -> StoreResult<Doctor> {
        self.fetch_one("doctors", id).await
    }

    async fn insert_appointment(&self, appointment: NewAppointment) -> StoreResult<Appointment> {
        let body = json!({
            "patient_id": appointment.patient_id,
            "doctor_id": appointment.doctor_id,
            "time_slot": appointment.time_slot.to_rfc3339(),
            "status": appointment.status,
            "notes": appointment.notes,
        });
        self.insert_returning("appointments", body).await
    }

    async fn get_appointment(&self, id: Uuid) -> StoreResult<Appointment> {
        self.fetch_one("appointments", id).await
    }

    async fn list_patient_appointments(
        &self,
        patient_id: Uuid,
        filter: &AppointmentFilter,
    ) -> StoreResult<Vec<Appointment>> {
        let mut path = format!("/rest/v1/appointments?patient_id=eq.{}", patient_id);
        path.push_str(&time_window(filter.from, filter.to));
        if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty()) {
            path.push_str(&format!("&status=eq.{}", urlencoding::encode(status)));
        }
        path.push_str(&format!(
            "&order=time_slot.asc,id.asc&limit={}&offset={}",
            filter.limit, filter.offset
        ));

        Ok(self.supabase.request(Method::GET, &path, None).await?)
    }

    async fn doctor_schedule(
        &self,
        specialty: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> StoreResult<Vec<ScheduleEntry>> {
        let mut path = format!(
            "/rest/v1/appointments?select=id,patient_id,doctor_id,time_slot,status,doctors!inner(name,specialty)&doctors.specialty=eq.{}",
            urlencoding::encode(specialty)
        );
        path.push_str(&time_window(from, to));
        path.push_str("&order=time_slot.asc");

        let rows: Vec<ScheduleRow> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(rows
            .into_iter()
            .map(|row| ScheduleEntry {
                doctor_id: row.doctor_id,
                doctor_name: row.doctors.name,
                specialty: row.doctors.specialty,
                appointment_id: row.id,
                patient_id: row.patient_id,
                time_slot: row.time_slot,
                status: row.status,
            })
            .collect())
    }

    async fn insert_notification(&self, notification: NotificationDraft) -> StoreResult<Notification> {
        let body = json!({
            "appointment_id": notification.appointment_id,
            "type": notification.kind,
            "send_at": notification.send_at.to_rfc3339(),
            "status": notification.status,
        });
        self.insert_returning("notifications", body).await
    }

    async fn list_due_notifications(&self, now: DateTime<Utc>) -> StoreResult<Vec<Notification>> {
        let path = format!(
            "/rest/v1/notifications?status=eq.{}&send_at=lte.{}&order=send_at.asc,created_at.asc",
            NotificationStatus::Pending,
            encode_ts(now)
        );
        Ok(self.supabase.request(Method::GET, &path, None).await?)
    }

    async fn list_appointment_notifications(
        &self,
        appointment_id: Uuid,
    ) -> StoreResult<Vec<Notification>> {
        let path = format!(
            "/rest/v1/notifications?appointment_id=eq.{}&order=send_at.asc",
            appointment_id
        );
        Ok(self.supabase.request(Method::GET, &path, None).await?)
    }

    async fn mark_notification_sent(&self, id: Uuid) -> StoreResult<bool> {
        self.transition(id, json!({
            "status": NotificationStatus::Sent,
            "last_error": Value::Null,
        })).await
    }

    async fn mark_notification_failed(&self, id: Uuid, error: &str) -> StoreResult<bool> {
        self.transition(id, json!({
            "status": NotificationStatus::Failed,
            "last_error": error,
        })).await
    }
}
