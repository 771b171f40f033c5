use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::{
    Appointment, AppointmentFilter, Doctor, NewAppointment, NewDoctor, NotificationDraft,
    NewPatient, Notification, NotificationStatus, Patient, ScheduleEntry,
};

use crate::store::{EntityStore, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    patients: HashMap<Uuid, Patient>,
    doctors: HashMap<Uuid, Doctor>,
    appointments: HashMap<Uuid, Appointment>,
    booked_slots: HashSet<(Uuid, DateTime<Utc>)>,
    notifications: HashMap<Uuid, Notification>,
}

/// Process-local store. All writes go through one lock, so the slot
/// uniqueness check and the insert happen atomically.
#[derive(Default)]
pub struct InMemoryEntityStore {
    tables: RwLock<Tables>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn transition(
        &self,
        id: Uuid,
        target: NotificationStatus,
        error: Option<&str>,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        let Some(notification) = tables.notifications.get_mut(&id) else {
            return Ok(false);
        };

        if !notification.status.can_transition_to(&target) {
            debug!(
                "Notification {} is {} - ignoring transition to {}",
                id, notification.status, target
            );
            return Ok(false);
        }

        notification.status = target;
        notification.last_error = error.map(str::to_string);
        Ok(true)
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn insert_patient(&self, patient: NewPatient) -> StoreResult<Patient> {
        let patient = Patient {
            id: Uuid::new_v4(),
            name: patient.name,
            phone: patient.phone,
            email: patient.email,
            medical_id: patient.medical_id,
            created_at: Utc::now(),
        };

        self.tables.write().await.patients.insert(patient.id, patient.clone());
        Ok(patient)
    }

    async fn get_patient(&self, id: Uuid) -> StoreResult<Patient> {
        self.tables
            .read()
            .await
            .patients
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("patient {}", id)))
    }

    async fn insert_doctor(&self, doctor: NewDoctor) -> StoreResult<Doctor> {
        let doctor = Doctor {
            id: Uuid::new_v4(),
            name: doctor.name,
            specialty: doctor.specialty,
            contact: doctor.contact,
            created_at: Utc::now(),
        };

        self.tables.write().await.doctors.insert(doctor.id, doctor.clone());
        Ok(doctor)
    }

    async fn get_doctor(&self, id: Uuid) -> StoreResult<Doctor> {
        self.tables
            .read()
            .await
            .doctors
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("doctor {}", id)))
    }

    async fn insert_appointment(&self, appointment: NewAppointment) -> StoreResult<Appointment> {
        let mut tables = self.tables.write().await;

        let slot = (appointment.doctor_id, appointment.time_slot);
        if !tables.booked_slots.insert(slot) {
            return Err(StoreError::UniquenessViolation(format!(
                "doctor {} already has an appointment at {}",
                appointment.doctor_id, appointment.time_slot
            )));
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            time_slot: appointment.time_slot,
            status: appointment.status,
            notes: appointment.notes,
            created_at: Utc::now(),
        };
        tables.appointments.insert(appointment.id, appointment.clone());

        Ok(appointment)
    }

    async fn get_appointment(&self, id: Uuid) -> StoreResult<Appointment> {
        self.tables
            .read()
            .await
            .appointments
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("appointment {}", id)))
    }

    async fn list_patient_appointments(
        &self,
        patient_id: Uuid,
        filter: &AppointmentFilter,
    ) -> StoreResult<Vec<Appointment>> {
        let tables = self.tables.read().await;

        let mut appointments: Vec<Appointment> = tables
            .appointments
            .values()
            .filter(|a| a.patient_id == patient_id && filter.matches(a))
            .cloned()
            .collect();
        appointments.sort_by(|a, b| a.time_slot.cmp(&b.time_slot).then(a.id.cmp(&b.id)));

        Ok(appointments
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect())
    }

    async fn doctor_schedule(
        &self,
        specialty: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> StoreResult<Vec<ScheduleEntry>> {
        let tables = self.tables.read().await;
        let window = AppointmentFilter {
            from,
            to,
            ..Default::default()
        };

        let mut entries: Vec<ScheduleEntry> = tables
            .appointments
            .values()
            .filter(|a| window.matches(a))
            .filter_map(|a| {
                let doctor = tables.doctors.get(&a.doctor_id)?;
                (doctor.specialty == specialty).then(|| ScheduleEntry {
                    doctor_id: doctor.id,
                    doctor_name: doctor.name.clone(),
                    specialty: doctor.specialty.clone(),
                    appointment_id: a.id,
                    patient_id: a.patient_id,
                    time_slot: a.time_slot,
                    status: a.status.clone(),
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            a.time_slot
                .cmp(&b.time_slot)
                .then(a.doctor_id.cmp(&b.doctor_id))
        });

        Ok(entries)
    }

    async fn insert_notification(&self, notification: NotificationDraft) -> StoreResult<Notification> {
        let notification = Notification {
            id: Uuid::new_v4(),
            appointment_id: notification.appointment_id,
            kind: notification.kind,
            send_at: notification.send_at,
            status: notification.status,
            last_error: None,
            created_at: Utc::now(),
        };

        self.tables
            .write()
            .await
            .notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn list_due_notifications(&self, now: DateTime<Utc>) -> StoreResult<Vec<Notification>> {
        let tables = self.tables.read().await;

        let mut due: Vec<Notification> = tables
            .notifications
            .values()
            .filter(|n| n.is_due(now))
            .cloned()
            .collect();
        due.sort_by(|a, b| {
            a.send_at
                .cmp(&b.send_at)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });

        Ok(due)
    }

    async fn list_appointment_notifications(
        &self,
        appointment_id: Uuid,
    ) -> StoreResult<Vec<Notification>> {
        let tables = self.tables.read().await;

        let mut notifications: Vec<Notification> = tables
            .notifications
            .values()
            .filter(|n| n.appointment_id == appointment_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| a.send_at.cmp(&b.send_at).then(a.id.cmp(&b.id)));

        Ok(notifications)
    }

    async fn mark_notification_sent(&self, id: Uuid) -> StoreResult<bool> {
        self.transition(id, NotificationStatus::Sent, None).await
    }

    async fn mark_notification_failed(&self, id: Uuid, error: &str) -> StoreResult<bool> {
        self.transition(id, NotificationStatus::Failed, Some(error)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Duration;
    use shared_models::NotificationKind;

    fn new_appointment(doctor_id: Uuid, time_slot: DateTime<Utc>) -> NewAppointment {
        NewAppointment {
            patient_id: Uuid::new_v4(),
            doctor_id,
            time_slot,
            status: "confirmed".to_string(),
            notes: String::new(),
        }
    }

    fn pending(appointment_id: Uuid, send_at: DateTime<Utc>) -> NotificationDraft {
        NotificationDraft {
            appointment_id,
            kind: NotificationKind::Email,
            send_at,
            status: NotificationStatus::Pending,
        }
    }

    #[tokio::test]
    async fn test_same_doctor_same_slot_is_rejected() {
        let store = InMemoryEntityStore::new();
        let doctor_id = Uuid::new_v4();
        let slot = Utc::now() + Duration::days(1);

        store.insert_appointment(new_appointment(doctor_id, slot)).await.unwrap();
        let second = store.insert_appointment(new_appointment(doctor_id, slot)).await;
        assert_matches!(second, Err(StoreError::UniquenessViolation(_)));

        // Different doctor, same instant is fine.
        store
            .insert_appointment(new_appointment(Uuid::new_v4(), slot))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_due_listing_is_ordered_and_excludes_terminal() {
        let store = InMemoryEntityStore::new();
        let now = Utc::now();
        let appointment_id = Uuid::new_v4();

        let late = store.insert_notification(pending(appointment_id, now)).await.unwrap();
        let early = store
            .insert_notification(pending(appointment_id, now - Duration::minutes(5)))
            .await
            .unwrap();
        let future = store
            .insert_notification(pending(appointment_id, now + Duration::minutes(5)))
            .await
            .unwrap();

        let due = store.list_due_notifications(now).await.unwrap();
        let ids: Vec<Uuid> = due.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![early.id, late.id]);

        assert!(store.mark_notification_sent(early.id).await.unwrap());
        let due = store.list_due_notifications(now).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, late.id);
        assert!(!due.iter().any(|n| n.id == future.id));
    }

    #[tokio::test]
    async fn test_terminal_notifications_are_not_retransitioned() {
        let store = InMemoryEntityStore::new();
        let n = store
            .insert_notification(pending(Uuid::new_v4(), Utc::now()))
            .await
            .unwrap();

        assert!(store.mark_notification_failed(n.id, "smtp down").await.unwrap());
        assert!(!store.mark_notification_sent(n.id).await.unwrap());
        assert!(!store.mark_notification_failed(n.id, "again").await.unwrap());

        let stored = store.list_appointment_notifications(n.appointment_id).await.unwrap();
        assert_eq!(stored[0].status, NotificationStatus::Failed);
        assert_eq!(stored[0].last_error.as_deref(), Some("smtp down"));
    }

    #[tokio::test]
    async fn test_unknown_notification_transition_is_noop() {
        let store = InMemoryEntityStore::new();
        assert!(!store.mark_notification_sent(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_entities_report_not_found() {
        let store = InMemoryEntityStore::new();
        assert_matches!(store.get_patient(Uuid::new_v4()).await, Err(StoreError::NotFound(_)));
        assert_matches!(store.get_doctor(Uuid::new_v4()).await, Err(StoreError::NotFound(_)));
        assert_matches!(
            store.get_appointment(Uuid::new_v4()).await,
            Err(StoreError::NotFound(_))
        );
    }
}
