use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use shared_database::{EntityStore, InMemoryEntityStore, SharedStore, StoreError, StoreResult};
use shared_models::{
    Appointment, AppointmentFilter, Doctor, NewAppointment, NewDoctor, NotificationDraft,
    NewPatient, Notification, Patient, ScheduleEntry,
};

pub async fn seed_patient(store: &dyn EntityStore, name: &str) -> Patient {
    store
        .insert_patient(NewPatient {
            name: name.to_string(),
            phone: "+353 1 555 0100".to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            medical_id: format!("MID-{}", &Uuid::new_v4().simple().to_string()[..8]),
        })
        .await
        .expect("seeding a patient into the test store")
}

pub async fn seed_doctor(store: &dyn EntityStore, name: &str, specialty: &str) -> Doctor {
    store
        .insert_doctor(NewDoctor {
            name: name.to_string(),
            specialty: specialty.to_string(),
            contact: "front-desk@example.com".to_string(),
        })
        .await
        .expect("seeding a doctor into the test store")
}

/// How long a stalled due listing hangs before answering.
const STALL: Duration = Duration::from_secs(30);

/// In-memory store whose individual operations can be made to fail or hang.
#[derive(Default)]
pub struct FlakyStore {
    inner: InMemoryEntityStore,
    fail_notification_inserts: AtomicBool,
    fail_due_listing: AtomicBool,
    stall_due_listing: AtomicBool,
    fail_transitions: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn shared(self: &Arc<Self>) -> SharedStore {
        Arc::clone(self) as SharedStore
    }

    pub fn fail_notification_inserts(&self, fail: bool) {
        self.fail_notification_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_due_listing(&self, fail: bool) {
        self.fail_due_listing.store(fail, Ordering::SeqCst);
    }

    pub fn stall_due_listing(&self, stall: bool) {
        self.stall_due_listing.store(stall, Ordering::SeqCst);
    }

    pub fn fail_transitions(&self, fail: bool) {
        self.fail_transitions.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, what: &str) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{} failed: connection reset", what)));
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore for FlakyStore {
    async fn insert_patient(&self, patient: NewPatient) -> StoreResult<Patient> {
        self.inner.insert_patient(patient).await
    }

    async fn get_patient(&self, id: Uuid) -> StoreResult<Patient> {
        self.inner.get_patient(id).await
    }

    async fn insert_doctor(&self, doctor: NewDoctor) -> StoreResult<Doctor> {
        self.inner.insert_doctor(doctor).await
    }

    async fn get_doctor(&self, id: Uuid) -> StoreResult<Doctor> {
        self.inner.get_doctor(id).await
    }

    async fn insert_appointment(&self, appointment: NewAppointment) -> StoreResult<Appointment> {
        self.inner.insert_appointment(appointment).await
    }

    async fn get_appointment(&self, id: Uuid) -> StoreResult<Appointment> {
        self.inner.get_appointment(id).await
    }

    async fn list_patient_appointments(
        &self,
        patient_id: Uuid,
        filter: &AppointmentFilter,
    ) -> StoreResult<Vec<Appointment>> {
        self.inner.list_patient_appointments(patient_id, filter).await
    }

    async fn doctor_schedule(
        &self,
        specialty: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> StoreResult<Vec<ScheduleEntry>> {
        self.inner.doctor_schedule(specialty, from, to).await
    }

    async fn insert_notification(&self, notification: NotificationDraft) -> StoreResult<Notification> {
        Self::check(&self.fail_notification_inserts, "insert notification")?;
        self.inner.insert_notification(notification).await
    }

    async fn list_due_notifications(&self, now: DateTime<Utc>) -> StoreResult<Vec<Notification>> {
        Self::check(&self.fail_due_listing, "list due notifications")?;
        if self.stall_due_listing.load(Ordering::SeqCst) {
            tokio::time::sleep(STALL).await;
        }
        self.inner.list_due_notifications(now).await
    }

    async fn list_appointment_notifications(
        &self,
        appointment_id: Uuid,
    ) -> StoreResult<Vec<Notification>> {
        self.inner.list_appointment_notifications(appointment_id).await
    }

    async fn mark_notification_sent(&self, id: Uuid) -> StoreResult<bool> {
        Self::check(&self.fail_transitions, "mark notification sent")?;
        self.inner.mark_notification_sent(id).await
    }

    async fn mark_notification_failed(&self, id: Uuid, error: &str) -> StoreResult<bool> {
        Self::check(&self.fail_transitions, "mark notification failed")?;
        self.inner.mark_notification_failed(id, error).await
    }
}
