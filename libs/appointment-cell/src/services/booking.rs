// libs/appointment-cell/src/services/booking.rs
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use notification_cell::NotificationScheduler;
use shared_database::{SharedStore, StoreError};
use shared_models::{
    Appointment, Notification, NewAppointment, DEFAULT_APPOINTMENT_STATUS,
};

use crate::models::{BookAppointmentRequest, BookingError};

pub struct AppointmentBookingService {
    store: SharedStore,
    scheduler: NotificationScheduler,
}

impl AppointmentBookingService {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            scheduler: NotificationScheduler::new(),
        }
    }

    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, BookingError> {
        self.book_appointment_at(request, Utc::now()).await
    }

    /// Books `request` as of `now`.
    ///
    /// Preconditions are checked in order: patient exists, doctor exists,
    /// slot strictly after `now`. Slot conflicts are not pre-checked; the
    /// store's uniqueness constraint decides between concurrent bookers.
    #[instrument(skip(self, request), fields(patient_id = %request.patient_id, doctor_id = %request.doctor_id))]
    pub async fn book_appointment_at(
        &self,
        request: BookAppointmentRequest,
        now: DateTime<Utc>,
    ) -> Result<Appointment, BookingError> {
        info!("Booking appointment at {}", request.time_slot);

        // **Step 1: Verify Patient Exists**
        self.verify_patient_exists(request.patient_id).await?;

        // **Step 2: Verify Doctor Exists**
        self.verify_doctor_exists(request.doctor_id).await?;

        // **Step 3: Slot Must Be In The Future**
        if request.time_slot <= now {
            return Err(BookingError::InvalidInput(
                "time_slot must be in the future".to_string(),
            ));
        }

        let status = request
            .status
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_APPOINTMENT_STATUS.to_string());

        // **Step 4: Insert, Letting The Store Arbitrate Conflicts**
        let appointment = self
            .store
            .insert_appointment(NewAppointment {
                patient_id: request.patient_id,
                doctor_id: request.doctor_id,
                time_slot: request.time_slot,
                status,
                notes: request.notes.unwrap_or_default(),
            })
            .await
            .map_err(|e| match e {
                StoreError::UniquenessViolation(_) => {
                    warn!(
                        "Doctor {} already booked at {}",
                        request.doctor_id, request.time_slot
                    );
                    BookingError::Conflict {
                        doctor_id: request.doctor_id,
                        time_slot: request.time_slot,
                    }
                }
                other => BookingError::TransientDependency(other.to_string()),
            })?;

        // **Step 5: Schedule Reminders**
        // The appointment is already committed; a failure here is reported, not rolled back.
        if let Err(e) = self.enqueue_notifications(&appointment, now).await {
            warn!(
                "Appointment {} booked but notification scheduling failed: {}",
                appointment.id, e
            );
            return Err(BookingError::PartialFailure {
                appointment: Box::new(appointment),
                reason: e.to_string(),
            });
        }

        info!("Appointment {} booked", appointment.id);
        Ok(appointment)
    }

    async fn verify_patient_exists(&self, patient_id: Uuid) -> Result<(), BookingError> {
        match self.store.get_patient(patient_id).await {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound(_)) => Err(BookingError::PatientNotFound(patient_id)),
            Err(e) => Err(BookingError::TransientDependency(e.to_string())),
        }
    }

    async fn verify_doctor_exists(&self, doctor_id: Uuid) -> Result<(), BookingError> {
        match self.store.get_doctor(doctor_id).await {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound(_)) => Err(BookingError::DoctorNotFound(doctor_id)),
            Err(e) => Err(BookingError::TransientDependency(e.to_string())),
        }
    }

    async fn enqueue_notifications(
        &self,
        appointment: &Appointment,
        now: DateTime<Utc>,
    ) -> Result<Vec<Notification>, StoreError> {
        let mut created = Vec::new();

        for draft in self.scheduler.schedule(appointment, now) {
            debug!("Scheduling {} notification at {}", draft.kind, draft.send_at);
            created.push(self.store.insert_notification(draft).await?);
        }

        Ok(created)
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, StoreError> {
        self.store.get_appointment(appointment_id).await
    }

    pub async fn get_appointment_notifications(
        &self,
        appointment_id: Uuid,
    ) -> Result<Vec<Notification>, StoreError> {
        self.store.get_appointment(appointment_id).await?;
        self.store.list_appointment_notifications(appointment_id).await
    }
}
