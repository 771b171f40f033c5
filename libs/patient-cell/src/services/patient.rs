use tracing::{debug, info, instrument};
use uuid::Uuid;

use shared_database::{SharedStore, StoreError};
use shared_models::{Appointment, NewPatient, Patient};

use crate::models::{CreatePatientRequest, PatientAppointmentsQuery, PatientError};

pub struct PatientService {
    store: SharedStore,
}

impl PatientService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(PatientError::ValidationError("name is required".to_string()));
        }

        debug!("Creating patient record for: {}", name);

        let patient = self
            .store
            .insert_patient(NewPatient {
                name: name.to_string(),
                phone: request.phone.trim().to_string(),
                email: request.email.trim().to_string(),
                medical_id: request.medical_id.trim().to_string(),
            })
            .await?;

        info!("Patient {} created", patient.id);
        Ok(patient)
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        debug!("Fetching patient: {}", patient_id);

        self.store.get_patient(patient_id).await.map_err(|e| match e {
            StoreError::NotFound(_) => PatientError::NotFound(patient_id),
            other => PatientError::DatabaseError(other),
        })
    }

    /// Lists a patient's appointments ordered by time slot. An unknown patient
    /// simply has no appointments.
    #[instrument(skip(self, query))]
    pub async fn get_patient_appointments(
        &self,
        patient_id: Uuid,
        query: &PatientAppointmentsQuery,
    ) -> Result<Vec<Appointment>, PatientError> {
        let filter = query.to_filter();
        debug!(
            "Listing appointments (from={:?}, to={:?}, status={:?}, limit={}, offset={})",
            filter.from, filter.to, filter.status, filter.limit, filter.offset
        );

        Ok(self.store.list_patient_appointments(patient_id, &filter).await?)
    }
}
