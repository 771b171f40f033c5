use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{SharedStore, StoreError};
use shared_models::{Doctor, NewDoctor, ScheduleEntry};

use crate::models::{CreateDoctorRequest, DoctorError, ScheduleQuery};

pub struct DoctorService {
    store: SharedStore,
}

impl DoctorService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Create a new doctor record
    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        let name = request.name.trim();
        let specialty = request.specialty.trim();

        if name.is_empty() {
            return Err(DoctorError::ValidationError("name is required".to_string()));
        }
        if specialty.is_empty() {
            return Err(DoctorError::ValidationError("specialty is required".to_string()));
        }

        debug!("Creating doctor record for: {} ({})", name, specialty);

        let doctor = self
            .store
            .insert_doctor(NewDoctor {
                name: name.to_string(),
                specialty: specialty.to_string(),
                contact: request.contact.trim().to_string(),
            })
            .await?;

        info!("Doctor {} created", doctor.id);
        Ok(doctor)
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor: {}", doctor_id);

        self.store.get_doctor(doctor_id).await.map_err(|e| match e {
            StoreError::NotFound(_) => DoctorError::NotFound(doctor_id),
            other => DoctorError::DatabaseError(other),
        })
    }

    /// Appointments of every doctor practising `specialty`, ordered by slot.
    pub async fn get_schedule(
        &self,
        specialty: &str,
        query: &ScheduleQuery,
    ) -> Result<Vec<ScheduleEntry>, DoctorError> {
        let (from, to) = query.window();
        debug!("Fetching {} schedule between {:?} and {:?}", specialty, from, to);

        Ok(self.store.doctor_schedule(specialty, from, to).await?)
    }
}
