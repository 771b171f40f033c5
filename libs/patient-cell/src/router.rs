use axum::{routing::{get, post}, Router};

use shared_database::SharedStore;

use crate::handlers::*;

pub fn create_patient_router(store: SharedStore) -> Router {
    Router::new()
        .route("/", post(create_patient))
        .route("/{id}", get(get_patient))
        .route("/{id}/appointments", get(get_patient_appointments))
        .with_state(store)
}
