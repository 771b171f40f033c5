use axum::{
    Router,
    routing::{get, post},
};

use shared_database::SharedStore;

use crate::handlers;

pub fn doctor_routes(store: SharedStore) -> Router {
    Router::new()
        .route("/", post(handlers::create_doctor))
        .route("/id/{doctor_id}", get(handlers::get_doctor))
        .route("/{specialty}/schedule", get(handlers::get_specialty_schedule))
        .with_state(store)
}
