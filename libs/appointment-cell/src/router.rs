// libs/appointment-cell/src/router.rs
use axum::{
    Router,
    routing::{get, post},
};

use shared_database::SharedStore;

use crate::handlers;

pub fn appointment_routes(store: SharedStore) -> Router {
    Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/notifications", get(handlers::get_appointment_notifications))
        .with_state(store)
}
