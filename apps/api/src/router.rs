use axum::{
    Router,
    routing::get,
};

use appointment_cell::appointment_routes;
use doctor_cell::doctor_routes;
use patient_cell::create_patient_router;
use shared_database::SharedStore;

pub fn create_router(store: SharedStore) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic API is running!" }))
        .nest("/patients", create_patient_router(store.clone()))
        .nest("/doctors", doctor_routes(store.clone()))
        .nest("/appointments", appointment_routes(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use shared_database::InMemoryEntityStore;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_liveness_route() {
        let app = create_router(Arc::new(InMemoryEntityStore::new()));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Clinic API is running!");
    }

    #[tokio::test]
    async fn test_cells_are_mounted() {
        let app = create_router(Arc::new(InMemoryEntityStore::new()));

        for uri in [
            "/patients/00000000-0000-0000-0000-000000000000",
            "/doctors/id/00000000-0000-0000-0000-000000000000",
            "/appointments/00000000-0000-0000-0000-000000000000",
        ] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        }

        let response = app
            .oneshot(Request::builder().uri("/doctors/cardiology/schedule").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
