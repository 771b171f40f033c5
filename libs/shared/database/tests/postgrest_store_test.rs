use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_database::{EntityStore, StoreError, SupabaseEntityStore};
use shared_models::{NewAppointment, NotificationKind, NotificationStatus};

fn store_for(server: &MockServer) -> SupabaseEntityStore {
    let config = AppConfig {
        supabase_url: server.uri(),
        supabase_service_key: "test-service-key".to_string(),
        ..AppConfig::default()
    };
    SupabaseEntityStore::new(&config)
}

#[tokio::test]
async fn test_duplicate_slot_maps_to_uniqueness_violation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(header("Prefer", "return=representation"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "details": "Key (doctor_id, time_slot) already exists.",
            "hint": null,
            "message": "duplicate key value violates unique constraint \"appointments_doctor_slot_key\""
        })))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let result = store
        .insert_appointment(NewAppointment {
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            time_slot: Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap(),
            status: "confirmed".to_string(),
            notes: String::new(),
        })
        .await;

    assert_matches!(result, Err(StoreError::UniquenessViolation(msg)) if msg.contains("duplicate key"));
}

#[tokio::test]
async fn test_foreign_key_conflict_is_not_a_slot_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23503",
            "details": "Key (patient_id) is not present in table \"patients\".",
            "hint": null,
            "message": "insert or update on table \"appointments\" violates foreign key constraint"
        })))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let result = store
        .insert_appointment(NewAppointment {
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            time_slot: Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap(),
            status: "confirmed".to_string(),
            notes: String::new(),
        })
        .await;

    assert_matches!(result, Err(StoreError::Unavailable(msg)) if msg.contains("foreign key"));
}

#[tokio::test]
async fn test_bare_conflict_without_code_is_uniqueness_violation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_string("conflict"))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let result = store
        .insert_appointment(NewAppointment {
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            time_slot: Utc.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap(),
            status: "confirmed".to_string(),
            notes: String::new(),
        })
        .await;

    assert_matches!(result, Err(StoreError::UniquenessViolation(_)));
}

#[tokio::test]
async fn test_missing_patient_is_not_found() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    assert_matches!(store.get_patient(id).await, Err(StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_server_errors_are_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream timeout"))
        .mount(&server)
        .await;

    let store = store_for(&server);
    assert_matches!(store.get_doctor(Uuid::new_v4()).await, Err(StoreError::Unavailable(_)));
}

#[tokio::test]
async fn test_due_query_filters_pending_and_decodes_rows() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/rest/v1/notifications"))
        .and(query_param("status", "eq.pending"))
        .and(query_param("order", "send_at.asc,created_at.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": id,
            "appointment_id": appointment_id,
            "type": "email",
            "send_at": "2024-01-02T00:00:00Z",
            "status": "pending",
            "last_error": null,
            "created_at": "2024-01-01T00:00:00Z"
        }])))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let due = store
        .list_due_notifications(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
        .await
        .unwrap();

    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, id);
    assert_eq!(due[0].kind, NotificationKind::Email);
    assert_eq!(due[0].status, NotificationStatus::Pending);
}

#[tokio::test]
async fn test_transition_is_conditional_on_pending() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/notifications"))
        .and(query_param("id", format!("eq.{}", id)))
        .and(query_param("status", "eq.pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    let applied = store.mark_notification_failed(id, "provider rejected").await.unwrap();
    assert!(!applied);
}
