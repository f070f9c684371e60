use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use assert_matches::assert_matches;
use serde_json::json;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path, query_param};
use uuid::Uuid;

use appointment_cell::handlers::*;
use appointment_cell::models::*;
use shared_models::{auth::User, error::AppError};
use shared_utils::test_utils::{TestConfig, TestUser, JwtTestUtils, MockSupabaseResponses};

fn create_test_user_extension(user: &TestUser) -> Extension<User> {
    Extension(user.to_user())
}

fn create_auth_header(token: &str) -> TypedHeader<Authorization<Bearer>> {
    let auth = Authorization::bearer(token).unwrap();
    TypedHeader(auth)
}

async fn mount_service(mock_server: &MockServer, name: &str, duration: Option<i64>, price: Option<f64>) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/healthcare_services"))
        .and(query_param("name", format!("eq.{}", name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::healthcare_service_response(name, duration, price, Some(name))
        ])))
        .mount(mock_server)
        .await;
}

async fn mount_unknown_services(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/healthcare_services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(mock_server)
        .await;
}

fn end_time_query(service: Option<&str>, date: Option<&str>, time: Option<&str>) -> Query<EndTimeQuery> {
    Query(EndTimeQuery {
        service: service.map(str::to_string),
        appointment_date: date.map(str::to_string),
        appointment_time: time.map(str::to_string),
    })
}

#[tokio::test]
async fn test_calculate_end_time_from_service_duration() {
    let mock_server = MockServer::start().await;
    mount_service(&mock_server, "Operation", Some(60), Some(1000.0)).await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let result = calculate_end_time(
        State(config),
        end_time_query(Some("Operation"), Some("2025-08-30"), Some("10:00:00")),
    ).await;

    let Json(body) = result.unwrap();
    assert_eq!(body["estimated_end_time"], "11:00:00");
}

#[tokio::test]
async fn test_calculate_end_time_uses_default_duration() {
    let mock_server = MockServer::start().await;
    mount_service(&mock_server, "Consultation", None, Some(300.0)).await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let result = calculate_end_time(
        State(config),
        end_time_query(Some("Consultation"), Some("2025-08-30"), Some("10:00")),
    ).await;

    let Json(body) = result.unwrap();
    assert_eq!(body["estimated_end_time"], "10:03:00");
}

#[tokio::test]
async fn test_calculate_end_time_with_missing_arguments() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let result = calculate_end_time(
        State(config),
        end_time_query(Some("Operation"), None, Some("10:00:00")),
    ).await;

    let Json(body) = result.unwrap();
    assert!(body["estimated_end_time"].is_null());
}

#[tokio::test]
async fn test_calculate_end_time_for_unknown_service() {
    let mock_server = MockServer::start().await;
    mount_unknown_services(&mock_server).await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let result = calculate_end_time(
        State(config),
        end_time_query(Some("Massage"), Some("2025-08-30"), Some("10:00:00")),
    ).await;

    let Json(body) = result.unwrap();
    assert!(body["estimated_end_time"].is_null());
}

#[tokio::test]
async fn test_calculate_end_time_rejects_malformed_time() {
    let mock_server = MockServer::start().await;
    mount_service(&mock_server, "Operation", Some(60), Some(1000.0)).await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let result = calculate_end_time(
        State(config),
        end_time_query(Some("Operation"), Some("2025-08-30"), Some("ten o'clock")),
    ).await;

    assert_matches!(result, Err(AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_calculate_end_time_with_out_of_range_duration() {
    let mock_server = MockServer::start().await;
    mount_service(&mock_server, "Marathon", Some(10_000_000_000_000), None).await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let result = calculate_end_time(
        State(config),
        end_time_query(Some("Marathon"), Some("2025-08-30"), Some("10:00:00")),
    ).await;

    assert_matches!(result, Err(AppError::BadRequest(msg)) if msg.contains("out of range"));
}

#[tokio::test]
async fn test_get_service_price() {
    let mock_server = MockServer::start().await;
    mount_service(&mock_server, "Operation", Some(60), Some(200.0)).await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let result = get_service_price(
        State(config),
        Query(ServicePriceQuery { service: Some("Operation".to_string()) }),
    ).await;

    let Json(body) = result.unwrap();
    assert_eq!(body["price"].as_f64(), Some(200.0));
}

#[tokio::test]
async fn test_get_service_price_defaults_to_zero() {
    let mock_server = MockServer::start().await;
    mount_unknown_services(&mock_server).await;
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_arc();

    let unknown = get_service_price(
        State(config.clone()),
        Query(ServicePriceQuery { service: Some("Massage".to_string()) }),
    ).await.unwrap();
    let empty = get_service_price(
        State(config),
        Query(ServicePriceQuery { service: None }),
    ).await.unwrap();

    assert_eq!(unknown.0["price"].as_f64(), Some(0.0));
    assert_eq!(empty.0["price"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn test_status_change_requires_staff_role() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_supabase_url(&mock_server.uri());
    let patient = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &test_config.jwt_secret, Some(1));

    let result = update_appointment_status(
        State(test_config.to_arc()),
        Path(Uuid::new_v4()),
        create_auth_header(&token),
        create_test_user_extension(&patient),
        Json(StatusUpdateRequest { status: AppointmentStatus::Completed }),
    ).await;

    assert_matches!(result, Err(AppError::Auth(_)));
}

#[tokio::test]
async fn test_get_appointment_returns_document() {
    let mock_server = MockServer::start().await;
    let test_config = TestConfig::with_supabase_url(&mock_server.uri());
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patient_appointments"))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response(&id.to_string(), "2025-10-30", "10:00:00", "11:00:00", "Completed", "Operation", Some(1000.0))
        ])))
        .mount(&mock_server)
        .await;

    let user = TestUser::receptionist("desk@clinic.test");
    let token = JwtTestUtils::create_test_token(&user, &test_config.jwt_secret, Some(1));

    let Json(body) = get_appointment(
        State(test_config.to_arc()),
        Path(id),
        create_auth_header(&token),
    ).await.unwrap();

    assert_eq!(body["id"], id.to_string());
    assert_eq!(body["status"], "Completed");
    assert_eq!(body["estimated_end_time"], "11:00:00");
}
