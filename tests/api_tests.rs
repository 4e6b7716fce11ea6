use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use inkstudio::config::Config;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Staff account seeded by the initial migration
const ADMIN_USER: &str = "admin";
const ADMIN_PASSWORD: &str = "password";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A single pooled connection keeps every query on the same in-memory DB
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.server.secure_cookies = false;

    let state = inkstudio::api::create_app_state(config)
        .await
        .expect("Failed to create app state");
    inkstudio::api::router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn session_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Expected a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

async fn register_client(app: &Router, username: &str) -> String {
    let response = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "password": "hunter2hunter2",
            "first_name": "Test",
            "last_name": "Client",
            "email": format!("{username}@example.com"),
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

async fn book(app: &Router, cookie: &str, client_name: &str, date: &str) -> Value {
    let response = send(
        app,
        "POST",
        "/api/appointments",
        Some(cookie),
        Some(json!({
            "client_name": client_name,
            "email": "client@example.com",
            "phone": "+351 900 000 000",
            "tattoo_design": "Fine-line fern on the forearm",
            "appointment_date": date,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ============================================================================
// Public surface
// ============================================================================

#[tokio::test]
async fn test_landing_is_public() {
    let app = spawn_app().await;

    let response = send(&app, "GET", "/api/landing", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert!(json["data"]["styles"].is_array());
    assert!(json["data"]["artists"].is_array());
    assert!(json["data"]["studios"].is_array());
    assert!(json["data"]["reviews"].is_array());
}

#[tokio::test]
async fn test_enquiry_validation_reports_every_missing_field() {
    let app = spawn_app().await;

    let response = send(
        &app,
        "POST",
        "/api/enquiries",
        None,
        Some(json!({ "name": "Ana", "email": "not-an-email" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    let fields: Vec<&str> = json["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"phone"));
    assert!(fields.contains(&"message"));

    // Nothing was persisted
    let admin = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;
    let response = send(&app, "GET", "/api/manage/enquiries", Some(&admin), None).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_enquiry_intake_and_staff_inbox() {
    let app = spawn_app().await;

    let response = send(
        &app,
        "POST",
        "/api/enquiries",
        None,
        Some(json!({
            "name": "Ana",
            "email": "ana@example.com",
            "phone": "+351 911 111 111",
            "message": "Looking for a blackwork sleeve quote",
            "preferred_date": "2030-06-01",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_contacted"], false);
    let id = json["data"]["id"].as_i64().unwrap();

    // The inbox is staff-only
    let client = register_client(&app, "ana").await;
    let response = send(&app, "GET", "/api/manage/enquiries", Some(&client), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;
    let response = send(&app, "GET", "/api/manage/enquiries", Some(&admin), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let response = send(
        &app,
        "PUT",
        &format!("/api/enquiries/{id}/contacted"),
        Some(&admin),
        Some(json!({ "is_contacted": true })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", "/api/manage/enquiries", Some(&admin), None).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["is_contacted"], true);
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_protected_routes_require_login() {
    let app = spawn_app().await;

    for uri in [
        "/api/dashboard",
        "/api/appointments",
        "/api/manage/appointments",
        "/api/manage/enquiries",
        "/api/auth/me",
    ] {
        let response = send(&app, "GET", uri, None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri: {uri}");
    }
}

#[tokio::test]
async fn test_login_routes_by_role() {
    let app = spawn_app().await;

    let response = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": ADMIN_USER, "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_staff"], true);
    assert_eq!(json["data"]["next_page"], "manage");

    let response = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": "rui",
            "password": "hunter2hunter2",
            "email": "rui@example.com",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_staff"], false);
    assert_eq!(json["data"]["next_page"], "dashboard");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = spawn_app().await;

    let response = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": ADMIN_USER, "password": "wrong" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_rejects_taken_username() {
    let app = spawn_app().await;

    let response = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": ADMIN_USER,
            "password": "hunter2hunter2",
            "email": "other@example.com",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["fields"][0]["field"], "username");
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let app = spawn_app().await;
    let cookie = register_client(&app, "leila").await;

    let response = send(&app, "GET", "/api/dashboard", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "POST", "/api/auth/logout", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", "/api/dashboard", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Booking workflow
// ============================================================================

#[tokio::test]
async fn test_booking_forces_pending_and_owner() {
    let app = spawn_app().await;
    let cookie = register_client(&app, "ines").await;

    let me = body_json(send(&app, "GET", "/api/auth/me", Some(&cookie), None).await).await;
    let my_id = me["data"]["id"].as_i64().unwrap();

    // Payload tries to smuggle a status and a different owner
    let response = send(
        &app,
        "POST",
        "/api/appointments",
        Some(&cookie),
        Some(json!({
            "client_name": "Inês",
            "email": "ines@example.com",
            "phone": "+351 922 222 222",
            "tattoo_design": "Koi over the shoulder",
            "appointment_date": "2030-05-20T14:00",
            "status": "approved",
            "user_id": 9999,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["user_id"].as_i64().unwrap(), my_id);
}

#[tokio::test]
async fn test_booking_rejects_past_dates_and_bad_input() {
    let app = spawn_app().await;
    let cookie = register_client(&app, "marta").await;

    let response = send(
        &app,
        "POST",
        "/api/appointments",
        Some(&cookie),
        Some(json!({
            "client_name": "Marta",
            "email": "marta@example.com",
            "phone": "+351 933 333 333",
            "tattoo_design": "Script on the wrist",
            "appointment_date": "2001-01-01T10:00",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["fields"][0]["field"], "appointment_date");

    // Everything wrong at once: every violation is reported
    let response = send(
        &app,
        "POST",
        "/api/appointments",
        Some(&cookie),
        Some(json!({ "appointment_date": "not a date" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["fields"].as_array().unwrap().len() >= 5);

    // Nothing was persisted
    let response = send(&app, "GET", "/api/appointments", Some(&cookie), None).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_staff_cannot_use_client_booking_path() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    let response = send(
        &app,
        "POST",
        "/api/appointments",
        Some(&admin),
        Some(json!({
            "client_name": "Walk-in",
            "email": "walkin@example.com",
            "phone": "+351 944 444 444",
            "tattoo_design": "Small anchor",
            "appointment_date": "2030-02-02T11:00",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Visibility scoping
// ============================================================================

#[tokio::test]
async fn test_clients_never_see_each_others_records() {
    let app = spawn_app().await;
    let alice = register_client(&app, "alice").await;
    let bruno = register_client(&app, "bruno").await;

    book(&app, &alice, "Alice", "2030-03-01T10:00").await;
    book(&app, &alice, "Alice", "2030-03-08T10:00").await;
    book(&app, &bruno, "Bruno", "2030-03-02T15:00").await;

    let json = body_json(send(&app, "GET", "/api/appointments", Some(&alice), None).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let json = body_json(send(&app, "GET", "/api/appointments", Some(&bruno), None).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["client_name"], "Bruno");

    // Dashboard aggregates are scoped the same way
    let json = body_json(send(&app, "GET", "/api/dashboard", Some(&bruno), None).await).await;
    assert_eq!(json["data"]["stats"]["total"], 1);
    assert_eq!(json["data"]["stats"]["pending"], 1);

    // Staff see everything
    let admin = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;
    let json =
        body_json(send(&app, "GET", "/api/manage/appointments", Some(&admin), None).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_dashboard_reports_next_session() {
    let app = spawn_app().await;
    let cookie = register_client(&app, "nuno").await;

    book(&app, &cookie, "Nuno", "2030-09-01T10:00").await;
    book(&app, &cookie, "Nuno", "2030-04-01T10:00").await;

    let json = body_json(send(&app, "GET", "/api/dashboard", Some(&cookie), None).await).await;
    assert_eq!(json["data"]["next_session"], "2030-04-01T10:00:00+00:00");
    assert_eq!(json["data"]["upcoming"].as_array().unwrap().len(), 2);
}

// ============================================================================
// Status transitions
// ============================================================================

#[tokio::test]
async fn test_staff_transition_reports_prior_status() {
    let app = spawn_app().await;
    let client = register_client(&app, "sofia").await;
    let booked = book(&app, &client, "Sofia", "2030-07-07T12:00").await;
    let id = booked["data"]["id"].as_i64().unwrap();

    let admin = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;
    let response = send(
        &app,
        "PUT",
        &format!("/api/appointments/{id}/status"),
        Some(&admin),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["prior_status"], "pending");
    assert_eq!(json["data"]["status"], "approved");

    // Transitions are not one-way: approved can go back to pending
    let response = send(
        &app,
        "PUT",
        &format!("/api/appointments/{id}/status"),
        Some(&admin),
        Some(json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["prior_status"], "approved");
}

#[tokio::test]
async fn test_non_staff_cannot_transition_status() {
    let app = spawn_app().await;
    let client = register_client(&app, "tiago").await;
    let booked = book(&app, &client, "Tiago", "2030-08-08T12:00").await;
    let id = booked["data"]["id"].as_i64().unwrap();

    let response = send(
        &app,
        "PUT",
        &format!("/api/appointments/{id}/status"),
        Some(&client),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The record is untouched
    let json = body_json(send(&app, "GET", "/api/appointments", Some(&client), None).await).await;
    assert_eq!(json["data"][0]["status"], "pending");
}

#[tokio::test]
async fn test_unknown_status_is_rejected_without_mutation() {
    let app = spawn_app().await;
    let client = register_client(&app, "vera").await;
    let booked = book(&app, &client, "Vera", "2030-10-10T12:00").await;
    let id = booked["data"]["id"].as_i64().unwrap();

    let admin = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;
    for bad in ["cancelled", "APPROVED", ""] {
        let response = send(
            &app,
            "PUT",
            &format!("/api/appointments/{id}/status"),
            Some(&admin),
            Some(json!({ "status": bad })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "status: {bad:?}");
    }

    let json = body_json(send(&app, "GET", "/api/appointments", Some(&client), None).await).await;
    assert_eq!(json["data"][0]["status"], "pending");
}

// Documented limitation: status writes carry no version token, so when two
// staff decisions race on the same record the later commit silently
// overwrites the earlier one. Each write still reports the prior value it
// replaced, which is the only trace the earlier decision leaves.
#[tokio::test]
async fn test_competing_status_writes_last_write_wins() {
    let app = spawn_app().await;
    let client = register_client(&app, "helena").await;
    let booked = book(&app, &client, "Helena", "2030-09-09T12:00").await;
    let id = booked["data"]["id"].as_i64().unwrap();

    let admin = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    // First staff decision approves, a second overrides with rejected;
    // nothing guards the second write against the first
    let response = send(
        &app,
        "PUT",
        &format!("/api/appointments/{id}/status"),
        Some(&admin),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        "PUT",
        &format!("/api/appointments/{id}/status"),
        Some(&admin),
        Some(json!({ "status": "rejected" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["prior_status"], "approved");

    let json = body_json(send(&app, "GET", "/api/appointments", Some(&client), None).await).await;
    assert_eq!(json["data"][0]["status"], "rejected");
}

#[tokio::test]
async fn test_missing_appointment_returns_not_found() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    let response = send(
        &app,
        "PUT",
        "/api/appointments/424242/status",
        Some(&admin),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_transition_counts_only_real_rows() {
    let app = spawn_app().await;
    let client = register_client(&app, "xavier").await;
    let a = book(&app, &client, "Xavier", "2030-11-01T12:00").await["data"]["id"]
        .as_i64()
        .unwrap();
    let b = book(&app, &client, "Xavier", "2030-11-02T12:00").await["data"]["id"]
        .as_i64()
        .unwrap();

    let admin = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;
    let response = send(
        &app,
        "POST",
        "/api/manage/appointments/status",
        Some(&admin),
        Some(json!({ "ids": [a, b, 424242], "status": "rejected" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["updated"], 2);

    let json = body_json(send(&app, "GET", "/api/appointments", Some(&client), None).await).await;
    for row in json["data"].as_array().unwrap() {
        assert_eq!(row["status"], "rejected");
    }

    // Bulk writes are staff-only too
    let response = send(
        &app,
        "POST",
        "/api/manage/appointments/status",
        Some(&client),
        Some(json!({ "ids": [a], "status": "pending" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Export
// ============================================================================

#[tokio::test]
async fn test_csv_export_is_staff_only_with_fixed_columns() {
    let app = spawn_app().await;
    let client = register_client(&app, "yara").await;
    book(&app, &client, "Yara \"Ink\" Costa", "2030-12-01T12:00").await;

    let response = send(
        &app,
        "GET",
        "/api/manage/appointments/export",
        Some(&client),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;
    let response = send(
        &app,
        "GET",
        "/api/manage/appointments/export",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv"
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Client Name,Email,Phone,Tattoo Design,Appointment Date,Status,Created At"
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("\"Yara \"\"Ink\"\" Costa\""));
    assert!(row.contains("Pending Review"));
}

// ============================================================================
// Edit and delete
// ============================================================================

#[tokio::test]
async fn test_edit_rewrites_fields_but_not_status() {
    let app = spawn_app().await;
    let client = register_client(&app, "zeca").await;
    let booked = book(&app, &client, "Zeca", "2030-06-15T12:00").await;
    let id = booked["data"]["id"].as_i64().unwrap();

    let response = send(
        &app,
        "PUT",
        &format!("/api/appointments/{id}"),
        Some(&client),
        Some(json!({
            "client_name": "Zeca Afonso",
            "email": "zeca@example.com",
            "phone": "+351 955 555 555",
            "tattoo_design": "Grândola mural, full back",
            "appointment_date": "2030-06-20T09:30",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["client_name"], "Zeca Afonso");
    assert_eq!(json["data"]["appointment_date"], "2030-06-20T09:30:00+00:00");
    assert_eq!(json["data"]["status"], "pending");
}

// Documents a known gap carried over from the existing workflow: edit and
// delete check authentication but not ownership. If this ever tightens to
// owner-or-staff, these assertions should flip to FORBIDDEN.
#[tokio::test]
async fn test_edit_and_delete_lack_ownership_checks() {
    let app = spawn_app().await;
    let owner = register_client(&app, "owner").await;
    let intruder = register_client(&app, "intruder").await;

    let booked = book(&app, &owner, "Owner", "2030-05-05T12:00").await;
    let id = booked["data"]["id"].as_i64().unwrap();

    let response = send(
        &app,
        "PUT",
        &format!("/api/appointments/{id}"),
        Some(&intruder),
        Some(json!({
            "client_name": "Hijacked",
            "email": "intruder@example.com",
            "phone": "+351 966 666 666",
            "tattoo_design": "Changed design",
            "appointment_date": "2030-05-06T12:00",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        "DELETE",
        &format!("/api/appointments/{id}"),
        Some(&intruder),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(send(&app, "GET", "/api/appointments", Some(&owner), None).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_delete_missing_appointment_is_not_found() {
    let app = spawn_app().await;
    let client = register_client(&app, "quim").await;

    let response = send(&app, "DELETE", "/api/appointments/424242", Some(&client), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
