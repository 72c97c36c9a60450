use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use skin_nova_api::{create_app, AppState};
use skin_nova_data::repository::InMemoryDocumentStore;
use skin_nova_domain::config::AppConfig;
use skin_nova_domain::mail::RecordingMailer;

// Ensure tracing is initialized only once
static INIT: Once = Once::new();

fn initialize() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A fresh upload directory per test app
fn unique_dir() -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("skinnova-api-test-{}-{}", std::process::id(), n))
}

struct TestApp {
    router: Router,
    state: AppState,
    mailer: RecordingMailer,
}

impl TestApp {
    fn new() -> Self {
        initialize();
        let mut config = AppConfig::for_testing();
        config.upload_dir = unique_dir();

        let mailer = RecordingMailer::new();
        let state = AppState::new(Arc::new(InMemoryDocumentStore::new()), config, Arc::new(mailer.clone()));

        Self {
            router: create_app(state.clone()),
            state,
            mailer,
        }
    }

    async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Post a multipart form where every file sits under `field`
    async fn upload(&self, uri: &str, token: &str, field: &str, files: &[(&str, &[u8])]) -> (StatusCode, Value) {
        let boundary = "skinnova-test-boundary";
        let mut body = Vec::new();
        for (filename, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    boundary, field, filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    /// Sign up and return (user id, access token)
    async fn signup(&self, email: &str, role: &str) -> (String, String) {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/signup",
                None,
                Some(json!({ "name": "Test User", "email": email, "password": "Password123!", "role": role })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
        (
            body["user"]["id"].as_str().unwrap().to_string(),
            body["token"].as_str().unwrap().to_string(),
        )
    }

    async fn admin_token(&self) -> String {
        let admin = self.state.config.admin.clone();
        self.state
            .services
            .users
            .ensure_admin(&admin.email, &admin.password)
            .await
            .unwrap();

        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": admin.email, "password": admin.password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.state.config.upload_dir);
    }
}

#[tokio::test]
async fn health_reports_ok_with_security_headers() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["database"]["status"], "healthy");
}

#[tokio::test]
async fn signup_login_and_me() {
    let app = TestApp::new();
    let (user_id, _) = app.signup("Jane@Example.com", "patient").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "jane@example.com", "password": "Password123!" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("refreshToken").is_some());
    assert!(body["user"].get("passwordHash").is_none());
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = app.request(Method::GET, "/api/auth/me", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], user_id);
    assert_eq!(me["email"], "jane@example.com");
    assert_eq!(me["role"], "patient");

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "jane@example.com", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn duplicate_and_admin_signups_are_rejected() {
    let app = TestApp::new();
    app.signup("dup@example.com", "doctor").await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({ "email": "DUP@example.com", "password": "Password123!" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({ "email": "boss@example.com", "password": "Password123!", "role": "admin" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn logout_revokes_the_access_token() {
    let app = TestApp::new();
    let (_, token) = app.signup("leaver@example.com", "patient").await;

    let (status, _) = app.request(Method::POST, "/api/auth/logout", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.request(Method::GET, "/api/auth/me", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "No token provided");

    let (status, _) = app.request(Method::GET, "/api/appointments", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_reject_other_roles() {
    let app = TestApp::new();
    let (_, token) = app.signup("patient@example.com", "patient").await;

    let (status, _) = app.request(Method::GET, "/api/admin/users", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request(Method::GET, "/api/activities", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.admin_token().await;
    let (status, users) = app.request(Method::GET, "/api/admin/users", Some(admin.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn admin_verifies_doctors_for_the_directory() {
    let app = TestApp::new();
    let (doctor_id, _) = app.signup("derm@example.com", "doctor").await;

    let (status, doctors) = app.request(Method::GET, "/api/doctors/verified", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doctors.as_array().unwrap().is_empty());

    let admin = app.admin_token().await;
    let (status, user) = app
        .request(Method::POST, &format!("/api/admin/users/{}/verify", doctor_id), Some(admin.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["verified"], true);

    let (_, doctors) = app.request(Method::GET, "/api/doctors/verified", None, None).await;
    assert_eq!(doctors.as_array().unwrap().len(), 1);

    let (_, all) = app
        .request(Method::GET, "/api/doctors/verified?verifiedOnly=false", None, None)
        .await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn appointment_flow_opens_the_chat() {
    let app = TestApp::new();
    let (patient_id, patient) = app.signup("pat@example.com", "patient").await;
    let (doctor_id, doctor) = app.signup("doc@example.com", "doctor").await;

    // No appointment between them yet
    let chat_uri = format!("/api/chat/{}/{}", patient_id, doctor_id);
    let (status, _) = app.request(Method::GET, &chat_uri, Some(patient.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let date = Utc::now() + Duration::days(3);
    let (status, appointment) = app
        .request(
            Method::POST,
            "/api/appointments",
            Some(patient.as_str()),
            Some(json!({ "doctorId": doctor_id, "requestedDate": date, "reason": "Mole check" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", appointment);
    assert_eq!(appointment["status"], "pending");
    let appointment_id = appointment["id"].as_str().unwrap().to_string();

    // Outsiders never see the chat
    let (_, outsider) = app.signup("nosy@example.com", "patient").await;
    let (status, _) = app.request(Method::GET, &chat_uri, Some(outsider.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Patients cannot approve
    let approve_uri = format!("/api/appointments/{}/approve", appointment_id);
    let (status, _) = app.request(Method::PUT, &approve_uri, Some(patient.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, approved) = app
        .request(Method::PUT, &approve_uri, Some(doctor.as_str()), Some(json!({ "notes": "Bring prior scans" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");
    assert!(approved["approvedDate"].is_string());

    // Request and approval mails
    assert_eq!(app.mailer.sent().len(), 2);

    let (status, listing) = app
        .request(Method::GET, "/api/appointments?status=approved", Some(doctor.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["appointments"].as_array().unwrap().len(), 1);
    assert_eq!(listing["counts"]["approved"], 1);

    let (status, chat) = app
        .request(
            Method::POST,
            &format!("{}/message", chat_uri),
            Some(patient.as_str()),
            Some(json!({ "content": "Hello doctor" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(chat["messages"][0]["content"], "Hello doctor");
    assert_eq!(chat["messages"][0]["senderRole"], "patient");
    let message_id = chat["messages"][0]["id"].as_str().unwrap().to_string();

    // Only the sender edits
    let message_uri = format!("{}/message/{}", chat_uri, message_id);
    let (status, _) = app
        .request(Method::PUT, &message_uri, Some(doctor.as_str()), Some(json!({ "content": "Hijacked" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, edited) = app
        .request(Method::PUT, &message_uri, Some(patient.as_str()), Some(json!({ "content": "Hello Dr." })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["isEdited"], true);

    let (status, patients) = app
        .request(Method::GET, &format!("/api/chat/doctor/{}/patients", doctor_id), Some(doctor.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patients.as_array().unwrap().len(), 1);

    let (status, activities) = app
        .request(Method::GET, &format!("/api/activities/{}", patient_id), Some(patient.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!activities.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn appointments_reject_bad_filters() {
    let app = TestApp::new();
    let (_, token) = app.signup("filter@example.com", "patient").await;

    let (status, _) = app
        .request(Method::GET, "/api/appointments?view=someday", Some(token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn doctors_manage_their_availability() {
    let app = TestApp::new();
    let (doctor_id, doctor) = app.signup("slots@example.com", "doctor").await;
    let (_, patient) = app.signup("viewer@example.com", "patient").await;

    let slot = json!({ "dayOfWeek": 1, "startTime": "09:00", "endTime": "12:00" });
    let (status, created) = app.request(Method::POST, "/api/availability", Some(doctor.as_str()), Some(slot)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/availability",
            Some(patient.as_str()),
            Some(json!({ "dayOfWeek": 1, "startTime": "09:00", "endTime": "12:00" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, slots) = app
        .request(Method::GET, &format!("/api/availability/{}", doctor_id), Some(patient.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slots.as_array().unwrap().len(), 1);

    let (status, mine) = app
        .request(Method::GET, "/api/availability/my-availability", Some(doctor.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn banners_are_public_to_read_and_admin_to_write() {
    let app = TestApp::new();

    let (status, banners) = app.request(Method::GET, "/api/banners/all", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(banners.as_array().unwrap().is_empty());

    let (_, patient) = app.signup("fan@example.com", "patient").await;
    let banner = json!({
        "title": "Summer skin checks",
        "description": "Book a yearly mole check",
        "imageUrl": "/uploads/banners/sun.png"
    });
    let (status, _) = app
        .request(Method::POST, "/api/banners/create", Some(patient.as_str()), Some(banner.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.admin_token().await;
    let (status, created) = app
        .request(Method::POST, "/api/banners/create", Some(admin.as_str()), Some(banner))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let banner_id = created["id"].as_str().unwrap().to_string();

    let (status, toggled) = app
        .request(Method::PATCH, &format!("/api/banners/{}/toggle", banner_id), Some(admin.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["isActive"], !created["isActive"].as_bool().unwrap());

    let (_, all) = app.request(Method::GET, "/api/banners/all-admin", Some(admin.as_str()), None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn health_data_is_validated_and_summarized() {
    let app = TestApp::new();
    let (_, token) = app.signup("runner@example.com", "patient").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/health-data/records",
            Some(token.as_str()),
            Some(json!({ "heartRate": 400 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Heart rate"));

    let (status, _) = app
        .request(
            Method::POST,
            "/api/health-data/records",
            Some(token.as_str()),
            Some(json!({ "deviceType": "fitbit", "heartRate": 72, "steps": 8000 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, page) = app
        .request(Method::GET, "/api/health-data/records?limit=10", Some(token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"]["total"], 1);

    let (status, latest) = app.request(Method::GET, "/api/health-data/latest", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["latest"]["heartRate"], 72.0);

    let (status, _) = app
        .request(Method::GET, "/api/health-data/analytics?period=1y", Some(token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, analytics) = app
        .request(Method::GET, "/api/health-data/analytics?period=30d", Some(token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(analytics["daily"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn forgot_password_does_not_reveal_accounts() {
    let app = TestApp::new();
    app.signup("forgetful@example.com", "patient").await;

    let (status, known) = app
        .request(
            Method::POST,
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": "forgetful@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, unknown) = app
        .request(
            Method::POST,
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": "nobody@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(known, unknown);
    assert_eq!(app.mailer.sent().len(), 1);
}

#[tokio::test]
async fn swagger_document_is_served() {
    let app = TestApp::new();
    let (status, doc) = app.request(Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"].get("/api/health").is_some());
}

/// Book an appointment from patient to doctor and have the doctor approve it
async fn approved_appointment(app: &TestApp, patient: &str, doctor_id: &str, doctor: &str) -> String {
    let date = Utc::now() + Duration::days(2);
    let (status, appointment) = app
        .request(
            Method::POST,
            "/api/appointments",
            Some(patient),
            Some(json!({ "doctorId": doctor_id, "requestedDate": date, "reason": "Rash follow-up" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", appointment);
    let appointment_id = appointment["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/appointments/{}/approve", appointment_id),
            Some(doctor),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    appointment_id
}

#[tokio::test]
async fn doctors_read_reports_only_while_access_is_granted() {
    let app = TestApp::new();
    let (patient_id, patient) = app.signup("reports@example.com", "patient").await;
    let (doctor_id, doctor) = app.signup("reader@example.com", "doctor").await;

    let (status, _) = app
        .request(Method::POST, "/api/reports", Some(patient.as_str()), Some(json!({ "description": "No name" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, report) = app
        .request(
            Method::POST,
            "/api/reports",
            Some(patient.as_str()),
            Some(json!({ "reportName": "Biopsy results", "reportType": "Lab Test" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", report);
    assert_eq!(report["patientId"], patient_id.as_str());

    let (status, mine) = app.request(Method::GET, "/api/reports", Some(patient.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);

    // Reports of others are invisible
    let report_uri = format!("/api/reports/{}", report["id"].as_str().unwrap());
    let (status, _) = app.request(Method::GET, &report_uri, Some(doctor.as_str()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let reports_uri = format!("/api/patient-reports/{}", patient_id);
    let (status, _) = app.request(Method::GET, &reports_uri, Some(doctor.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let appointment_id = approved_appointment(&app, &patient, &doctor_id, &doctor).await;
    let grant = json!({ "doctorId": doctor_id, "appointmentId": appointment_id });
    let (status, access) = app
        .request(Method::POST, "/api/report-access/grant", Some(patient.as_str()), Some(grant.clone()))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", access);
    assert_eq!(access["accessGranted"], true);

    let check_uri = format!("/api/report-access/check/{}/{}", patient_id, appointment_id);
    let (status, check) = app.request(Method::GET, &check_uri, Some(doctor.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(check["hasAccess"], true);

    let (status, shared) = app.request(Method::GET, &reports_uri, Some(doctor.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shared["patient"]["email"], "reports@example.com");
    assert_eq!(shared["reports"][0]["reportName"], "Biopsy results");

    let (status, _) = app
        .request(Method::POST, "/api/report-access/revoke", Some(patient.as_str()), Some(grant))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.request(Method::GET, &reports_uri, Some(doctor.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, record) = app
        .request(Method::GET, &format!("/api/report-access/{}", appointment_id), Some(patient.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["hasAccess"], false);
}

#[tokio::test]
async fn verification_documents_stay_private() {
    let app = TestApp::new();
    let (doctor_id, doctor) = app.signup("licensed@example.com", "doctor").await;
    let (_, patient) = app.signup("curious@example.com", "patient").await;

    let (status, _) = app
        .upload(
            "/api/doctors/upload-documents",
            &patient,
            "documents",
            &[("licence.pdf", b"%PDF-1.4".as_slice())],
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, uploaded) = app
        .upload(
            "/api/doctors/upload-documents",
            &doctor,
            "documents",
            &[("licence.pdf", b"%PDF-1.4".as_slice()), ("board.png", b"\x89PNG".as_slice())],
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", uploaded);
    assert_eq!(uploaded["fileCount"], 2);
    let stored = uploaded["verificationDocuments"][0].as_str().unwrap().to_string();

    let documents_uri = format!("/api/doctors/documents/{}", doctor_id);
    let (status, _) = app.request(Method::GET, &documents_uri, Some(patient.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.admin_token().await;
    let (status, listing) = app.request(Method::GET, &documents_uri, Some(admin.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["documentCount"], 2);

    let (status, _) = app
        .request(
            Method::GET,
            &format!("{}/download/{}", documents_uri, stored),
            Some(admin.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Not reachable through the static upload routes
    let (status, _) = app
        .request(Method::GET, &format!("/uploads/verification-documents/{}", stored), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn out_of_range_pages_are_empty() {
    let app = TestApp::new();
    let (_, token) = app.signup("pager@example.com", "patient").await;
    let (status, _) = app
        .request(
            Method::POST,
            "/api/health-data/records",
            Some(token.as_str()),
            Some(json!({ "deviceType": "fitbit", "steps": 1200 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/health-data/records?page={}&limit=50", usize::MAX);
    let (status, page) = app.request(Method::GET, &uri, Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page["records"].as_array().unwrap().is_empty());
    assert_eq!(page["pagination"]["total"], 1);
}

#[tokio::test]
async fn slots_cannot_move_onto_a_taken_day() {
    let app = TestApp::new();
    let (_, doctor) = app.signup("busy@example.com", "doctor").await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/availability",
            Some(doctor.as_str()),
            Some(json!({ "dayOfWeek": 1, "startTime": "09:00", "endTime": "12:00" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, tuesday) = app
        .request(
            Method::POST,
            "/api/availability",
            Some(doctor.as_str()),
            Some(json!({ "dayOfWeek": 2, "startTime": "13:00", "endTime": "17:00" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/availability/{}", tuesday["id"].as_str().unwrap()),
            Some(doctor.as_str()),
            Some(json!({ "dayOfWeek": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn doctors_cannot_book_themselves() {
    let app = TestApp::new();
    let (doctor_id, doctor) = app.signup("solo@example.com", "doctor").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/appointments",
            Some(doctor.as_str()),
            Some(json!({ "doctorId": doctor_id, "requestedDate": Utc::now() + Duration::days(1) })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert!(app.mailer.sent().is_empty());
}
