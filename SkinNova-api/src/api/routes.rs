use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::debug;

use skin_nova_data::models::Role;
use skin_nova_domain::auth::{auth_middleware, authorize};
use skin_nova_domain::uploads::UploadKind;

use crate::api::handlers::{
    activities, admin, appointments, auth, availability, banners, chat, doctors, health, health_data, profile,
    reports,
};
use crate::api::AppState;
use crate::openapi::configure_swagger_routes;

/// Request bodies above this are rejected with 413
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Create the application router
pub fn create_app(state: AppState) -> Router {
    debug!("Creating application router");

    let upload_dir = state.config.upload_dir.clone();

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/profile/photo/:user_id", get(profile::get_photo))
        .route("/doctors/verified", get(doctors::list_doctors))
        .route("/banners/all", get(banners::list_active));

    debug!("Public routes configured");

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/profile/upload-photo", post(profile::upload_photo))
        .route("/doctors/upload-documents", post(doctors::upload_documents))
        .route("/doctors/documents/:doctor_id", get(doctors::list_documents))
        .route(
            "/doctors/documents/:doctor_id/download/:filename",
            get(doctors::download_document),
        )
        // Static segments before parametrized ones
        .route("/availability/my-availability", get(availability::my_availability))
        .route("/availability", post(availability::upsert_slot))
        .route(
            "/availability/:id",
            get(availability::doctor_availability)
                .put(availability::update_slot)
                .delete(availability::delete_slot),
        )
        .route(
            "/appointments",
            post(appointments::create_appointment).get(appointments::list_appointments),
        )
        .route("/appointments/:id/approve", put(appointments::approve_appointment))
        .route("/appointments/:id/reject", put(appointments::reject_appointment))
        .route("/appointments/:id/complete", put(appointments::complete_appointment))
        .route("/chat/user/:user_id", get(chat::user_chats))
        .route("/chat/doctor/:doctor_id/patients", get(chat::doctor_patients))
        .route(
            "/chat/patient/:patient_id/appointments-with-chat",
            get(chat::appointments_with_chat),
        )
        .route("/chat/:patient_id/:doctor_id", get(chat::get_chat))
        .route("/chat/:patient_id/:doctor_id/message", post(chat::send_message))
        .route(
            "/chat/:patient_id/:doctor_id/message/:message_id",
            put(chat::edit_message).delete(chat::delete_message),
        )
        .route("/activities/:user_id", get(activities::list_for_user))
        .route(
            "/health-data/records",
            post(health_data::create_record).get(health_data::list_records),
        )
        .route("/health-data/latest", get(health_data::latest))
        .route("/health-data/analytics", get(health_data::analytics))
        .route("/reports", get(reports::list_reports).post(reports::create_report))
        .route("/reports/upload", post(reports::upload_file))
        .route(
            "/reports/:id",
            get(reports::get_report)
                .put(reports::update_report)
                .delete(reports::delete_report),
        )
        .route("/report-access/grant", post(reports::grant_access))
        .route("/report-access/revoke", post(reports::revoke_access))
        .route(
            "/report-access/check/:patient_id/:appointment_id",
            get(reports::check_access),
        )
        .route("/report-access/:appointment_id", get(reports::access_status))
        .route("/patient-reports/:patient_id", get(reports::patient_reports))
        .route(
            "/patient-reports/:patient_id/:appointment_id",
            get(reports::patient_reports_for_appointment),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware::<AppState>));

    debug!("Protected routes configured");

    // Authentication must happen before authorization, so the auth layer is added last
    let admin_routes = Router::new()
        .route("/activities", get(activities::list_all))
        .route("/admin/users", get(admin::list_users))
        .route(
            "/admin/users/:id",
            get(admin::get_user).put(admin::update_user).delete(admin::delete_user),
        )
        .route("/admin/users/:id/verify", post(admin::verify_user))
        .route("/admin/appointments", get(admin::list_appointments))
        .route("/banners/all-admin", get(banners::list_all))
        .route("/banners/upload", post(banners::upload))
        .route("/banners/create", post(banners::create))
        .route("/banners/:id", put(banners::update).delete(banners::delete))
        .route("/banners/:id/toggle", patch(banners::toggle))
        .route_layer(middleware::from_fn(authorize::require_role(Role::Admin)))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware::<AppState>));

    debug!("Admin routes configured");

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes);

    let mut app = Router::new().nest("/api", api_routes);

    // Verification documents stay private and are only downloadable through the API
    for kind in UploadKind::SERVED {
        app = app.nest_service(
            &format!("/uploads/{}", kind.directory()),
            ServeDir::new(upload_dir.join(kind.directory())),
        );
    }

    let app = app.with_state(state).merge(configure_swagger_routes());

    debug!("Swagger UI merged");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    app.layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
