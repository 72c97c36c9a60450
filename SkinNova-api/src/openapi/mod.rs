use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

/// Registers the JWT bearer scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
    }
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        crate::api::handlers::health::health_check,

        // Auth
        crate::api::handlers::auth::signup,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::refresh_token,
        crate::api::handlers::auth::me,
        crate::api::handlers::auth::logout,
        crate::api::handlers::auth::forgot_password,
        crate::api::handlers::auth::reset_password,

        // Profile
        crate::api::handlers::profile::upload_photo,
        crate::api::handlers::profile::get_photo,

        // Doctors
        crate::api::handlers::doctors::list_doctors,
        crate::api::handlers::doctors::upload_documents,
        crate::api::handlers::doctors::list_documents,
        crate::api::handlers::doctors::download_document,

        // Availability
        crate::api::handlers::availability::my_availability,
        crate::api::handlers::availability::doctor_availability,
        crate::api::handlers::availability::upsert_slot,
        crate::api::handlers::availability::update_slot,
        crate::api::handlers::availability::delete_slot,

        // Appointments
        crate::api::handlers::appointments::create_appointment,
        crate::api::handlers::appointments::list_appointments,
        crate::api::handlers::appointments::approve_appointment,
        crate::api::handlers::appointments::reject_appointment,
        crate::api::handlers::appointments::complete_appointment,

        // Chat
        crate::api::handlers::chat::get_chat,
        crate::api::handlers::chat::send_message,
        crate::api::handlers::chat::edit_message,
        crate::api::handlers::chat::delete_message,
        crate::api::handlers::chat::user_chats,
        crate::api::handlers::chat::doctor_patients,
        crate::api::handlers::chat::appointments_with_chat,

        // Activities
        crate::api::handlers::activities::list_all,
        crate::api::handlers::activities::list_for_user,

        // Admin
        crate::api::handlers::admin::list_users,
        crate::api::handlers::admin::get_user,
        crate::api::handlers::admin::update_user,
        crate::api::handlers::admin::delete_user,
        crate::api::handlers::admin::verify_user,
        crate::api::handlers::admin::list_appointments,

        // Banners
        crate::api::handlers::banners::list_active,
        crate::api::handlers::banners::list_all,
        crate::api::handlers::banners::upload,
        crate::api::handlers::banners::create,
        crate::api::handlers::banners::update,
        crate::api::handlers::banners::delete,
        crate::api::handlers::banners::toggle,

        // Health data
        crate::api::handlers::health_data::create_record,
        crate::api::handlers::health_data::list_records,
        crate::api::handlers::health_data::latest,
        crate::api::handlers::health_data::analytics,

        // Reports
        crate::api::handlers::reports::list_reports,
        crate::api::handlers::reports::create_report,
        crate::api::handlers::reports::upload_file,
        crate::api::handlers::reports::get_report,
        crate::api::handlers::reports::update_report,
        crate::api::handlers::reports::delete_report,

        // Report access
        crate::api::handlers::reports::grant_access,
        crate::api::handlers::reports::revoke_access,
        crate::api::handlers::reports::check_access,
        crate::api::handlers::reports::access_status,
        crate::api::handlers::reports::patient_reports,
        crate::api::handlers::reports::patient_reports_for_appointment,
    ),
    components(
        schemas(
            // Request and response bodies
            crate::api::ErrorResponse,
            crate::entities::common::MessageResponse,
            crate::entities::common::UploadResponse,
            crate::entities::common::FileUpload,
            crate::entities::auth::SignupRequest,
            crate::entities::auth::LoginRequest,
            crate::entities::auth::RefreshRequest,
            crate::entities::auth::TokenResponse,
            crate::entities::auth::ForgotPasswordRequest,
            crate::entities::auth::ResetPasswordRequest,
            crate::entities::users::UpdateUserRequest,
            crate::entities::users::VerifyUserRequest,
            crate::entities::users::ProfilePhotoResponse,
            crate::entities::users::ProfilePhotoUpload,
            crate::entities::availability::SlotRequest,
            crate::entities::availability::SlotUpdateRequest,
            crate::entities::appointments::CreateAppointmentRequest,
            crate::entities::appointments::ApproveAppointmentRequest,
            crate::entities::appointments::RejectAppointmentRequest,
            crate::entities::appointments::CompleteAppointmentRequest,
            crate::entities::chat::MessageRequest,
            crate::entities::banners::BannerRequest,
            crate::entities::health_data::HealthRecordRequest,
            crate::entities::reports::ReportRequest,
            crate::entities::reports::ReportAccessRequest,
            crate::entities::reports::AccessCheckResponse,
            crate::entities::reports::ReportFileResponse,
            crate::entities::reports::DocumentsUpload,
            crate::entities::reports::DocumentsUploadResponse,

            // Stored documents
            skin_nova_data::models::Role,
            skin_nova_data::models::Location,
            skin_nova_data::models::AvailabilitySlot,
            skin_nova_data::models::AppointmentStatus,
            skin_nova_data::models::Appointment,
            skin_nova_data::models::SenderRole,
            skin_nova_data::models::ChatMessage,
            skin_nova_data::models::Chat,
            skin_nova_data::models::ActivityAction,
            skin_nova_data::models::ActivityMetadata,
            skin_nova_data::models::Activity,
            skin_nova_data::models::BannerFontSize,
            skin_nova_data::models::BannerTextStyle,
            skin_nova_data::models::BannerAlignment,
            skin_nova_data::models::Banner,
            skin_nova_data::models::DeviceType,
            skin_nova_data::models::HealthRecord,
            skin_nova_data::models::Report,
            skin_nova_data::models::ReportAccess,

            // Domain views
            skin_nova_domain::entities::PublicUser,
            skin_nova_domain::entities::AuthSession,
            skin_nova_domain::entities::AppointmentCounts,
            skin_nova_domain::entities::AppointmentListing,
            skin_nova_domain::entities::DoctorPatientChat,
            skin_nova_domain::entities::AppointmentWithChat,
            skin_nova_domain::entities::Pagination,
            skin_nova_domain::entities::HealthRecordPage,
            skin_nova_domain::entities::HealthSummary,
            skin_nova_domain::entities::LatestHealth,
            skin_nova_domain::entities::AnalyticsPeriod,
            skin_nova_domain::entities::DailyMetrics,
            skin_nova_domain::entities::RiskFactor,
            skin_nova_domain::entities::TrendAnalysis,
            skin_nova_domain::entities::InsightKind,
            skin_nova_domain::entities::HealthInsight,
            skin_nova_domain::entities::HealthAnalytics,
            skin_nova_domain::entities::ReportPatient,
            skin_nova_domain::entities::PatientReports,
            skin_nova_domain::entities::ReportAccessStatus,
            skin_nova_domain::entities::DoctorDocuments,

            // Health check
            skin_nova_domain::health::SystemHealth,
            skin_nova_domain::health::SystemStatus,
            skin_nova_domain::health::ComponentStatus,
            skin_nova_domain::health::HealthComponent,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "auth", description = "Signup, login and token management"),
        (name = "profile", description = "Profile photos"),
        (name = "doctors", description = "Doctor directory and verification documents"),
        (name = "availability", description = "Doctor availability slots"),
        (name = "appointments", description = "Appointment booking and review"),
        (name = "chat", description = "Doctor and patient messaging"),
        (name = "activities", description = "Activity feed"),
        (name = "admin", description = "Account administration"),
        (name = "banners", description = "Landing page banners"),
        (name = "health-data", description = "Wearable measurements and analytics"),
        (name = "reports", description = "Patient medical reports"),
        (name = "report-access", description = "Patient grants letting doctors read reports")
    ),
    info(
        title = "SkinNova API",
        version = "0.1.0",
        description = "API for dermatology appointments, doctor and patient chat, and wearable health data",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;
