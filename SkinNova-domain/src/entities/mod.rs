// Domain inputs and views exchanged with the API layer
pub mod appointments;
pub mod availability;
pub mod banners;
pub mod chat;
pub mod health;
pub mod reports;
pub mod users;

pub use appointments::{
    AppointmentCounts, AppointmentFilter, AppointmentListing, AppointmentView, ApproveAppointmentInput,
    CompleteAppointmentInput, CreateAppointmentInput, RejectAppointmentInput,
};
pub use availability::{SlotInput, SlotPatch, UpsertOutcome};
pub use banners::BannerInput;
pub use chat::{AppointmentWithChat, DoctorPatientChat};
pub use health::{
    AnalyticsPeriod, DailyMetrics, HealthAnalytics, HealthInsight, HealthRecordInput, HealthRecordPage,
    HealthRecordQuery, HealthSummary, InsightKind, LatestHealth, Pagination, RiskFactor, TrendAnalysis,
};
pub use reports::{DoctorDocuments, PatientReports, ReportAccessStatus, ReportInput, ReportPatient};
pub use users::{AuthSession, LoginInput, PublicUser, SignupInput, UpdateUserInput};
