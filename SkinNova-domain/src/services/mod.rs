// Domain services
// Each service owns the repositories it needs and enforces the business rules for one area.

pub mod activities;
pub mod appointments;
pub mod availability;
pub mod banners;
pub mod chat;
pub mod errors;
pub mod health_metrics;
pub mod reports;
pub mod users;

use std::sync::Arc;

use skin_nova_data::repository::SharedDocumentStore;

use crate::auth::password::PasswordHasher;
use crate::auth::TokenManager;
use crate::config::AppConfig;
use crate::mail::Mailer;
use crate::uploads::UploadStore;

pub use activities::ActivityService;
pub use appointments::AppointmentService;
pub use availability::AvailabilityService;
pub use banners::BannerService;
pub use chat::ChatService;
pub use errors::{ServiceError, ServiceResult};
pub use health_metrics::HealthMetricsService;
pub use reports::ReportService;
pub use users::UserService;

/// All domain services, wired to one document store
#[derive(Debug, Clone)]
pub struct Services {
    pub tokens: TokenManager,
    pub users: UserService,
    pub availability: AvailabilityService,
    pub appointments: AppointmentService,
    pub chat: ChatService,
    pub activities: ActivityService,
    pub banners: BannerService,
    pub health_metrics: HealthMetricsService,
    pub reports: ReportService,
}

impl Services {
    pub fn new(store: SharedDocumentStore, config: &AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        let tokens = TokenManager::new(config.jwt.clone());
        let uploads = UploadStore::new(config.upload_dir.clone());
        let activities = ActivityService::new(store.clone());

        Self {
            users: UserService::new(
                store.clone(),
                tokens.clone(),
                PasswordHasher::new(config.bcrypt_cost),
                mailer.clone(),
                activities.clone(),
                uploads.clone(),
                config.frontend_url.clone(),
            ),
            availability: AvailabilityService::new(store.clone()),
            appointments: AppointmentService::new(store.clone(), mailer, activities.clone()),
            chat: ChatService::new(store.clone()),
            banners: BannerService::new(store.clone(), uploads.clone()),
            health_metrics: HealthMetricsService::new(store.clone()),
            reports: ReportService::new(store, uploads),
            activities,
            tokens,
        }
    }
}
