// HTTP layer: shared state, error mapping, handlers and the router

pub mod error;
pub mod handlers;
pub mod routes;

use std::sync::Arc;

use skin_nova_data::repository::SharedDocumentStore;
use skin_nova_domain::auth::{AuthState, TokenManager};
use skin_nova_domain::config::AppConfig;
use skin_nova_domain::health::{HealthService, HealthServiceTrait};
use skin_nova_domain::mail::Mailer;
use skin_nova_domain::services::Services;

pub use error::{ApiResult, ErrorResponse};
pub use routes::create_app;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub health: Arc<dyn HealthServiceTrait>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: SharedDocumentStore, config: AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        let health = HealthService::new(store.clone(), mailer.is_configured());
        Self {
            services: Services::new(store, &config, mailer),
            health: Arc::new(health),
            config: Arc::new(config),
        }
    }
}

impl AuthState for AppState {
    fn token_manager(&self) -> &TokenManager {
        &self.services.tokens
    }
}
