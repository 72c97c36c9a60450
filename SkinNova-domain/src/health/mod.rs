//! Domain layer health check functionality
//! This module reports whether the backing store is reachable and which optional
//! components are enabled.

use std::collections::BTreeMap;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use skin_nova_data::repository::SharedDocumentStore;
#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// System health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum SystemStatus {
    /// All required components are healthy
    #[serde(rename = "ok")]
    Healthy,
    /// Some components are degraded but the system is functional
    #[serde(rename = "degraded")]
    Degraded,
    /// System is not functioning properly
    #[serde(rename = "unhealthy")]
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
    /// Optional component that is not configured
    Disabled,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HealthComponent {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub status: SystemStatus,
    #[cfg_attr(feature = "with-api", schema(value_type = String))]
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    /// Map of component names to their health status
    pub components: BTreeMap<String, HealthComponent>,
}

impl SystemHealth {
    pub fn is_available(&self) -> bool {
        self.status != SystemStatus::Unhealthy
    }
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the status of the database
    async fn check_database_status(&self) -> Result<(), String>;
}

/// Health checks against the running store
#[derive(Debug, Clone)]
pub struct HealthService {
    store: SharedDocumentStore,
    mail_configured: bool,
    started: Instant,
}

impl HealthService {
    pub fn new(store: SharedDocumentStore, mail_configured: bool) -> Self {
        Self {
            store,
            mail_configured,
            started: Instant::now(),
        }
    }
}

/// Overall status from the component states. Disabled components are ignored.
pub fn overall_status<'a>(components: impl IntoIterator<Item = &'a HealthComponent>) -> SystemStatus {
    components
        .into_iter()
        .fold(SystemStatus::Healthy, |status, component| match (status, component.status) {
            (_, ComponentStatus::Unhealthy) | (SystemStatus::Unhealthy, _) => SystemStatus::Unhealthy,
            (_, ComponentStatus::Degraded) => SystemStatus::Degraded,
            (status, _) => status,
        })
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let database = match self.check_database_status().await {
            Ok(()) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: Some(self.store.backend().to_string()),
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(e),
            },
        };

        let mail = if self.mail_configured {
            HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            }
        } else {
            HealthComponent {
                status: ComponentStatus::Disabled,
                details: Some("No mail transport configured".to_string()),
            }
        };

        let components: BTreeMap<String, HealthComponent> =
            [("database".to_string(), database), ("mail".to_string(), mail)].into_iter().collect();

        SystemHealth {
            status: overall_status(components.values()),
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
            uptime_seconds: self.started.elapsed().as_secs(),
            components,
        }
    }

    async fn check_database_status(&self) -> Result<(), String> {
        self.store.ping().await.map_err(|e| {
            warn!("Database health check failed: {}", e);
            format!("Database connection error: {}", e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::Value;
    use skin_nova_data::repository::{DocumentStore, InMemoryDocumentStore, RepositoryError};

    #[derive(Debug)]
    struct UnreachableStore;

    #[async_trait]
    impl DocumentStore for UnreachableStore {
        async fn put(&self, _: &str, _: &str, _: Value) -> Result<(), RepositoryError> {
            Err(RepositoryError::Lock("down".into()))
        }
        async fn get(&self, _: &str, _: &str) -> Result<Option<Value>, RepositoryError> {
            Err(RepositoryError::Lock("down".into()))
        }
        async fn delete(&self, _: &str, _: &str) -> Result<bool, RepositoryError> {
            Err(RepositoryError::Lock("down".into()))
        }
        async fn list(&self, _: &str) -> Result<Vec<Value>, RepositoryError> {
            Err(RepositoryError::Lock("down".into()))
        }
        async fn ping(&self) -> Result<(), RepositoryError> {
            Err(RepositoryError::Lock("down".into()))
        }
        fn backend(&self) -> &'static str {
            "unreachable"
        }
    }

    #[tokio::test]
    async fn in_memory_store_is_healthy_without_mail() {
        let service = HealthService::new(Arc::new(InMemoryDocumentStore::new()), false);
        let health = service.get_system_health().await;

        assert_eq!(health.status, SystemStatus::Healthy);
        assert!(health.is_available());
        assert_eq!(health.components["database"].status, ComponentStatus::Healthy);
        assert_eq!(health.components["mail"].status, ComponentStatus::Disabled);

        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json["uptimeSeconds"].is_u64());
    }

    #[tokio::test]
    async fn unreachable_store_is_unhealthy() {
        let service = HealthService::new(Arc::new(UnreachableStore), true);
        let health = service.get_system_health().await;

        assert_eq!(health.status, SystemStatus::Unhealthy);
        assert!(!health.is_available());
        assert!(health.components["database"].details.as_deref().unwrap().contains("down"));
    }

    #[test]
    fn degraded_components_degrade_the_system() {
        let healthy = HealthComponent { status: ComponentStatus::Healthy, details: None };
        let degraded = HealthComponent { status: ComponentStatus::Degraded, details: None };
        assert_eq!(overall_status([&healthy, &degraded]), SystemStatus::Degraded);
        assert_eq!(overall_status([&healthy]), SystemStatus::Healthy);
    }
}
