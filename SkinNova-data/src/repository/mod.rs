// Repository module structure
pub mod errors;
mod document;
mod in_memory;
#[cfg(feature = "sqlite")]
mod storage;

mod activities;
mod appointments;
mod availability;
mod banners;
mod chats;
mod health_records;
mod reports;
mod users;

use std::sync::Arc;
use tracing::warn;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use document::{Collection, Document, DocumentStore, SharedDocumentStore};
pub use in_memory::InMemoryDocumentStore;
#[cfg(feature = "sqlite")]
pub use storage::SqliteDocumentStore;

pub use activities::ActivityRepository;
pub use appointments::AppointmentRepository;
pub use availability::AvailabilityRepository;
pub use banners::BannerRepository;
pub use chats::ChatRepository;
pub use health_records::{HealthRecordFilter, HealthRecordRepository};
pub use reports::{ReportAccessRepository, ReportRepository};
pub use users::UserRepository;

/// Document store for the running application.
///
/// Uses the global database pool when it has been initialized and falls back
/// to in-memory storage otherwise.
pub fn create_document_store() -> SharedDocumentStore {
    #[cfg(feature = "sqlite")]
    {
        match crate::database::get_db_pool() {
            Ok(pool) => return Arc::new(SqliteDocumentStore::new(&pool)),
            Err(e) => warn!("Database not available ({}), using in-memory storage", e),
        }
    }

    #[cfg(not(feature = "sqlite"))]
    warn!("Built without a database backend, using in-memory storage");

    Arc::new(InMemoryDocumentStore::new())
}
