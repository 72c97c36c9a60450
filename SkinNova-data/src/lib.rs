// SkinNova Data
// This crate handles persistence: the database pool, the document store and typed repositories

// Database connection management
#[cfg(feature = "sqlite")]
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
