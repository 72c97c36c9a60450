// SkinNova Domain
// This crate contains the business logic for the SkinNova backend

// Services that implement business logic
pub mod services;

// Authentication and authorization
pub mod auth;

// Configuration loaded from the environment
pub mod config;

// Domain entities: service inputs and outputs
pub mod entities;

// Health checks and system status
pub mod health;

// Outgoing email
pub mod mail;

// Uploaded file storage
pub mod uploads;

// Re-export the database module from skin_nova_data for convenience
#[cfg(feature = "sqlite")]
pub use skin_nova_data::database;

// Testing utilities
#[cfg(any(test, feature = "mock"))]
pub mod testing;
