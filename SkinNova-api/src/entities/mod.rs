// Public entities for the SkinNova API
// Request payloads are validated here and converted into domain inputs

// Common entities: messages, uploads
pub mod common;

// Signup, login and password reset
pub mod auth;

// Admin user management and doctor listing
pub mod users;

pub mod availability;

pub mod appointments;

pub mod chat;

pub mod banners;

// Wearable health metrics
pub mod health_data;

// Patient reports, report access and doctor verification documents
pub mod reports;
