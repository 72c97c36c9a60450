// SkinNova-api lib.rs
//
// HTTP surface of SkinNova: router, handlers, request/response bodies
// and the OpenAPI document.

pub mod api;
pub mod entities;
pub mod openapi;

pub use api::{create_app, AppState};
