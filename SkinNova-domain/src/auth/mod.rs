//! Authentication for the SkinNova API
//!
//! JWT bearer authentication, role-based authorization, password hashing and
//! structured auth event logging.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use skin_nova_data::models::{Role, User};

use crate::auth::logging::{log_auth_event, AuthEvent, AuthEventType};

// JWT handling
pub mod token;

// Token blacklist for revocation
pub mod token_blacklist;

// Role-based access control
pub mod authorize;

// bcrypt hashing and reset tokens
pub mod password;

// Auth event logging
pub mod logging;

pub use token::{Claims, SecurityError, TokenManager, TokenType};

/// The authenticated caller, inserted into request extensions by [`auth_middleware`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&Claims> for AuthUser {
    fn from(claims: &Claims) -> Self {
        Self {
            id: claims.sub.clone(),
            email: claims.email.clone(),
            role: claims.role,
        }
    }
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// State that can authenticate requests
pub trait AuthState: Clone + Send + Sync + 'static {
    fn token_manager(&self) -> &TokenManager;
}

/// Client address as reported by a proxy, if any
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message,
        })),
    )
        .into_response()
}

/// Authentication middleware for protected routes
///
/// Accepts `Authorization: Bearer <access token>`. On success the request gets
/// an [`AuthUser`] and the token's [`Claims`] as extensions.
pub async fn auth_middleware<S: AuthState>(
    State(state): State<S>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let request_path = req.uri().path().to_string();
    let ip = client_ip(req.headers());

    let failure = |details: &str| {
        let mut event = AuthEvent::new(AuthEventType::TokenValidation, None, false)
            .with_details(details)
            .with_resource(request_path.clone())
            .with_duration(start_time.elapsed().as_millis() as u64)
            .with_auth_method("jwt");
        if let Some(ip) = &ip {
            event = event.with_ip(ip.clone());
        }
        log_auth_event(event);
    };

    let token = match req.headers().get(header::AUTHORIZATION).map(|value| value.to_str()) {
        Some(Ok(value)) => match value.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => token.trim().to_string(),
            _ => {
                failure("Authorization header does not contain Bearer token");
                return unauthorized("Invalid authorization header");
            }
        },
        Some(Err(_)) => {
            warn!("Invalid Authorization header format");
            failure("Invalid Authorization header format");
            return unauthorized("Invalid authorization header");
        }
        None => {
            debug!("Missing Authorization header");
            failure("Missing Authorization header");
            return unauthorized("No token provided");
        }
    };

    match state.token_manager().validate_token(&token, TokenType::Access) {
        Ok(claims) => {
            debug!("Token validated for user: {}", claims.sub);
            let user = AuthUser::from(&claims);
            req.extensions_mut().insert(user);
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => {
            failure(&e.to_string());
            let message = match e {
                SecurityError::TokenExpired => "Token has expired",
                SecurityError::TokenRevoked => "Token has been revoked",
                _ => "Invalid token",
            };
            unauthorized(message)
        }
    }
}
