use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Types of authentication events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventType {
    Login,
    FailedLogin,
    Logout,
    Registration,
    TokenRefresh,
    TokenValidation,
    PasswordResetRequest,
    PasswordReset,
    AccessDenied,
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AuthEventType::Login => "LOGIN",
            AuthEventType::FailedLogin => "FAILED_LOGIN",
            AuthEventType::Logout => "LOGOUT",
            AuthEventType::Registration => "REGISTRATION",
            AuthEventType::TokenRefresh => "TOKEN_REFRESH",
            AuthEventType::TokenValidation => "TOKEN_VALIDATION",
            AuthEventType::PasswordResetRequest => "PASSWORD_RESET_REQUEST",
            AuthEventType::PasswordReset => "PASSWORD_RESET",
            AuthEventType::AccessDenied => "ACCESS_DENIED",
        };
        f.write_str(name)
    }
}

/// Authentication event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub event_type: AuthEventType,
    /// User ID or email (if available)
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub success: bool,
    pub details: Option<String>,
    /// The resource being accessed (if applicable)
    pub resource: Option<String>,
    /// Duration of the operation in milliseconds (if applicable)
    pub duration_ms: Option<u64>,
    /// Authentication method used (password, jwt, rbac)
    pub auth_method: Option<String>,
}

impl AuthEvent {
    pub fn new(event_type: AuthEventType, user_id: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            user_id: user_id.map(String::from),
            timestamp: Utc::now(),
            ip_address: None,
            success,
            details: None,
            resource: None,
            duration_ms: None,
            auth_method: None,
        }
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_auth_method(mut self, auth_method: impl Into<String>) -> Self {
        self.auth_method = Some(auth_method.into());
        self
    }
}

/// Log an authentication event. Failures are logged at warn level.
pub fn log_auth_event(event: AuthEvent) {
    let user = event.user_id.as_deref().unwrap_or("anonymous");
    let status = if event.success { "SUCCESS" } else { "FAILURE" };
    let details = event.details.as_deref().unwrap_or("");
    let resource = event.resource.as_deref().unwrap_or("-");
    let ip = event.ip_address.as_deref().unwrap_or("-");

    if event.success {
        info!(
            event_type = %event.event_type,
            auth_method = event.auth_method.as_deref().unwrap_or("-"),
            duration_ms = event.duration_ms,
            "AUTH-LOG [{}] [{}] [{}] [{}] [{}] {}",
            event.event_type, user, status, resource, ip, details
        );
    } else {
        warn!(
            event_type = %event.event_type,
            auth_method = event.auth_method.as_deref().unwrap_or("-"),
            duration_ms = event.duration_ms,
            "AUTH-LOG [{}] [{}] [{}] [{}] [{}] {}",
            event.event_type, user, status, resource, ip, details
        );
    }
}

pub fn log_successful_login(user_id: &str) {
    log_auth_event(AuthEvent::new(AuthEventType::Login, Some(user_id), true).with_auth_method("password"));
}

pub fn log_failed_login(email: &str, reason: &str) {
    let event = AuthEvent::new(AuthEventType::FailedLogin, Some(email), false)
        .with_details(reason)
        .with_auth_method("password");
    log_auth_event(event);
}

pub fn log_token_refresh(user_id: &str, success: bool, details: Option<&str>) {
    let mut event = AuthEvent::new(AuthEventType::TokenRefresh, Some(user_id), success);
    if let Some(d) = details {
        event = event.with_details(d);
    }
    log_auth_event(event);
}

pub fn log_logout(user_id: &str) {
    log_auth_event(AuthEvent::new(AuthEventType::Logout, Some(user_id), true));
}

pub fn log_access_denied(user_id: &str, resource: &str, required_roles: &[String]) {
    let event = AuthEvent::new(AuthEventType::AccessDenied, Some(user_id), false)
        .with_resource(resource)
        .with_details(format!("Required roles: {}", required_roles.join(", ")))
        .with_auth_method("rbac");
    log_auth_event(event);
}
