use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use futures::future::BoxFuture;
use serde_json::json;
use tracing::{debug, warn};

use skin_nova_data::models::Role;

use crate::auth::logging::{log_access_denied, log_auth_event, AuthEvent, AuthEventType};
use crate::auth::AuthUser;

/// Let the request through only if the authenticated user has one of `allowed`.
///
/// Must run after [`crate::auth::auth_middleware`].
pub async fn require_roles(req: Request<Body>, next: Next, allowed: &[Role]) -> Response {
    let request_path = req.uri().path().to_string();

    match req.extensions().get::<AuthUser>() {
        Some(user) if allowed.contains(&user.role) => {
            debug!("User {} has required role for resource access: {}", user.id, request_path);
            next.run(req).await
        }
        Some(user) => {
            let required: Vec<String> = allowed.iter().map(|r| r.to_string()).collect();
            warn!("User {} lacks required roles: {:?} for resource: {}", user.id, required, request_path);
            log_access_denied(&user.id, &request_path, &required);

            (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "forbidden",
                    "message": "You don't have the required permissions to access this resource",
                    "required_roles": required,
                })),
            )
                .into_response()
        }
        None => {
            warn!("No user info found in request extensions for path: {}", request_path);
            let event = AuthEvent::new(AuthEventType::AccessDenied, None, false)
                .with_details("Authentication context missing in request extensions")
                .with_resource(request_path)
                .with_auth_method("rbac");
            log_auth_event(event);

            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "unauthorized",
                    "message": "Authentication required",
                })),
            )
                .into_response()
        }
    }
}

/// Middleware requiring a specific role, for use with `axum::middleware::from_fn`
pub fn require_role(
    role: Role,
) -> impl Fn(Request<Body>, Next) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
    require_any_role(&[role])
}

/// Middleware requiring any of the given roles
pub fn require_any_role(
    roles: &[Role],
) -> impl Fn(Request<Body>, Next) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
    let roles = roles.to_vec();
    move |req, next| {
        let roles = roles.clone();
        Box::pin(async move { require_roles(req, next, &roles).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app(user: Option<AuthUser>) -> Router {
        Router::new()
            .route("/admin", get(|| async { "ok" }))
            .route_layer(middleware::from_fn(require_role(Role::Admin)))
            .layer(middleware::from_fn(move |mut req: Request<Body>, next: Next| {
                let user = user.clone();
                async move {
                    if let Some(user) = user {
                        req.extensions_mut().insert(user);
                    }
                    next.run(req).await
                }
            }))
    }

    fn user(role: Role) -> AuthUser {
        AuthUser {
            id: "test-user".into(),
            email: "test@example.com".into(),
            role,
        }
    }

    async fn status_for(user: Option<AuthUser>) -> StatusCode {
        app(user)
            .oneshot(Request::builder().uri("/admin").body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_require_roles_with_matching_role() {
        assert_eq!(status_for(Some(user(Role::Admin))).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_require_roles_with_no_matching_role() {
        assert_eq!(status_for(Some(user(Role::Doctor))).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn missing_auth_context_is_unauthorized() {
        assert_eq!(status_for(None).await, StatusCode::UNAUTHORIZED);
    }
}
