use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use tracing::{info, instrument};

use skin_nova_domain::auth::{AuthUser, Claims};
use skin_nova_domain::entities::{AuthSession, PublicUser};

use crate::api::error::validate_request;
use crate::api::{ApiResult, AppState, ErrorResponse};
use crate::entities::auth::{
    ForgotPasswordRequest, LoginRequest, RefreshRequest, ResetPasswordRequest, SignupRequest, TokenResponse,
};
use crate::entities::common::MessageResponse;

/// Register a patient or doctor account
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = AuthSession),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Admin accounts cannot be created via signup", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn signup(State(state): State<AppState>, Json(request): Json<SignupRequest>) -> ApiResult<impl IntoResponse> {
    validate_request(&request)?;
    let session = state.services.users.signup(request.into()).await?;
    info!("User registered: {}", session.user.id);
    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthSession),
        (status = 400, description = "Email and password are required", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> ApiResult<Json<AuthSession>> {
    let session = state.services.users.login(request.into()).await?;
    Ok(Json(session))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = TokenResponse),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<Json<TokenResponse>> {
    if request.refresh_token.trim().is_empty() {
        return Err(ErrorResponse::bad_request("Refresh token is required"));
    }
    let issued = state.services.users.refresh(request.refresh_token.trim()).await?;
    Ok(Json(issued.into()))
}

/// The signed-in user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = PublicUser),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[instrument(skip(state))]
pub async fn me(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Json<PublicUser>> {
    Ok(Json(state.services.users.me(&user.id).await?))
}

/// Revoke the presented access token
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn logout(State(state): State<AppState>, Extension(claims): Extension<Claims>) -> Json<MessageResponse> {
    state.services.users.logout(&claims);
    Json(MessageResponse::new("Logged out successfully"))
}

/// Email a password reset link. Unknown addresses get the same answer.
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent if the account exists", body = MessageResponse),
        (status = 400, description = "Email is required", body = ErrorResponse),
        (status = 500, description = "Failed to send email", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.users.forgot_password(&request.email).await?;
    Ok(Json(MessageResponse::new("If email exists, reset link sent")))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid or expired token", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    validate_request(&request)?;
    state
        .services
        .users
        .reset_password(&request.token, &request.password)
        .await?;
    Ok(Json(MessageResponse::new("Password reset successful")))
}
