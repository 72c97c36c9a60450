use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use skin_nova_data::models::user::normalize_email;
use skin_nova_data::models::{ActivityAction, Role, User};
use skin_nova_data::repository::{SharedDocumentStore, UserRepository};

use crate::auth::logging::{
    log_auth_event, log_failed_login, log_logout, log_successful_login, log_token_refresh, AuthEvent,
    AuthEventType,
};
use crate::auth::password::{generate_reset_token, hash_reset_token, PasswordHasher};
use crate::auth::token::IssuedToken;
use crate::auth::{AuthUser, Claims, TokenManager, TokenType};
use crate::entities::{AuthSession, DoctorDocuments, LoginInput, PublicUser, SignupInput, UpdateUserInput};
use crate::mail::{templates, Mailer};
use crate::services::activities::ActivityService;
use crate::services::errors::{ServiceError, ServiceResult};
use crate::uploads::{UploadKind, UploadStore};

/// How long a password reset link stays valid
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Files accepted in one verification upload
pub const MAX_VERIFICATION_DOCUMENTS: usize = 5;

/// Accounts, sessions, password resets and profile photos
#[derive(Debug, Clone)]
pub struct UserService {
    users: UserRepository,
    tokens: TokenManager,
    hasher: PasswordHasher,
    mailer: Arc<dyn Mailer>,
    activities: ActivityService,
    uploads: UploadStore,
    frontend_url: String,
}

impl UserService {
    pub fn new(
        store: SharedDocumentStore,
        tokens: TokenManager,
        hasher: PasswordHasher,
        mailer: Arc<dyn Mailer>,
        activities: ActivityService,
        uploads: UploadStore,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            users: UserRepository::new(store),
            tokens,
            hasher,
            mailer,
            activities,
            uploads,
            frontend_url: frontend_url.into(),
        }
    }

    /// Register a patient or doctor account and sign it in
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn signup(&self, input: SignupInput) -> ServiceResult<AuthSession> {
        let email = normalize_email(&input.email);
        if email.is_empty() || input.password.is_empty() {
            return Err(ServiceError::validation("Email and password are required"));
        }

        let role = match input.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            Some(raw) => raw
                .parse::<Role>()
                .map_err(|_| ServiceError::validation(format!("Invalid role: {}", raw)))?,
            None => Role::Patient,
        };
        if role == Role::Admin {
            return Err(ServiceError::forbidden("Cannot create admin via signup"));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::conflict("Email already registered"));
        }

        let password_hash = self.hasher.hash_password(&input.password).await?;
        let name = input.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        let mut user = User::new(name, &email, password_hash, role);
        if let Some(profile @ Value::Object(_)) = input.profile {
            user.profile = profile;
        }

        self.users.create(&user).await?;

        let activity = ActivityService::for_user(&user, ActivityAction::UserRegistration, "New User Registration")
            .with_description(format!("{} registered as a {}", user.display_name(), user.role));
        self.activities.record(activity).await;

        log_auth_event(
            AuthEvent::new(AuthEventType::Registration, Some(&user.id), true)
                .with_details(format!("role={}", user.role))
                .with_auth_method("password"),
        );

        self.issue_session(&user)
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> ServiceResult<AuthSession> {
        let email = normalize_email(&input.email);
        if email.is_empty() || input.password.is_empty() {
            return Err(ServiceError::validation("Email and password are required"));
        }

        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                log_failed_login(&email, "unknown email");
                return Err(ServiceError::Unauthorized("Invalid credentials".to_string()));
            }
        };

        if !self.hasher.verify_password(&input.password, &user.password_hash).await? {
            log_failed_login(&email, "wrong password");
            return Err(ServiceError::Unauthorized("Invalid credentials".to_string()));
        }

        log_successful_login(&user.id);
        self.issue_session(&user)
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<IssuedToken> {
        let claims = self
            .tokens
            .validate_token(refresh_token, TokenType::Refresh)
            .map_err(|e| {
                log_token_refresh("unknown", false, Some(&e.to_string()));
                ServiceError::from(e)
            })?;

        let user = match self.users.find_by_id(&claims.sub).await? {
            Some(user) => user,
            None => {
                log_token_refresh(&claims.sub, false, Some("user no longer exists"));
                return Err(ServiceError::Unauthorized("User no longer exists".to_string()));
            }
        };

        let issued = self.tokens.generate_token(&user, TokenType::Access)?;
        log_token_refresh(&user.id, true, None);
        Ok(issued)
    }

    /// Revoke the token the request was made with
    pub fn logout(&self, claims: &Claims) {
        self.tokens.revoke_token(claims);
        log_logout(&claims.sub);
    }

    pub async fn me(&self, user_id: &str) -> ServiceResult<PublicUser> {
        Ok(PublicUser::from(self.require_user(user_id).await?))
    }

    /// Email a reset link. Unknown addresses succeed silently.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> ServiceResult<()> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(ServiceError::validation("Email is required"));
        }

        let Some(mut user) = self.users.find_by_email(&email).await? else {
            info!("Password reset requested for unknown email");
            log_auth_event(
                AuthEvent::new(AuthEventType::PasswordResetRequest, Some(&email), false).with_details("unknown email"),
            );
            return Ok(());
        };

        let reset = generate_reset_token();
        let now = Utc::now();
        user.reset_token_hash = Some(reset.hash);
        user.reset_token_expires = Some(now + Duration::minutes(RESET_TOKEN_TTL_MINUTES));
        user.updated_at = now;
        self.users.update(&user).await?;

        let activity = ActivityService::for_user(&user, ActivityAction::PasswordResetRequested, "Password Reset Requested")
            .with_description(format!("{} requested a password reset", user.display_name()));
        self.activities.record(activity).await;

        let link = format!("{}/reset-password?token={}", self.frontend_url, reset.token);
        if let Err(e) = self.mailer.send(templates::password_reset_email(&user.email, &link)).await {
            error!("Failed to send password reset email to {}: {}", user.email, e);
            return Err(ServiceError::Mail("Failed to send email".to_string()));
        }

        log_auth_event(AuthEvent::new(AuthEventType::PasswordResetRequest, Some(&user.id), true));
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> ServiceResult<()> {
        if token.trim().is_empty() || password.is_empty() {
            return Err(ServiceError::validation("Token and password are required"));
        }

        let now = Utc::now();
        let Some(mut user) = self.users.find_by_reset_token(&hash_reset_token(token.trim()), now).await? else {
            log_auth_event(
                AuthEvent::new(AuthEventType::PasswordReset, None, false).with_details("invalid or expired token"),
            );
            return Err(ServiceError::validation("Invalid or expired token"));
        };

        user.password_hash = self.hasher.hash_password(password).await?;
        user.reset_token_hash = None;
        user.reset_token_expires = None;
        user.updated_at = now;
        self.users.update(&user).await?;

        log_auth_event(AuthEvent::new(AuthEventType::PasswordReset, Some(&user.id), true));
        Ok(())
    }

    /// All accounts, newest first
    pub async fn list_users(&self) -> ServiceResult<Vec<PublicUser>> {
        Ok(self.users.list().await?.into_iter().map(PublicUser::from).collect())
    }

    pub async fn get_user(&self, id: &str) -> ServiceResult<PublicUser> {
        self.me(id).await
    }

    #[instrument(skip(self, requester, input), fields(admin = %requester.id))]
    pub async fn update_user(&self, requester: &AuthUser, id: &str, input: UpdateUserInput) -> ServiceResult<PublicUser> {
        if input.is_empty() {
            return Err(ServiceError::validation("At least one field (name, email, role) is required"));
        }

        let mut user = self.require_user(id).await?;

        if let Some(raw) = input.role.as_deref() {
            let role = raw
                .parse::<Role>()
                .map_err(|_| ServiceError::validation(format!("Invalid role: {}", raw)))?;
            if requester.id == user.id && role != user.role {
                return Err(ServiceError::validation("You cannot change your own role"));
            }
            user.role = role;
        }

        if let Some(raw) = input.email.as_deref() {
            let email = normalize_email(raw);
            if email.is_empty() {
                return Err(ServiceError::validation("Email cannot be empty"));
            }
            if let Some(existing) = self.users.find_by_email(&email).await? {
                if existing.id != user.id {
                    return Err(ServiceError::conflict("Email already in use"));
                }
            }
            user.email = email;
        }

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            user.name = if name.is_empty() { None } else { Some(name) };
        }

        user.updated_at = Utc::now();
        self.users.update(&user).await?;

        let activity = ActivityService::for_user(&user, ActivityAction::ProfileUpdated, "Profile Updated")
            .with_description(format!("Account of {} was updated by an admin", user.display_name()));
        self.activities.record(activity).await;

        Ok(PublicUser::from(user))
    }

    pub async fn delete_user(&self, requester: &AuthUser, id: &str) -> ServiceResult<()> {
        if requester.id == id {
            return Err(ServiceError::validation("You cannot delete your own account"));
        }
        if !self.users.delete(id).await? {
            return Err(ServiceError::not_found("User not found"));
        }
        info!("User {} deleted by admin {}", id, requester.id);
        Ok(())
    }

    pub async fn set_verified(&self, id: &str, verified: bool) -> ServiceResult<PublicUser> {
        let mut user = self.require_user(id).await?;
        user.verified = verified;
        user.updated_at = Utc::now();
        self.users.update(&user).await?;

        let title = if verified { "User Verified" } else { "Verification Revoked" };
        let activity = ActivityService::for_user(&user, ActivityAction::UserVerified, title)
            .with_description(format!("{} ({}) verification set to {}", user.display_name(), user.role, verified));
        self.activities.record(activity).await;

        Ok(PublicUser::from(user))
    }

    /// Doctor directory, optionally restricted to verified doctors
    pub async fn list_doctors(&self, verified_only: bool) -> ServiceResult<Vec<PublicUser>> {
        Ok(self
            .users
            .list_by_role(Role::Doctor)
            .await?
            .into_iter()
            .filter(|doctor| !verified_only || doctor.verified)
            .map(PublicUser::from)
            .collect())
    }

    /// Make sure the configured admin account exists
    pub async fn ensure_admin(&self, email: &str, password: &str) -> ServiceResult<PublicUser> {
        let email = normalize_email(email);
        match self.users.find_by_email(&email).await? {
            Some(user) if user.role == Role::Admin => {
                info!("Admin account {} already exists", email);
                Ok(PublicUser::from(user))
            }
            Some(mut user) => {
                warn!("Promoting existing account {} to admin", email);
                user.role = Role::Admin;
                user.verified = true;
                user.updated_at = Utc::now();
                self.users.update(&user).await?;
                Ok(PublicUser::from(user))
            }
            None => {
                let password_hash = self.hasher.hash_password(password).await?;
                let mut user = User::new(Some("Administrator".to_string()), &email, password_hash, Role::Admin);
                user.verified = true;
                self.users.create(&user).await?;
                info!("Created admin account {}", email);
                Ok(PublicUser::from(user))
            }
        }
    }

    /// Store a new profile photo and drop the previous one
    pub async fn upload_profile_photo(&self, requester: &AuthUser, original_name: &str, bytes: &[u8]) -> ServiceResult<PublicUser> {
        let mut user = self.require_user(&requester.id).await?;

        let stored = self
            .uploads
            .save(UploadKind::ProfilePhoto, original_name, bytes, Some(&user.id))
            .await?;

        if let Some(previous) = user.profile_photo.as_deref() {
            if let Some(filename) = UploadStore::filename_from_url(UploadKind::ProfilePhoto, previous) {
                self.uploads.remove(UploadKind::ProfilePhoto, filename).await;
            }
        }

        user.profile_photo = Some(stored.url);
        user.updated_at = Utc::now();
        self.users.update(&user).await?;

        Ok(PublicUser::from(user))
    }

    /// Location on disk of a user's profile photo
    pub async fn profile_photo_path(&self, user_id: &str) -> ServiceResult<PathBuf> {
        let user = self.require_user(user_id).await?;
        let filename = user
            .profile_photo
            .as_deref()
            .and_then(|url| UploadStore::filename_from_url(UploadKind::ProfilePhoto, url))
            .ok_or_else(|| ServiceError::not_found("No profile photo"))?;

        let path = self.uploads.path_of(UploadKind::ProfilePhoto, filename);
        if tokio::fs::metadata(&path).await.is_err() {
            return Err(ServiceError::not_found("Profile photo file not found"));
        }
        Ok(path)
    }

    /// Replace the calling doctor's verification documents. A file that fails
    /// validation rejects the whole batch and nothing is kept.
    #[instrument(skip(self, requester, files), fields(doctor = %requester.id, count = files.len()))]
    pub async fn upload_verification_documents(
        &self,
        requester: &AuthUser,
        files: &[(String, Vec<u8>)],
    ) -> ServiceResult<Vec<String>> {
        if files.is_empty() {
            return Err(ServiceError::validation("No files uploaded"));
        }
        if files.len() > MAX_VERIFICATION_DOCUMENTS {
            return Err(ServiceError::validation(format!(
                "At most {} documents can be uploaded",
                MAX_VERIFICATION_DOCUMENTS
            )));
        }

        let mut user = self.require_user(&requester.id).await?;
        if !user.is_doctor() {
            return Err(ServiceError::forbidden("Only doctors can upload verification documents"));
        }

        let mut stored = Vec::with_capacity(files.len());
        for (original_name, bytes) in files {
            match self
                .uploads
                .save(UploadKind::VerificationDocument, original_name, bytes, Some(&user.id))
                .await
            {
                Ok(file) => stored.push(file.filename),
                Err(e) => {
                    for filename in &stored {
                        self.uploads.remove(UploadKind::VerificationDocument, filename).await;
                    }
                    return Err(e);
                }
            }
        }

        let previous = std::mem::replace(&mut user.verification_documents, stored);
        user.updated_at = Utc::now();
        self.users.update(&user).await?;

        for filename in &previous {
            self.uploads.remove(UploadKind::VerificationDocument, filename).await;
        }
        info!("Doctor {} uploaded {} verification documents", user.id, user.verification_documents.len());
        Ok(user.verification_documents)
    }

    /// A doctor's verification documents. Visible to the doctor and to admins.
    pub async fn verification_documents(&self, requester: &AuthUser, doctor_id: &str) -> ServiceResult<DoctorDocuments> {
        let doctor = self.document_owner(requester, doctor_id).await?;
        Ok(DoctorDocuments {
            document_count: doctor.verification_documents.len(),
            doctor_id: doctor.id,
            name: doctor.name,
            email: doctor.email,
            verified: doctor.verified,
            documents: doctor.verification_documents,
        })
    }

    /// Location on disk of one verification document
    pub async fn verification_document_path(
        &self,
        requester: &AuthUser,
        doctor_id: &str,
        filename: &str,
    ) -> ServiceResult<PathBuf> {
        let doctor = self.document_owner(requester, doctor_id).await?;
        if !doctor.verification_documents.iter().any(|name| name == filename) {
            return Err(ServiceError::not_found("Document not found"));
        }

        let path = self.uploads.path_of(UploadKind::VerificationDocument, filename);
        if tokio::fs::metadata(&path).await.is_err() {
            return Err(ServiceError::not_found("File not found on server"));
        }
        Ok(path)
    }

    async fn document_owner(&self, requester: &AuthUser, doctor_id: &str) -> ServiceResult<User> {
        if !requester.is_admin() && requester.id != doctor_id {
            warn!("User {} denied access to documents of {}", requester.id, doctor_id);
            return Err(ServiceError::forbidden("Access denied"));
        }
        match self.users.find_by_id(doctor_id).await? {
            Some(user) if user.is_doctor() => Ok(user),
            _ => Err(ServiceError::not_found("Doctor not found")),
        }
    }

    async fn require_user(&self, id: &str) -> ServiceResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }

    fn issue_session(&self, user: &User) -> ServiceResult<AuthSession> {
        let access = self.tokens.generate_token(user, TokenType::Access)?;
        let refresh = self.tokens.generate_token(user, TokenType::Refresh)?;
        Ok(AuthSession {
            user: PublicUser::from(user),
            token: access.token,
            refresh_token: refresh.token,
            expires_at: access.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestContext, TEST_PASSWORD};

    fn signup(email: &str, role: Option<&str>) -> SignupInput {
        SignupInput {
            name: Some("Jane Doe".to_string()),
            email: email.to_string(),
            password: "secret123".to_string(),
            role: role.map(String::from),
            profile: None,
        }
    }

    #[tokio::test]
    async fn signup_then_login() {
        let ctx = TestContext::new();
        let users = &ctx.services.users;

        let session = users.signup(signup("Jane@Example.com", Some("Doctor"))).await.unwrap();
        assert_eq!(session.user.email, "jane@example.com");
        assert_eq!(session.user.role, Role::Doctor);

        let claims = ctx.services.tokens.validate_token(&session.token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, session.user.id);

        let login = users
            .login(LoginInput {
                email: "jane@example.com".into(),
                password: "secret123".into(),
            })
            .await
            .unwrap();
        assert_eq!(login.user.id, session.user.id);

        let err = users
            .login(LoginInput {
                email: "jane@example.com".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(msg) if msg == "Invalid credentials"));
    }

    #[tokio::test]
    async fn signup_rejects_admin_duplicates_and_bad_roles() {
        let ctx = TestContext::new();
        let users = &ctx.services.users;

        assert!(matches!(
            users.signup(signup("a@example.com", Some("admin"))).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            users.signup(signup("a@example.com", Some("nurse"))).await,
            Err(ServiceError::Validation(_))
        ));

        users.signup(signup("a@example.com", None)).await.unwrap();
        assert!(matches!(
            users.signup(signup("A@example.com", None)).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn password_reset_flow() {
        let ctx = TestContext::new();
        let users = &ctx.services.users;
        let user = ctx.create_user("reset@example.com", Role::Patient).await;

        // Unknown addresses look the same to the caller
        users.forgot_password("nobody@example.com").await.unwrap();
        assert!(ctx.mailer.sent().is_empty());

        users.forgot_password("reset@example.com").await.unwrap();
        let sent = ctx.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "reset@example.com");

        let body = &sent[0].html_body;
        let start = body.find("token=").unwrap() + "token=".len();
        let token: String = body[start..].chars().take_while(|c| c.is_ascii_hexdigit()).collect();
        assert_eq!(token.len(), 64);

        assert!(matches!(
            users.reset_password("not-the-token", "newpass").await,
            Err(ServiceError::Validation(_))
        ));
        users.reset_password(&token, "newpass").await.unwrap();

        // Tokens are single use
        assert!(users.reset_password(&token, "again").await.is_err());

        let session = users
            .login(LoginInput {
                email: user.email.clone(),
                password: "newpass".into(),
            })
            .await
            .unwrap();
        assert_eq!(session.user.id, user.id);
    }

    #[tokio::test]
    async fn reset_email_failure_is_reported() {
        let ctx = TestContext::new();
        ctx.create_user("reset@example.com", Role::Patient).await;
        ctx.mailer.set_failing(true);

        let err = ctx.services.users.forgot_password("reset@example.com").await.unwrap_err();
        assert!(matches!(err, ServiceError::Mail(msg) if msg == "Failed to send email"));
    }

    #[tokio::test]
    async fn admin_cannot_change_own_role_or_delete_self() {
        let ctx = TestContext::new();
        let admin = ctx.create_user("root@example.com", Role::Admin).await;
        let requester = AuthUser::from(&admin);

        let err = ctx
            .services
            .users
            .update_user(
                &requester,
                &admin.id,
                UpdateUserInput {
                    role: Some("patient".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        assert!(matches!(
            ctx.services.users.delete_user(&requester, &admin.id).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            ctx.services.users.update_user(&requester, &admin.id, UpdateUserInput::default()).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn update_user_rejects_taken_email() {
        let ctx = TestContext::new();
        let admin = ctx.create_user("root@example.com", Role::Admin).await;
        let first = ctx.create_user("first@example.com", Role::Patient).await;
        ctx.create_user("second@example.com", Role::Patient).await;

        let err = ctx
            .services
            .users
            .update_user(
                &AuthUser::from(&admin),
                &first.id,
                UpdateUserInput {
                    email: Some("Second@example.com".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn verified_doctor_listing() {
        let ctx = TestContext::new();
        let doctor = ctx.create_user("doc@example.com", Role::Doctor).await;
        ctx.create_user("other-doc@example.com", Role::Doctor).await;
        ctx.create_user("pat@example.com", Role::Patient).await;

        assert_eq!(ctx.services.users.list_doctors(false).await.unwrap().len(), 2);
        assert!(ctx.services.users.list_doctors(true).await.unwrap().is_empty());

        ctx.services.users.set_verified(&doctor.id, true).await.unwrap();
        let verified = ctx.services.users.list_doctors(true).await.unwrap();
        assert_eq!(verified.len(), 1);
        assert_eq!(verified[0].id, doctor.id);
    }

    #[tokio::test]
    async fn ensure_admin_creates_then_promotes() {
        let ctx = TestContext::new();
        let users = &ctx.services.users;

        let admin = users.ensure_admin("boss@example.com", TEST_PASSWORD).await.unwrap();
        assert_eq!(admin.role, Role::Admin);
        let again = users.ensure_admin("boss@example.com", TEST_PASSWORD).await.unwrap();
        assert_eq!(again.id, admin.id);

        let patient = ctx.create_user("pat@example.com", Role::Patient).await;
        let promoted = users.ensure_admin("pat@example.com", "ignored").await.unwrap();
        assert_eq!(promoted.id, patient.id);
        assert_eq!(promoted.role, Role::Admin);
    }

    #[tokio::test]
    async fn refresh_and_logout() {
        let ctx = TestContext::new();
        let users = &ctx.services.users;
        let session = users.signup(signup("jane@example.com", None)).await.unwrap();

        // Access tokens are not accepted as refresh tokens
        assert!(matches!(users.refresh(&session.token).await, Err(ServiceError::Unauthorized(_))));
        let refreshed = users.refresh(&session.refresh_token).await.unwrap();

        let claims = ctx.services.tokens.validate_token(&refreshed.token, TokenType::Access).unwrap();
        users.logout(&claims);
        assert!(ctx.services.tokens.validate_token(&refreshed.token, TokenType::Access).is_err());
        // Other sessions are unaffected
        assert!(ctx.services.tokens.validate_token(&session.token, TokenType::Access).is_ok());
    }

    #[tokio::test]
    async fn profile_photo_replaces_previous_file() {
        let ctx = TestContext::new();
        let user = ctx.create_user("pat@example.com", Role::Patient).await;
        let requester = AuthUser::from(&user);
        let users = &ctx.services.users;

        assert!(matches!(users.profile_photo_path(&user.id).await, Err(ServiceError::NotFound(_))));

        let first = users.upload_profile_photo(&requester, "a.png", b"first").await.unwrap();
        let first_path = users.profile_photo_path(&user.id).await.unwrap();
        assert!(first.profile_photo.unwrap().starts_with("/uploads/profile-photos/"));

        // Filenames carry a millisecond timestamp
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        users.upload_profile_photo(&requester, "b.jpg", b"second").await.unwrap();
        let second_path = users.profile_photo_path(&user.id).await.unwrap();

        assert_ne!(first_path, second_path);
        assert!(!first_path.exists());
        assert_eq!(tokio::fs::read(&second_path).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn verification_documents_are_private_to_doctor_and_admin() {
        let ctx = TestContext::new();
        let doctor_user = ctx.create_user("doc@example.com", Role::Doctor).await;
        let doctor = AuthUser::from(&doctor_user);
        let patient = AuthUser::from(&ctx.create_user("pat@example.com", Role::Patient).await);
        let admin = AuthUser::from(&ctx.create_user("root@example.com", Role::Admin).await);
        let users = &ctx.services.users;

        let files = vec![
            ("licence.pdf".to_string(), b"%PDF".to_vec()),
            ("diploma.png".to_string(), b"png".to_vec()),
        ];
        assert!(matches!(
            users.upload_verification_documents(&patient, &files).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            users.upload_verification_documents(&doctor, &[]).await,
            Err(ServiceError::Validation(_))
        ));

        let stored = users.upload_verification_documents(&doctor, &files).await.unwrap();
        assert_eq!(stored.len(), 2);

        let listed = users.verification_documents(&admin, &doctor_user.id).await.unwrap();
        assert_eq!(listed.document_count, 2);
        assert!(!listed.verified);
        assert_eq!(users.get_user(&doctor_user.id).await.unwrap().verification_documents, stored);

        assert!(matches!(
            users.verification_documents(&patient, &doctor_user.id).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            users.verification_documents(&admin, &patient.id).await,
            Err(ServiceError::NotFound(_))
        ));

        let path = users
            .verification_document_path(&doctor, &doctor_user.id, &stored[0])
            .await
            .unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"%PDF");
        assert!(matches!(
            users.verification_document_path(&admin, &doctor_user.id, "../other.pdf").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn rejected_batch_keeps_previous_documents() {
        let ctx = TestContext::new();
        let doctor_user = ctx.create_user("doc@example.com", Role::Doctor).await;
        let doctor = AuthUser::from(&doctor_user);
        let users = &ctx.services.users;

        let first = users
            .upload_verification_documents(&doctor, &[("licence.pdf".to_string(), b"v1".to_vec())])
            .await
            .unwrap();

        let mixed = vec![
            ("new.pdf".to_string(), b"v2".to_vec()),
            ("script.exe".to_string(), b"MZ".to_vec()),
        ];
        assert!(matches!(
            users.upload_verification_documents(&doctor, &mixed).await,
            Err(ServiceError::Validation(_))
        ));

        let listed = users.verification_documents(&doctor, &doctor_user.id).await.unwrap();
        assert_eq!(listed.documents, first);
        let dir = ctx.upload_store().root().join(UploadKind::VerificationDocument.directory());
        assert_eq!(std::fs::read_dir(dir).unwrap().count(), 1);

        let too_many: Vec<_> = (0..=MAX_VERIFICATION_DOCUMENTS)
            .map(|i| (format!("doc{}.pdf", i), b"x".to_vec()))
            .collect();
        assert!(matches!(
            users.upload_verification_documents(&doctor, &too_many).await,
            Err(ServiceError::Validation(_))
        ));
    }
}
