//! Application configuration loaded from the environment

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::Duration;
use tracing::{info, warn};

const DEV_JWT_SECRET: &str = "skinnova-development-secret-change-me";

/// Top level configuration for the SkinNova backend
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Base URL of the web frontend, used to build links in emails
    pub frontend_url: String,
    pub jwt: JwtConfig,
    pub bcrypt_cost: u32,
    pub admin: AdminConfig,
    /// Root directory for uploaded files, served under `/uploads`
    pub upload_dir: PathBuf,
    /// `None` when no mail transport is configured
    pub mail: Option<MailConfig>,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
}

/// Credentials of the account seeded at startup
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl AppConfig {
    /// Build the configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                warn!("JWT_SECRET is not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let config = Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env("PORT", 4000),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            jwt: JwtConfig {
                secret,
                issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "skinnova".to_string()),
                access_token_ttl: Duration::minutes(parse_env("ACCESS_TOKEN_EXPIRATION_MINUTES", 7 * 24 * 60)),
                refresh_token_ttl: Duration::days(parse_env("REFRESH_TOKEN_EXPIRATION_DAYS", 30)),
            },
            bcrypt_cost: parse_env("BCRYPT_COST", 10),
            admin: AdminConfig {
                email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@skinova.local".to_string()),
                password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "Admin123!".to_string()),
            },
            upload_dir: PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string())),
            mail: MailConfig::from_env(),
        };

        info!(
            "Configuration loaded: port={}, frontend_url={}, upload_dir={:?}, mail={}",
            config.port,
            config.frontend_url,
            config.upload_dir,
            if config.mail.is_some() { "smtp" } else { "disabled" }
        );

        config
    }

    /// Deterministic configuration for tests
    pub fn for_testing() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            frontend_url: "http://localhost:3000".to_string(),
            jwt: JwtConfig {
                secret: "test_secret_key_for_testing_only".to_string(),
                issuer: "skinnova-test".to_string(),
                access_token_ttl: Duration::minutes(15),
                refresh_token_ttl: Duration::days(7),
            },
            bcrypt_cost: 4,
            admin: AdminConfig {
                email: "admin@skinova.local".to_string(),
                password: "Admin123!".to_string(),
            },
            upload_dir: env::temp_dir().join("skinnova-test-uploads"),
            mail: None,
        }
    }
}

impl MailConfig {
    /// Read mail settings. `MAIL_SERVICE=gmail` (the default) uses Gmail with an app password,
    /// anything else uses `MAIL_HOST`.
    pub fn from_env() -> Option<Self> {
        let service = env::var("MAIL_SERVICE").unwrap_or_else(|_| "gmail".to_string());

        let config = if service.eq_ignore_ascii_case("gmail") {
            let username = env::var("GMAIL_USER").ok().filter(|u| !u.is_empty())?;
            let password = clean_app_password(&env::var("GMAIL_APP_PASSWORD").ok()?);
            if password.is_empty() {
                return None;
            }
            let from = env::var("MAIL_FROM").unwrap_or_else(|_| username.clone());
            MailConfig {
                host: "smtp.gmail.com".to_string(),
                port: 465,
                username,
                password,
                from,
            }
        } else {
            let host = env::var("MAIL_HOST").ok().filter(|h| !h.is_empty())?;
            MailConfig {
                host,
                port: parse_env("MAIL_PORT", 587),
                username: env::var("MAIL_USER").unwrap_or_default(),
                password: env::var("MAIL_PASS").unwrap_or_default(),
                from: env::var("MAIL_FROM").unwrap_or_else(|_| "noreply@skinnova.com".to_string()),
            }
        };

        Some(config)
    }
}

/// Gmail app passwords are displayed in groups separated by spaces
pub fn clean_app_password(password: &str) -> String {
    password.chars().filter(|c| !c.is_whitespace()).collect()
}

fn parse_env<T: FromStr + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid value '{}' for {}, using default {}", raw, name, default);
            default
        }),
        Err(_) => default,
    }
}
