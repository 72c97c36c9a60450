use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use skin_nova_api::{create_app, AppState};
use skin_nova_data::database::{get_connection_info, initialize_database_pool, DatabaseConfig};
use skin_nova_data::repository::create_document_store;
use skin_nova_domain::auth::token_blacklist::start_cleanup_task;
use skin_nova_domain::config::AppConfig;
use skin_nova_domain::mail::{create_mailer, LogMailer, Mailer};

/// The main entry point for the SkinNova API server
///
/// This function:
/// 1. Initializes environment variables from .env file
/// 2. Sets up tracing for logging
/// 3. Initializes the database connection pool
/// 4. Seeds the administrator account
/// 5. Creates and starts the Axum web application
/// 6. Handles graceful shutdown
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_ansi(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stdout),
        )
        .with(env_filter)
        .init();

    info!("Starting SkinNova API server");

    // The store falls back to memory when SQLite cannot be opened
    match DatabaseConfig::from_env().and_then(|config| initialize_database_pool(&config)) {
        Ok(()) => info!("Database pool initialized successfully"),
        Err(e) => error!("Failed to initialize database pool: {}", e),
    }
    if let Some(info) = get_connection_info() {
        info!("{}", info);
    }
    let store = create_document_store();
    info!("Using {} document store", store.backend());

    let config = AppConfig::from_env();

    let mailer: Arc<dyn Mailer> = match create_mailer(config.mail.as_ref()) {
        Ok(mailer) => mailer,
        Err(e) => {
            warn!("Failed to configure mail transport, emails will only be logged: {}", e);
            Arc::new(LogMailer)
        }
    };

    let addr = format!("{}:{}", config.host, config.port);
    let admin = config.admin.clone();

    let state = AppState::new(store, config, mailer);

    match state.services.users.ensure_admin(&admin.email, &admin.password).await {
        Ok(user) => info!("Admin account ready: {}", user.email),
        Err(e) => error!("Failed to ensure admin account: {}", e),
    }

    start_cleanup_task(state.services.tokens.blacklist().clone());

    let app = create_app(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on CTRL+C, or SIGTERM on Unix systems
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down server...");
}
