//! LocalPassengers API
//!
//! Train-passenger management backend: role-based access control over
//! trains, passenger alerts, and reroutes, with a JWT access/refresh token
//! lifecycle carried in HttpOnly cookies and an auditable authorization
//! boundary in front of every protected route.

mod auth;
mod config;
mod db;
mod error;
mod models;
mod rbac;
mod routes;
mod state;
mod stores;

use crate::config::Settings;
use crate::routes::create_router;
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("Starting LocalPassengers API...");

    // Load configuration
    let settings = Settings::load()?;
    info!("Configuration loaded successfully");

    // Initialize database pool - required, no in-memory fallback for accounts
    let pool = match db::create_pool(&settings.database).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("FATAL: Failed to initialize database pool: {}", e);
            error!("DATABASE_URL must be set and the database must be accessible");
            return Err(e);
        }
    };

    db::ensure_tables(&pool).await?;

    let state = Arc::new(AppState::new(pool, &settings.auth));

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("Server listening on http://{}", addr);
    info!("");
    info!("API Endpoints:");
    info!("   --- Authentication ---");
    info!("   POST   /api/auth/register        - Register new account");
    info!("   POST   /api/auth/login           - Login with email/password");
    info!("   POST   /api/auth/refresh         - Refresh access token");
    info!("   POST   /api/auth/logout          - Clear token cookies");
    info!("   GET    /api/auth/me              - Get current user");
    info!("");
    info!("   --- Admin ---");
    info!("   GET    /api/admin/users          - List users");
    info!("   PATCH  /api/admin/users/:id      - Change a user's role");
    info!("   DELETE /api/admin/users/:id      - Delete a user");
    info!("");
    info!("   --- Trains, Alerts, Reroutes ---");
    info!("   GET    /api/trains               - List trains (filter + paginate)");
    info!("   POST   /api/trains               - Create train");
    info!("   PUT    /api/trains/:id/assign    - Assign station master");
    info!("   GET    /api/station-master/trains - Trains assigned to caller");
    info!("   GET    /api/alerts               - List passenger alerts");
    info!("   GET    /api/reroutes             - List reroutes");
    info!("");
    info!("   --- RBAC Introspection ---");
    info!("   GET    /api/rbac/permissions     - Caller's permissions");
    info!("   GET    /api/rbac/roles           - Full role table");
    info!("   GET    /api/rbac/audit-log       - Authorization decisions");
    info!("   GET    /api/rbac/stats           - Decision statistics");
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,localpassengers_api=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        },
    }
}
