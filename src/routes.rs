//! Route definitions and router setup
//!
//! Configures all API routes and middleware. The authorization middleware
//! wraps every route; the cookie layer sits outside it so token cookies are
//! readable during authorization.

mod admin;
mod alerts;
mod auth;
mod rbac;
mod reroutes;
mod trains;

use crate::auth::authorize;
use crate::config::Settings;
use crate::state::SharedState;
use axum::{
    http::{header, Method},
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(settings);

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware_stack = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .propagate_x_request_id();

    let auth_state = state.auth.clone();

    // Build the router
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Authentication
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh).get(auth::refresh))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        // Admin user management
        .route("/api/admin/users", get(admin::list_users))
        .route(
            "/api/admin/users/{id}",
            patch(admin::update_role).delete(admin::delete_user),
        )
        // Station master
        .route("/api/station-master/trains", get(trains::assigned_trains))
        // Trains
        .route("/api/trains", get(trains::list).post(trains::create))
        .route(
            "/api/trains/{id}",
            get(trains::get_one).put(trains::update).delete(trains::remove),
        )
        .route("/api/trains/{id}/assign", put(trains::assign))
        // Passenger alerts
        .route("/api/alerts", get(alerts::list).post(alerts::create))
        .route(
            "/api/alerts/{id}",
            get(alerts::get_one).put(alerts::update).delete(alerts::remove),
        )
        // Reroutes
        .route("/api/reroutes", get(reroutes::list).post(reroutes::create))
        .route("/api/reroutes/{id}", axum::routing::delete(reroutes::remove))
        // RBAC introspection
        .route("/api/rbac/permissions", get(rbac::my_permissions))
        .route("/api/rbac/roles", get(rbac::roles))
        .route("/api/rbac/audit-log", get(rbac::audit_log))
        .route("/api/rbac/stats", get(rbac::stats))
        .with_state(state)
        // Authorization boundary; cookie layer must sit outside it
        .layer(middleware::from_fn_with_state(auth_state, authorize))
        .layer(CookieManagerLayer::new())
        .layer(middleware_stack)
}

/// Build CORS layer from settings
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<_> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let headers = [header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT];

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(headers)
            .max_age(Duration::from_secs(3600))
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true)
            .max_age(Duration::from_secs(3600))
    }
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
