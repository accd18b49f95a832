//! Application state management
//!
//! Contains shared state accessible across all handlers. User accounts live
//! in PostgreSQL; trains, alerts, reroutes, and the audit log are in-memory.

use crate::auth::{AuthState, RouteTable, TokenService};
use crate::config::AuthConfig;
use crate::db::UserService;
use crate::rbac::MemoryAuditLog;
use crate::stores::{AlertStore, RerouteStore, TrainStore};
use deadpool_postgres::Pool;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// User service for database operations; owns the only pool handle the
    /// handlers ever touch
    pub users: UserService,

    /// Train store (has internal locking)
    pub trains: TrainStore,

    /// Passenger alert store
    pub alerts: AlertStore,

    /// Reroute record store
    pub reroutes: RerouteStore,

    /// Token service, audit sink, and route table for the auth boundary
    pub auth: AuthState,

    /// Whether cookies carry the Secure flag
    pub secure_cookies: bool,
}

impl AppState {
    /// Create new application state with database pool
    pub fn new(pool: Pool, auth_config: &AuthConfig) -> Self {
        let users = UserService::new(pool);
        let auth = AuthState {
            tokens: Arc::new(TokenService::new(auth_config)),
            audit: Arc::new(MemoryAuditLog::new()),
            routes: Arc::new(RouteTable::localpassengers()),
        };

        Self {
            users,
            trains: TrainStore::new(),
            alerts: AlertStore::new(),
            reroutes: RerouteStore::new(),
            auth,
            secure_cookies: auth_config.secure_cookies,
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
