//! Authorization middleware
//!
//! Runs once per inbound request: classify the path against the protected
//! route table, extract and verify the access token, check the required
//! role, then admit with identity attached. Every terminal decision lands in
//! the audit log. Handlers behind this middleware never see an unauthorized
//! request.

use crate::auth::{
    identity::{Identity, X_USER_EMAIL, X_USER_ID, X_USER_ROLE},
    tokens::TokenService,
    transport::extract_access_token,
};
use crate::error::AppError;
use crate::rbac::{AuditEntry, AuditSink, Role};
use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::debug;

/// Protection level of a route group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGroup {
    /// ADMIN only
    AdminOnly,
    /// Named role, or ADMIN (implicit superset)
    RoleOnly(Role),
    /// Any verified identity
    Authenticated,
    /// Matched but open; passes through with no identity
    Public,
}

/// Ordered prefix table mapping paths to route groups. First match wins;
/// unmatched paths pass through untouched.
pub struct RouteTable {
    rules: Vec<(&'static str, RouteGroup)>,
}

impl RouteTable {
    pub fn new(rules: Vec<(&'static str, RouteGroup)>) -> Self {
        Self { rules }
    }

    /// The LocalPassengers protected-route map
    pub fn localpassengers() -> Self {
        Self::new(vec![
            // auth endpoints stay public so the refresh flow cannot dead-lock
            // on its own middleware
            ("/api/auth/refresh", RouteGroup::Public),
            ("/api/auth/login", RouteGroup::Public),
            ("/api/auth/register", RouteGroup::Public),
            ("/api/auth/logout", RouteGroup::Public),
            ("/api/auth/me", RouteGroup::Authenticated),
            ("/api/admin", RouteGroup::AdminOnly),
            ("/api/station-master", RouteGroup::RoleOnly(Role::StationMaster)),
            ("/api/trains", RouteGroup::Authenticated),
            ("/api/alerts", RouteGroup::Authenticated),
            ("/api/reroutes", RouteGroup::Authenticated),
            ("/api/rbac", RouteGroup::Authenticated),
        ])
    }

    pub fn classify(&self, path: &str) -> Option<RouteGroup> {
        self.rules
            .iter()
            .find(|(prefix, _)| path.starts_with(prefix))
            .map(|(_, group)| *group)
    }
}

/// Shared state of the authorization layer
#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenService>,
    pub audit: Arc<dyn AuditSink>,
    pub routes: Arc<RouteTable>,
}

/// Authorization middleware entry point
pub async fn authorize(
    State(auth): State<AuthState>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();
    let method = request.method().to_string();

    // 1. Classify
    let group = match auth.routes.classify(&path) {
        None | Some(RouteGroup::Public) => return Ok(next.run(request).await),
        Some(group) => group,
    };

    // 2. Extract
    let token = match extract_access_token(request.headers(), &cookies) {
        Some(token) => token,
        None => {
            auth.audit.record(
                AuditEntry::new(&path, &method, false).with_reason("Token missing"),
            );
            return Err(AppError::TokenMissing);
        }
    };

    // 3. Verify
    let payload = match auth.tokens.verify_access(&token) {
        Some(payload) => payload,
        None => {
            // Distinguish expired from invalid so clients know to hit the
            // refresh endpoint. Unreadable tokens are invalid, not expired.
            let expired = TokenService::decode_unverified_expiry(&token)
                .map(|exp| exp < Utc::now().timestamp())
                .unwrap_or(false);
            let (error, reason) = if expired {
                (AppError::TokenExpired, "Token expired")
            } else {
                (AppError::TokenInvalid, "Token invalid")
            };
            auth.audit
                .record(AuditEntry::new(&path, &method, false).with_reason(reason));
            return Err(error);
        }
    };

    // 4. Authorize
    if let Err(error) = check_role(group, payload.role) {
        auth.audit.record(
            AuditEntry::new(&path, &method, false)
                .with_identity(payload.user_id, &payload.email, payload.role)
                .with_reason(error.to_string()),
        );
        return Err(error);
    }

    // 5. Admit
    auth.audit.record(
        AuditEntry::new(&path, &method, true).with_identity(
            payload.user_id,
            &payload.email,
            payload.role,
        ),
    );
    debug!(user = %payload.email, role = %payload.role, path = %path, "request admitted");

    attach_identity_headers(&mut request, payload.user_id, &payload.email, payload.role);
    request.extensions_mut().insert(Identity {
        user_id: payload.user_id,
        email: payload.email,
        role: payload.role,
    });

    Ok(next.run(request).await)
}

/// Compare the verified role against the matched group. ADMIN satisfies
/// every role-specific check in addition to its own.
fn check_role(group: RouteGroup, role: Role) -> Result<(), AppError> {
    match group {
        RouteGroup::Authenticated | RouteGroup::Public => Ok(()),
        RouteGroup::AdminOnly => {
            if role == Role::Admin {
                Ok(())
            } else {
                Err(AppError::Forbidden {
                    code: "FORBIDDEN_ACCESS",
                    message: "Access denied. Admin privileges required.".to_string(),
                })
            }
        }
        RouteGroup::RoleOnly(required) => {
            if role == required || role == Role::Admin {
                Ok(())
            } else {
                let code = match required {
                    Role::StationMaster => "FORBIDDEN_STATION_MASTER",
                    _ => "ROLE_REQUIRED",
                };
                Err(AppError::Forbidden {
                    code,
                    message: format!("Access denied. {} role required.", required),
                })
            }
        }
    }
}

fn attach_identity_headers(request: &mut Request, user_id: i64, email: &str, role: Role) {
    let headers = request.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&user_id.to_string()) {
        headers.insert(HeaderName::from_static(X_USER_ID), value);
    }
    if let Ok(value) = HeaderValue::from_str(email) {
        headers.insert(HeaderName::from_static(X_USER_EMAIL), value);
    }
    if let Ok(value) = HeaderValue::from_str(role.as_str()) {
        headers.insert(HeaderName::from_static(X_USER_ROLE), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tokens::TokenPayload;
    use crate::config::AuthConfig;
    use crate::rbac::MemoryAuditLog;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Json, Router,
    };
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use tower_cookies::CookieManagerLayer;

    const ACCESS_SECRET: &str = "test-access-secret";

    fn auth_state() -> (AuthState, Arc<MemoryAuditLog>) {
        let audit = Arc::new(MemoryAuditLog::new());
        let state = AuthState {
            tokens: Arc::new(TokenService::new(&AuthConfig {
                access_secret: ACCESS_SECRET.to_string(),
                refresh_secret: "test-refresh-secret".to_string(),
                secure_cookies: false,
            })),
            audit: audit.clone(),
            routes: Arc::new(RouteTable::localpassengers()),
        };
        (state, audit)
    }

    async fn echo_identity(identity: Identity) -> Json<Value> {
        Json(json!({ "email": identity.email, "role": identity.role }))
    }

    async fn echo_headers(headers: axum::http::HeaderMap) -> Json<Value> {
        Json(json!({
            "id": headers.get(X_USER_ID).and_then(|v| v.to_str().ok()),
            "email": headers.get(X_USER_EMAIL).and_then(|v| v.to_str().ok()),
            "role": headers.get(X_USER_ROLE).and_then(|v| v.to_str().ok()),
        }))
    }

    fn app(state: AuthState) -> Router {
        Router::new()
            .route("/api/admin/users", get(echo_identity))
            .route("/api/station-master/trains", get(echo_identity))
            .route("/api/trains", get(echo_identity))
            .route("/api/trains/headers", get(echo_headers))
            .route("/api/health", get(|| async { "ok" }))
            .layer(
                tower::ServiceBuilder::new()
                    .layer(CookieManagerLayer::new())
                    .layer(from_fn_with_state(state, authorize)),
            )
    }

    fn token_for(role: Role) -> String {
        let service = TokenService::new(&AuthConfig {
            access_secret: ACCESS_SECRET.to_string(),
            refresh_secret: "test-refresh-secret".to_string(),
            secure_cookies: false,
        });
        service
            .issue_access(&TokenPayload {
                user_id: 7,
                email: "a@b.com".to_string(),
                role,
            })
            .unwrap()
    }

    fn expired_token() -> String {
        #[derive(serde::Serialize)]
        struct StaleClaims<'a> {
            sub: i64,
            email: &'a str,
            role: &'a str,
            exp: i64,
            iat: i64,
            token_type: &'a str,
        }
        let now = Utc::now().timestamp();
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &StaleClaims {
                sub: 7,
                email: "a@b.com",
                role: "USER",
                exp: now - 120,
                iat: now - 1020,
                token_type: "access",
            },
            &jsonwebtoken::EncodingKey::from_secret(ACCESS_SECRET.as_bytes()),
        )
        .unwrap()
    }

    async fn send(app: Router, request: HttpRequest<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn get_with_bearer(path: &str, token: &str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .uri(path)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn missing_token_is_401_with_denied_audit_entry() {
        let (state, audit) = auth_state();
        let request = HttpRequest::builder()
            .uri("/api/trains")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(state), request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["errorCode"], "AUTH_TOKEN_MISSING");
        assert_eq!(body["success"], false);

        let entries = audit.recent(10);
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].allowed);
        assert!(audit.stats().allowed == 0);
    }

    #[tokio::test]
    async fn user_role_on_admin_route_is_403_forbidden_access() {
        let (state, _) = auth_state();
        let request = get_with_bearer("/api/admin/users", &token_for(Role::User));
        let (status, body) = send(app(state), request).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["errorCode"], "FORBIDDEN_ACCESS");
    }

    #[tokio::test]
    async fn user_role_on_station_master_route_is_403() {
        let (state, audit) = auth_state();
        let request = get_with_bearer("/api/station-master/trains", &token_for(Role::User));
        let (status, body) = send(app(state), request).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["errorCode"], "FORBIDDEN_STATION_MASTER");

        let denied = audit.recent_denied(1);
        assert_eq!(denied[0].user_id, Some(7));
        assert_eq!(denied[0].role, Some(Role::User));
    }

    #[tokio::test]
    async fn station_master_reaches_station_master_route() {
        let (state, _) = auth_state();
        let request = get_with_bearer("/api/station-master/trains", &token_for(Role::StationMaster));
        let (status, body) = send(app(state), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "STATION_MASTER");
    }

    #[tokio::test]
    async fn admin_satisfies_station_master_check() {
        let (state, audit) = auth_state();
        let request = get_with_bearer("/api/station-master/trains", &token_for(Role::Admin));
        let (status, body) = send(app(state), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "ADMIN");
        assert!(audit.recent(1)[0].allowed);
    }

    #[tokio::test]
    async fn expired_token_is_401_token_expired() {
        let (state, _) = auth_state();
        let request = get_with_bearer("/api/trains", &expired_token());
        let (status, body) = send(app(state), request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["errorCode"], "TOKEN_EXPIRED");
        assert!(body["hint"].as_str().unwrap().contains("/api/auth/refresh"));
    }

    #[tokio::test]
    async fn garbage_token_is_401_invalid_not_expired() {
        let (state, _) = auth_state();
        let request = get_with_bearer("/api/trains", "definitely.not.a-jwt");
        let (status, body) = send(app(state), request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["errorCode"], "AUTH_TOKEN_INVALID");
    }

    #[tokio::test]
    async fn access_cookie_admits_without_header() {
        let (state, _) = auth_state();
        let request = HttpRequest::builder()
            .uri("/api/trains")
            .header(
                header::COOKIE,
                format!("accessToken={}", token_for(Role::User)),
            )
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(state), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "a@b.com");
    }

    #[tokio::test]
    async fn identity_headers_reach_the_handler() {
        let (state, _) = auth_state();
        let request = get_with_bearer("/api/trains/headers", &token_for(Role::TeamLead));
        let (status, body) = send(app(state), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "7");
        assert_eq!(body["email"], "a@b.com");
        assert_eq!(body["role"], "TEAM_LEAD");
    }

    #[tokio::test]
    async fn unmatched_path_passes_through_without_audit() {
        let (state, audit) = auth_state();
        let request = HttpRequest::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app(state), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(audit.recent(10).is_empty());
    }

    #[test]
    fn route_table_first_match_wins() {
        let table = RouteTable::localpassengers();
        assert_eq!(table.classify("/api/auth/refresh"), Some(RouteGroup::Public));
        assert_eq!(table.classify("/api/auth/me"), Some(RouteGroup::Authenticated));
        assert_eq!(table.classify("/api/admin/users/3"), Some(RouteGroup::AdminOnly));
        assert_eq!(
            table.classify("/api/station-master/trains"),
            Some(RouteGroup::RoleOnly(Role::StationMaster))
        );
        assert_eq!(table.classify("/health"), None);
        // user management lives under /api/admin; no bare /api/users rule
        assert_eq!(table.classify("/api/users"), None);
    }
}
