//! Authentication route handlers
//!
//! Registration, login, token refresh, logout, and the current-user
//! endpoint. Login and register set both token cookies; refresh rotates the
//! access cookie only.

use crate::auth::{
    attach_access_token, attach_tokens, clear_tokens, extract_refresh_token, hash_password,
    verify_password, Identity, TokenPair, TokenPayload, TokenService,
    ACCESS_TOKEN_EXPIRY_MINUTES,
};
use crate::db::DbUser;
use crate::error::{validation_error, AppError};
use crate::rbac::Role;
use crate::state::SharedState;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}

impl From<&DbUser> for UserResponse {
    fn from(user: &DbUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserResponse,
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    pub user: UserResponse,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: UserResponse,
}

fn token_payload(user: &DbUser) -> TokenPayload {
    TokenPayload {
        user_id: user.id,
        email: user.email.clone(),
        role: user.role,
    }
}

/// Sign a fresh access token for `user` and set it as the access cookie
fn issue_access_cookie(
    tokens: &TokenService,
    cookies: &Cookies,
    user: &DbUser,
    secure: bool,
) -> Result<String, AppError> {
    let access_token = tokens.issue_access(&token_payload(user))?;
    attach_access_token(cookies, &access_token, secure);
    Ok(access_token)
}

/// POST /api/auth/register
///
/// Register a new account. New users get the USER role; role changes go
/// through the admin endpoints.
pub async fn register(
    State(state): State<SharedState>,
    cookies: Cookies,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    req.validate().map_err(|e| validation_error(e.to_string()))?;

    let password_hash = hash_password(&req.password)?;
    let user = state
        .users
        .create(&req.email, &password_hash, &req.name, Role::User)
        .await?;

    let tokens = state.auth.tokens.issue_pair(&token_payload(&user))?;
    attach_tokens(
        &cookies,
        &tokens.access_token,
        &tokens.refresh_token,
        state.secure_cookies,
    );

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            user: UserResponse::from(&user),
            tokens,
        }),
    ))
}

/// POST /api/auth/login
///
/// Authenticate with email and password, receive JWT tokens.
pub async fn login(
    State(state): State<SharedState>,
    cookies: Cookies,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let tokens = state.auth.tokens.issue_pair(&token_payload(&user))?;
    attach_tokens(
        &cookies,
        &tokens.access_token,
        &tokens.refresh_token,
        state.secure_cookies,
    );

    Ok(Json(AuthResponse {
        success: true,
        user: UserResponse::from(&user),
        tokens,
    }))
}

/// POST /api/auth/refresh
///
/// Mint a new access token from the refresh cookie. The refresh token itself
/// is not rotated; it stays valid until its own expiry. The new access token
/// is built from the current database record, so role changes made since
/// login take effect here.
pub async fn refresh(
    State(state): State<SharedState>,
    cookies: Cookies,
) -> Result<Json<RefreshResponse>, AppError> {
    let token = extract_refresh_token(&cookies).ok_or(AppError::RefreshTokenMissing)?;

    let payload = state
        .auth
        .tokens
        .verify_refresh(&token)
        .ok_or(AppError::RefreshTokenInvalid)?;

    // The account may have been deleted since the refresh token was issued
    let user = state
        .users
        .find_by_id(payload.user_id)
        .await?
        .ok_or(AppError::UserGone)?;

    let access_token =
        issue_access_cookie(&state.auth.tokens, &cookies, &user, state.secure_cookies)?;

    Ok(Json(RefreshResponse {
        success: true,
        user: UserResponse::from(&user),
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: ACCESS_TOKEN_EXPIRY_MINUTES * 60,
    }))
}

/// POST /api/auth/logout
///
/// Clear both token cookies. Stateless tokens stay verifiable until expiry;
/// logout only removes them from the browser.
pub async fn logout(
    State(state): State<SharedState>,
    cookies: Cookies,
) -> Json<serde_json::Value> {
    clear_tokens(&cookies, state.secure_cookies);
    Json(serde_json::json!({
        "success": true,
        "message": "Logged out successfully."
    }))
}

/// GET /api/auth/me
///
/// Current user, resolved from the verified identity attached by the
/// middleware.
pub async fn me(
    State(state): State<SharedState>,
    identity: Identity,
) -> Result<Json<MeResponse>, AppError> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", identity.user_id)))?;

    Ok(Json(MeResponse {
        success: true,
        user: UserResponse::from(&user),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ACCESS_TOKEN_COOKIE;
    use crate::config::AuthConfig;
    use crate::state::{AppState, SharedState};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        routing::post,
        Router,
    };
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;
    use tower_cookies::CookieManagerLayer;

    fn auth_config() -> AuthConfig {
        AuthConfig {
            access_secret: "test-access-secret".to_string(),
            refresh_secret: "test-refresh-secret".to_string(),
            secure_cookies: false,
        }
    }

    // Deadpool opens connections lazily, so a state built this way works for
    // every path that fails before touching Postgres.
    fn test_state() -> SharedState {
        let mut cfg = deadpool_postgres::Config::new();
        cfg.host = Some("127.0.0.1".to_string());
        cfg.user = Some("unused".to_string());
        cfg.dbname = Some("unused".to_string());
        let pool = cfg
            .create_pool(
                Some(deadpool_postgres::Runtime::Tokio1),
                tokio_postgres::NoTls,
            )
            .unwrap();
        Arc::new(AppState::new(pool, &auth_config()))
    }

    fn app(state: SharedState) -> Router {
        Router::new()
            .route("/api/auth/refresh", post(refresh))
            .route("/api/auth/logout", post(logout))
            .with_state(state)
            .layer(CookieManagerLayer::new())
    }

    fn user(role: Role) -> DbUser {
        let now = Utc::now();
        DbUser {
            id: 7,
            email: "a@b.com".to_string(),
            password_hash: "x".to_string(),
            name: Some("A".to_string()),
            role,
            created_at: now,
            updated_at: now,
        }
    }

    fn post_to(path: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn rotated_access_cookie_payload_matches_the_user() {
        let tokens = TokenService::new(&auth_config());
        let cookies = Cookies::default();
        let user = user(Role::TeamLead);

        let token = issue_access_cookie(&tokens, &cookies, &user, false).unwrap();

        let cookie = cookies.get(ACCESS_TOKEN_COOKIE).unwrap();
        assert_eq!(cookie.value(), token);
        let payload = tokens.verify_access(cookie.value()).unwrap();
        assert_eq!(payload.user_id, 7);
        assert_eq!(payload.email, "a@b.com");
        assert_eq!(payload.role, Role::TeamLead);
    }

    #[tokio::test]
    async fn logout_is_200_and_expires_both_cookies() {
        let response = app(test_state())
            .oneshot(post_to("/api/auth/logout", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let set: Vec<String> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(set.len(), 2);

        let access = set.iter().find(|c| c.starts_with("accessToken=")).unwrap();
        assert!(access.contains("Max-Age=0"));
        let refresh = set.iter().find(|c| c.starts_with("refreshToken=")).unwrap();
        assert!(refresh.contains("Max-Age=0"));
        assert!(refresh.contains("Path=/api/auth/refresh"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn refresh_without_cookie_is_401_missing() {
        let response = app(test_state())
            .oneshot(post_to("/api/auth/refresh", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["errorCode"], "REFRESH_TOKEN_MISSING");
    }

    #[tokio::test]
    async fn refresh_with_garbage_cookie_is_401_invalid() {
        let response = app(test_state())
            .oneshot(post_to(
                "/api/auth/refresh",
                Some("refreshToken=not-a-jwt"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["errorCode"], "REFRESH_TOKEN_INVALID");
    }

    #[tokio::test]
    async fn access_token_in_refresh_cookie_is_rejected() {
        let state = test_state();
        let access = state
            .auth
            .tokens
            .issue_access(&token_payload(&user(Role::User)))
            .unwrap();
        let cookie = format!("refreshToken={}", access);

        let response = app(state)
            .oneshot(post_to("/api/auth/refresh", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["errorCode"], "REFRESH_TOKEN_INVALID");
    }
}
