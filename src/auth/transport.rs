//! Token transport
//!
//! Moves tokens between HTTP requests/responses and the token service.
//! Access tokens travel either as a `Bearer` header or an `accessToken`
//! cookie; refresh tokens live in a cookie path-scoped to the refresh
//! endpoint so they are never sent on unrelated requests.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use tower_cookies::{
    cookie::{time::Duration, SameSite},
    Cookie, Cookies,
};

use super::tokens::{ACCESS_TOKEN_EXPIRY_MINUTES, REFRESH_TOKEN_EXPIRY_DAYS};

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Refresh cookie is only ever sent to the refresh endpoint
pub const REFRESH_COOKIE_PATH: &str = "/api/auth/refresh";

/// Parse a `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

/// Extract the access token from a request.
///
/// Priority: (1) `Authorization: Bearer` header, (2) `accessToken` cookie.
/// First match wins; no merging.
pub fn extract_access_token(headers: &HeaderMap, cookies: &Cookies) -> Option<String> {
    if let Some(token) = bearer_token(headers) {
        return Some(token.to_string());
    }
    cookies
        .get(ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
}

/// Extract the refresh token. Cookie only.
pub fn extract_refresh_token(cookies: &Cookies) -> Option<String> {
    cookies
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
}

fn access_cookie(value: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(ACCESS_TOKEN_COOKIE, value);
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookie.set_max_age(Duration::minutes(ACCESS_TOKEN_EXPIRY_MINUTES));
    cookie
}

fn refresh_cookie(value: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(REFRESH_TOKEN_COOKIE, value);
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path(REFRESH_COOKIE_PATH);
    cookie.set_max_age(Duration::days(REFRESH_TOKEN_EXPIRY_DAYS));
    cookie
}

/// Set both auth cookies on the response (login/register)
pub fn attach_tokens(cookies: &Cookies, access: &str, refresh: &str, secure: bool) {
    cookies.add(access_cookie(access.to_string(), secure));
    cookies.add(refresh_cookie(refresh.to_string(), secure));
}

/// Replace only the access cookie (refresh flow)
pub fn attach_access_token(cookies: &Cookies, access: &str, secure: bool) {
    cookies.add(access_cookie(access.to_string(), secure));
}

/// Overwrite both cookies with zero max-age (logout)
pub fn clear_tokens(cookies: &Cookies, secure: bool) {
    let mut access = access_cookie(String::new(), secure);
    access.set_max_age(Duration::ZERO);
    cookies.add(access);

    let mut refresh = refresh_cookie(String::new(), secure);
    refresh.set_max_age(Duration::ZERO);
    cookies.add(refresh);
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn bearer_header_parses() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn non_bearer_schemes_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn access_cookie_attributes() {
        let cookie = access_cookie("tok".to_string(), true);
        assert_eq!(cookie.name(), "accessToken");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(Duration::minutes(15)));
    }

    #[test]
    fn refresh_cookie_is_path_scoped() {
        let cookie = refresh_cookie("tok".to_string(), false);
        assert_eq!(cookie.name(), "refreshToken");
        assert_eq!(cookie.path(), Some("/api/auth/refresh"));
        assert_eq!(cookie.max_age(), Some(Duration::days(7)));
        assert_eq!(cookie.secure(), Some(false));
    }
}
