//! JWT token service
//!
//! Issues and verifies access/refresh tokens. The two token classes are
//! signed with distinct HS256 secrets; verification returns the payload or
//! nothing, never an error the caller has to unwind. A token is either fully
//! verified or rejected.

use crate::config::AuthConfig;
use crate::error::AppError;
use crate::rbac::Role;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Access token expiration (15 minutes)
pub const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 15;

/// Refresh token expiration (7 days)
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

/// Identity carried inside both token classes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
}

/// JWT claims as encoded on the wire
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject (user ID)
    sub: i64,
    email: String,
    role: Role,
    /// Expiration time (Unix timestamp)
    exp: i64,
    /// Issued at (Unix timestamp)
    iat: i64,
    token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
enum TokenType {
    Access,
    Refresh,
}

/// Token pair returned on login/register
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Issues and verifies both token classes. No shared mutable state; safe to
/// call concurrently.
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
        }
    }

    /// Sign a short-lived access token for the given identity
    pub fn issue_access(&self, payload: &TokenPayload) -> Result<String, AppError> {
        self.issue(
            payload,
            TokenType::Access,
            Duration::minutes(ACCESS_TOKEN_EXPIRY_MINUTES),
            &self.access_encoding,
        )
    }

    /// Sign a long-lived refresh token for the given identity
    pub fn issue_refresh(&self, payload: &TokenPayload) -> Result<String, AppError> {
        self.issue(
            payload,
            TokenType::Refresh,
            Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
            &self.refresh_encoding,
        )
    }

    /// Issue both tokens at once (login/register flow)
    pub fn issue_pair(&self, payload: &TokenPayload) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.issue_access(payload)?,
            refresh_token: self.issue_refresh(payload)?,
            token_type: "Bearer".to_string(),
            expires_in: ACCESS_TOKEN_EXPIRY_MINUTES * 60,
        })
    }

    fn issue(
        &self,
        payload: &TokenPayload,
        token_type: TokenType,
        lifetime: Duration,
        key: &EncodingKey,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: payload.user_id,
            email: payload.email.clone(),
            role: payload.role,
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
            token_type,
        };
        encode(&Header::default(), &claims, key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify an access token. Expired, malformed, wrongly-signed, and
    /// wrong-class tokens all collapse to `None`.
    pub fn verify_access(&self, token: &str) -> Option<TokenPayload> {
        self.verify(token, TokenType::Access, &self.access_decoding)
    }

    /// Verify a refresh token; same contract as [`Self::verify_access`].
    pub fn verify_refresh(&self, token: &str) -> Option<TokenPayload> {
        self.verify(token, TokenType::Refresh, &self.refresh_decoding)
    }

    fn verify(&self, token: &str, expected: TokenType, key: &DecodingKey) -> Option<TokenPayload> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, key, &validation).ok()?;
        if data.claims.token_type != expected {
            return None;
        }
        Some(TokenPayload {
            user_id: data.claims.sub,
            email: data.claims.email,
            role: data.claims.role,
        })
    }

    /// Read the expiry out of a token without verifying the signature.
    ///
    /// Diagnostics only. Never treat the result as an authentication
    /// decision.
    pub fn decode_unverified_expiry(token: &str) -> Option<i64> {
        #[derive(Deserialize)]
        struct ExpOnly {
            exp: i64,
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<ExpOnly>(token, &DecodingKey::from_secret(&[]), &validation)
            .ok()
            .map(|data| data.claims.exp)
    }

    /// True when the (unverified) expiry lies in the past or cannot be read
    pub fn is_expired(token: &str) -> bool {
        match Self::decode_unverified_expiry(token) {
            Some(exp) => exp < Utc::now().timestamp(),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn service() -> TokenService {
        TokenService::new(&AuthConfig {
            access_secret: "test-access-secret".to_string(),
            refresh_secret: "test-refresh-secret".to_string(),
            secure_cookies: false,
        })
    }

    fn payload() -> TokenPayload {
        TokenPayload {
            user_id: 7,
            email: "a@b.com".to_string(),
            role: Role::User,
        }
    }

    fn sign_expired(service: &TokenService, seconds_ago: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 7,
            email: "a@b.com".to_string(),
            role: Role::User,
            exp: now - seconds_ago,
            iat: now - seconds_ago - 60,
            token_type: TokenType::Access,
        };
        encode(&Header::default(), &claims, &service.access_encoding).unwrap()
    }

    #[test]
    fn access_token_round_trips() {
        let service = service();
        let token = service.issue_access(&payload()).unwrap();
        let verified = service.verify_access(&token).unwrap();
        assert_eq!(verified, payload());
    }

    #[test]
    fn refresh_token_round_trips() {
        let service = service();
        let token = service.issue_refresh(&payload()).unwrap();
        let verified = service.verify_refresh(&token).unwrap();
        assert_eq!(verified, payload());
    }

    #[test]
    fn token_classes_do_not_cross_verify() {
        let service = service();
        let access = service.issue_access(&payload()).unwrap();
        let refresh = service.issue_refresh(&payload()).unwrap();
        assert!(service.verify_refresh(&access).is_none());
        assert!(service.verify_access(&refresh).is_none());
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let service = service();
        let other = TokenService::new(&AuthConfig {
            access_secret: "a-different-secret".to_string(),
            refresh_secret: "another-different-secret".to_string(),
            secure_cookies: false,
        });
        let token = service.issue_access(&payload()).unwrap();
        assert!(other.verify_access(&token).is_none());
    }

    #[test]
    fn expired_token_is_invalid() {
        let service = service();
        let token = sign_expired(&service, 120);
        assert!(service.verify_access(&token).is_none());
        assert!(TokenService::is_expired(&token));
    }

    #[test]
    fn malformed_token_is_invalid() {
        let service = service();
        assert!(service.verify_access("not-a-jwt").is_none());
        assert!(service.verify_access("").is_none());
        assert!(TokenService::decode_unverified_expiry("garbage").is_none());
    }

    #[test]
    fn unverified_decode_exposes_expiry_only() {
        let service = service();
        let token = service.issue_access(&payload()).unwrap();
        let exp = TokenService::decode_unverified_expiry(&token).unwrap();
        let expected = Utc::now().timestamp() + ACCESS_TOKEN_EXPIRY_MINUTES * 60;
        assert!((exp - expected).abs() <= 2);
        assert!(!TokenService::is_expired(&token));
    }

    #[test]
    fn pair_carries_bearer_metadata() {
        let service = service();
        let pair = service.issue_pair(&payload()).unwrap();
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 900);
        assert!(service.verify_access(&pair.access_token).is_some());
        assert!(service.verify_refresh(&pair.refresh_token).is_some());
    }
}
