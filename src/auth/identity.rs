//! Verified request identity
//!
//! The authorization middleware injects an [`Identity`] (and the matching
//! `x-user-*` headers) into every admitted request. Handlers consume it via
//! the axum extractor below and never verify tokens themselves.

use crate::error::AppError;
use crate::rbac::Role;
use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Serialize;

/// Internal identity headers attached for downstream handlers
pub const X_USER_ID: &str = "x-user-id";
pub const X_USER_EMAIL: &str = "x-user-email";
pub const X_USER_ROLE: &str = "x-user-role";

/// Identity of the verified caller
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(AppError::TokenMissing)
    }
}
