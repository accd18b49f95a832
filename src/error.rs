//! Error handling module
//!
//! Provides unified error types and the JSON error envelope shared by every
//! failure response: `{ success, message, errorCode, hint? }`. Authentication
//! and authorization failures are fully handled at the middleware boundary;
//! handlers only ever see an authorized request.

use crate::rbac::Permission;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("Authentication required. Token missing.")]
    TokenMissing,

    #[error("Invalid token. Please login again.")]
    TokenInvalid,

    #[error("Access token expired.")]
    TokenExpired,

    #[error("Refresh token not found. Please login again.")]
    RefreshTokenMissing,

    #[error("Invalid or expired refresh token. Please login again.")]
    RefreshTokenInvalid,

    #[error("User not found. Please login again.")]
    UserGone,

    #[error("{message}")]
    Forbidden {
        code: &'static str,
        message: String,
    },

    #[error("Access denied. You do not have permission to {action}.")]
    PermissionDenied {
        permission: Permission,
        action: String,
    },

    #[error("{0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Error response envelope
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl AppError {
    /// Stable machine-readable code carried in every error body
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Pool(_) => "POOL_EXHAUSTED",
            AppError::TokenMissing => "AUTH_TOKEN_MISSING",
            AppError::TokenInvalid => "AUTH_TOKEN_INVALID",
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::RefreshTokenMissing => "REFRESH_TOKEN_MISSING",
            AppError::RefreshTokenInvalid => "REFRESH_TOKEN_INVALID",
            AppError::UserGone => "USER_NOT_FOUND",
            AppError::Forbidden { code, .. } => code,
            AppError::PermissionDenied { .. } => "PERMISSION_DENIED",
            AppError::Unauthorized(_) => "AUTH_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Pool(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::TokenMissing
            | AppError::TokenInvalid
            | AppError::TokenExpired
            | AppError::RefreshTokenMissing
            | AppError::RefreshTokenInvalid
            | AppError::UserGone
            | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } | AppError::PermissionDenied { .. } => {
                StatusCode::FORBIDDEN
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn hint(&self) -> Option<String> {
        match self {
            AppError::TokenExpired => Some(
                "Call POST /api/auth/refresh with the refresh cookie to obtain a new access token."
                    .to_string(),
            ),
            AppError::PermissionDenied { permission, .. } => {
                Some(format!("Required permission: {}", permission))
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // 5xx details go to the log, never into the body
        let message = match &self {
            AppError::Database(e) => {
                error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Pool(e) => {
                error!("Pool error: {:?}", e);
                "Database connection pool exhausted".to_string()
            }
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            AppError::Config(msg) => {
                error!("Configuration error: {}", msg);
                "A configuration error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            error_code: self.error_code().to_string(),
            hint: self.hint(),
        });

        (self.status(), body).into_response()
    }
}

/// Helper function to create a validation error
pub fn validation_error(msg: impl Into<String>) -> AppError {
    AppError::Validation(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn codes_are_stable() {
        assert_eq!(AppError::TokenMissing.error_code(), "AUTH_TOKEN_MISSING");
        assert_eq!(AppError::TokenExpired.error_code(), "TOKEN_EXPIRED");
        assert_eq!(AppError::TokenInvalid.error_code(), "AUTH_TOKEN_INVALID");
        assert_eq!(
            AppError::Forbidden {
                code: "FORBIDDEN_STATION_MASTER",
                message: "Access denied.".to_string(),
            }
            .error_code(),
            "FORBIDDEN_STATION_MASTER"
        );
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(AppError::TokenMissing.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::TokenExpired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::PermissionDenied {
                permission: Permission::CreateTrain,
                action: "create a train".to_string(),
            }
            .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Internal("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn expired_token_suggests_refresh() {
        let hint = AppError::TokenExpired.hint().unwrap();
        assert!(hint.contains("/api/auth/refresh"));
    }
}
