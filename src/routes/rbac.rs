//! RBAC introspection handlers
//!
//! Read-only views over the role table and the audit log. The permission
//! listing is open to any authenticated user; the audit endpoints require
//! the `view:logs` grant.

use crate::auth::Identity;
use crate::error::AppError;
use crate::rbac::{
    permissions_for, require_permission, AuditEntry, AuditStats, Permission, Role, ROLE_HIERARCHY,
};
use crate::state::SharedState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct MyPermissionsResponse {
    pub success: bool,
    pub role: Role,
    pub permissions: &'static [Permission],
}

#[derive(Debug, Serialize)]
pub struct RoleInfo {
    pub role: Role,
    pub description: &'static str,
    pub permissions: &'static [Permission],
}

#[derive(Debug, Serialize)]
pub struct RolesResponse {
    pub success: bool,
    pub roles: Vec<RoleInfo>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<usize>,
    pub user_id: Option<i64>,
    pub denied_only: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct AuditLogResponse {
    pub success: bool,
    pub entries: Vec<AuditEntry>,
}

#[derive(Debug, Serialize)]
pub struct AuditStatsResponse {
    pub success: bool,
    pub stats: AuditStats,
}

/// GET /api/rbac/permissions
///
/// The calling user's role and granted permissions.
pub async fn my_permissions(identity: Identity) -> Json<MyPermissionsResponse> {
    Json(MyPermissionsResponse {
        success: true,
        role: identity.role,
        permissions: permissions_for(identity.role),
    })
}

/// GET /api/rbac/roles
///
/// The full role table, most privileged first.
pub async fn roles(_identity: Identity) -> Json<RolesResponse> {
    Json(RolesResponse {
        success: true,
        roles: ROLE_HIERARCHY
            .into_iter()
            .map(|role| RoleInfo {
                role,
                description: role.description(),
                permissions: permissions_for(role),
            })
            .collect(),
    })
}

/// GET /api/rbac/audit-log
pub async fn audit_log(
    State(state): State<SharedState>,
    identity: Identity,
    Query(query): Query<AuditQuery>,
) -> Result<Json<AuditLogResponse>, AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::ViewLogs,
        "/api/rbac/audit-log",
        "view audit log",
    )?;

    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let entries = if let Some(user_id) = query.user_id {
        state.auth.audit.recent_for_user(user_id, limit)
    } else if query.denied_only.unwrap_or(false) {
        state.auth.audit.recent_denied(limit)
    } else {
        state.auth.audit.recent(limit)
    };

    Ok(Json(AuditLogResponse {
        success: true,
        entries,
    }))
}

/// GET /api/rbac/stats
pub async fn stats(
    State(state): State<SharedState>,
    identity: Identity,
) -> Result<Json<AuditStatsResponse>, AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::ViewLogs,
        "/api/rbac/stats",
        "view audit stats",
    )?;

    Ok(Json(AuditStatsResponse {
        success: true,
        stats: state.auth.audit.stats(),
    }))
}
