//! Admin user-management handlers
//!
//! The middleware already restricts `/api/admin` to ADMIN; these handlers
//! still run the fine-grained permission gates so every decision is audited.

use crate::auth::Identity;
use crate::error::AppError;
use crate::rbac::{require_permission, Permission, Role};
use crate::routes::auth::UserResponse;
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct UsersListResponse {
    pub success: bool,
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Serialize)]
pub struct UserUpdatedResponse {
    pub success: bool,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<SharedState>,
    identity: Identity,
) -> Result<Json<UsersListResponse>, AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::ReadUser,
        "/api/admin/users",
        "list users",
    )?;

    let users = state.users.list().await?;
    Ok(Json(UsersListResponse {
        success: true,
        users: users.iter().map(UserResponse::from).collect(),
    }))
}

/// PATCH /api/admin/users/{id}
pub async fn update_role(
    State(state): State<SharedState>,
    identity: Identity,
    Path(user_id): Path<i64>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<UserUpdatedResponse>, AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::ManageRoles,
        "/api/admin/users",
        "update user role",
    )?;

    if user_id == identity.user_id && req.role != Role::Admin {
        return Err(AppError::BadRequest(
            "Admins cannot demote their own account".to_string(),
        ));
    }

    let user = state.users.update_role(user_id, req.role).await?;
    Ok(Json(UserUpdatedResponse {
        success: true,
        user: UserResponse::from(&user),
    }))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    State(state): State<SharedState>,
    identity: Identity,
    Path(user_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::DeleteUser,
        "/api/admin/users",
        "delete user",
    )?;

    if user_id == identity.user_id {
        return Err(AppError::BadRequest(
            "Admins cannot delete their own account".to_string(),
        ));
    }

    state.users.delete(user_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("User {} deleted.", user_id)
    })))
}
