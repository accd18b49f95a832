//! Reroute route handlers

use crate::auth::Identity;
use crate::error::{validation_error, AppError};
use crate::models::{CreateRerouteRequest, Reroute};
use crate::rbac::{require_permission, Permission};
use crate::state::SharedState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RerouteQuery {
    pub train_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct RerouteListResponse {
    pub success: bool,
    pub reroutes: Vec<Reroute>,
}

#[derive(Debug, Serialize)]
pub struct RerouteResponse {
    pub success: bool,
    pub reroute: Reroute,
}

/// GET /api/reroutes
pub async fn list(
    State(state): State<SharedState>,
    identity: Identity,
    Query(query): Query<RerouteQuery>,
) -> Result<Json<RerouteListResponse>, AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::ReadReroute,
        "/api/reroutes",
        "list reroutes",
    )?;

    let reroutes = state.reroutes.list(query.train_id).await;
    Ok(Json(RerouteListResponse {
        success: true,
        reroutes,
    }))
}

/// POST /api/reroutes
pub async fn create(
    State(state): State<SharedState>,
    identity: Identity,
    Json(req): Json<CreateRerouteRequest>,
) -> Result<(StatusCode, Json<RerouteResponse>), AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::CreateReroute,
        "/api/reroutes",
        "create reroute",
    )?;
    req.validate().map_err(|e| validation_error(e.to_string()))?;

    // Reroutes must point at a real train
    state.trains.get(req.train_id).await?;

    let reroute = Reroute {
        id: Uuid::new_v4(),
        train_id: req.train_id,
        source: req.source,
        destination: req.destination,
        reason: req.reason,
        created_by: identity.user_id,
        created_at: Utc::now(),
    };

    let reroute = state.reroutes.create(reroute).await?;
    Ok((
        StatusCode::CREATED,
        Json(RerouteResponse {
            success: true,
            reroute,
        }),
    ))
}

/// DELETE /api/reroutes/{id}
pub async fn remove(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::DeleteReroute,
        "/api/reroutes",
        "delete reroute",
    )?;

    state.reroutes.delete(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Reroute {} deleted.", id)
    })))
}
