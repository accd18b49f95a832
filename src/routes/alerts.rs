//! Passenger alert route handlers

use crate::auth::Identity;
use crate::error::{validation_error, AppError};
use crate::models::{Alert, CreateAlertRequest, UpdateAlertRequest};
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
pub struct AlertQuery {
    pub train_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct AlertListResponse {
    pub success: bool,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Serialize)]
pub struct AlertResponse {
    pub success: bool,
    pub alert: Alert,
}

/// GET /api/alerts
pub async fn list(
    State(state): State<SharedState>,
    identity: Identity,
    Query(query): Query<AlertQuery>,
) -> Result<Json<AlertListResponse>, AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::ReadAlert,
        "/api/alerts",
        "list alerts",
    )?;

    let alerts = state.alerts.list(query.train_id).await;
    Ok(Json(AlertListResponse {
        success: true,
        alerts,
    }))
}

/// POST /api/alerts
pub async fn create(
    State(state): State<SharedState>,
    identity: Identity,
    Json(req): Json<CreateAlertRequest>,
) -> Result<(StatusCode, Json<AlertResponse>), AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::CreateAlert,
        "/api/alerts",
        "create alert",
    )?;
    req.validate().map_err(|e| validation_error(e.to_string()))?;

    // Alerts must point at a real train
    state.trains.get(req.train_id).await?;

    let now = Utc::now();
    let alert = Alert {
        id: Uuid::new_v4(),
        train_id: req.train_id,
        train_name: req.train_name,
        source: req.source,
        destination: req.destination,
        alert_type: req.alert_type,
        created_by: identity.user_id,
        created_at: now,
        updated_at: now,
    };

    let alert = state.alerts.create(alert).await?;
    Ok((
        StatusCode::CREATED,
        Json(AlertResponse {
            success: true,
            alert,
        }),
    ))
}

/// GET /api/alerts/{id}
pub async fn get_one(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<AlertResponse>, AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::ReadAlert,
        "/api/alerts",
        "read alert",
    )?;

    let alert = state.alerts.get(id).await?;
    Ok(Json(AlertResponse {
        success: true,
        alert,
    }))
}

/// PUT /api/alerts/{id}
pub async fn update(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAlertRequest>,
) -> Result<Json<AlertResponse>, AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::UpdateAlert,
        "/api/alerts",
        "update alert",
    )?;
    req.validate().map_err(|e| validation_error(e.to_string()))?;

    let mut alert = state.alerts.get(id).await?;
    if let Some(train_name) = req.train_name {
        alert.train_name = train_name;
    }
    if let Some(source) = req.source {
        alert.source = source;
    }
    if let Some(destination) = req.destination {
        alert.destination = destination;
    }
    if let Some(alert_type) = req.alert_type {
        alert.alert_type = alert_type;
    }
    alert.updated_at = Utc::now();

    let alert = state.alerts.update(alert).await?;
    Ok(Json(AlertResponse {
        success: true,
        alert,
    }))
}

/// DELETE /api/alerts/{id}
pub async fn remove(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::DeleteAlert,
        "/api/alerts",
        "delete alert",
    )?;

    state.alerts.delete(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Alert {} deleted.", id)
    })))
}
