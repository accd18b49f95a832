//! Train route handlers

use crate::auth::Identity;
use crate::error::{validation_error, AppError};
use crate::models::{CreateTrainRequest, Train, TrainQuery, UpdateTrainRequest};
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

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug, Serialize)]
pub struct TrainListResponse {
    pub success: bool,
    pub trains: Vec<Train>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub success: bool,
    pub train: Train,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub station_master_id: i64,
}

/// GET /api/trains
pub async fn list(
    State(state): State<SharedState>,
    identity: Identity,
    Query(query): Query<TrainQuery>,
) -> Result<Json<TrainListResponse>, AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::ReadTrain,
        "/api/trains",
        "list trains",
    )?;

    let (page, limit) = query.pagination();
    let (trains, total) = state
        .trains
        .list(query.source.as_deref(), query.destination.as_deref(), page, limit)
        .await;

    Ok(Json(TrainListResponse {
        success: true,
        trains,
        pagination: Pagination {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit),
        },
    }))
}

/// POST /api/trains
pub async fn create(
    State(state): State<SharedState>,
    identity: Identity,
    Json(req): Json<CreateTrainRequest>,
) -> Result<(StatusCode, Json<TrainResponse>), AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::CreateTrain,
        "/api/trains",
        "create train",
    )?;
    req.validate().map_err(|e| validation_error(e.to_string()))?;

    let now = Utc::now();
    let train = Train {
        id: Uuid::new_v4(),
        train_number: req.train_number,
        name: req.name,
        source: req.source,
        destination: req.destination,
        departure_time: req.departure_time,
        arrival_time: req.arrival_time,
        status: req.status.unwrap_or_else(|| "scheduled".to_string()),
        station_master_id: None,
        created_at: now,
        updated_at: now,
    };

    let train = state.trains.create(train).await?;
    Ok((
        StatusCode::CREATED,
        Json(TrainResponse {
            success: true,
            train,
        }),
    ))
}

/// GET /api/trains/{id}
pub async fn get_one(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<TrainResponse>, AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::ReadTrain,
        "/api/trains",
        "read train",
    )?;

    let train = state.trains.get(id).await?;
    Ok(Json(TrainResponse {
        success: true,
        train,
    }))
}

/// PUT /api/trains/{id}
pub async fn update(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTrainRequest>,
) -> Result<Json<TrainResponse>, AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::UpdateTrain,
        "/api/trains",
        "update train",
    )?;
    req.validate().map_err(|e| validation_error(e.to_string()))?;

    let mut train = state.trains.get(id).await?;
    if let Some(name) = req.name {
        train.name = name;
    }
    if let Some(source) = req.source {
        train.source = source;
    }
    if let Some(destination) = req.destination {
        train.destination = destination;
    }
    if let Some(departure_time) = req.departure_time {
        train.departure_time = departure_time;
    }
    if let Some(arrival_time) = req.arrival_time {
        train.arrival_time = arrival_time;
    }
    if let Some(status) = req.status {
        train.status = status;
    }
    if let Some(station_master_id) = req.station_master_id {
        train.station_master_id = Some(station_master_id);
    }
    train.updated_at = Utc::now();

    let train = state.trains.update(train).await?;
    Ok(Json(TrainResponse {
        success: true,
        train,
    }))
}

/// DELETE /api/trains/{id}
pub async fn remove(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::DeleteTrain,
        "/api/trains",
        "delete train",
    )?;

    state.trains.delete(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Train {} deleted.", id)
    })))
}

/// PUT /api/trains/{id}/assign
///
/// Assign a station master to a train. Requires the dedicated assign grant,
/// which only ADMIN holds.
pub async fn assign(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<TrainResponse>, AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::AssignTrain,
        "/api/trains",
        "assign station master",
    )?;

    let master = state
        .users
        .find_by_id(req.station_master_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("User {} not found", req.station_master_id))
        })?;
    if master.role != crate::rbac::Role::StationMaster {
        return Err(AppError::BadRequest(format!(
            "User {} is not a station master",
            master.id
        )));
    }

    let mut train = state.trains.get(id).await?;
    train.station_master_id = Some(master.id);
    train.updated_at = Utc::now();
    let train = state.trains.update(train).await?;

    Ok(Json(TrainResponse {
        success: true,
        train,
    }))
}

/// GET /api/station-master/trains
///
/// Trains assigned to the calling station master.
pub async fn assigned_trains(
    State(state): State<SharedState>,
    identity: Identity,
) -> Result<Json<serde_json::Value>, AppError> {
    require_permission(
        state.auth.audit.as_ref(),
        &identity,
        Permission::ReadTrain,
        "/api/station-master/trains",
        "list assigned trains",
    )?;

    let trains = state.trains.for_station_master(identity.user_id).await;
    Ok(Json(serde_json::json!({
        "success": true,
        "trains": trains
    })))
}
