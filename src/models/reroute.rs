//! Reroute records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A recorded reroute for one train
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reroute {
    pub id: Uuid,
    pub train_id: Uuid,
    pub source: String,
    pub destination: String,
    pub reason: Option<String>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRerouteRequest {
    pub train_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "Source must be 1-100 characters"))]
    pub source: String,
    #[validate(length(min = 1, max = 100, message = "Destination must be 1-100 characters"))]
    pub destination: String,
    #[validate(length(max = 500, message = "Reason must not exceed 500 characters"))]
    pub reason: Option<String>,
}
