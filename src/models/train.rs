//! Train model and request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A train in the network
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Train {
    pub id: Uuid,
    pub train_number: String,
    pub name: String,
    pub source: String,
    pub destination: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub status: String,
    /// Station master responsible for this train, if assigned
    pub station_master_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrainRequest {
    #[validate(length(min = 1, max = 10, message = "Train number must be 1-10 characters"))]
    pub train_number: String,
    #[validate(length(min = 1, max = 200, message = "Train name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Source must be 1-100 characters"))]
    pub source: String,
    #[validate(length(min = 1, max = 100, message = "Destination must be 1-100 characters"))]
    pub destination: String,
    #[validate(length(min = 1, max = 20))]
    pub departure_time: String,
    #[validate(length(min = 1, max = 20))]
    pub arrival_time: String,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTrainRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub source: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub destination: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub departure_time: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub arrival_time: Option<String>,
    pub status: Option<String>,
    pub station_master_id: Option<i64>,
}

/// Query parameters for listing trains
#[derive(Debug, Default, Deserialize)]
pub struct TrainQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub source: Option<String>,
    pub destination: Option<String>,
}

impl TrainQuery {
    /// Normalized (page, limit); limit is clamped to 100
    pub fn pagination(&self) -> (usize, usize) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(10).clamp(1, 100);
        (page, limit)
    }
}
