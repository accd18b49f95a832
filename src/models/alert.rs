//! Passenger alert model and request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// What the alert announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    #[default]
    All,
    Delay,
    Cancellation,
    PlatformChange,
    Reroute,
}

/// A passenger-facing alert for one train
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    pub train_id: Uuid,
    pub train_name: String,
    pub source: String,
    pub destination: String,
    pub alert_type: AlertType,
    /// User who created the alert
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertRequest {
    pub train_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Train name must be 1-200 characters"))]
    pub train_name: String,
    #[validate(length(min = 1, max = 100, message = "Source must be 1-100 characters"))]
    pub source: String,
    #[validate(length(min = 1, max = 100, message = "Destination must be 1-100 characters"))]
    pub destination: String,
    #[serde(default)]
    pub alert_type: AlertType,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlertRequest {
    #[validate(length(min = 1, max = 200))]
    pub train_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub source: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub destination: Option<String>,
    pub alert_type: Option<AlertType>,
}
