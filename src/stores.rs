//! In-memory stores for trains, alerts, and reroutes
//!
//! Thread-safe stores keyed by id. Listing snapshots the map, so readers
//! never block writers for long.

use crate::error::AppError;
use crate::models::{Alert, Reroute, Train};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Thread-safe train store
pub struct TrainStore {
    trains: Arc<RwLock<HashMap<Uuid, Train>>>,
}

impl TrainStore {
    pub fn new() -> Self {
        Self {
            trains: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a new train
    pub async fn create(&self, train: Train) -> Result<Train, AppError> {
        let mut trains = self.trains.write().await;
        if trains
            .values()
            .any(|t| t.train_number == train.train_number)
        {
            return Err(AppError::Conflict(format!(
                "Train {} already exists",
                train.train_number
            )));
        }
        trains.insert(train.id, train.clone());
        Ok(train)
    }

    /// Get a train by ID
    pub async fn get(&self, id: Uuid) -> Result<Train, AppError> {
        let trains = self.trains.read().await;
        trains
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Train {} not found", id)))
    }

    /// List trains with optional source/destination filters, newest first.
    /// Returns the page plus the total match count.
    pub async fn list(
        &self,
        source: Option<&str>,
        destination: Option<&str>,
        page: usize,
        limit: usize,
    ) -> (Vec<Train>, usize) {
        let trains = self.trains.read().await;
        let mut matched: Vec<Train> = trains
            .values()
            .filter(|t| source.map_or(true, |s| t.source.eq_ignore_ascii_case(s)))
            .filter(|t| destination.map_or(true, |d| t.destination.eq_ignore_ascii_case(d)))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len();
        let start = (page - 1).saturating_mul(limit);
        let items = matched.into_iter().skip(start).take(limit).collect();
        (items, total)
    }

    /// Update a train in place
    pub async fn update(&self, train: Train) -> Result<Train, AppError> {
        let mut trains = self.trains.write().await;
        if !trains.contains_key(&train.id) {
            return Err(AppError::NotFound(format!("Train {} not found", train.id)));
        }
        trains.insert(train.id, train.clone());
        Ok(train)
    }

    /// Delete a train
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut trains = self.trains.write().await;
        trains
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Train {} not found", id)))
    }

    /// Trains assigned to one station master
    pub async fn for_station_master(&self, user_id: i64) -> Vec<Train> {
        let trains = self.trains.read().await;
        let mut assigned: Vec<Train> = trains
            .values()
            .filter(|t| t.station_master_id == Some(user_id))
            .cloned()
            .collect();
        assigned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        assigned
    }

    pub async fn count(&self) -> usize {
        let trains = self.trains.read().await;
        trains.len()
    }
}

impl Default for TrainStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe alert store
pub struct AlertStore {
    alerts: Arc<RwLock<HashMap<Uuid, Alert>>>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self {
            alerts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a new alert
    pub async fn create(&self, alert: Alert) -> Result<Alert, AppError> {
        let mut alerts = self.alerts.write().await;
        alerts.insert(alert.id, alert.clone());
        Ok(alert)
    }

    /// Get an alert by ID
    pub async fn get(&self, id: Uuid) -> Result<Alert, AppError> {
        let alerts = self.alerts.read().await;
        alerts
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Alert {} not found", id)))
    }

    /// List all alerts (optionally filtered by train), newest first
    pub async fn list(&self, train_id: Option<Uuid>) -> Vec<Alert> {
        let alerts = self.alerts.read().await;
        let mut matched: Vec<Alert> = alerts
            .values()
            .filter(|a| train_id.map_or(true, |tid| a.train_id == tid))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched
    }

    /// Update an alert in place
    pub async fn update(&self, alert: Alert) -> Result<Alert, AppError> {
        let mut alerts = self.alerts.write().await;
        if !alerts.contains_key(&alert.id) {
            return Err(AppError::NotFound(format!("Alert {} not found", alert.id)));
        }
        alerts.insert(alert.id, alert.clone());
        Ok(alert)
    }

    /// Delete an alert
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut alerts = self.alerts.write().await;
        alerts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Alert {} not found", id)))
    }

    pub async fn count(&self) -> usize {
        let alerts = self.alerts.read().await;
        alerts.len()
    }
}

impl Default for AlertStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe reroute store
pub struct RerouteStore {
    reroutes: Arc<RwLock<HashMap<Uuid, Reroute>>>,
}

impl RerouteStore {
    pub fn new() -> Self {
        Self {
            reroutes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Record a reroute
    pub async fn create(&self, reroute: Reroute) -> Result<Reroute, AppError> {
        let mut reroutes = self.reroutes.write().await;
        reroutes.insert(reroute.id, reroute.clone());
        Ok(reroute)
    }

    /// List all reroutes (optionally filtered by train), newest first
    pub async fn list(&self, train_id: Option<Uuid>) -> Vec<Reroute> {
        let reroutes = self.reroutes.read().await;
        let mut matched: Vec<Reroute> = reroutes
            .values()
            .filter(|r| train_id.map_or(true, |tid| r.train_id == tid))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched
    }

    /// Delete a reroute record
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut reroutes = self.reroutes.write().await;
        reroutes
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Reroute {} not found", id)))
    }
}

impl Default for RerouteStore {
    fn default() -> Self {
        Self::new()
    }
}
