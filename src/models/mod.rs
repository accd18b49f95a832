//! Domain models
//!
//! Trains, alerts, and reroutes, with validated request payloads.

mod alert;
mod reroute;
mod train;

pub use alert::{Alert, AlertType, CreateAlertRequest, UpdateAlertRequest};
pub use reroute::{CreateRerouteRequest, Reroute};
pub use train::{CreateTrainRequest, Train, TrainQuery, UpdateTrainRequest};
