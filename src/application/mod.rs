// Application layer - Use cases over the shared dashboard state
pub mod district_service;
pub mod goal_service;
pub mod scheduler;
pub mod telemetry_repository;
pub mod trend_service;

#[cfg(test)]
pub mod fake_repository;

use crate::domain::dashboard::DashboardState;
use std::sync::Arc;
use tokio::sync::RwLock;

pub type SharedState = Arc<RwLock<DashboardState>>;
