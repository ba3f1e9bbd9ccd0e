// Repository trait for upstream telemetry access
use crate::domain::telemetry::{SensorFieldRef, Series};
use crate::domain::window::TimeWindow;
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TelemetryError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("upstream returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("unexpected response from {url}: {message}")]
    Parse { url: String, message: String },

    #[error("unable to resolve a value for field {field}")]
    UnresolvedField { field: u8 },

    #[error("no channel configured for field {field}")]
    Unconfigured { field: u8 },
}

impl TelemetryError {
    /// Transport failures and non-success statuses, as opposed to bodies
    /// that arrived but could not be read.
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, TelemetryError::Transport { .. } | TelemetryError::Status { .. })
    }
}

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// Samples of one field inside `window`, ascending by timestamp.
    async fn fetch_series(
        &self,
        field: &SensorFieldRef,
        window: TimeWindow,
    ) -> Result<Series, TelemetryError>;

    /// Most recent numeric value of one field.
    async fn fetch_last_field(&self, field: &SensorFieldRef) -> Result<f64, TelemetryError>;

    /// Mean of one field over a local calendar day; `Ok(None)` when the day
    /// has no readings.
    async fn fetch_daily_average(
        &self,
        field: &SensorFieldRef,
        date: NaiveDate,
    ) -> Result<Option<f64>, TelemetryError>;
}
