// Scripted repository for service tests
use crate::application::telemetry_repository::{TelemetryError, TelemetryRepository};
use crate::domain::telemetry::{SensorFieldRef, Series};
use crate::domain::window::TimeWindow;
use crate::infrastructure::config::{DistrictFields, DistrictsConfig};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

type FieldKey = (String, u8);

fn key(field: &SensorFieldRef) -> FieldKey {
    (field.channel_id.clone(), field.field_index)
}

fn outage(field: &SensorFieldRef) -> TelemetryError {
    TelemetryError::Transport {
        url: format!("fake://{}/{}", field.channel_id, field.field_index),
        message: "connection reset".to_string(),
    }
}

#[derive(Default)]
pub struct FakeRepository {
    last: Mutex<HashMap<FieldKey, Result<f64, TelemetryError>>>,
    daily: Mutex<HashMap<FieldKey, Result<Option<f64>, TelemetryError>>>,
    series: Mutex<HashMap<FieldKey, Result<Series, TelemetryError>>>,
    gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<FieldKey>>,
}

impl FakeRepository {
    pub fn with_last(self, field: &SensorFieldRef, value: f64) -> Self {
        self.last.lock().unwrap().insert(key(field), Ok(value));
        self
    }

    pub fn with_daily(self, field: &SensorFieldRef, value: Option<f64>) -> Self {
        self.daily.lock().unwrap().insert(key(field), Ok(value));
        self
    }

    pub fn with_series(self, field: &SensorFieldRef, series: Series) -> Self {
        self.series.lock().unwrap().insert(key(field), Ok(series));
        self
    }

    /// Hold every series and daily-average request until `gate` is notified.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    async fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }

    pub fn calls(&self) -> Vec<FieldKey> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TelemetryRepository for FakeRepository {
    async fn fetch_series(
        &self,
        field: &SensorFieldRef,
        _window: TimeWindow,
    ) -> Result<Series, TelemetryError> {
        self.calls.lock().unwrap().push(key(field));
        self.wait_for_gate().await;
        let scripted = self.series.lock().unwrap().get(&key(field)).cloned();
        scripted.unwrap_or_else(|| Err(outage(field)))
    }

    async fn fetch_last_field(&self, field: &SensorFieldRef) -> Result<f64, TelemetryError> {
        self.calls.lock().unwrap().push(key(field));
        let scripted = self.last.lock().unwrap().get(&key(field)).cloned();
        scripted.unwrap_or_else(|| Err(outage(field)))
    }

    async fn fetch_daily_average(
        &self,
        field: &SensorFieldRef,
        _date: NaiveDate,
    ) -> Result<Option<f64>, TelemetryError> {
        self.calls.lock().unwrap().push(key(field));
        self.wait_for_gate().await;
        let scripted = self.daily.lock().unwrap().get(&key(field)).cloned();
        scripted.unwrap_or_else(|| Err(outage(field)))
    }
}

/// One channel per district; PM2.5 on field 1, temperature on field 2.
pub fn test_districts() -> DistrictsConfig {
    let fields = |channel: &str| DistrictFields {
        pm25: SensorFieldRef::new(channel, None, 1),
        temp: SensorFieldRef::new(channel, None, 2),
    };
    DistrictsConfig {
        klong: fields("klong-ch"),
        thon: fields("thon-ch"),
        bang: fields("bang-ch"),
    }
}
