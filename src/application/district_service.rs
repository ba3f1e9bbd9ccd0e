// District service - Live and historical per-district readings
use crate::application::SharedState;
use crate::application::telemetry_repository::{TelemetryError, TelemetryRepository};
use crate::domain::dashboard::{DashboardEvent, DashboardSnapshot, ViewingMode};
use crate::domain::district::{District, DistrictSnapshot, SensorMetric};
use crate::domain::sequence::RequestKey;
use crate::infrastructure::config::DistrictsConfig;
use chrono::NaiveDate;
use futures::future::join_all;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

enum ReadingOutcome {
    Value(f64),
    NoData,
    Failed(TelemetryError),
    Unconfigured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollKind {
    Live,
    Historical,
}

impl fmt::Display for PollKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollKind::Live => f.write_str("live"),
            PollKind::Historical => f.write_str("historical"),
        }
    }
}

#[derive(Clone)]
pub struct DistrictService {
    repository: Arc<dyn TelemetryRepository>,
    districts: DistrictsConfig,
    state: SharedState,
    events: broadcast::Sender<DashboardEvent>,
}

impl DistrictService {
    pub fn new(
        repository: Arc<dyn TelemetryRepository>,
        districts: DistrictsConfig,
        state: SharedState,
        events: broadcast::Sender<DashboardEvent>,
    ) -> Self {
        Self {
            repository,
            districts,
            state,
            events,
        }
    }

    /// Refresh every district's latest `metric` reading.
    ///
    /// Districts are fetched concurrently and applied together; a failing
    /// district keeps its last known value and never affects the others.
    pub async fn poll_live(&self, metric: SensorMetric) {
        let ticket = self.issue_ticket(metric).await;

        let outcomes = join_all(District::ALL.into_iter().map(|district| async move {
            let field = self.districts.field(district, metric);
            if !field.is_configured() {
                return (district, ReadingOutcome::Unconfigured);
            }
            let outcome = match self.repository.fetch_last_field(field).await {
                Ok(value) => ReadingOutcome::Value(value),
                Err(e) => ReadingOutcome::Failed(e),
            };
            (district, outcome)
        }))
        .await;

        self.apply(metric, ticket, PollKind::Live, outcomes).await;
    }

    /// Replace every district's `metric` reading with its average over `date`.
    /// Days without data and failed fetches both keep the previous value.
    pub async fn poll_historical(&self, metric: SensorMetric, date: NaiveDate) {
        let ticket = self.issue_ticket(metric).await;

        let outcomes = join_all(District::ALL.into_iter().map(|district| async move {
            let field = self.districts.field(district, metric);
            if !field.is_configured() {
                return (district, ReadingOutcome::Unconfigured);
            }
            let outcome = match self.repository.fetch_daily_average(field, date).await {
                Ok(Some(value)) => ReadingOutcome::Value(value),
                Ok(None) => ReadingOutcome::NoData,
                Err(e) => ReadingOutcome::Failed(e),
            };
            (district, outcome)
        }))
        .await;

        self.apply(metric, ticket, PollKind::Historical, outcomes).await;
    }

    /// Force raw readings for a district, for manual testing of the render layer.
    pub async fn override_reading(
        &self,
        district: District,
        pm25: Option<f64>,
        temp: Option<f64>,
    ) -> DistrictSnapshot {
        let mut changed = Vec::new();
        let snapshot = {
            let mut state = self.state.write().await;
            for (metric, value) in [(SensorMetric::Pm25, pm25), (SensorMetric::Temp, temp)] {
                if let Some(value) = value {
                    state.set_reading(district, metric, value);
                    changed.push(metric);
                }
            }
            state.district_snapshot(district)
        };

        tracing::info!("Manual override for {}: {:?}", district, snapshot);
        for metric in changed {
            self.notify(DashboardEvent::ReadingsUpdated { metric });
        }
        snapshot
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.state.read().await.snapshot()
    }

    async fn issue_ticket(&self, metric: SensorMetric) -> u64 {
        self.state
            .write()
            .await
            .sequencer
            .issue(RequestKey::Readings(metric))
    }

    async fn apply(
        &self,
        metric: SensorMetric,
        ticket: u64,
        kind: PollKind,
        outcomes: Vec<(District, ReadingOutcome)>,
    ) {
        let mut state = self.state.write().await;
        if !state.sequencer.is_current(RequestKey::Readings(metric), ticket) {
            tracing::debug!(
                "Discarding stale {} {} poll (ticket {})",
                kind,
                metric,
                ticket
            );
            return;
        }
        // A timer tick already in flight when the section went historical
        if kind == PollKind::Live && state.mode(metric) != ViewingMode::Live {
            tracing::debug!("Discarding live {} poll; section is {:?}", metric, state.mode(metric));
            return;
        }

        let mut updated = 0;
        for (district, outcome) in outcomes {
            match outcome {
                ReadingOutcome::Value(value) => {
                    let previous = state.reading(district).get(metric);
                    state.set_reading(district, metric, value);
                    tracing::debug!("{} {}: {} -> {}", district, metric, previous, value);
                    updated += 1;
                }
                ReadingOutcome::NoData => {
                    tracing::info!(
                        "No {} data for {}; keeping previous value",
                        metric,
                        district
                    );
                }
                ReadingOutcome::Failed(e) if e.is_fetch_error() => {
                    tracing::warn!(
                        "{} {} poll failed for {}: {}; keeping last known value",
                        kind,
                        metric,
                        district,
                        e
                    );
                }
                ReadingOutcome::Failed(e) => {
                    tracing::info!(
                        "{} {} reading for {} unusable: {}; keeping last known value",
                        kind,
                        metric,
                        district,
                        e
                    );
                }
                ReadingOutcome::Unconfigured => {}
            }
        }
        drop(state);

        tracing::debug!("Applied {} {} poll: {} of 3 districts updated", kind, metric, updated);
        self.notify(DashboardEvent::ReadingsUpdated { metric });
    }

    fn notify(&self, event: DashboardEvent) {
        // No subscribers is fine; the render layer may not be connected
        let _ = self.events.send(event);
    }
}
