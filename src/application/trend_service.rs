// Trend service - Per-district chart series for one section
use crate::application::SharedState;
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::dashboard::{DashboardEvent, TrendView};
use crate::domain::district::{District, SensorMetric};
use crate::domain::sequence::RequestKey;
use crate::domain::window::TimeWindow;
use crate::infrastructure::config::DistrictsConfig;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct TrendService {
    repository: Arc<dyn TelemetryRepository>,
    districts: DistrictsConfig,
    state: SharedState,
    events: broadcast::Sender<DashboardEvent>,
}

impl TrendService {
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

    /// Load every district's `metric` series over `window` into the chart.
    ///
    /// A district whose fetch fails keeps the series it had before, so one
    /// outage leaves a stale line rather than an empty chart.
    pub async fn load_trend(&self, metric: SensorMetric, window: TimeWindow) {
        let ticket = self
            .state
            .write()
            .await
            .sequencer
            .issue(RequestKey::Trend(metric));

        let results = join_all(District::ALL.into_iter().map(|district| async move {
            let field = self.districts.field(district, metric);
            if !field.is_configured() {
                return (district, None);
            }
            (district, Some(self.repository.fetch_series(field, window).await))
        }))
        .await;

        let mut state = self.state.write().await;
        if !state.sequencer.is_current(RequestKey::Trend(metric), ticket) {
            tracing::debug!("Discarding stale {} trend load (ticket {})", metric, ticket);
            return;
        }

        state.set_trend_window(metric, window);
        for (district, result) in results {
            match result {
                Some(Ok(series)) => {
                    tracing::debug!("Loaded {} {} samples for {}", series.len(), metric, district);
                    state.set_series(metric, district, series);
                }
                Some(Err(e)) => {
                    tracing::warn!("{} trend fetch failed for {}: {}", metric, district, e);
                }
                None => {}
            }
        }
        drop(state);

        let _ = self.events.send(DashboardEvent::TrendUpdated { metric });
    }

    pub async fn trend(&self, metric: SensorMetric) -> TrendView {
        self.state.read().await.trend(metric)
    }
}
