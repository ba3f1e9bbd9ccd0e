// Goal service - Hourly compliance of one district over one local day
use crate::application::SharedState;
use crate::application::telemetry_repository::{TelemetryError, TelemetryRepository};
use crate::domain::compliance::{ComplianceThreshold, score};
use crate::domain::dashboard::{DashboardEvent, GoalReport};
use crate::domain::district::District;
use crate::domain::hourly::bin_hourly;
use crate::domain::sequence::RequestKey;
use crate::domain::window::TimeWindow;
use crate::infrastructure::config::{DistrictsConfig, GoalPresets};
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct GoalService {
    repository: Arc<dyn TelemetryRepository>,
    districts: DistrictsConfig,
    presets: GoalPresets,
    timezone: Tz,
    state: SharedState,
    events: broadcast::Sender<DashboardEvent>,
}

impl GoalService {
    pub fn new(
        repository: Arc<dyn TelemetryRepository>,
        districts: DistrictsConfig,
        presets: GoalPresets,
        timezone: Tz,
        state: SharedState,
        events: broadcast::Sender<DashboardEvent>,
    ) -> Self {
        Self {
            repository,
            districts,
            presets,
            timezone,
            state,
            events,
        }
    }

    pub fn presets(&self) -> &GoalPresets {
        &self.presets
    }

    /// Score `district` against `threshold` for each local hour of `date`.
    ///
    /// The report is returned to the caller either way; it only replaces the
    /// tracker's latest report if no newer evaluation was started meanwhile.
    pub async fn evaluate(
        &self,
        district: District,
        date: NaiveDate,
        threshold: ComplianceThreshold,
    ) -> Result<GoalReport, TelemetryError> {
        let field = self.districts.field(district, threshold.metric.sensor());
        if !field.is_configured() {
            return Err(TelemetryError::Unconfigured {
                field: field.field_index,
            });
        }

        let ticket = self.state.write().await.sequencer.issue(RequestKey::Goal);
        let window = TimeWindow::for_date(date, &self.timezone);
        let series = self.repository.fetch_series(field, window).await?;

        let bin = bin_hourly(&series, threshold.metric, &self.timezone);
        let result = score(&bin, &threshold);
        tracing::info!(
            "Goal {} {} on {}: {} within, {} exceeding, best streak {}h ({} of 24 hours with data)",
            district,
            threshold.metric,
            date,
            result.within_hours,
            result.exceed_hours,
            result.longest_streak,
            bin.filled_hours()
        );

        let report = GoalReport {
            district,
            date,
            threshold,
            bin,
            result,
        };

        let mut state = self.state.write().await;
        if state.sequencer.is_current(RequestKey::Goal, ticket) {
            state.set_goal(report.clone());
            drop(state);
            let _ = self.events.send(DashboardEvent::GoalUpdated { district });
        } else {
            tracing::debug!("Not publishing stale goal evaluation (ticket {})", ticket);
        }

        Ok(report)
    }

    pub async fn latest(&self) -> Option<GoalReport> {
        self.state.read().await.goal().cloned()
    }
}
