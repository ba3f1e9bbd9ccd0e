// Dashboard domain model: the live state shared by fetchers and the render layer
use super::compliance::{ComplianceResult, ComplianceThreshold};
use super::district::{District, DistrictReading, DistrictSnapshot, Insights, SensorMetric};
use super::hourly::HourlyBin;
use super::sequence::RequestSequencer;
use super::telemetry::Series;
use super::window::TimeWindow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ViewingMode {
    Live,
    Historical { date: NaiveDate },
}

/// Chart data for one section: a series per district over one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendView {
    pub metric: SensorMetric,
    pub window: Option<TimeWindow>,
    pub series: BTreeMap<District, Series>,
}

impl TrendView {
    fn empty(metric: SensorMetric) -> Self {
        Self {
            metric,
            window: None,
            series: District::ALL.iter().map(|d| (*d, Series::new())).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalReport {
    pub district: District,
    pub date: NaiveDate,
    pub threshold: ComplianceThreshold,
    pub bin: HourlyBin,
    pub result: ComplianceResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub districts: Vec<DistrictSnapshot>,
    pub insights: Option<Insights>,
    pub modes: BTreeMap<SensorMetric, ViewingMode>,
}

/// Change notifications for the render layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    ReadingsUpdated { metric: SensorMetric },
    TrendUpdated { metric: SensorMetric },
    GoalUpdated { district: District },
    ModeChanged { metric: SensorMetric, mode: ViewingMode },
}

/// Process-wide dashboard state, owned behind one lock by the services.
#[derive(Debug)]
pub struct DashboardState {
    readings: BTreeMap<District, DistrictReading>,
    trends: BTreeMap<SensorMetric, TrendView>,
    goal: Option<GoalReport>,
    modes: BTreeMap<SensorMetric, ViewingMode>,
    pub sequencer: RequestSequencer,
}

impl DashboardState {
    /// Demo readings, empty charts, every section live.
    pub fn seeded() -> Self {
        Self {
            readings: District::ALL
                .iter()
                .map(|d| (*d, DistrictReading::seed(*d)))
                .collect(),
            trends: SensorMetric::ALL
                .iter()
                .map(|m| (*m, TrendView::empty(*m)))
                .collect(),
            goal: None,
            modes: SensorMetric::ALL
                .iter()
                .map(|m| (*m, ViewingMode::Live))
                .collect(),
            sequencer: RequestSequencer::default(),
        }
    }

    pub fn reading(&self, district: District) -> DistrictReading {
        self.readings
            .get(&district)
            .copied()
            .unwrap_or_else(|| DistrictReading::seed(district))
    }

    pub fn set_reading(&mut self, district: District, metric: SensorMetric, value: f64) {
        self.readings
            .entry(district)
            .or_insert_with(|| DistrictReading::seed(district))
            .set(metric, value);
    }

    pub fn district_snapshot(&self, district: District) -> DistrictSnapshot {
        DistrictSnapshot::new(district, &self.reading(district))
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let districts: Vec<DistrictSnapshot> = District::ALL
            .iter()
            .map(|d| self.district_snapshot(*d))
            .collect();
        let insights = Insights::from_snapshots(&districts);

        DashboardSnapshot {
            districts,
            insights,
            modes: self.modes.clone(),
        }
    }

    pub fn trend(&self, metric: SensorMetric) -> TrendView {
        self.trends
            .get(&metric)
            .cloned()
            .unwrap_or_else(|| TrendView::empty(metric))
    }

    pub fn set_trend_window(&mut self, metric: SensorMetric, window: TimeWindow) {
        self.trends
            .entry(metric)
            .or_insert_with(|| TrendView::empty(metric))
            .window = Some(window);
    }

    pub fn set_series(&mut self, metric: SensorMetric, district: District, series: Series) {
        self.trends
            .entry(metric)
            .or_insert_with(|| TrendView::empty(metric))
            .series
            .insert(district, series);
    }

    pub fn goal(&self) -> Option<&GoalReport> {
        self.goal.as_ref()
    }

    pub fn set_goal(&mut self, report: GoalReport) {
        self.goal = Some(report);
    }

    pub fn mode(&self, metric: SensorMetric) -> ViewingMode {
        self.modes.get(&metric).copied().unwrap_or(ViewingMode::Live)
    }

    pub fn set_mode(&mut self, metric: SensorMetric, mode: ViewingMode) {
        self.modes.insert(metric, mode);
    }
}
